use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("ghostdash")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch and manage grocery scrape sessions")
        .long_about("ghostdash talks to a remote scrape job API. It lists scrape sessions, follows their progress live, starts new scrapes, and exports extracted products.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Remote API base address (overrides config)")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List scrape sessions, most recent first")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("show")
                .about("Show a session's progress and products")
                .arg(
                    Arg::new("id")
                        .help("Session id (defaults to the most recent session with products)")
                        .index(1)
                )
                .arg(
                    Arg::new("search")
                        .long("search")
                        .short('s')
                        .help("Only show products whose name or category contains this text")
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("start")
                .about("Start scraping a store URL")
                .arg(
                    Arg::new("url")
                        .help("Store page to scrape")
                        .required(true)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a session and its products")
                .arg(
                    Arg::new("id")
                        .help("Session id to delete")
                        .required(true)
                        .index(1)
                )
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .short('y')
                        .help("Skip the confirmation prompt")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("export")
                .about("Export a session's products as CSV")
                .arg(
                    Arg::new("id")
                        .help("Session id to export")
                        .required(true)
                        .index(1)
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("File name to save as (default: derived from the session name)")
                )
        )
        .subcommand(
            Command::new("watch")
                .about("Follow sessions live until interrupted")
                .long_about(
                    "Without an id, redraws the session list every time it changes.\n\
                    With an id, prints progress updates for that session and exits once it completes, fails, or is canceled."
                )
                .arg(
                    Arg::new("id")
                        .help("Session id to follow")
                        .index(1)
                )
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        let app = build_cli();
        assert_eq!(app.get_name(), "ghostdash");
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let app = build_cli();
        assert!(app.try_get_matches_from(vec!["ghostdash"]).is_err());
    }

    #[test]
    fn test_cli_list_json_flag() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["ghostdash", "list", "--json"])
            .unwrap();
        let list_matches = matches.subcommand_matches("list").unwrap();
        assert!(list_matches.get_flag("json"));
    }

    #[test]
    fn test_cli_show_with_search() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["ghostdash", "show", "abc123", "--search", "milk"])
            .unwrap();
        let show_matches = matches.subcommand_matches("show").unwrap();
        assert_eq!(show_matches.get_one::<String>("id").unwrap(), "abc123");
        assert_eq!(show_matches.get_one::<String>("search").unwrap(), "milk");
    }

    #[test]
    fn test_cli_show_id_is_optional() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["ghostdash", "show"]).unwrap();
        let show_matches = matches.subcommand_matches("show").unwrap();
        assert!(show_matches.get_one::<String>("id").is_none());
    }

    #[test]
    fn test_cli_start_requires_url() {
        let app = build_cli();
        assert!(app.try_get_matches_from(vec!["ghostdash", "start"]).is_err());
    }

    #[test]
    fn test_cli_delete_yes_flag() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["ghostdash", "delete", "abc123", "-y"])
            .unwrap();
        let delete_matches = matches.subcommand_matches("delete").unwrap();
        assert!(delete_matches.get_flag("yes"));
    }

    #[test]
    fn test_cli_export_output() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["ghostdash", "export", "abc123", "-o", "milk.csv"])
            .unwrap();
        let export_matches = matches.subcommand_matches("export").unwrap();
        assert_eq!(export_matches.get_one::<String>("output").unwrap(), "milk.csv");
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec![
                "ghostdash",
                "watch",
                "--verbose",
                "--base-url",
                "http://localhost:8000/api",
            ])
            .unwrap();
        assert!(matches.get_flag("verbose"));
        assert_eq!(
            matches.get_one::<String>("base-url").unwrap(),
            "http://localhost:8000/api"
        );
        let watch_matches = matches.subcommand_matches("watch").unwrap();
        assert!(watch_matches.get_one::<String>("id").is_none());
    }
}
