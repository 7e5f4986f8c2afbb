use std::io::{self, Write};
use std::sync::Arc;

use clap::ArgMatches;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use ghostdash_core::config::GhostdashConfig;
use ghostdash_core::events;
use ghostdash_core::sessions::{default_export_filename, filter_products};
use ghostdash_core::{
    CacheChange, CacheKey, CacheSnapshot, Dashboard, Event, Session, SessionCounts, resolve,
};

use crate::table::TableFormatter;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
fn load_config_with_warning() -> GhostdashConfig {
    match GhostdashConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.ghostdash/config.toml and ./.ghostdash/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            GhostdashConfig::default()
        }
    }
}

/// Config from files plus command-line overrides.
fn resolve_config(matches: &ArgMatches) -> Result<GhostdashConfig, Box<dyn std::error::Error>> {
    let mut config = load_config_with_warning();
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.remote.base_url = Some(base_url.clone());
        config.validate()?;
    }
    Ok(config)
}

fn is_confirmation_accepted(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    normalized == "y" || normalized == "yes"
}

/// `--output` if given, otherwise a name derived from the session, otherwise
/// one derived from the id.
fn export_file_name(output: Option<&str>, id: &str, sessions: Option<&[Session]>) -> String {
    if let Some(name) = output {
        return name.to_string();
    }
    sessions
        .and_then(|list| list.iter().find(|s| s.id == id))
        .map(default_export_filename)
        .unwrap_or_else(|| format!("{id}_products.csv"))
}

fn stale_note(snapshot: &CacheSnapshot) -> Option<String> {
    snapshot
        .warning
        .as_ref()
        .map(|w| format!("Showing last known data; refresh failed: {}", w.reason))
}

pub async fn run_command(matches: &ArgMatches) -> CommandResult {
    events::log_app_startup();

    let config = resolve_config(matches)?;
    let dashboard = Dashboard::from_config(&config)?;

    let result = match matches.subcommand() {
        Some(("list", sub_matches)) => handle_list_command(&dashboard, sub_matches).await,
        Some(("show", sub_matches)) => handle_show_command(&dashboard, sub_matches).await,
        Some(("start", sub_matches)) => handle_start_command(&dashboard, sub_matches).await,
        Some(("delete", sub_matches)) => handle_delete_command(&dashboard, sub_matches).await,
        Some(("export", sub_matches)) => handle_export_command(&dashboard, sub_matches).await,
        Some(("watch", sub_matches)) => handle_watch_command(&dashboard, sub_matches).await,
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    events::log_app_shutdown();
    result
}

async fn handle_list_command(dashboard: &Dashboard, matches: &ArgMatches) -> CommandResult {
    let json_output = matches.get_flag("json");
    info!(event = "cli.list_started", json_output = json_output);

    let snapshot = dashboard.list_sessions().await;
    let Some(sessions) = snapshot.sessions() else {
        let reason = snapshot
            .warning
            .as_ref()
            .map_or("no data", |w| w.reason.as_str());
        eprintln!("❌ Failed to list sessions: {}", reason);
        error!(event = "cli.list_failed", error = reason);
        return Err(format!("Failed to list sessions: {reason}").into());
    };

    let current = resolve(None, sessions);

    if json_output {
        #[derive(serde::Serialize)]
        struct ListOutput<'a> {
            sessions: &'a [Session],
            current: Option<&'a str>,
            counts: SessionCounts,
            stale: bool,
        }

        let output = ListOutput {
            sessions,
            current: current.as_deref(),
            counts: SessionCounts::from_sessions(sessions),
            stale: snapshot.is_stale,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if sessions.is_empty() {
        println!("No scrape sessions yet. Start one with `ghostdash start <url>`.");
    } else {
        print_session_list(sessions, current.as_deref());
    }

    if let Some(note) = stale_note(&snapshot) {
        eprintln!("⚠️  {}", note);
    }

    info!(event = "cli.list_completed", count = sessions.len());
    Ok(())
}

fn print_session_list(sessions: &[Session], current: Option<&str>) {
    let counts = SessionCounts::from_sessions(sessions);
    println!(
        "Sessions: {} total, {} active, {} completed, {} failed, {} canceled ({} products)",
        counts.total,
        counts.active,
        counts.completed,
        counts.failed,
        counts.canceled,
        counts.products
    );
    TableFormatter::for_sessions(sessions).print_sessions(sessions, current);
}

async fn handle_show_command(dashboard: &Dashboard, matches: &ArgMatches) -> CommandResult {
    let json_output = matches.get_flag("json");
    let search = matches.get_one::<String>("search").map(String::as_str);

    let id = match matches.get_one::<String>("id") {
        Some(id) => id.clone(),
        None => {
            let list = dashboard.list_sessions().await;
            match list.sessions().and_then(|s| resolve(None, s)) {
                Some(id) => id,
                None => {
                    println!("No session with products yet.");
                    return Ok(());
                }
            }
        }
    };

    info!(event = "cli.show_started", session_id = %id);

    let snapshot = dashboard.get_session(&id).await;
    let Some(detail) = snapshot.detail() else {
        let reason = snapshot
            .warning
            .as_ref()
            .map_or("no data", |w| w.reason.as_str());
        eprintln!("❌ Failed to load session '{}': {}", id, reason);
        error!(event = "cli.show_failed", session_id = %id, error = reason);
        return Err(format!("Failed to load session '{id}': {reason}").into());
    };

    let products = filter_products(&detail.products, search.unwrap_or(""));

    if json_output {
        #[derive(serde::Serialize)]
        struct ShowOutput<'a> {
            #[serde(flatten)]
            session: &'a Session,
            progress: f64,
            error: Option<&'a str>,
            total_products: u64,
            products: &'a [&'a ghostdash_core::Product],
            stale: bool,
        }

        let output = ShowOutput {
            session: &detail.session,
            progress: detail.progress,
            error: detail.error.as_deref(),
            total_products: detail.total_products,
            products: &products,
            stale: snapshot.is_stale,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} ({})", detail.session.name, detail.session.url);
        println!(
            "Status: {}   Progress: {:.0}%   Products: {}",
            detail.status(),
            detail.progress,
            detail.total_products
        );
        if let Some(reason) = &detail.error {
            println!("Error: {}", reason);
        }
        if products.is_empty() {
            match search {
                Some(term) if !term.trim().is_empty() => {
                    println!("No products match '{}'.", term)
                }
                _ => println!("No products extracted yet."),
            }
        } else {
            TableFormatter::for_products(&products).print_products(&products);
        }
    }

    if let Some(note) = stale_note(&snapshot) {
        eprintln!("⚠️  {}", note);
    }

    info!(
        event = "cli.show_completed",
        session_id = %id,
        shown = products.len()
    );
    Ok(())
}

async fn handle_start_command(dashboard: &Dashboard, matches: &ArgMatches) -> CommandResult {
    let url = matches
        .get_one::<String>("url")
        .ok_or("URL argument is required")?;

    info!(event = "cli.start_started", url = %url);

    match dashboard.start_scraping(url).await {
        Ok(Event::ScrapeStarted {
            session_id,
            message,
        }) => {
            println!("✅ {}", message);
            println!("   Session: {}", session_id);
            println!("   Follow it with: ghostdash watch {}", session_id);
            info!(event = "cli.start_completed", session_id = %session_id);
            Ok(())
        }
        Ok(other) => Err(format!("Unexpected result: {other:?}").into()),
        Err(e) => {
            eprintln!("❌ Failed to start scraping: {}", e);
            error!(event = "cli.start_failed", url = %url, error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

async fn handle_delete_command(dashboard: &Dashboard, matches: &ArgMatches) -> CommandResult {
    let id = matches
        .get_one::<String>("id")
        .ok_or("Session id argument is required")?;

    if !matches.get_flag("yes") {
        print!("Delete session '{}' and all its products? [y/N] ", id);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !is_confirmation_accepted(&input) {
            println!("Aborted.");
            info!(event = "cli.delete_aborted", session_id = %id);
            return Ok(());
        }
    }

    info!(event = "cli.delete_started", session_id = %id);

    match dashboard.delete_session(id).await {
        Ok(_) => {
            println!("✅ Session '{}' deleted.", id);
            info!(event = "cli.delete_completed", session_id = %id);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Failed to delete session '{}': {}", id, e);
            error!(event = "cli.delete_failed", session_id = %id, error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

async fn handle_export_command(dashboard: &Dashboard, matches: &ArgMatches) -> CommandResult {
    let id = matches
        .get_one::<String>("id")
        .ok_or("Session id argument is required")?;
    let output = matches.get_one::<String>("output").map(String::as_str);

    let file_name = if output.is_some() {
        export_file_name(output, id, None)
    } else {
        let list = dashboard.list_sessions().await;
        export_file_name(None, id, list.sessions())
    };

    info!(
        event = "cli.export_started",
        session_id = %id,
        file_name = %file_name
    );

    match dashboard.export_session(id, &file_name).await {
        Ok(Event::SessionExported { path, bytes, .. }) => {
            println!("✅ Exported {} bytes to {}", bytes, path.display());
            info!(event = "cli.export_completed", session_id = %id, bytes = bytes);
            Ok(())
        }
        Ok(other) => Err(format!("Unexpected result: {other:?}").into()),
        Err(e) => {
            eprintln!("❌ Failed to export session '{}': {}", id, e);
            error!(event = "cli.export_failed", session_id = %id, error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

async fn handle_watch_command(dashboard: &Dashboard, matches: &ArgMatches) -> CommandResult {
    let key = match matches.get_one::<String>("id") {
        Some(id) => CacheKey::session(id.as_str()),
        None => CacheKey::Sessions,
    };

    info!(event = "cli.watch_started", key = %key);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = dashboard.subscribe(
        &key,
        Arc::new(move |_key: &CacheKey, change: CacheChange| {
            let _ = tx.send(change);
        }),
    );
    let handle = dashboard.watch(key.clone());

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break Ok(());
            }
            change = rx.recv() => {
                let Some(change) = change else { break Ok(()) };
                if change == CacheChange::Invalidated {
                    continue;
                }
                let Some(snapshot) = dashboard.cache().get(&key) else {
                    continue;
                };
                if render_watch_update(&key, &snapshot)? {
                    break Ok(());
                }
            }
        }
    };

    handle.unsubscribe();
    dashboard.unsubscribe(&key, subscription);
    info!(event = "cli.watch_completed", key = %key);
    result
}

/// Print the latest state of a watched key. Returns true once there is
/// nothing more to wait for.
fn render_watch_update(
    key: &CacheKey,
    snapshot: &CacheSnapshot,
) -> Result<bool, Box<dyn std::error::Error>> {
    match key {
        CacheKey::Sessions => {
            if let Some(sessions) = snapshot.sessions() {
                print!("\x1B[2J\x1B[1;1H");
                io::stdout().flush()?;
                if sessions.is_empty() {
                    println!("No scrape sessions yet.");
                } else {
                    print_session_list(sessions, resolve(None, sessions).as_deref());
                }
                println!("Watching for changes. Press Ctrl-C to stop.");
            }
            if let Some(note) = stale_note(snapshot) {
                eprintln!("⚠️  {}", note);
            }
            Ok(false)
        }
        CacheKey::Session(id) => {
            if let Some(note) = stale_note(snapshot) {
                eprintln!("⚠️  {}", note);
            }
            let Some(detail) = snapshot.detail() else {
                return Ok(false);
            };
            println!(
                "{}  {:>3.0}%  pages {}/{}  products {}",
                detail.status(),
                detail.progress,
                detail.session.scraped_pages,
                detail.session.total_pages,
                detail.total_products
            );
            if detail.status().is_terminal() {
                match &detail.error {
                    Some(reason) => println!("Session '{}' {}: {}", id, detail.status(), reason),
                    None => println!("Session '{}' {}.", id, detail.status()),
                }
                return Ok(true);
            }
            Ok(false)
        }
    }
}
