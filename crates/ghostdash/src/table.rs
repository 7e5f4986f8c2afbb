use ghostdash_core::{Product, Session};

/// Box-drawn table with fixed column widths.
pub struct TableFormatter {
    headers: Vec<&'static str>,
    widths: Vec<usize>,
}

impl TableFormatter {
    fn new(headers: Vec<&'static str>, widths: Vec<usize>) -> Self {
        Self { headers, widths }
    }

    /// Columns: current marker, id, name, status, pages, products, started.
    pub fn for_sessions(sessions: &[Session]) -> Self {
        let id_width = sessions
            .iter()
            .map(|s| s.id.len())
            .max()
            .unwrap_or(8)
            .clamp(2, 36);
        let name_width = sessions
            .iter()
            .map(|s| s.name.chars().count())
            .max()
            .unwrap_or(16)
            .clamp(4, 40);

        Self::new(
            vec!["", "ID", "Name", "Status", "Pages", "Products", "Started"],
            vec![1, id_width, name_width, 11, 9, 8, 19],
        )
    }

    /// Columns: name, price, was, unit, category.
    pub fn for_products(products: &[&Product]) -> Self {
        let name_width = products
            .iter()
            .map(|p| p.name.as_deref().unwrap_or("").chars().count())
            .max()
            .unwrap_or(16)
            .clamp(4, 50);

        Self::new(
            vec!["Name", "Price", "Was", "Unit", "Category"],
            vec![name_width, 9, 9, 10, 24],
        )
    }

    pub fn print_sessions(&self, sessions: &[Session], current: Option<&str>) {
        self.print_header();
        for session in sessions {
            let marker = if current == Some(session.id.as_str()) { "*" } else { "" };
            self.print_row(&[
                marker,
                &session.id,
                &session.name,
                session.status.as_str(),
                &format!("{}/{}", session.scraped_pages, session.total_pages),
                &session.product_count.to_string(),
                &session.started_at,
            ]);
        }
        self.print_footer();
    }

    pub fn print_products(&self, products: &[&Product]) {
        self.print_header();
        for product in products {
            self.print_row(&[
                product.name.as_deref().unwrap_or("(unnamed)"),
                product.current_price.as_deref().unwrap_or("-"),
                product.original_price.as_deref().unwrap_or(""),
                product.unit_size.as_deref().unwrap_or(""),
                product.category.as_deref().unwrap_or(""),
            ]);
        }
        self.print_footer();
    }

    fn print_header(&self) {
        println!("{}", self.border('┌', '┬', '┐'));
        println!("{}", self.row(&self.headers));
        println!("{}", self.border('├', '┼', '┤'));
    }

    fn print_footer(&self) {
        println!("{}", self.border('└', '┴', '┘'));
    }

    fn print_row(&self, cells: &[&str]) {
        println!("{}", self.row(cells));
    }

    fn row(&self, cells: &[&str]) -> String {
        let cells: Vec<String> = cells
            .iter()
            .zip(&self.widths)
            .map(|(cell, width)| truncate(cell, *width))
            .collect();
        format!("│ {} │", cells.join(" │ "))
    }

    fn border(&self, left: char, middle: char, right: char) -> String {
        let segments: Vec<String> = self.widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(&middle.to_string()))
    }
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Uses character count (not byte count) to safely handle UTF-8 strings.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_pads_short_strings() {
        assert_eq!(truncate("abc", 5), "abc  ");
    }

    #[test]
    fn test_truncate_long_strings() {
        assert_eq!(truncate("Fresh Grocer Cedar Grove", 10), "Fresh G...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Crème fraîche épaisse", 8), "Crème...");
    }

    #[test]
    fn test_row_and_border_line_up() {
        let table = TableFormatter::new(vec!["A", "B"], vec![3, 2]);
        let row = table.row(&["x", "yy"]);
        let border = table.border('┌', '┬', '┐');
        assert_eq!(row, "│ x   │ yy │");
        assert_eq!(border, "┌─────┬────┐");
        assert_eq!(row.chars().count(), border.chars().count());
    }
}
