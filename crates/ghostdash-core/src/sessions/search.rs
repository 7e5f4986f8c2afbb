use crate::sessions::types::{Product, Session};

/// Filter products by a free-text term.
///
/// Matches case-insensitively against the product name or category.
/// A blank term returns every product.
pub fn filter_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }

    products
        .iter()
        .filter(|product| {
            let matches = |field: Option<&str>| {
                field.is_some_and(|value| value.to_lowercase().contains(&needle))
            };
            matches(product.name.as_deref()) || matches(product.category.as_deref())
        })
        .collect()
}

/// File name suggested for a session's export, e.g. `fresh_grocer_products.csv`.
pub fn default_export_filename(session: &Session) -> String {
    let slug = session
        .name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect::<String>()
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    let stem = if slug.is_empty() {
        session.id.as_str()
    } else {
        slug.as_str()
    };
    format!("{stem}_products.csv")
}
