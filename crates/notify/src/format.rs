//! Pure rendering of a due-alert batch into notification text.
//!
//! Kept free of transport concerns so the exact wording is unit-testable
//! and shared between the email and log notifiers.

use homestock_db::models::alert::AlertWithItem;

/// Subject line for a batch. Names the item when the batch has exactly one
/// entry, otherwise counts them.
pub fn subject(batch: &[AlertWithItem]) -> String {
    match batch {
        [single] => format!("[Homestock] Low stock: {}", single.item_name),
        _ => format!("[Homestock] Low stock: {} items need attention", batch.len()),
    }
}

/// Plain-text body: a header plus one line per alert, in batch order.
pub fn body(batch: &[AlertWithItem]) -> String {
    let lines: Vec<String> = batch.iter().map(line).collect();
    format!(
        "The following items are at or below their alert threshold:\n\n{}\n",
        lines.join("\n")
    )
}

fn line(row: &AlertWithItem) -> String {
    let mut line = format!("- {}", row.item_name);
    if let Some(name) = &row.name {
        line.push_str(&format!(" ({name})"));
    }
    line.push_str(&format!(
        ": {} remaining, threshold {}",
        row.quantity, row.threshold
    ));
    if let Some(link) = &row.item_link {
        line.push_str(&format!(", reorder {link}"));
    }
    line
}
