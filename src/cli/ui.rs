use crate::core::insight::Sentiment;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Value,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Value => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned rate cell; the placeholder is dimmed.
pub fn rate_cell(text: &str, available: bool) -> Cell {
    let cell = Cell::new(text).set_alignment(CellAlignment::Right);
    if available {
        cell.add_attribute(Attribute::Bold)
    } else {
        cell.fg(Color::DarkGrey)
    }
}

/// Upper-case sentiment badge, green/red/blue like the insight card.
pub fn sentiment_badge(sentiment: Sentiment) -> String {
    let text = format!("[{}]", sentiment.to_string().to_uppercase());
    let styled = match sentiment {
        Sentiment::Positive => style(text).green().bold(),
        Sentiment::Negative => style(text).red().bold(),
        Sentiment::Neutral => style(text).blue().bold(),
    };
    styled.to_string()
}

/// Creates a ticking spinner for work of unknown length.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Returns a separator line matching the terminal width.
pub fn separator() -> String {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    "─".repeat(term_width)
}
