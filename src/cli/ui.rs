use crate::core::TransformedRates;
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
    Success,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Success => style(text).green().bold(),
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

pub fn rate_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.6}")).set_alignment(CellAlignment::Right)
}

/// One row per currency: code, rate, reverse rate.
pub fn rates_table(base: &str, rates: &TransformedRates) -> Table {
    let base = base.to_uppercase();
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Currency"),
        header_cell(&format!("Rate (per 1 {base})")),
        header_cell(&format!("Reverse rate ({base})")),
    ]);
    for (code, pair) in rates.iter() {
        table.add_row(vec![
            Cell::new(code.to_uppercase()),
            rate_cell(pair.rate),
            rate_cell(pair.reverse_rate),
        ]);
    }
    table
}

/// Creates a steadily ticking spinner; hidden when stderr is not a terminal.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RatePair;

    #[test]
    fn test_style_text_keeps_content() {
        for style_type in [
            StyleType::Title,
            StyleType::Label,
            StyleType::Success,
            StyleType::Subtle,
        ] {
            assert!(style_text("2025-09-24", style_type).contains("2025-09-24"));
        }
    }

    #[test]
    fn test_rates_table_rows() {
        let mut rates = TransformedRates::new();
        rates.insert("eur", RatePair::from_rate(1.25));
        rates.insert("usd", RatePair::from_rate(2.0));

        let rendered = rates_table("gbp", &rates).to_string();
        assert!(rendered.contains("Rate (per 1 GBP)"));
        assert!(rendered.contains("EUR"));
        assert!(rendered.contains("1.250000"));
        assert!(rendered.contains("0.800000"));
        assert!(rendered.find("EUR").unwrap() < rendered.find("USD").unwrap());
    }
}
