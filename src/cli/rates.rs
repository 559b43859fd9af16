use super::ui;
use crate::core::{Conversion, Quote, Response};
use chrono::DateTime;
use comfy_table::Cell;

/// Renders a snapshot as a table of currency codes and rates, sorted by code.
pub fn display_snapshot(title: &str, response: &Response) -> String {
    let base = response.base_currency();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (per 1 {base})")),
    ]);

    let mut rates: Vec<_> = response.rates().iter().collect();
    rates.sort_by(|a, b| a.0.cmp(b.0));
    for (code, rate) in rates {
        table.add_row(vec![Cell::new(code), ui::rate_cell(*rate, code == base)]);
    }

    let mut output = format!(
        "{} (base {})\n",
        ui::style_text(title, ui::StyleType::Title),
        ui::style_text(base, ui::StyleType::Label)
    );
    if let Some(published) = response
        .timestamp()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
    {
        output.push_str(&ui::style_text(
            &format!("Published {}", published.format("%Y-%m-%d %H:%M UTC")),
            ui::StyleType::Subtle,
        ));
        output.push('\n');
    }
    output.push('\n');
    output.push_str(&table.to_string());
    output
}

pub fn display_quote(quote: &Quote) -> String {
    format!(
        "1 {} = {} {}",
        ui::style_text(&quote.from, ui::StyleType::Label),
        ui::style_text(&quote.rate.to_string(), ui::StyleType::Value),
        ui::style_text(&quote.to, ui::StyleType::Label)
    )
}

pub fn display_conversion(conversion: &Conversion) -> String {
    format!(
        "{} {} = {} {} {}",
        conversion.amount,
        ui::style_text(&conversion.quote.from, ui::StyleType::Label),
        ui::style_text(&format!("{:.2}", conversion.value), ui::StyleType::Value),
        ui::style_text(&conversion.quote.to, ui::StyleType::Label),
        ui::style_text(
            &format!("(rate {})", conversion.quote.rate),
            ui::StyleType::Subtle
        )
    )
}
