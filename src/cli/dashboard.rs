use super::ui;
use crate::core::conversion::format_rate;
use crate::core::trend::TrendPoint;
use crate::view::ViewModel;
use comfy_table::{Cell, CellAlignment};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One character per point, scaled between the series' min and max.
pub fn sparkline(points: &[TrendPoint]) -> String {
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.value), hi.max(p.value))
        });
    let span = max - min;
    let top = (SPARK_LEVELS.len() - 1) as f64;

    points
        .iter()
        .map(|p| {
            let level = if span > 0.0 {
                ((p.value - min) / span * top).round() as usize
            } else {
                SPARK_LEVELS.len() / 2
            };
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

fn converter_section(view: &ViewModel) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Amount to Convert"),
        ui::header_cell("From"),
        ui::header_cell("To"),
    ]);
    table.add_row(vec![
        Cell::new(format!("{}", view.amount)).set_alignment(CellAlignment::Right),
        Cell::new(view.base.label()),
        Cell::new(view.target.label()),
    ]);

    let mut output = format!(
        "{}\n\n{}\n\n",
        ui::style_text("Currency Exchange", ui::StyleType::Title),
        table
    );
    output.push_str(&format!(
        "Converted Amount: {} {}\n",
        ui::style_text(view.converted.text(), ui::StyleType::Value),
        ui::style_text(view.target.code(), ui::StyleType::Label)
    ));
    output.push_str(&ui::style_text(&view.rate_line(), ui::StyleType::Subtle));
    output.push('\n');
    if view.rates_loading {
        output.push_str(&ui::style_text("Fetching live rates...", ui::StyleType::Subtle));
        output.push('\n');
    }
    if let Some(note) = &view.error_note {
        output.push_str(&ui::style_text(note, ui::StyleType::Error));
        output.push('\n');
    }
    output
}

fn quick_stats_section(view: &ViewModel) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(
        view.quick_stats
            .iter()
            .map(|s| ui::header_cell(&format!("{} Rate", s.code)))
            .collect::<Vec<_>>(),
    );
    table.add_row(
        view.quick_stats
            .iter()
            .map(|s| ui::rate_cell(&s.display_rate(), s.rate.is_some()))
            .collect::<Vec<_>>(),
    );
    table.to_string()
}

fn insight_section(view: &ViewModel) -> String {
    let card = &view.insight;
    let mut output = format!(
        "{} {}\n",
        ui::style_text("AI Market Insight", ui::StyleType::Title),
        ui::sentiment_badge(card.badge)
    );
    if card.loading {
        output.push_str(&ui::style_text("Analyzing...", ui::StyleType::Subtle));
        output.push('\n');
    } else {
        output.push_str(&ui::style_text(&card.title, ui::StyleType::Label));
        output.push('\n');
        output.push_str(&card.content);
        output.push('\n');
    }
    output
}

fn trend_section(view: &ViewModel) -> String {
    let mut output = format!(
        "{}\n",
        ui::style_text("Price Trend (Week)", ui::StyleType::Title)
    );
    if view.trend.is_empty() {
        output.push_str(&ui::style_text("No trend available", ui::StyleType::Subtle));
        output.push('\n');
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(
        view.trend
            .iter()
            .map(|p| ui::header_cell(p.label))
            .collect::<Vec<_>>(),
    );
    table.add_row(
        view.trend
            .iter()
            .map(|p| Cell::new(format_rate(p.value)).set_alignment(CellAlignment::Right))
            .collect::<Vec<_>>(),
    );
    output.push_str(&format!("{}\n{}\n", sparkline(&view.trend), table));
    output.push_str(&ui::style_text(
        "Past 7 Days · Simulated Outlook",
        ui::StyleType::Subtle,
    ));
    output.push('\n');
    output
}

fn footer(view: &ViewModel) -> String {
    let mut output = String::from(
        "Exchange rates provided by Open Exchange API. All values are indicative.",
    );
    if let Some(retrieved) = view.retrieved_at {
        output.push_str(&format!(
            "\nRetrieved {}",
            retrieved.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    if let Some(published) = view.published_at {
        output.push_str(&format!(
            " (published {})",
            published.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    ui::style_text(&output, ui::StyleType::Subtle)
}

/// Renders the full dashboard for one view-model.
pub fn render(view: &ViewModel) -> String {
    [
        converter_section(view),
        quick_stats_section(view),
        insight_section(view),
        trend_section(view),
        footer(view),
    ]
    .join("\n")
}
