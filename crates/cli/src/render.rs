use console::style;
use ecopay_core::domain::credits::{CreditProgress, UserCredits};

const BAR_WIDTH: usize = 24;

/// A run of reply text and whether it sat inside a `**` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    pub bold: bool,
}

/// Splits on `**` markers. An unmatched trailing marker is kept as literal text.
pub fn emphasis_spans(content: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut rest = content;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        if open > 0 {
            spans.push(Span { text: &rest[..open], bold: false });
        }
        spans.push(Span { text: &after_open[..close], bold: true });
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span { text: rest, bold: false });
    }
    spans
}

pub fn render_reply(content: &str) -> String {
    emphasis_spans(content)
        .into_iter()
        .map(|span| {
            if span.bold {
                style(span.text).bold().to_string()
            } else {
                span.text.to_string()
            }
        })
        .collect()
}

pub fn credit_bar(credits: &UserCredits, progress: &CreditProgress, cash: &str) -> String {
    let filled = ((progress.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));

    let mut line = format!(
        "{} credits ({cash})  [{bar}] {:.0}% of {}",
        credits.total, progress.percent, progress.goal
    );
    if credits.pending > 0 {
        line.push_str(&format!("  +{} pending", credits.pending));
    }
    line
}
