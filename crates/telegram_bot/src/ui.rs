//! Reply texts. Plain text only, no markup.

use chrono::{DateTime, Utc};
use classifier::ClassifierError;
use ledger::{LedgerError, Record, Summary};

/// Width of the `/stats` window.
pub(crate) const STATS_WINDOW_DAYS: i64 = 7;

pub(crate) const ADD_USAGE: &str =
    "Send an expense description after /add, e.g. `/add Coffee $3.50`.";

pub(crate) fn no_expenses() -> String {
    format!("No expenses recorded in the last {STATS_WINDOW_DAYS} days.")
}

pub(crate) fn render_recorded(record: &Record) -> String {
    format!(
        "Recorded\nDescription: {}\nCategory: {}\nAmount: ${:.2}",
        record.description, record.category, record.amount
    )
}

pub(crate) fn render_summary(summary: &Summary, since: DateTime<Utc>) -> String {
    let mut text = format!(
        "Last {STATS_WINDOW_DAYS} days (since {}):\n",
        since.format("%Y-%m-%d")
    );
    text.push_str(&format!(
        "Total: ${:.2} across {} expenses\n",
        summary.total_amount, summary.total_count
    ));

    let ranked = summary.ranked_categories();
    if !ranked.is_empty() {
        text.push_str("By category:\n");
        for (name, total) in ranked {
            text.push_str(&format!("- {}: ${:.2}\n", category_label(name), total));
        }
    }

    text.trim_end_matches('\n').to_string()
}

fn category_label(name: &str) -> &str {
    if name == Summary::UNCATEGORIZED {
        "(uncategorized)"
    } else {
        name
    }
}

pub(crate) fn unknown_command(name: &str) -> String {
    format!("Unknown command: /{name}")
}

pub(crate) fn classification_failed(err: &ClassifierError) -> String {
    format!("Error: {err}")
}

pub(crate) fn store_failed(err: &LedgerError) -> String {
    format!("Failed to store expense: {err}")
}

pub(crate) fn stats_failed(err: &LedgerError) -> String {
    format!("Failed to load stats: {err}")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn confirmation_layout() {
        let text = render_recorded(&Record::new("Food", 12.5, "Lunch"));
        assert_eq!(
            text,
            "Recorded\nDescription: Lunch\nCategory: Food\nAmount: $12.50"
        );
    }

    #[test]
    fn summary_layout() {
        let mut summary = Summary::default();
        summary.add("Food", 1, 10.0);
        summary.add("Travel", 1, 15.5);
        let since = Utc.with_ymd_and_hms(2025, 3, 1, 18, 30, 0).unwrap();

        assert_eq!(
            render_summary(&summary, since),
            "Last 7 days (since 2025-03-01):\n\
             Total: $25.50 across 2 expenses\n\
             By category:\n\
             - Travel: $15.50\n\
             - Food: $10.00"
        );
    }

    #[test]
    fn summary_without_categories_has_no_breakdown() {
        let summary = Summary {
            total_count: 3,
            total_amount: 9.0,
            ..Summary::default()
        };
        let since = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();

        assert_eq!(
            render_summary(&summary, since),
            "Last 7 days (since 2025-03-01):\nTotal: $9.00 across 3 expenses"
        );
    }

    #[test]
    fn uncategorized_bucket_has_a_label() {
        let mut summary = Summary::default();
        summary.add("", 1, 4.0);
        let since = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();

        assert!(render_summary(&summary, since).ends_with("- (uncategorized): $4.00"));
    }

    #[test]
    fn error_prefixes() {
        assert_eq!(
            store_failed(&LedgerError::EmptyDescription),
            "Failed to store expense: expense description cannot be empty"
        );
        assert_eq!(
            classification_failed(&ClassifierError::NoResult),
            "Error: no result returned from OpenAI"
        );
        assert_eq!(unknown_command("help"), "Unknown command: /help");
        assert_eq!(no_expenses(), "No expenses recorded in the last 7 days.");
    }
}
