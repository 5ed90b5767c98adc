//! Aggregates over a time window.

use std::{cmp::Ordering, collections::HashMap};

/// Count and amount totals of the entries inserted since a given instant.
///
/// Entries with an empty category are counted in the totals and kept in
/// `category_totals` under [`Summary::UNCATEGORIZED`]; no store drops them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    pub total_count: u64,
    pub total_amount: f64,
    pub category_totals: HashMap<String, f64>,
}

impl Summary {
    /// Key of the bucket holding entries without a category.
    pub const UNCATEGORIZED: &'static str = "";

    /// Accounts `count` entries of `category` whose amounts sum to `amount`.
    pub fn add(&mut self, category: &str, count: u64, amount: f64) {
        self.total_count += count;
        self.total_amount += amount;
        *self
            .category_totals
            .entry(category.to_string())
            .or_insert(0.0) += amount;
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Category totals by descending amount. Equal amounts are ordered by
    /// category name so the output is reproducible.
    pub fn ranked_categories(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .category_totals
            .iter()
            .map(|(name, total)| (name.as_str(), *total))
            .collect();
        ranked.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(b.0),
            other => other,
        });
        ranked
    }
}
