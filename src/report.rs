// src/report.rs
//
// Per-account summaries over the cleaned registry.

use std::collections::{BTreeMap, HashSet};

use chrono::Datelike;
use serde::Serialize;
use tracing::debug;

use crate::process::Transaction;

/// Amount sum and row count for one (organization, year) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowAggregate {
    pub primary_organization: String,
    pub reg_year: i32,
    pub total_amount: f64,
    pub payment_count: u64,
}

/// Everything we report for one receiving account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountReport {
    /// The matching registry rows, in source order.
    pub rows: Vec<Transaction>,
    /// Distinct hashed client names among the matches, first-seen order.
    pub client_name_hashes: Vec<String>,
    /// Distinct receiver names among the matches, first-seen order; null
    /// names are not represented.
    pub client_receiver_names: Vec<String>,
    /// Per-(organization, year) aggregates, year ascending.
    pub flows: Vec<FlowAggregate>,
}

/// Build the report for `iban`: exact match on the receiving account.
///
/// An account with no matching rows yields a report with four empty
/// collections, not an error. Rows where the normalizer has not yet set
/// `reg_year` fall back to the registration date's year.
pub fn report_for_account(rows: &[Transaction], iban: &str) -> AccountReport {
    let matches: Vec<Transaction> = rows
        .iter()
        .filter(|r| r.client_receiver_acc == iban)
        .cloned()
        .collect();

    let mut seen_hashes = HashSet::new();
    let mut client_name_hashes = Vec::new();
    let mut seen_names = HashSet::new();
    let mut client_receiver_names = Vec::new();
    for row in &matches {
        if seen_hashes.insert(row.client_name_hash.clone()) {
            client_name_hashes.push(row.client_name_hash.clone());
        }
        if let Some(name) = &row.client_receiver_name {
            if seen_names.insert(name.clone()) {
                client_receiver_names.push(name.clone());
            }
        }
    }

    // keyed (year, organization) so iteration comes out year-ascending
    let mut groups: BTreeMap<(i32, String), (f64, u64)> = BTreeMap::new();
    for row in &matches {
        let year = row.reg_year.unwrap_or_else(|| row.reg_date.year());
        let entry = groups
            .entry((year, row.primary_organization.clone()))
            .or_insert((0.0, 0));
        entry.0 += row.amount;
        entry.1 += 1;
    }
    let flows = groups
        .into_iter()
        .map(
            |((reg_year, primary_organization), (total_amount, payment_count))| FlowAggregate {
                primary_organization,
                reg_year,
                total_amount,
                payment_count,
            },
        )
        .collect();

    debug!(iban, n_rows = matches.len(), "account report built");
    AccountReport {
        rows: matches,
        client_name_hashes,
        client_receiver_names,
        flows,
    }
}
