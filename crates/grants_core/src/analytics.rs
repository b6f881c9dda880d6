//! Derived funding analytics over a snapshot of grants.
//!
//! # Responsibility
//! - Compute dashboard counts, funding breakdowns and upcoming deadlines.
//!
//! # Invariants
//! - Pure: no storage access, no clock access (`today` is a parameter).
//! - An empty input yields empty results everywhere, never an error.
//! - Amounts are summed as-is; currencies are not converted.
//! - Sums saturate at `Decimal::MAX` instead of overflowing.

use crate::model::grant::{Grant, GrantStatus};
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Default look-ahead for the upcoming deadlines view.
pub const DEFAULT_UPCOMING_WINDOW_DAYS: u32 = 30;

/// Decimal places kept for averages.
const AVERAGE_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunderTotal {
    pub funder: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeAverage {
    pub theme: String,
    pub average: Decimal,
}

/// Headline metrics for the dashboard view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub by_status: BTreeMap<GrantStatus, usize>,
}

/// All funding breakdowns computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingAnalytics {
    pub status_counts: BTreeMap<GrantStatus, usize>,
    pub funding_by_status: BTreeMap<GrantStatus, Decimal>,
    pub funding_by_year: BTreeMap<i32, Decimal>,
    pub funding_by_funder: Vec<FunderTotal>,
    pub average_funding_by_theme: Vec<ThemeAverage>,
}

impl FundingAnalytics {
    pub fn compute(grants: &[Grant]) -> Self {
        Self {
            status_counts: status_counts(grants),
            funding_by_status: funding_by_status(grants),
            funding_by_year: funding_by_year(grants),
            funding_by_funder: funding_by_funder(grants),
            average_funding_by_theme: average_funding_by_theme(grants),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status_counts.is_empty()
    }
}

/// Grant count per status, with zero entries for unused statuses.
///
/// Empty when there are no grants at all.
pub fn status_counts(grants: &[Grant]) -> BTreeMap<GrantStatus, usize> {
    if grants.is_empty() {
        return BTreeMap::new();
    }
    let mut counts: BTreeMap<GrantStatus, usize> =
        GrantStatus::ALL.into_iter().map(|status| (status, 0)).collect();
    for grant in grants {
        *counts.entry(grant.status).or_default() += 1;
    }
    counts
}

pub fn dashboard_summary(grants: &[Grant]) -> DashboardSummary {
    DashboardSummary {
        total: grants.len(),
        by_status: status_counts(grants),
    }
}

pub fn funding_by_status(grants: &[Grant]) -> BTreeMap<GrantStatus, Decimal> {
    let mut totals = BTreeMap::new();
    for grant in grants {
        add_amount(totals.entry(grant.status).or_insert(Decimal::ZERO), grant);
    }
    totals
}

/// Sum per deadline year; grants without a deadline are left out.
pub fn funding_by_year(grants: &[Grant]) -> BTreeMap<i32, Decimal> {
    let mut totals = BTreeMap::new();
    for grant in grants {
        if let Some(deadline) = grant.deadline {
            add_amount(totals.entry(deadline.year()).or_insert(Decimal::ZERO), grant);
        }
    }
    totals
}

/// Totals per funder, largest first (ties by funder name).
pub fn funding_by_funder(grants: &[Grant]) -> Vec<FunderTotal> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for grant in grants {
        add_amount(
            totals.entry(grant.funder.as_str()).or_insert(Decimal::ZERO),
            grant,
        );
    }

    let mut ranked: Vec<FunderTotal> = totals
        .into_iter()
        .map(|(funder, total)| FunderTotal {
            funder: funder.to_string(),
            total,
        })
        .collect();
    ranked.sort_by(|a, b| descending(a.total, b.total).then_with(|| a.funder.cmp(&b.funder)));
    ranked
}

/// Mean amount per theme, largest first (ties by theme name).
pub fn average_funding_by_theme(grants: &[Grant]) -> Vec<ThemeAverage> {
    let mut sums: BTreeMap<&str, (Decimal, u32)> = BTreeMap::new();
    for grant in grants {
        let entry = sums
            .entry(grant.theme.as_str())
            .or_insert((Decimal::ZERO, 0));
        add_amount(&mut entry.0, grant);
        entry.1 += 1;
    }

    let mut ranked: Vec<ThemeAverage> = sums
        .into_iter()
        .map(|(theme, (sum, count))| ThemeAverage {
            theme: theme.to_string(),
            average: (sum / Decimal::from(count)).round_dp(AVERAGE_SCALE),
        })
        .collect();
    ranked.sort_by(|a, b| descending(a.average, b.average).then_with(|| a.theme.cmp(&b.theme)));
    ranked
}

/// Grants due within `[today, today + window_days]`, in input order.
pub fn upcoming_deadlines(grants: &[Grant], today: NaiveDate, window_days: u32) -> Vec<Grant> {
    let Some(horizon) = today.checked_add_days(Days::new(u64::from(window_days))) else {
        return Vec::new();
    };
    grants
        .iter()
        .filter(|grant| {
            grant
                .deadline
                .is_some_and(|deadline| deadline >= today && deadline <= horizon)
        })
        .cloned()
        .collect()
}

fn add_amount(total: &mut Decimal, grant: &Grant) {
    *total = total.saturating_add(grant.funding_amount);
}

fn descending(a: Decimal, b: Decimal) -> Ordering {
    b.cmp(&a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::grant::GrantDraft;
    use chrono::{TimeZone, Utc};

    fn grant(id: i64, funder: &str, theme: &str, amount: i64, status: GrantStatus) -> Grant {
        let mut draft = GrantDraft::new(format!("grant {id}"), funder, Decimal::from(amount));
        draft.theme = theme.to_string();
        draft.status = status;
        Grant::from_draft(id, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(), draft)
    }

    #[test]
    fn empty_input_gives_empty_results() {
        let analytics = FundingAnalytics::compute(&[]);
        assert!(analytics.is_empty());
        assert!(analytics.funding_by_status.is_empty());
        assert!(analytics.funding_by_year.is_empty());
        assert!(analytics.funding_by_funder.is_empty());
        assert!(analytics.average_funding_by_theme.is_empty());
        assert_eq!(dashboard_summary(&[]).total, 0);
    }

    #[test]
    fn status_counts_include_zero_statuses() {
        let grants = vec![grant(1, "F", "T", 10, GrantStatus::Draft)];
        let counts = status_counts(&grants);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[&GrantStatus::Draft], 1);
        assert_eq!(counts[&GrantStatus::Submitted], 0);
        assert_eq!(counts[&GrantStatus::Funded], 0);
    }

    #[test]
    fn funder_ranking_breaks_ties_by_name() {
        let grants = vec![
            grant(1, "Zeta", "T", 100, GrantStatus::Draft),
            grant(2, "Alpha", "T", 100, GrantStatus::Draft),
            grant(3, "Mid", "T", 150, GrantStatus::Draft),
        ];
        let ranked: Vec<_> = funding_by_funder(&grants)
            .into_iter()
            .map(|row| row.funder)
            .collect();
        assert_eq!(ranked, vec!["Mid", "Alpha", "Zeta"]);
    }

    #[test]
    fn theme_average_is_rounded_to_cents() {
        let grants = vec![
            grant(1, "F", "Health", 100, GrantStatus::Draft),
            grant(2, "F", "Health", 100, GrantStatus::Draft),
            grant(3, "F", "Health", 101, GrantStatus::Draft),
        ];
        let averages = average_funding_by_theme(&grants);
        assert_eq!(averages[0].average, Decimal::new(10033, 2));
    }

    #[test]
    fn upcoming_window_is_inclusive_on_both_ends() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut on_today = grant(1, "F", "T", 1, GrantStatus::Draft);
        on_today.deadline = Some(today);
        let mut on_horizon = grant(2, "F", "T", 1, GrantStatus::Draft);
        on_horizon.deadline = NaiveDate::from_ymd_opt(2026, 5, 31);
        let mut past_horizon = grant(3, "F", "T", 1, GrantStatus::Draft);
        past_horizon.deadline = NaiveDate::from_ymd_opt(2026, 6, 1);
        let mut yesterday = grant(4, "F", "T", 1, GrantStatus::Draft);
        yesterday.deadline = NaiveDate::from_ymd_opt(2026, 4, 30);
        let undated = grant(5, "F", "T", 1, GrantStatus::Draft);

        let grants = vec![on_today, on_horizon, past_horizon, yesterday, undated];
        let ids: Vec<_> = upcoming_deadlines(&grants, today, 30)
            .iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn huge_amounts_saturate_instead_of_panicking() {
        let mut first = grant(1, "F", "T", 0, GrantStatus::Funded);
        first.funding_amount = Decimal::MAX;
        first.deadline = NaiveDate::from_ymd_opt(2026, 3, 1);
        let mut second = first.clone();
        second.id = 2;

        let analytics = FundingAnalytics::compute(&[first, second]);
        assert_eq!(analytics.funding_by_status[&GrantStatus::Funded], Decimal::MAX);
        assert_eq!(analytics.funding_by_year[&2026], Decimal::MAX);
        assert_eq!(analytics.funding_by_funder[0].total, Decimal::MAX);
        assert_eq!(analytics.average_funding_by_theme.len(), 1);
    }
}
