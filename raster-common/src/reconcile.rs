//! Reconciliation engine
//!
//! Merge website events and automation shows into a [`SlotGrid`], evaluate
//! the rules against every slot and return the chronologically sorted
//! findings. A run is purely in-memory; fetching the feeds and publishing the
//! result are the caller's business.

use tracing::info;

use crate::error::Result;
use crate::findings::{Finding, FindingsList};
use crate::grid::{DuplicatePolicies, GridBuilder, SlotGrid};
use crate::models::{AutomationSchedule, WebsiteEvent};
use crate::rules::{self, RuleOptions};
use crate::time::LocalTime;

/// Configuration of a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub rules: RuleOptions,
    pub duplicates: DuplicatePolicies,
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub grid: SlotGrid,
    pub findings: FindingsList,
}

/// Build the slot grid from both feeds.
///
/// Website events are merged first, then automation shows with the current
/// show folded in after the upcoming ones. Duplicate findings are returned
/// unsorted.
pub fn build_grid(
    website: impl IntoIterator<Item = WebsiteEvent>,
    automation: AutomationSchedule,
    policies: DuplicatePolicies,
) -> Result<(SlotGrid, Vec<Finding>)> {
    let mut builder = GridBuilder::new(policies);
    for event in website {
        builder.add_website_event(event)?;
    }
    for show in automation.into_shows() {
        builder.add_automation_show(show)?;
    }
    Ok(builder.finish())
}

/// Run a full reconciliation evaluated at `now`.
///
/// # Examples
/// ```
/// use chrono::FixedOffset;
/// use raster_common::models::{AutomationSchedule, WebsiteEvent};
/// use raster_common::reconcile::{reconcile, ReconcileOptions};
/// use raster_common::time::LocalTime;
///
/// let cet = FixedOffset::east_opt(3600).unwrap();
/// let t = |s: &str| LocalTime::parse_with_offset(s, cet).unwrap();
/// let talk = WebsiteEvent {
///     start: t("2024-01-02 08:00:00"),
///     end: t("2024-01-02 09:00:00"),
///     title: "Talk Show".to_string(),
///     url: "#".to_string(),
///     description: String::new(),
/// };
///
/// let run = reconcile(
///     vec![talk],
///     AutomationSchedule::default(),
///     t("2024-01-01 00:00:00"),
///     &ReconcileOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(run.findings.len(), 1);
/// ```
pub fn reconcile(
    website: impl IntoIterator<Item = WebsiteEvent>,
    automation: AutomationSchedule,
    now: LocalTime,
    options: &ReconcileOptions,
) -> Result<Reconciliation> {
    let (grid, mut findings) = build_grid(website, automation, options.duplicates)?;
    findings.extend(rules::evaluate(&grid, now, &options.rules));
    let findings = FindingsList::from_unsorted(findings);

    info!(
        grid_entries = grid.len(),
        findings = findings.len(),
        "Loaded {} grid entries and {} findings",
        grid.len(),
        findings.len()
    );

    Ok(Reconciliation { grid, findings })
}
