//! Consistency rules evaluated per slot
//!
//! Rules run in a fixed order: skip past events, presence, URL, end time,
//! description. Only paired slots get past the presence rule.

use chrono::Duration;

use crate::findings::{Finding, FindingKind};
use crate::grid::{Slot, SlotGrid};
use crate::models::{AutomationShow, WebsiteEvent};
use crate::time::LocalTime;

/// Placeholder programme that is never reported as missing
pub const DEFAULT_FILLER_NAME: &str = "Klangbecken";

/// Allowed automation overrun past the website end time
pub const DEFAULT_END_TOLERANCE_MINUTES: i64 = 10;

/// End time the website renders for shows running until midnight
const WEBSITE_MIDNIGHT_ARTIFACT: &str = "23:59:00";

/// Placeholder URL the website uses when no show page is linked
const WEBSITE_NO_URL: &str = "#";

/// Tunables for rule evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOptions {
    pub filler_name: String,
    pub end_tolerance: Duration,
    /// Report paired slots whose website description is empty
    pub check_descriptions: bool,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            filler_name: DEFAULT_FILLER_NAME.to_string(),
            end_tolerance: Duration::minutes(DEFAULT_END_TOLERANCE_MINUTES),
            check_descriptions: false,
        }
    }
}

/// Evaluate every slot of the grid. Output is in grid order, unsorted by time.
pub fn evaluate(grid: &SlotGrid, now: LocalTime, options: &RuleOptions) -> Vec<Finding> {
    let mut findings = Vec::new();
    for slot in grid.slots() {
        evaluate_slot(slot, now, options, &mut findings);
    }
    findings
}

/// Evaluate one slot, appending findings to `out`
pub fn evaluate_slot(slot: &Slot, now: LocalTime, options: &RuleOptions, out: &mut Vec<Finding>) {
    let Some(anchor) = slot.anchor_time() else {
        return;
    };

    if let Some(website) = &slot.website {
        if website.start < now {
            return;
        }
    }

    let mut report = |kind: FindingKind, message: String| {
        out.push(Finding::new(kind, message, anchor, slot.clone()));
    };

    let (website, automation) = match (&slot.website, &slot.automation) {
        (Some(website), None) => {
            if website.title != options.filler_name {
                report(
                    FindingKind::MissingFromAutomation,
                    format!("{} is missing from the automation system.", website.title),
                );
            }
            return;
        }
        (None, Some(automation)) => {
            if automation.name != options.filler_name {
                report(
                    FindingKind::MissingFromWebsite,
                    format!("{} is missing from the website.", automation.name),
                );
            }
            return;
        }
        (Some(website), Some(automation)) => (website, automation),
        (None, None) => return,
    };

    if website.title != automation.name {
        report(
            FindingKind::TitleMismatch,
            format!(
                "Title on website ({}) does not match automation system ({}).",
                website.title, automation.name
            ),
        );
    }

    if website.url != automation.url {
        if website.url == WEBSITE_NO_URL {
            report(
                FindingKind::MissingWebsiteUrl,
                format!("No URL set for show {} on website.", website.title),
            );
        } else {
            report(
                FindingKind::UrlMismatch,
                format!(
                    "URL on website ({}) does not match automation system ({}).",
                    website.url, automation.url
                ),
            );
        }
    }

    if end_time_mismatch(website, automation, options.end_tolerance) {
        report(
            FindingKind::EndTimeMismatch,
            format!(
                "End on website ({}) does not match automation system ({}).",
                website.end.display(),
                automation.end.display()
            ),
        );
    }

    if options.check_descriptions && website.description.is_empty() {
        report(
            FindingKind::MissingDescription,
            format!("Description for show {} is missing on website.", website.title),
        );
    }
}

/// Automation may overrun the website end by up to `tolerance` (pre-produced
/// shows running long); ending early is always a mismatch.
fn end_time_mismatch(website: &WebsiteEvent, automation: &AutomationShow, tolerance: Duration) -> bool {
    if website.end == automation.end {
        return false;
    }
    if website.end.time_of_day() == WEBSITE_MIDNIGHT_ARTIFACT {
        return false;
    }
    let overrun = automation.end.since(&website.end);
    overrun < Duration::zero() || overrun > tolerance
}
