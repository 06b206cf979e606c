//! Slot grid: both schedules merged by normalized start time
//!
//! Each key holds at most one record per source. A second record for an
//! occupied side is a duplicate, handled according to the source's
//! [`DuplicatePolicy`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ReconcileError, Result};
use crate::findings::{Finding, FindingKind};
use crate::models::{AutomationShow, WebsiteEvent};
use crate::time::LocalTime;

/// Origin of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Website,
    Automation,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Website => f.write_str("website"),
            Source::Automation => f.write_str("automation"),
        }
    }
}

/// What to do when a source delivers two records for the same start time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Emit a finding and keep the later record
    Report,
    /// Abort the run with [`ReconcileError::DuplicateEntry`]
    Reject,
}

/// Duplicate policy per source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicatePolicies {
    pub website: DuplicatePolicy,
    pub automation: DuplicatePolicy,
}

impl Default for DuplicatePolicies {
    fn default() -> Self {
        Self {
            website: DuplicatePolicy::Report,
            automation: DuplicatePolicy::Report,
        }
    }
}

/// Shape of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Empty,
    WebsiteOnly,
    AutomationOnly,
    Paired,
}

/// Records from both sources sharing one start time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub website: Option<WebsiteEvent>,
    pub automation: Option<AutomationShow>,
}

impl Slot {
    pub fn kind(&self) -> SlotKind {
        match (&self.website, &self.automation) {
            (None, None) => SlotKind::Empty,
            (Some(_), None) => SlotKind::WebsiteOnly,
            (None, Some(_)) => SlotKind::AutomationOnly,
            (Some(_), Some(_)) => SlotKind::Paired,
        }
    }

    /// Website start if present, else automation start
    pub fn anchor_time(&self) -> Option<LocalTime> {
        self.website
            .as_ref()
            .map(|w| w.start)
            .or_else(|| self.automation.as_ref().map(|a| a.start))
    }
}

/// Slots keyed by normalized start time, in key order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotGrid {
    slots: BTreeMap<String, Slot>,
}

impl SlotGrid {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Slot> {
        self.slots.get(key)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Incrementally merges both feeds into a [`SlotGrid`].
///
/// Duplicate findings are collected alongside the grid; slots are only ever
/// created or filled in, never removed.
#[derive(Debug)]
pub struct GridBuilder {
    grid: SlotGrid,
    findings: Vec<Finding>,
    policies: DuplicatePolicies,
}

impl GridBuilder {
    pub fn new(policies: DuplicatePolicies) -> Self {
        Self {
            grid: SlotGrid::default(),
            findings: Vec::new(),
            policies,
        }
    }

    /// Merge one website event
    pub fn add_website_event(&mut self, event: WebsiteEvent) -> Result<()> {
        let key = event.start.key();
        let slot = self.grid.slots.entry(key.clone()).or_default();

        if let Some(existing) = &slot.website {
            let existing_title = existing.title.clone();
            let anchor = existing.start;
            match self.policies.website {
                DuplicatePolicy::Reject => {
                    return Err(ReconcileError::DuplicateEntry {
                        feed: Source::Website,
                        key,
                        existing: existing_title,
                        incoming: event.title,
                    });
                }
                DuplicatePolicy::Report => {
                    warn!(key = %key, existing = %existing_title, incoming = %event.title, "Duplicate website entry");
                    self.findings.push(Finding::new(
                        FindingKind::DuplicateWebsiteEntry,
                        format!(
                            "Duplicate website entry: {} (new: {})",
                            existing_title, event.title
                        ),
                        anchor,
                        slot.clone(),
                    ));
                }
            }
        }

        debug!(key = %key, title = %event.title, "Website slot");
        slot.website = Some(event);
        Ok(())
    }

    /// Merge one automation show, decoding HTML entities in its name
    pub fn add_automation_show(&mut self, mut show: AutomationShow) -> Result<()> {
        show.name = html_escape::decode_html_entities(&show.name).into_owned();

        let key = show.start.key();
        let slot = self.grid.slots.entry(key.clone()).or_default();

        if let Some(existing) = &slot.automation {
            let existing_name = existing.name.clone();
            match self.policies.automation {
                DuplicatePolicy::Reject => {
                    return Err(ReconcileError::DuplicateEntry {
                        feed: Source::Automation,
                        key,
                        existing: existing_name,
                        incoming: show.name,
                    });
                }
                DuplicatePolicy::Report => {
                    warn!(key = %key, existing = %existing_name, incoming = %show.name, "Duplicate automation entry");
                    let anchor = slot.anchor_time().unwrap_or(show.start);
                    self.findings.push(Finding::new(
                        FindingKind::DuplicateAutomationEntry,
                        format!(
                            "Duplicate automation entry: {} (new: {})",
                            existing_name, show.name
                        ),
                        anchor,
                        slot.clone(),
                    ));
                }
            }
        }

        debug!(key = %key, name = %show.name, "Automation slot");
        slot.automation = Some(show);
        Ok(())
    }

    /// Finish construction, returning the grid and any duplicate findings
    pub fn finish(self) -> (SlotGrid, Vec<Finding>) {
        (self.grid, self.findings)
    }
}
