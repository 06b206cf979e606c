//! Findings produced by a reconciliation run

use serde::Serialize;

use crate::grid::Slot;
use crate::time::LocalTime;

/// Category of a reported discrepancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    DuplicateWebsiteEntry,
    DuplicateAutomationEntry,
    MissingFromAutomation,
    MissingFromWebsite,
    TitleMismatch,
    MissingWebsiteUrl,
    UrlMismatch,
    EndTimeMismatch,
    MissingDescription,
}

/// A single discrepancy for an operator to resolve.
///
/// `time` is the anchor time: the website start when the slot has a website
/// side, otherwise the automation start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
    pub time: LocalTime,
    pub slot: Slot,
}

impl Finding {
    pub fn new(kind: FindingKind, message: impl Into<String>, time: LocalTime, slot: Slot) -> Self {
        Self {
            kind,
            message: message.into(),
            time,
            slot,
        }
    }
}

/// Findings ordered ascending by anchor time.
///
/// Built once per run and never mutated afterwards. Findings sharing an
/// anchor time keep the order in which they were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FindingsList(Vec<Finding>);

impl FindingsList {
    /// Sort findings into chronological order (stable)
    pub fn from_unsorted(mut findings: Vec<Finding>) -> Self {
        findings.sort_by_key(|f| f.time);
        Self(findings)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Finding] {
        &self.0
    }

    /// Split into runs of findings sharing the same anchor time, for display
    /// under one heading per time.
    pub fn grouped_by_time(&self) -> Vec<(LocalTime, &[Finding])> {
        let mut groups = Vec::new();
        let mut rest = self.0.as_slice();

        while let Some(first) = rest.first() {
            let len = rest.iter().take_while(|f| f.time == first.time).count();
            let (group, tail) = rest.split_at(len);
            groups.push((first.time, group));
            rest = tail;
        }

        groups
    }
}

impl<'a> IntoIterator for &'a FindingsList {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
