//! # raster-common
//!
//! Reconciliation engine comparing the website's programme calendar with
//! the broadcast automation schedule:
//! - Local-time values shared by both feeds
//! - Source record models
//! - Slot grid keyed by normalized start time
//! - Consistency rules and the chronologically ordered findings list

pub mod error;
pub mod findings;
pub mod grid;
pub mod models;
pub mod reconcile;
pub mod rules;
pub mod time;

pub use error::{ReconcileError, Result, TimeParseError};
pub use findings::{Finding, FindingKind, FindingsList};
pub use grid::{DuplicatePolicies, DuplicatePolicy, Slot, SlotGrid, SlotKind, Source};
pub use models::{AutomationSchedule, AutomationShow, WebsiteEvent};
pub use reconcile::{reconcile, ReconcileOptions, Reconciliation};
pub use rules::RuleOptions;
pub use time::LocalTime;
