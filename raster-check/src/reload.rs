//! Reload pipeline
//!
//! fetch website → fetch automation → reconcile → publish. Steps run
//! strictly one after the other; any failure leaves the previous findings
//! published and records the error on the snapshot instead.

use std::sync::Arc;

use chrono::Days;
use raster_common::{reconcile, time, LocalTime, ReconcileError, ReconcileOptions};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::feeds::{FetchError, ScheduleFeeds};
use crate::state::{Snapshot, SnapshotStore};

/// Why a reload did not publish new findings
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("Website feed: {0}")]
    Website(#[source] FetchError),

    #[error("Automation feed: {0}")]
    Automation(#[source] FetchError),

    #[error("Reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),
}

/// Runs reconciliation passes and publishes their results
pub struct Reloader {
    feeds: Arc<dyn ScheduleFeeds>,
    store: SnapshotStore,
    options: ReconcileOptions,
    days: u32,
    /// Serializes runs so publish steps never interleave
    running: Mutex<()>,
}

impl Reloader {
    pub fn new(feeds: Arc<dyn ScheduleFeeds>, store: SnapshotStore, options: ReconcileOptions, days: u32) -> Self {
        Self {
            feeds,
            store,
            options,
            days,
            running: Mutex::new(()),
        }
    }

    /// Look-ahead window in days
    pub fn days(&self) -> u32 {
        self.days
    }

    /// Run one full pass evaluated at the current time
    pub async fn reload(&self) -> Result<Arc<Snapshot>, ReloadError> {
        self.reload_at(time::now()).await
    }

    /// Run one full pass evaluated at `now`
    pub async fn reload_at(&self, now: LocalTime) -> Result<Arc<Snapshot>, ReloadError> {
        let _guard = self.running.lock().await;
        info!(days = self.days, "Reloading schedules");

        match self.run(now).await {
            Ok(snapshot) => {
                info!(
                    findings = snapshot.findings.len(),
                    grid_entries = snapshot.grid_size,
                    "Published findings"
                );
                Ok(self.store.publish(snapshot).await)
            }
            Err(e) => {
                error!(error = %e, "Reload failed, keeping previous findings");
                self.store.record_failure(e.to_string(), now).await;
                Err(e)
            }
        }
    }

    async fn run(&self, now: LocalTime) -> Result<Snapshot, ReloadError> {
        let from = now.instant().date_naive();
        let to = from
            .checked_add_days(Days::new(u64::from(self.days)))
            .unwrap_or(from);

        let events = self
            .feeds
            .website_events(from, to)
            .await
            .map_err(ReloadError::Website)?;
        let schedule = self
            .feeds
            .automation_schedule(self.days)
            .await
            .map_err(ReloadError::Automation)?;

        let run = reconcile(events, schedule, now, &self.options)?;
        Ok(Snapshot::new(run.findings, run.grid.len(), now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{FixedOffset, NaiveDate};
    use raster_common::{AutomationSchedule, AutomationShow, DuplicatePolicies, DuplicatePolicy, WebsiteEvent};
    use std::sync::Mutex as StdMutex;

    fn at(raw: &str) -> LocalTime {
        LocalTime::parse_with_offset(raw, FixedOffset::east_opt(3600).unwrap()).unwrap()
    }

    /// Feeds replaying queued responses and recording requested ranges
    #[derive(Default)]
    struct ScriptedFeeds {
        website: StdMutex<Vec<Result<Vec<WebsiteEvent>, FetchError>>>,
        automation: StdMutex<Vec<Result<AutomationSchedule, FetchError>>>,
        ranges: StdMutex<Vec<(NaiveDate, NaiveDate)>>,
    }

    #[async_trait]
    impl ScheduleFeeds for ScriptedFeeds {
        async fn website_events(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<WebsiteEvent>, FetchError> {
            self.ranges.lock().unwrap().push((from, to));
            self.website.lock().unwrap().remove(0)
        }

        async fn automation_schedule(&self, _days: u32) -> Result<AutomationSchedule, FetchError> {
            self.automation.lock().unwrap().remove(0)
        }
    }

    fn talk_show() -> WebsiteEvent {
        WebsiteEvent {
            start: at("2024-01-02 08:00:00"),
            end: at("2024-01-02 09:00:00"),
            title: "Talk Show".to_string(),
            url: "#".to_string(),
            description: String::new(),
        }
    }

    fn show(name: &str) -> AutomationShow {
        AutomationShow {
            start: at("2024-01-02 10:00:00"),
            end: at("2024-01-02 11:00:00"),
            name: name.to_string(),
            url: String::new(),
        }
    }

    fn reloader(feeds: ScriptedFeeds, options: ReconcileOptions) -> (Reloader, SnapshotStore) {
        let store = SnapshotStore::new();
        let reloader = Reloader::new(Arc::new(feeds), store.clone(), options, 60);
        (reloader, store)
    }

    #[tokio::test]
    async fn test_successful_reload_publishes() {
        let feeds = ScriptedFeeds::default();
        feeds.website.lock().unwrap().push(Ok(vec![talk_show()]));
        feeds.automation.lock().unwrap().push(Ok(AutomationSchedule::default()));
        let (reloader, store) = reloader(feeds, ReconcileOptions::default());

        let snapshot = reloader.reload_at(at("2024-01-01 12:00:00")).await.unwrap();

        assert_eq!(snapshot.findings.len(), 1);
        assert_eq!(snapshot.grid_size, 1);
        assert_eq!(store.current().await.findings.len(), 1);
    }

    #[tokio::test]
    async fn test_requests_look_ahead_window() {
        let feeds = Arc::new(ScriptedFeeds::default());
        feeds.website.lock().unwrap().push(Ok(vec![]));
        feeds.automation.lock().unwrap().push(Ok(AutomationSchedule::default()));
        let reloader = Reloader::new(feeds.clone(), SnapshotStore::new(), ReconcileOptions::default(), 60);

        reloader.reload_at(at("2024-01-01 12:00:00")).await.unwrap();

        let ranges = feeds.ranges.lock().unwrap();
        assert_eq!(
            ranges[0],
            (
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
            )
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_findings() {
        let feeds = ScriptedFeeds::default();
        feeds.website.lock().unwrap().push(Ok(vec![talk_show()]));
        feeds.automation.lock().unwrap().push(Ok(AutomationSchedule::default()));
        feeds.website.lock().unwrap().push(Ok(vec![]));
        feeds.automation.lock().unwrap().push(Err(FetchError::Timeout {
            url: "http://airtime".to_string(),
        }));
        let (reloader, store) = reloader(feeds, ReconcileOptions::default());

        reloader.reload_at(at("2024-01-01 12:00:00")).await.unwrap();
        let err = reloader.reload_at(at("2024-01-01 13:00:00")).await.unwrap_err();

        assert!(matches!(err, ReloadError::Automation(FetchError::Timeout { .. })));
        let snapshot = store.current().await;
        assert_eq!(snapshot.findings.len(), 1);
        assert_eq!(snapshot.generated_at, Some(at("2024-01-01 12:00:00")));
        let failure = snapshot.last_error.as_ref().unwrap();
        assert!(failure.message.contains("timed out"));
        assert_eq!(failure.at, at("2024-01-01 13:00:00"));
    }

    #[tokio::test]
    async fn test_website_failure_skips_automation_fetch() {
        let feeds = ScriptedFeeds::default();
        feeds.website.lock().unwrap().push(Err(FetchError::Network("refused".to_string())));
        let (reloader, _store) = reloader(feeds, ReconcileOptions::default());

        let err = reloader.reload_at(at("2024-01-01 12:00:00")).await.unwrap_err();
        assert!(matches!(err, ReloadError::Website(_)));
    }

    #[tokio::test]
    async fn test_strict_duplicates_fail_reload() {
        let feeds = ScriptedFeeds::default();
        feeds.website.lock().unwrap().push(Ok(vec![]));
        let mut schedule = AutomationSchedule::default();
        schedule.shows.next = vec![show("A"), show("B")];
        feeds.automation.lock().unwrap().push(Ok(schedule));
        let options = ReconcileOptions {
            duplicates: DuplicatePolicies {
                automation: DuplicatePolicy::Reject,
                ..DuplicatePolicies::default()
            },
            ..ReconcileOptions::default()
        };
        let (reloader, store) = reloader(feeds, options);

        let err = reloader.reload_at(at("2024-01-01 12:00:00")).await.unwrap_err();

        assert!(matches!(err, ReloadError::Reconcile(_)));
        assert!(store.current().await.last_error.is_some());
    }
}
