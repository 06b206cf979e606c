//! Scenario tests for the reconciliation engine
//!
//! Tests cover:
//! - Worked examples (tolerated overrun, end mismatch, filler suppression)
//! - Duplicate handling per source
//! - Skip-on-past and chronological ordering
//! - Feeds parsed from JSON payloads

use chrono::FixedOffset;
use raster_common::{
    reconcile, AutomationSchedule, AutomationShow, DuplicatePolicies, DuplicatePolicy,
    FindingKind, LocalTime, ReconcileError, ReconcileOptions, RuleOptions, Source, WebsiteEvent,
};

fn at(raw: &str) -> LocalTime {
    LocalTime::parse_with_offset(raw, FixedOffset::east_opt(3600).unwrap()).unwrap()
}

/// Evaluation instant before every fixture
fn now() -> LocalTime {
    at("2024-01-01 00:00:00")
}

fn website(title: &str, start: &str, end: &str, url: &str) -> WebsiteEvent {
    WebsiteEvent {
        start: at(start),
        end: at(end),
        title: title.to_string(),
        url: url.to_string(),
        description: String::new(),
    }
}

fn show(name: &str, start: &str, end: &str, url: &str) -> AutomationShow {
    AutomationShow {
        start: at(start),
        end: at(end),
        name: name.to_string(),
        url: url.to_string(),
    }
}

fn schedule(next: Vec<AutomationShow>) -> AutomationSchedule {
    let mut schedule = AutomationSchedule::default();
    schedule.shows.next = next;
    schedule
}

// =============================================================================
// Worked examples
// =============================================================================

#[test]
fn test_overrun_within_tolerance_has_no_findings() {
    let run = reconcile(
        vec![website("Morning Show", "2024-01-02 08:00:00", "2024-01-02 10:00:00", "http://x")],
        schedule(vec![show("Morning Show", "2024-01-02 08:00:00", "2024-01-02 10:08:00", "http://x")]),
        now(),
        &ReconcileOptions::default(),
    )
    .unwrap();

    assert_eq!(run.grid.len(), 1);
    assert!(run.findings.is_empty());
}

#[test]
fn test_overrun_beyond_tolerance_reports_end_mismatch() {
    let run = reconcile(
        vec![website("Morning Show", "2024-01-02 08:00:00", "2024-01-02 10:00:00", "http://x")],
        schedule(vec![show("Morning Show", "2024-01-02 08:00:00", "2024-01-02 10:11:00", "http://x")]),
        now(),
        &ReconcileOptions::default(),
    )
    .unwrap();

    assert_eq!(run.findings.len(), 1);
    let finding = run.findings.iter().next().unwrap();
    assert_eq!(finding.kind, FindingKind::EndTimeMismatch);
    assert_eq!(finding.time, at("2024-01-02 08:00:00"));
}

#[test]
fn test_filler_and_real_show_on_website_only() {
    let run = reconcile(
        vec![
            website("Klangbecken", "2024-01-02 06:00:00", "2024-01-02 08:00:00", "#"),
            website("Talk Show", "2024-01-02 12:00:00", "2024-01-02 13:00:00", "#"),
        ],
        AutomationSchedule::default(),
        now(),
        &ReconcileOptions::default(),
    )
    .unwrap();

    assert_eq!(run.findings.len(), 1);
    let finding = run.findings.iter().next().unwrap();
    assert_eq!(finding.kind, FindingKind::MissingFromAutomation);
    assert!(finding.message.contains("Talk Show"));
}

// =============================================================================
// Duplicates
// =============================================================================

#[test]
fn test_duplicate_website_entry_is_a_finding() {
    let run = reconcile(
        vec![
            website("Old", "2024-01-02 08:00:00", "2024-01-02 09:00:00", "u"),
            website("New", "2024-01-02 08:00:00", "2024-01-02 09:00:00", "u"),
        ],
        schedule(vec![show("New", "2024-01-02 08:00:00", "2024-01-02 09:00:00", "u")]),
        now(),
        &ReconcileOptions::default(),
    )
    .unwrap();

    let kinds: Vec<_> = run.findings.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FindingKind::DuplicateWebsiteEntry]);
}

#[test]
fn test_duplicate_automation_entry_is_a_finding_by_default() {
    let run = reconcile(
        vec![],
        schedule(vec![
            show("Klangbecken", "2024-01-02 08:00:00", "2024-01-02 09:00:00", ""),
            show("Klangbecken", "2024-01-02 08:00:00", "2024-01-02 09:00:00", ""),
        ]),
        now(),
        &ReconcileOptions::default(),
    )
    .unwrap();

    let kinds: Vec<_> = run.findings.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FindingKind::DuplicateAutomationEntry]);
}

#[test]
fn test_strict_automation_duplicates_abort() {
    let options = ReconcileOptions {
        duplicates: DuplicatePolicies {
            automation: DuplicatePolicy::Reject,
            ..DuplicatePolicies::default()
        },
        ..ReconcileOptions::default()
    };
    let result = reconcile(
        vec![],
        schedule(vec![
            show("A", "2024-01-02 08:00:00", "2024-01-02 09:00:00", ""),
            show("B", "2024-01-02 08:00:00", "2024-01-02 09:00:00", ""),
        ]),
        now(),
        &options,
    );

    assert!(matches!(
        result,
        Err(ReconcileError::DuplicateEntry { feed: Source::Automation, .. })
    ));
}

#[test]
fn test_current_show_folded_into_grid() {
    let mut automation = schedule(vec![show("Next", "2024-01-02 09:00:00", "2024-01-02 10:00:00", "u")]);
    automation.shows.current = Some(show("Now", "2024-01-02 08:00:00", "2024-01-02 09:00:00", "u"));

    let run = reconcile(
        vec![
            website("Now", "2024-01-02 08:00:00", "2024-01-02 09:00:00", "u"),
            website("Next", "2024-01-02 09:00:00", "2024-01-02 10:00:00", "u"),
        ],
        automation,
        now(),
        &ReconcileOptions::default(),
    )
    .unwrap();

    assert_eq!(run.grid.len(), 2);
    assert!(run.findings.is_empty());
}

// =============================================================================
// Skip-on-past and ordering
// =============================================================================

#[test]
fn test_past_slots_contribute_nothing() {
    let run = reconcile(
        vec![website("Yesterday", "2023-12-31 08:00:00", "2023-12-31 09:00:00", "a")],
        schedule(vec![show("Other", "2023-12-31 08:00:00", "2023-12-31 11:00:00", "b")]),
        now(),
        &ReconcileOptions::default(),
    )
    .unwrap();

    assert!(run.findings.is_empty());
}

#[test]
fn test_findings_sorted_by_anchor_time() {
    let run = reconcile(
        vec![
            website("Late", "2024-01-03 20:00:00", "2024-01-03 21:00:00", "#"),
            website("Early", "2024-01-02 06:00:00", "2024-01-02 07:00:00", "#"),
        ],
        schedule(vec![
            show("Middle", "2024-01-02 12:00:00", "2024-01-02 13:00:00", ""),
            show("First", "2024-01-01 23:00:00", "2024-01-02 00:00:00", ""),
        ]),
        now(),
        &ReconcileOptions::default(),
    )
    .unwrap();

    let times: Vec<_> = run.findings.iter().map(|f| f.time).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
    assert_eq!(run.findings.len(), 4);
    assert!(run.findings.iter().next().unwrap().message.contains("First"));
}

#[test]
fn test_description_check_enabled() {
    let options = ReconcileOptions {
        rules: RuleOptions {
            check_descriptions: true,
            ..RuleOptions::default()
        },
        ..ReconcileOptions::default()
    };
    let run = reconcile(
        vec![website("A", "2024-01-02 08:00:00", "2024-01-02 09:00:00", "u")],
        schedule(vec![show("A", "2024-01-02 08:00:00", "2024-01-02 09:00:00", "u")]),
        now(),
        &options,
    )
    .unwrap();

    let kinds: Vec<_> = run.findings.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FindingKind::MissingDescription]);
}

// =============================================================================
// JSON feeds
// =============================================================================

#[test]
fn test_reconcile_parsed_feeds() {
    let website_json = r#"[
        {"start": "2030-05-01 08:00:00", "end": "2030-05-01 09:00:00", "title": "News", "url": "https://example.org/news", "description": "d", "category": ["info"]},
        {"start": "2030-05-01 09:00:00", "end": "2030-05-01 10:00:00", "title": "Klangbecken", "url": "https://example.org/kb", "description": ""}
    ]"#;
    let automation_json = r#"{
        "shows": {
            "current": null,
            "next": [
                {"name": "News", "starts": "2030-05-01 08:00:00", "ends": "2030-05-01 09:00:00", "url": "https://example.org/news", "genre": "", "id": 4},
                {"name": "Rock &amp; Pop", "starts": "2030-05-01 10:00:00", "ends": "2030-05-01 11:00:00", "url": ""}
            ]
        }
    }"#;

    let events: Vec<WebsiteEvent> = serde_json::from_str(website_json).unwrap();
    let automation: AutomationSchedule = serde_json::from_str(automation_json).unwrap();
    let now = LocalTime::parse("2030-01-01 00:00:00").unwrap();

    let run = reconcile(events, automation, now, &ReconcileOptions::default()).unwrap();

    assert_eq!(run.grid.len(), 3);
    assert_eq!(run.findings.len(), 1);
    let finding = run.findings.iter().next().unwrap();
    assert_eq!(finding.kind, FindingKind::MissingFromWebsite);
    assert_eq!(finding.message, "Rock & Pop is missing from the website.");
}
