//! HTML dashboard rendering
//!
//! Findings are listed under one heading per anchor time, each with the
//! website and automation records of its slot.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use raster_common::{AutomationShow, Finding, WebsiteEvent};

use crate::state::Snapshot;

const INDEX_TEMPLATE: &str = include_str!("../ui/index.html");

/// Render the dashboard page for a snapshot
pub fn render_index(snapshot: &Snapshot, days: u32) -> String {
    fill_template(
        INDEX_TEMPLATE,
        &[
            ("{{STATUS}}", render_status(snapshot)),
            ("{{SUMMARY}}", render_summary(snapshot, days)),
            ("{{FINDINGS}}", render_findings(snapshot)),
        ],
    )
}

/// Substitute placeholders in one pass over the template, so inserted feed
/// text is never scanned for placeholders itself.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut html = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find("{{") {
        html.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match values.iter().find(|(placeholder, _)| tail.starts_with(placeholder)) {
            Some((placeholder, value)) => {
                html.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                html.push_str("{{");
                rest = &tail[2..];
            }
        }
    }

    html.push_str(rest);
    html
}

fn render_status(snapshot: &Snapshot) -> String {
    match &snapshot.last_error {
        Some(failure) => format!(
            "<p class=\"status\"><b>Last reload failed</b> ({}): {}. Showing previous results.</p>",
            encode_text(&failure.at.display()),
            encode_text(&failure.message)
        ),
        None => String::new(),
    }
}

fn render_summary(snapshot: &Snapshot, days: u32) -> String {
    match snapshot.generated_at {
        Some(generated_at) => format!(
            "Found {} issues in the next {} days (checked {}).",
            snapshot.findings.len(),
            days,
            encode_text(&generated_at.display())
        ),
        None => "No schedules loaded yet.".to_string(),
    }
}

fn render_findings(snapshot: &Snapshot) -> String {
    let mut html = String::new();
    for (time, group) in snapshot.findings.grouped_by_time() {
        let _ = writeln!(html, "<hr>\n<h2>{}</h2>", encode_text(&time.display()));
        for finding in group {
            render_finding(&mut html, finding);
        }
    }
    html
}

fn render_finding(html: &mut String, finding: &Finding) {
    let _ = writeln!(html, "<article>");
    let _ = writeln!(
        html,
        "\t<section class=\"lead\">{}</section>",
        encode_text(&finding.message)
    );
    if let Some(website) = &finding.slot.website {
        render_website(html, website);
    }
    if let Some(automation) = &finding.slot.automation {
        render_automation(html, automation);
    }
    let _ = writeln!(html, "</article>");
}

fn render_website(html: &mut String, event: &WebsiteEvent) {
    render_side(html, "Web", &event.title, &event.start.display(), &event.end.display(), &event.url);
}

fn render_automation(html: &mut String, show: &AutomationShow) {
    render_side(html, "LibreTime", &show.name, &show.start.display(), &show.end.display(), &show.url);
}

fn render_side(html: &mut String, label: &str, title: &str, start: &str, end: &str, url: &str) {
    let _ = write!(
        html,
        "\t<section>\n\t<h3>{}: {}</h3>\n\t<p>{} - {}</p>\n\t<p><b>URL:</b> <code>{}</code>",
        label,
        encode_text(title),
        encode_text(start),
        encode_text(end),
        encode_text(url),
    );
    if url.starts_with("http://") || url.starts_with("https://") {
        let _ = write!(
            html,
            " <a href=\"{}\">open</a>",
            encode_double_quoted_attribute(url)
        );
    }
    let _ = writeln!(html, "</p>\n\t</section>");
}
