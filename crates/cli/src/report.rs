#![forbid(unsafe_code)]

use ov_core::{Categorized, ReconcileSummary, Verdict};
use ov_storage::LintIssue;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;

pub(crate) struct ClassReport {
    pub class: String,
    pub categorized: Categorized,
}

pub(crate) fn print_lint(
    out: &mut impl Write,
    record_count: usize,
    issues: &[LintIssue],
) -> std::io::Result<()> {
    for issue in issues {
        writeln!(
            out,
            "{}/{} {}: {}",
            issue.kind.dir_name(),
            issue.class,
            issue.id,
            issue.message
        )?;
    }
    if issues.is_empty() {
        writeln!(out, "ok: {record_count} record(s), no issues")
    } else {
        writeln!(out, "{} issue(s) in {record_count} record(s)", issues.len())
    }
}

pub(crate) fn print_text(out: &mut impl Write, reports: &[ClassReport]) -> std::io::Result<()> {
    let mut total = ReconcileSummary::default();
    for report in reports {
        let summary = report.categorized.summary();
        writeln!(out, "== {} ({} patched)", report.class, summary.total)?;
        write_section(out, "still needed", &report.categorized.still_needed, true)?;
        write_section(out, "fixed upstream", &report.categorized.fixed, false)?;
        write_section(
            out,
            "removed from API",
            &report.categorized.removed_from_api,
            true,
        )?;
        total.total += summary.total;
        total.still_needed += summary.still_needed;
        total.fixed += summary.fixed;
        total.removed_from_api += summary.removed_from_api;
    }
    writeln!(
        out,
        "summary: {} total, {} still needed, {} fixed, {} removed from API",
        total.total, total.still_needed, total.fixed, total.removed_from_api
    )
}

fn write_section(
    out: &mut impl Write,
    title: &str,
    verdicts: &[Verdict],
    with_details: bool,
) -> std::io::Result<()> {
    if verdicts.is_empty() {
        return Ok(());
    }
    writeln!(out, "-- {title} ({})", verdicts.len())?;
    for verdict in verdicts {
        writeln!(
            out,
            "{:<16} {} ({})",
            verdict.status.as_str(),
            verdict.display_name,
            verdict.id
        )?;
        if !with_details {
            continue;
        }
        for detail in &verdict.details {
            writeln!(
                out,
                "    [{}] {}: {}",
                detail.status.as_str(),
                detail.field,
                detail.message
            )?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassReportJson<'a> {
    summary: ReconcileSummary,
    #[serde(flatten)]
    categorized: &'a Categorized,
}

pub(crate) fn print_json(out: &mut impl Write, reports: &[ClassReport]) -> std::io::Result<()> {
    let mut classes = Map::new();
    for report in reports {
        let body = ClassReportJson {
            summary: report.categorized.summary(),
            categorized: &report.categorized,
        };
        let value = serde_json::to_value(&body).map_err(std::io::Error::other)?;
        classes.insert(report.class.clone(), value);
    }
    let mut root = Map::new();
    root.insert("classes".to_string(), Value::Object(classes));
    serde_json::to_writer_pretty(&mut *out, &Value::Object(root)).map_err(std::io::Error::other)?;
    writeln!(out)
}
