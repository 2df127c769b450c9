use reaper_core::{ResourceRecord, RunMode, RunReport};

use crate::color;

/// What happened to a selected record in this run.
pub fn record_action(report: &RunReport, record: &ResourceRecord) -> &'static str {
    match report.mode {
        RunMode::Flag if report.dry_run => "would flag",
        RunMode::Flag => {
            if report.newly_flagged.contains(&record.id) {
                "new"
            } else {
                "flagged"
            }
        }
        RunMode::Sweep | RunMode::Immediate if report.dry_run => "would delete",
        RunMode::Sweep | RunMode::Immediate => {
            if report.deleted.iter().any(|r| r.id == record.id) {
                "deleted"
            } else if report.failed.iter().any(|f| f.id == record.id) {
                "failed"
            } else {
                "-"
            }
        }
    }
}

pub fn print_report(report: &RunReport) {
    let mode = if report.dry_run {
        format!("{} (dry run)", report.mode)
    } else {
        report.mode.to_string()
    };
    println!(
        "Cloud: {}   Type: {}   Mode: {}",
        color::accent(&report.cloud),
        report.kind.plural(),
        color::bold(&mode)
    );

    if let Some(warning) = &report.state_warning {
        eprintln!("{} {}", color::warning("Warning:"), warning);
    }

    println!("Discovered:   {}", report.discovered);
    if report.considered != report.discovered {
        println!("Considered:   {}", report.considered);
    }
    for stage in &report.stages {
        let unanswerable = if stage.mismatched > 0 {
            color::caution(&format!("  ({} could not be evaluated)", stage.mismatched))
        } else {
            String::new()
        };
        println!(
            "  {:<12} {} remaining{}",
            stage.stage, stage.remaining, unanswerable
        );
    }
    println!();

    if report.selected.is_empty() {
        println!("No {} matched.", report.kind.plural());
    } else {
        print_records_table(report);
    }

    print_summary(report);
}

fn print_records_table(report: &RunReport) {
    let id_w = report
        .selected
        .iter()
        .map(|r| r.id.chars().count())
        .max()
        .unwrap_or(2)
        .clamp(2, 36);
    let name_w = report
        .selected
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(4)
        .clamp(4, 40);
    let created_w = 16;
    let action_w = 12;

    let border = |left: &str, mid: &str, right: &str| {
        color::muted(&format!(
            "{}{}{}{}{}{}{}{}{}",
            left,
            "─".repeat(id_w + 2),
            mid,
            "─".repeat(name_w + 2),
            mid,
            "─".repeat(created_w + 2),
            mid,
            "─".repeat(action_w + 2),
            right,
        ))
    };

    println!("{}", border("┌", "┬", "┐"));
    println!(
        "│ {:<id_w$} │ {:<name_w$} │ {:<created_w$} │ {:<action_w$} │",
        "ID", "Name", "Created", "Action",
    );
    println!("{}", border("├", "┼", "┤"));

    for record in &report.selected {
        let action = record_action(report, record);
        // Pad before coloring; escape codes would throw off the width.
        let action_cell = format!(
            "{}{}",
            color::action(action),
            " ".repeat(action_w.saturating_sub(action.len()))
        );
        println!(
            "│ {:<id_w$} │ {:<name_w$} │ {:<created_w$} │ {} │",
            truncate_str(&record.id, id_w),
            truncate_str(&record.name, name_w),
            record.created_at.format("%Y-%m-%d %H:%M").to_string(),
            action_cell,
        );
    }

    println!("{}", border("└", "┴", "┘"));
}

fn print_summary(report: &RunReport) {
    match report.mode {
        RunMode::Flag => {
            println!(
                "Flagged: {} ({} new)",
                report.selected.len(),
                report.newly_flagged.len()
            );
        }
        RunMode::Sweep => {
            println!(
                "Deleted: {}   Failed: {}   Dropped: {}   Vanished: {}",
                report.deleted.len(),
                report.failed.len(),
                report.dropped.len(),
                report.vanished.len()
            );
        }
        RunMode::Immediate => {
            println!(
                "Deleted: {}   Failed: {}",
                report.deleted.len(),
                report.failed.len()
            );
        }
    }

    for failure in &report.failed {
        eprintln!(
            "  {} {} ({}): {}",
            color::error("✗"),
            failure.name,
            failure.id,
            failure.message
        );
    }

    if let Some(notify) = &report.notify {
        println!(
            "Warnings sent: {} message(s) covering {} resource(s)",
            notify.sent.len(),
            notify.notified
        );
        if !notify.unaddressed.is_empty() {
            eprintln!(
                "{} no owner address for: {}",
                color::warning("Warning:"),
                notify.unaddressed.join(", ")
            );
        }
        for failure in &notify.failed {
            eprintln!(
                "  {} {}: {}",
                color::error("✗"),
                failure.recipient,
                failure.message
            );
        }
    }

    if report.dry_run && !report.selected.is_empty() {
        eprintln!(
            "{}",
            color::hint("Dry run: nothing was stored, deleted or mailed. Pass --force to act.")
        );
    }
}

pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reaper_core::{DeleteFailure, ResourceKind};

    fn record(id: &str) -> ResourceRecord {
        let created = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        ResourceRecord::server(id, format!("server-{}", id), created, None)
    }

    fn report_for(mode: RunMode, dry_run: bool) -> RunReport {
        RunReport {
            cloud: "default".to_string(),
            kind: ResourceKind::Server,
            mode,
            dry_run,
            discovered: 3,
            considered: 3,
            stages: Vec::new(),
            selected: vec![record("1"), record("2"), record("3")],
            newly_flagged: Vec::new(),
            dropped: Vec::new(),
            vanished: Vec::new(),
            deleted: Vec::new(),
            failed: Vec::new(),
            notify: None,
            state_warning: None,
        }
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a-very-long-server-name", 10), "a-very-...");
        assert_eq!(truncate_str("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_flag_actions() {
        let mut report = report_for(RunMode::Flag, false);
        report.newly_flagged = vec!["2".to_string()];
        assert_eq!(record_action(&report, &record("1")), "flagged");
        assert_eq!(record_action(&report, &record("2")), "new");

        let dry = report_for(RunMode::Flag, true);
        assert_eq!(record_action(&dry, &record("1")), "would flag");
    }

    #[test]
    fn test_sweep_actions() {
        let mut report = report_for(RunMode::Sweep, false);
        report.deleted = vec![record("1")];
        report.failed = vec![DeleteFailure {
            id: "2".to_string(),
            name: "server-2".to_string(),
            error_code: "CLOUD_COMMAND_FAILED",
            message: "HTTP 409".to_string(),
        }];
        assert_eq!(record_action(&report, &record("1")), "deleted");
        assert_eq!(record_action(&report, &record("2")), "failed");
        assert_eq!(record_action(&report, &record("3")), "-");

        let dry = report_for(RunMode::Immediate, true);
        assert_eq!(record_action(&dry, &record("1")), "would delete");
    }
}
