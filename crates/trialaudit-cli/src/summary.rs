//! Human-readable summaries printed to stderr alongside the JSON output.

use colored::{ColoredString, Colorize};

use trialaudit_compare::{ComparisonReport, Severity};
use trialaudit_filing::FilingSummary;

fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.as_str().to_uppercase();
    match severity {
        Severity::High => label.red().bold(),
        Severity::Medium => label.yellow().bold(),
        Severity::Low => label.blue(),
        Severity::Info => label.dimmed(),
    }
}

pub fn print_filing_summary(summary: &FilingSummary) {
    eprintln!(
        "{} {} sections, {} candidates, {} comparators, {} trial identifiers",
        "Extracted".green().bold(),
        summary.sections_found.len(),
        summary.candidates.len(),
        summary.comparator_drugs_mentioned.len(),
        summary.nct_numbers_all.len()
    );
    if summary.pipeline_is_image {
        eprintln!(
            "  {} pipeline chart is an image; the text excerpt may be incomplete",
            "!".yellow()
        );
    }
    for candidate in &summary.candidates {
        let aliases = if candidate.also_known_as.is_empty() {
            String::new()
        } else {
            format!(" ({})", candidate.also_known_as.join(", "))
        };
        eprintln!(
            "  {} {}{} {} passages, phases: {}",
            "•".cyan(),
            candidate.name.bold(),
            aliases,
            candidate.passage_count,
            candidate.phase_claims.join(", ")
        );
    }
}

pub fn print_report_summary(report: &ComparisonReport) {
    let counts = &report.severity_counts;
    eprintln!(
        "{} {} against {} registry records",
        "Compared".green().bold(),
        report.candidate.name.bold(),
        report.records_compared
    );
    eprintln!(
        "  findings: {} high, {} medium, {} low, {} info",
        counts.high.to_string().red(),
        counts.medium.to_string().yellow(),
        counts.low,
        counts.info
    );

    for comparison in &report.record_comparisons {
        let marker = if comparison.post_filing {
            " [post-filing]".dimmed().to_string()
        } else {
            String::new()
        };
        eprintln!(
            "  {} {} {} ({} passages){}",
            "→".cyan(),
            comparison.nct_id.bold(),
            comparison.overall_status,
            comparison.matched_passages,
            marker
        );
        for finding in comparison.findings() {
            eprintln!(
                "      {} {}: {}",
                severity_label(finding.severity),
                finding.finding_type,
                finding.detail
            );
        }
    }

    let filing_level = report.findings.iter().filter(|f| f.nct_id.is_none());
    for finding in filing_level {
        eprintln!(
            "  {} {}: {}",
            severity_label(finding.severity),
            finding.finding_type,
            finding.detail
        );
    }

    if report.unmatched_passages > 0 {
        eprintln!(
            "  {} {} passages matched no registry record",
            "!".yellow(),
            report.unmatched_passages
        );
    }
}
