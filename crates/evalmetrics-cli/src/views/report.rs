use evalmetrics_runtime::ReportOutcome;
use evalmetrics_runtime::config::INPUT_ENV;
use owo_colors::OwoColorize;

pub fn format_summary(outcome: &ReportOutcome, color: bool) -> String {
    let entries = outcome.report.total_entries;
    let threads = outcome.report.unique_threads;

    if color {
        format!(
            "Processed {} entries from {} unique threads",
            entries.bold(),
            threads.bold()
        )
    } else {
        format!("Processed {} entries from {} unique threads", entries, threads)
    }
}

pub fn print_summary(outcome: &ReportOutcome) {
    println!("{}", format_summary(outcome, super::use_color()));
}

pub fn print_missing_input_hint() {
    eprintln!(
        "Pass --input <path> or set {} to point at your EVAL_METRICS_All.txt file",
        INPUT_ENV
    );
}
