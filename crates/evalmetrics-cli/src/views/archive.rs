use evalmetrics_runtime::ArchiveOutcome;
use owo_colors::OwoColorize;

pub fn format_created(outcome: &ArchiveOutcome, color: bool) -> String {
    let path = outcome.path.display().to_string();
    let size = format!("{:.2} MB", outcome.size_mb());

    if color {
        format!("Created {} ({})", path.green(), size)
    } else {
        format!("Created {} ({})", path, size)
    }
}

pub fn print_created(outcome: &ArchiveOutcome) {
    println!("{}", format_created(outcome, super::use_color()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_plain_created_line() {
        let outcome = ArchiveOutcome {
            path: PathBuf::from("reports/draft_data.zip"),
            size_bytes: 3 * 1024 * 1024,
            files: 4,
        };

        assert_eq!(
            format_created(&outcome, false),
            "Created reports/draft_data.zip (3.00 MB)"
        );
    }
}
