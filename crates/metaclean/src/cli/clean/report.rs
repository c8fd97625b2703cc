//! Human-readable batch report on stdout.

use metaclean_core::{BatchOutput, ProcessingOutcome};

/// Summary line followed by one entry per failure.
pub(crate) fn report_lines(output: &BatchOutput) -> Vec<String> {
    let mut lines = vec![output.summary().to_string()];
    for outcome in &output.outcomes {
        if let ProcessingOutcome::Failure {
            path,
            reason,
            error,
        } = outcome
        {
            lines.push(format!("Failure: {} - {}", path.display(), reason));
            if let Some(error) = error {
                lines.push(format!("Error: {error}"));
            }
        }
    }
    lines
}

pub(crate) fn print_report(output: &BatchOutput) {
    for line in report_lines(output) {
        println!("{line}");
    }

    let summary = output.summary();
    tracing::info!(
        "{} unchanged, {} locations saved",
        summary.unchanged,
        summary.located
    );
}
