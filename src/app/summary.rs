use super::controller::RunReport;

pub(crate) fn summary_lines(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("--- Run Summary ---".to_owned());
    lines.push(format!("Duration: {}s", report.elapsed.as_secs()));
    lines.push(format!(
        "Total Requests: {}",
        report.snapshot.total_requests
    ));
    lines.push(format!("Failed: {}", report.snapshot.failed_requests));
    // Integer average over whole seconds; sub-second runs count as one.
    let divisor = report.elapsed.as_secs().max(1);
    lines.push(format!(
        "Average RPS: {}",
        report.snapshot.total_requests.checked_div(divisor).unwrap_or(0)
    ));
    if !report.unique_errors.is_empty() {
        lines.push(String::new());
        lines.push("Encountered errors:".to_owned());
        for label in &report.unique_errors {
            lines.push(format!("- {}", label));
        }
    }
    lines
}

pub(crate) fn print_summary(report: &RunReport) {
    println!();
    for line in summary_lines(report) {
        println!("{}", line);
    }
}
