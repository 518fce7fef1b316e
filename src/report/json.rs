//! Machine-readable report

use super::ScanReport;

pub fn render(report: &ScanReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
