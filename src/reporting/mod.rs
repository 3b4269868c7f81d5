pub mod formatter;

pub use formatter::{
    format_assessment, format_pairing_report, format_sweep_report, print_campaign_result,
    print_verdict,
};

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

/// Timestamp-derived default capture name, used when the CLI was not given
/// one.
pub fn default_capture_name() -> String {
    format!(
        "ble_smart_test_{}.pcap",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

pub fn default_report_name() -> String {
    format!(
        "ble_security_report_{}.txt",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

pub fn ensure_pcap_extension(filename: &str) -> String {
    if filename.ends_with(".pcap") {
        filename.to_string()
    } else {
        format!("{filename}.pcap")
    }
}

/// Write the text report. Failures are logged and swallowed; losing a report
/// must never take the test results down with it.
pub fn write_text_report(path: &Path, content: &str) -> bool {
    match std::fs::write(path, content) {
        Ok(()) => {
            info!(path = %path.display(), "Report written");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to write report");
            false
        }
    }
}

/// Write machine-readable results as pretty JSON next to the text report.
pub fn write_json_results<T: Serialize>(path: &Path, value: &T) -> bool {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to serialize results");
            return false;
        }
    };
    match std::fs::write(path, json) {
        Ok(()) => {
            info!(path = %path.display(), "JSON results written");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to write JSON results");
            false
        }
    }
}
