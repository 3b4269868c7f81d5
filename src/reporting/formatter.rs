use console::{style, StyledObject};

use crate::campaign::{
    assess_sweep, CampaignOutcome, CampaignStatistics, PairingSweepResult, RecoveryCampaignResult,
    SecurityAssessment,
};
use crate::classifier::{ResponseStatus, ResponseVerdict};

fn styled_status(status: ResponseStatus) -> StyledObject<String> {
    let text = status.to_string();
    match status {
        ResponseStatus::Success => style(text).green(),
        ResponseStatus::PartialSuccess | ResponseStatus::Warning => style(text).yellow(),
        ResponseStatus::Error => style(text).red(),
        ResponseStatus::NoResponse => style(text).magenta(),
        ResponseStatus::Unknown => style(text).cyan(),
    }
}

/// Print a classified verdict to the console, colorized per status.
pub fn print_verdict(verdict: &ResponseVerdict) {
    println!("{}", "=".repeat(60));
    println!("Response analysis - {}", verdict.operation.as_str());
    println!("{}", "=".repeat(60));
    println!("Status: {}", styled_status(verdict.status));
    println!("Protocol layer: {}", verdict.protocol_layer);

    if !verdict.success_indicators.is_empty() {
        println!("{}", style("Success indicators:").green());
        for indicator in &verdict.success_indicators {
            println!("  + {indicator}");
        }
    }

    if !verdict.warning_indicators.is_empty() {
        println!("{}", style("Warning indicators:").yellow());
        for indicator in &verdict.warning_indicators {
            println!("  ! {indicator}");
        }
    }

    if !verdict.error_details.is_empty() {
        println!("{}", style("Error details:").red());
        for detail in &verdict.error_details {
            match detail.code {
                Some(code) => println!("  Code: {:#04x} - {}", code, detail.description),
                None => println!("  {}", detail.description),
            }
        }
    }

    if !verdict.vulnerability_hints.is_empty() {
        println!("{}", style("Vulnerability hints:").red());
        for hint in &verdict.vulnerability_hints {
            println!("  * {hint}");
        }
    }

    println!("{} {}", style("Recommended action:").cyan(), verdict.recommended_action);
    if !verdict.raw_response.is_empty() {
        println!("Response: {}", verdict.response_summary());
    }
    println!("{}", "=".repeat(60));
}

pub fn print_campaign_result(result: &RecoveryCampaignResult) {
    let outcome = match result.overall {
        CampaignOutcome::FullRecovery => style(result.overall.to_string()).green(),
        CampaignOutcome::PartialRecovery | CampaignOutcome::FailedPreConnection => {
            style(result.overall.to_string()).yellow()
        }
        CampaignOutcome::DeviceCrashed => style(result.overall.to_string()).red(),
    };
    println!(
        "\nTest {}={}: {} ({}/{} recovery probes succeeded)",
        result.parameter_name,
        result.parameter_value,
        outcome,
        result.successful_recoveries(),
        result.recovery_attempts.len(),
    );
    for hint in result.vulnerability_hints() {
        println!("  {} {hint}", style("*").red());
    }
}

/// Plain-text sweep report, written next to the capture file.
pub fn format_sweep_report(
    address: &str,
    serial_port: &str,
    capture_file: Option<&str>,
    results: &[RecoveryCampaignResult],
    stats: &CampaignStatistics,
) -> String {
    let mut report = String::new();
    let bar = "=".repeat(70);

    report.push_str(&format!("{bar}\nBLE Device Security Test Report\n{bar}\n\n"));
    report.push_str(&format!(
        "Test time: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("Device address: {address}\n"));
    report.push_str(&format!("Serial port: {serial_port}\n"));
    if let Some(capture) = capture_file {
        report.push_str(&format!("Capture file: {capture}\n"));
    }

    report.push_str("\nConnection statistics:\n");
    report.push_str(&format!("  Total connection attempts: {}\n", stats.total_attempts));
    report.push_str(&format!("  Successful connections: {}\n", stats.successful));
    report.push_str(&format!("  Failed connections: {}\n", stats.failed));
    if stats.total_attempts > 0 {
        report.push_str(&format!(
            "  Connection success rate: {:.1}%\n",
            stats.success_rate() * 100.0
        ));
    }

    report.push_str("\nTest results:\n");
    for result in results {
        report.push_str(&format!(
            "\n  Parameter: {}={}\n",
            result.parameter_name, result.parameter_value
        ));
        report.push_str(&format!("  Result: {}\n", result.overall));
        report.push_str(&format!("  Verdict: {}\n", result.overall.describe()));
        report.push_str(&format!(
            "  Recovery probes: {}/{} successful\n",
            result.successful_recoveries(),
            result.recovery_attempts.len()
        ));
        for hint in result.vulnerability_hints() {
            report.push_str(&format!("  Hint: {hint}\n"));
        }
    }

    report.push_str(&format!("\n{}\n", format_assessment(results)));
    report.push_str(&format!("{bar}\nReport End\n{bar}\n"));
    report
}

/// Sweep-level security assessment with remediation guidance.
pub fn format_assessment(results: &[RecoveryCampaignResult]) -> String {
    let assessment = assess_sweep(results);
    let mut out = String::new();
    out.push_str(&format!("Security assessment: {assessment}\n"));

    match assessment {
        SecurityAssessment::VulnerabilityFound => {
            out.push_str("Affected tests:\n");
            for result in results {
                if matches!(
                    result.overall,
                    CampaignOutcome::DeviceCrashed | CampaignOutcome::PartialRecovery
                ) {
                    out.push_str(&format!(
                        "  - {}={}: {}\n",
                        result.parameter_name,
                        result.parameter_value,
                        result.overall.describe()
                    ));
                }
            }
            out.push_str(
                "Impact: an attacker can force denial of service; the device may need a manual restart.\n\
                 Remediation:\n\
                 \x20 1. Validate Link Layer length fields, reject zero or out-of-range values\n\
                 \x20 2. Add defensive state machine handling for unexpected length transactions\n\
                 \x20 3. Apply protocol stack updates from the device manufacturer\n",
            );
        }
        SecurityAssessment::AbnormalBehavior => {
            out.push_str(
                "Some campaigns could not establish a baseline connection.\n\
                 Retest to confirm whether this is a vulnerability or an environment issue.\n",
            );
        }
        SecurityAssessment::NoVulnerability => {
            out.push_str("Device resisted all tested abnormal inputs.\n");
        }
    }
    out
}

pub fn format_pairing_report(
    address: &str,
    serial_port: &str,
    capture_file: Option<&str>,
    sweep: &PairingSweepResult,
    stats: &CampaignStatistics,
) -> String {
    let mut report = String::new();
    let bar = "=".repeat(70);

    report.push_str(&format!("{bar}\nBLE Pairing Key Size Test Report\n{bar}\n\n"));
    report.push_str(&format!(
        "Test time: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("Device address: {address}\n"));
    report.push_str(&format!("Serial port: {serial_port}\n"));
    if let Some(capture) = capture_file {
        report.push_str(&format!("Capture file: {capture}\n"));
    }

    report.push_str("\nTest statistics:\n");
    report.push_str(&format!("  Total tests: {}\n", sweep.total_tests));
    report.push_str(&format!("  Successful tests: {}\n", sweep.successful_tests));
    report.push_str(&format!("  Failed tests: {}\n", sweep.failed_tests));
    report.push_str(&format!("  Scan failures: {}\n", sweep.scan_failures));
    report.push_str(&format!("  Connection failures: {}\n", sweep.connect_failures));
    report.push_str(&format!("  Pairing rejections: {}\n", sweep.pairing_rejections));
    report.push_str(&format!("  No response: {}\n", sweep.no_response));

    report.push_str("\nResult analysis:\n");
    if sweep.accepted_key_sizes.is_empty() {
        report.push_str("  Device did not accept pairing for any tested key size\n");
    } else {
        report.push_str(&format!("  Accepted key sizes: {:?}\n", sweep.accepted_key_sizes));
        let non_standard = sweep.non_standard_sizes();
        if !non_standard.is_empty() {
            report.push_str(&format!(
                "  WARNING: device accepted non-standard key sizes: {non_standard:?}\n"
            ));
        }
    }

    report.push_str("\nConnection statistics:\n");
    report.push_str(&format!("  Total connection attempts: {}\n", stats.total_attempts));
    report.push_str(&format!("  Successful connections: {}\n", stats.successful));
    report.push_str(&format!("  Failed connections: {}\n", stats.failed));

    report.push_str(&format!("\n{bar}\nReport End\n{bar}\n"));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::ProbeOutcome;

    fn crashed_campaign() -> RecoveryCampaignResult {
        RecoveryCampaignResult {
            parameter_name: "max_rx_bytes",
            parameter_value: 0,
            pre_connection: true,
            attack_response: None,
            attack_elapsed_ms: Some(120),
            recovery_attempts: vec![ProbeOutcome::Failed; 7],
            overall: CampaignOutcome::DeviceCrashed,
        }
    }

    #[test]
    fn test_sweep_report_contains_verdict_and_stats() {
        let stats = CampaignStatistics {
            total_attempts: 10,
            successful: 3,
            failed: 7,
            ..Default::default()
        };
        let report = format_sweep_report(
            "24:B2:31:D1:81:30",
            "/dev/ttyACM0",
            Some("test.pcap"),
            &[crashed_campaign()],
            &stats,
        );
        assert!(report.contains("24:B2:31:D1:81:30"));
        assert!(report.contains("device_crashed"));
        assert!(report.contains("Denial of Service"));
        assert!(report.contains("Total connection attempts: 10"));
        assert!(report.contains("vulnerability found/suspected"));
    }

    #[test]
    fn test_pairing_report_flags_non_standard_sizes() {
        let sweep = PairingSweepResult {
            accepted_key_sizes: vec![5, 7],
            total_tests: 10,
            successful_tests: 2,
            failed_tests: 8,
            ..Default::default()
        };
        let report = format_pairing_report(
            "AA:BB:CC:DD:EE:FF",
            "/dev/ttyACM0",
            None,
            &sweep,
            &CampaignStatistics::default(),
        );
        assert!(report.contains("non-standard key sizes: [5]"));
    }
}
