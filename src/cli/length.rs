use std::path::Path;

use console::style;
use tracing::info;

use super::commands::LengthArgs;
use crate::campaign::TestSession;
use crate::engine::RemoteEngine;
use crate::errors::HarnessError;
use crate::reporting;

/// Run the length-field fuzzing sweep end to end: connect to the engine,
/// run one recovery campaign per value, then print and persist the results.
pub fn handle_length(args: LengthArgs) -> Result<(), HarnessError> {
    let address = super::normalize_address(&args.target.address)?;
    let capture = args
        .target
        .capture
        .as_deref()
        .map(reporting::ensure_pcap_extension)
        .unwrap_or_else(reporting::default_capture_name);

    println!("{}", style("BLE Link Layer Length Fuzzing Test").bold());
    println!("Target device: {address}");
    println!("Serial port: {}", args.target.serial_port);
    println!("Test values: {:?}\n", args.values);

    let engine = RemoteEngine::open(&args.target.control, &args.target.serial_port, &address)?;
    let mut session = TestSession::new(engine);

    let results = session.run_length_sweep(&args.values);

    for result in &results {
        reporting::print_campaign_result(result);
        if let Some(verdict) = &result.attack_response {
            reporting::print_verdict(verdict);
        }
    }
    println!("\n{}", reporting::format_assessment(&results));

    let stats = session.stats().clone();
    info!(
        attempts = stats.total_attempts,
        successful = stats.successful,
        failed = stats.failed,
        "Sweep finished"
    );

    // Evidence first, cleanup second; both are best-effort.
    session.save_capture(&capture);
    session.disconnect();

    let report_name = reporting::default_report_name();
    let report = reporting::format_sweep_report(
        &address,
        &args.target.serial_port,
        Some(&capture),
        &results,
        &stats,
    );
    reporting::write_text_report(Path::new(&report_name), &report);
    let json_name = report_name.replace(".txt", ".json");
    reporting::write_json_results(Path::new(&json_name), &results);

    Ok(())
}
