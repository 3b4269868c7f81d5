use std::path::Path;

use console::style;
use tracing::info;

use super::commands::PairingArgs;
use crate::campaign::TestSession;
use crate::engine::RemoteEngine;
use crate::errors::HarnessError;
use crate::reporting;

/// Run the pairing key-size sweep and report which sizes the device
/// accepted.
pub fn handle_pairing(args: PairingArgs) -> Result<(), HarnessError> {
    let address = super::normalize_address(&args.target.address)?;
    let capture = args
        .target
        .capture
        .as_deref()
        .map(reporting::ensure_pcap_extension)
        .unwrap_or_else(|| format!("pairing_test_{}.pcap", address.replace(':', "_")));

    println!("{}", style("BLE Pairing Key Size Test").bold());
    println!("Target device: {address}");
    println!("Serial port: {}", args.target.serial_port);
    println!(
        "Key size range: {} down to {}\n",
        args.start_key_size, args.end_key_size
    );

    let engine = RemoteEngine::open(&args.target.control, &args.target.serial_port, &address)?;
    let mut session = TestSession::new(engine);

    let sweep = session.run_pairing_sweep(args.start_key_size, args.end_key_size);

    if sweep.accepted_key_sizes.is_empty() {
        println!(
            "\n{}",
            style("Device did not accept pairing for any tested key size").yellow()
        );
    } else {
        println!(
            "\nAccepted key sizes: {}",
            style(format!("{:?}", sweep.accepted_key_sizes)).green()
        );
        let non_standard = sweep.non_standard_sizes();
        if !non_standard.is_empty() {
            println!(
                "{}",
                style(format!(
                    "WARNING: device accepted non-standard key sizes: {non_standard:?}"
                ))
                .red()
            );
        }
    }

    // Quick post-sweep reachability check so a hung device shows up in the
    // console, not just in the report numbers.
    let availability = session.probe_availability(1);
    if availability.device_available() {
        println!("{}", style("Device still reachable after sweep").green());
    } else {
        println!(
            "{}",
            style("Device not reachable after sweep, it may need a restart").red()
        );
    }

    let stats = session.stats().clone();
    info!(
        attempts = stats.total_attempts,
        accepted = sweep.accepted_key_sizes.len(),
        "Pairing sweep finished"
    );

    session.save_capture(&capture);
    session.disconnect();

    let report_name = reporting::default_report_name();
    let report = reporting::format_pairing_report(
        &address,
        &args.target.serial_port,
        Some(&capture),
        &sweep,
        &stats,
    );
    reporting::write_text_report(Path::new(&report_name), &report);
    let json_name = report_name.replace(".txt", ".json");
    reporting::write_json_results(Path::new(&json_name), &sweep);

    Ok(())
}
