use console::style;

use super::commands::ProbeArgs;
use crate::campaign::TestSession;
use crate::engine::RemoteEngine;
use crate::errors::HarnessError;

/// Non-destructive availability check: scan/connect rounds only, no fuzzed
/// PDUs.
pub fn handle_probe(args: ProbeArgs) -> Result<(), HarnessError> {
    let address = super::normalize_address(&args.target.address)?;

    println!("{}", style("BLE Device Availability Probe").bold());
    println!("Target device: {address}");
    println!("Rounds: {}\n", args.rounds);

    let engine = RemoteEngine::open(&args.target.control, &args.target.serial_port, &address)?;
    let mut session = TestSession::new(engine);

    let report = session.probe_availability(args.rounds);
    session.disconnect();

    println!("Scan success rate: {:.0}%", report.scan_rate() * 100.0);
    println!("Connect success rate: {:.0}%", report.connect_rate() * 100.0);
    if report.device_available() {
        println!("{}", style("Device is available for testing").green());
    } else {
        println!(
            "{}",
            style("Device is not reliably reachable, check power and range").red()
        );
    }

    Ok(())
}
