//! Lightweight device-availability check run before a long sweep: a few
//! scan/connect rounds with short retry budgets, summarized as success
//! rates.

use serde::Serialize;
use tracing::{info, warn};

use super::recovery::TestSession;
use crate::engine::{with_retries, FuzzEngine, RetryPolicy};

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    pub rounds: u32,
    pub successful_scans: u32,
    pub successful_connects: u32,
}

impl AvailabilityReport {
    pub fn scan_rate(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.successful_scans as f64 / self.rounds as f64
        }
    }

    /// Connect rate is measured against successful scans; connecting to a
    /// device that never advertised is not a meaningful sample.
    pub fn connect_rate(&self) -> f64 {
        if self.successful_scans == 0 {
            0.0
        } else {
            self.successful_connects as f64 / self.successful_scans as f64
        }
    }

    pub fn device_available(&self) -> bool {
        self.scan_rate() >= 0.4 && self.connect_rate() >= 0.5
    }
}

impl<E: FuzzEngine> TestSession<E> {
    /// Sample device reachability over `rounds` scan/connect cycles, each
    /// with the short probe retry budget.
    pub fn probe_availability(&mut self, rounds: u32) -> AvailabilityReport {
        info!(rounds, "Probing device availability");
        let mut report = AvailabilityReport {
            rounds,
            successful_scans: 0,
            successful_connects: 0,
        };

        let policy = RetryPolicy::probe().with_delay(self.config.retry_delay);

        for round in 1..=rounds {
            let engine = &mut self.engine;
            let (scan_ok, _) = with_retries("scan_req", &policy, || engine.scan());
            if scan_ok {
                report.successful_scans += 1;

                let engine = &mut self.engine;
                let stats = &mut self.stats;
                let (connect_ok, _) = with_retries("connection_request", &policy, || {
                    let result = engine.connect();
                    stats.total_attempts += 1;
                    match &result {
                        Ok(response) if !response.is_failure() => stats.successful += 1,
                        _ => stats.failed += 1,
                    }
                    result
                });

                if connect_ok {
                    report.successful_connects += 1;
                    if let Err(e) = self.engine.terminate() {
                        warn!(round, error = %e, "Disconnect after availability probe failed");
                    }
                    std::thread::sleep(self.config.settle_delay);
                }
            }

            if round < rounds {
                std::thread::sleep(self.config.retry_delay);
            }
        }

        info!(
            scan_rate = report.scan_rate(),
            connect_rate = report.connect_rate(),
            available = report.device_available(),
            "Availability probe complete"
        );
        report
    }
}
