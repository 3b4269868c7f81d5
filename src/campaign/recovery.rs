//! Recovery campaign orchestration: connect, perturb, then sample the
//! device's ability to accept new connections over time. Campaigns run
//! strictly sequentially; there is one radio and post-attack recovery has to
//! be observed serially to attribute causality.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use super::stats::CampaignStatistics;
use crate::classifier::{classify, Operation, ResponseStatus, ResponseVerdict, TestPhase};
use crate::engine::FuzzEngine;

/// Timing and retry knobs for a test session. Defaults match field-tested
/// values: the probe delay is deliberately longer than the connect retry
/// delay so a crashed device has time to reboot and re-advertise.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    pub connect_attempts: u32,
    pub connect_delay: Duration,
    /// Delay between retried scan/connect attempts inside a retry loop.
    pub retry_delay: Duration,
    /// Pause after a successful connect or terminate before the next PDU.
    pub settle_delay: Duration,
    /// Wait after the perturbation before probing recovery; crash effects
    /// like watchdog resets manifest with latency.
    pub observation_window: Duration,
    pub recovery_probes: u32,
    pub probe_delay: Duration,
    /// Wait after sending a pairing request before judging the response.
    pub pairing_wait: Duration,
    pub pairing_rest: Duration,
    pub inter_test_rest: Duration,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            connect_attempts: 7,
            connect_delay: Duration::from_secs(2),
            retry_delay: Duration::from_secs(1),
            settle_delay: Duration::from_millis(500),
            observation_window: Duration::from_secs(3),
            recovery_probes: 7,
            probe_delay: Duration::from_secs(4),
            pairing_wait: Duration::from_secs(2),
            pairing_rest: Duration::from_secs(2),
            inter_test_rest: Duration::from_secs(5),
        }
    }
}

impl CampaignConfig {
    /// Same attempt counts with every delay zeroed. For stub-engine tests.
    pub fn immediate() -> Self {
        Self {
            connect_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
            observation_window: Duration::ZERO,
            probe_delay: Duration::ZERO,
            pairing_wait: Duration::ZERO,
            pairing_rest: Duration::ZERO,
            inter_test_rest: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Outcome of one post-attack reconnection probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    Success,
    Failed,
    Exception,
}

/// Derived verdict of a whole campaign. Never set independently of the
/// probe outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignOutcome {
    FailedPreConnection,
    DeviceCrashed,
    PartialRecovery,
    FullRecovery,
}

impl CampaignOutcome {
    /// Exact threshold logic: any single non-recovered probe among K is
    /// enough to downgrade from full recovery.
    pub fn from_probes(probes: &[ProbeOutcome]) -> Self {
        let successes = probes
            .iter()
            .filter(|p| matches!(p, ProbeOutcome::Success))
            .count();
        if successes == 0 {
            CampaignOutcome::DeviceCrashed
        } else if successes < probes.len() {
            CampaignOutcome::PartialRecovery
        } else {
            CampaignOutcome::FullRecovery
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::FailedPreConnection => "Cannot establish initial connection",
            Self::DeviceCrashed => "Confirmed - Denial of Service vulnerability",
            Self::PartialRecovery => "Suspected - Partial Denial of Service",
            Self::FullRecovery => "No vulnerability",
        }
    }
}

impl std::fmt::Display for CampaignOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FailedPreConnection => write!(f, "failed_pre_connection"),
            Self::DeviceCrashed => write!(f, "device_crashed"),
            Self::PartialRecovery => write!(f, "partial_recovery"),
            Self::FullRecovery => write!(f, "full_recovery"),
        }
    }
}

/// Result of one recovery campaign against one fuzzed parameter value.
/// Built up phase by phase, immutable once the campaign returns.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryCampaignResult {
    pub parameter_name: &'static str,
    pub parameter_value: u32,
    pub pre_connection: bool,
    pub attack_response: Option<ResponseVerdict>,
    pub attack_elapsed_ms: Option<u64>,
    pub recovery_attempts: Vec<ProbeOutcome>,
    pub overall: CampaignOutcome,
}

impl RecoveryCampaignResult {
    pub fn successful_recoveries(&self) -> usize {
        self.recovery_attempts
            .iter()
            .filter(|p| matches!(p, ProbeOutcome::Success))
            .count()
    }

    pub fn vulnerability_hints(&self) -> &[String] {
        self.attack_response
            .as_ref()
            .map(|v| v.vulnerability_hints.as_slice())
            .unwrap_or(&[])
    }
}

/// A single-threaded test session owning the engine and the process-wide
/// connection statistics.
pub struct TestSession<E: FuzzEngine> {
    pub(crate) engine: E,
    pub(crate) config: CampaignConfig,
    pub(crate) stats: CampaignStatistics,
}

impl<E: FuzzEngine> TestSession<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, CampaignConfig::default())
    }

    pub fn with_config(engine: E, config: CampaignConfig) -> Self {
        Self {
            engine,
            config,
            stats: CampaignStatistics::default(),
        }
    }

    pub fn stats(&self) -> &CampaignStatistics {
        &self.stats
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Best-effort capture save. Failures are logged and swallowed so that
    /// preserving diagnostic evidence can never crash the harness.
    pub fn save_capture(&mut self, filename: &str) -> bool {
        match self.engine.save_capture(filename) {
            Ok(()) => {
                info!(filename, "Capture saved");
                true
            }
            Err(e) => {
                warn!(filename, error = %e, "Failed to save capture");
                false
            }
        }
    }

    /// Best-effort disconnect on the way out.
    pub fn disconnect(&mut self) {
        if let Err(e) = self.engine.terminate() {
            warn!(error = %e, "Disconnect failed");
        }
    }

    /// Baseline connection with bounded retries, judged by the classifier:
    /// success and partial_success both count as an established link.
    fn establish_connection(&mut self) -> bool {
        for attempt in 1..=self.config.connect_attempts {
            self.stats.total_attempts += 1;

            match self.engine.connect() {
                Ok(response) => {
                    let verdict = classify(
                        response.classifier_input(),
                        Operation::Connect,
                        TestPhase::Baseline,
                    );
                    if verdict.status.is_usable() {
                        self.stats.successful += 1;
                        info!(attempt, status = %verdict.status, "Connection established");
                        std::thread::sleep(self.config.settle_delay);
                        return true;
                    }
                    self.stats.failed += 1;
                    warn!(attempt, status = %verdict.status, "Connection attempt failed");
                }
                Err(e) => {
                    self.stats.failed += 1;
                    warn!(attempt, error = %e, "Connection attempt raised a fault");
                }
            }

            if attempt < self.config.connect_attempts {
                std::thread::sleep(self.config.connect_delay);
            }
        }
        self.stats.connect_failures += 1;
        false
    }

    /// One recovery campaign: PRE_CONNECT, PERTURB, RECOVERY_PROBE xK,
    /// VERDICT.
    pub fn run_length_campaign(&mut self, max_rx_bytes: u16) -> RecoveryCampaignResult {
        info!(max_rx_bytes, "Starting length-field recovery campaign");

        let mut result = RecoveryCampaignResult {
            parameter_name: "max_rx_bytes",
            parameter_value: max_rx_bytes as u32,
            pre_connection: false,
            attack_response: None,
            attack_elapsed_ms: None,
            recovery_attempts: Vec::new(),
            overall: CampaignOutcome::FailedPreConnection,
        };

        // No perturbation against a device that is not reachable.
        if !self.establish_connection() {
            warn!(max_rx_bytes, "Baseline connection failed, campaign aborted");
            return result;
        }
        result.pre_connection = true;

        // Exactly one fuzzed request carries the test parameter.
        let started = Instant::now();
        match self.engine.send_length_fuzz(max_rx_bytes) {
            Ok(response) => {
                let verdict = classify(
                    response.classifier_input(),
                    Operation::LengthFuzz,
                    TestPhase::Attack,
                );
                info!(max_rx_bytes, status = %verdict.status, hints = verdict.vulnerability_hints.len(), "Perturbation classified");
                result.attack_response = Some(verdict);
            }
            Err(e) => {
                warn!(max_rx_bytes, error = %e, "Length fuzz request raised a fault");
            }
        }
        result.attack_elapsed_ms = Some(started.elapsed().as_millis() as u64);

        std::thread::sleep(self.config.observation_window);

        for probe in 1..=self.config.recovery_probes {
            std::thread::sleep(self.config.probe_delay);
            let outcome = self.recovery_probe(probe);
            result.recovery_attempts.push(outcome);
        }

        result.overall = CampaignOutcome::from_probes(&result.recovery_attempts);
        info!(
            max_rx_bytes,
            recovered = result.successful_recoveries(),
            probes = result.recovery_attempts.len(),
            outcome = %result.overall,
            "Campaign complete"
        );
        result
    }

    /// One availability sample: a single-shot connect, not a retry loop.
    /// The goal is to sample the device over time, not to force success.
    fn recovery_probe(&mut self, probe: u32) -> ProbeOutcome {
        self.stats.total_attempts += 1;

        match self.engine.connect() {
            Ok(response) => {
                let verdict = classify(
                    response.classifier_input(),
                    Operation::Connect,
                    TestPhase::PostAttack,
                );
                if verdict.status == ResponseStatus::Success {
                    self.stats.successful += 1;
                    info!(probe, "Recovery probe succeeded");
                    // Leave nothing open across probes; a live connection
                    // would perturb the next reconnection attempt.
                    if let Err(e) = self.engine.terminate() {
                        warn!(probe, error = %e, "Post-probe disconnect failed");
                    }
                    std::thread::sleep(self.config.settle_delay);
                    ProbeOutcome::Success
                } else {
                    self.stats.failed += 1;
                    self.stats.connect_failures += 1;
                    info!(probe, status = %verdict.status, "Recovery probe failed");
                    ProbeOutcome::Failed
                }
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!(probe, error = %e, "Recovery probe raised a fault");
                ProbeOutcome::Exception
            }
        }
    }

    /// Run one campaign per parameter value, resting between campaigns.
    pub fn run_length_sweep(&mut self, values: &[u16]) -> Vec<RecoveryCampaignResult> {
        let mut results = Vec::with_capacity(values.len());
        for (i, &value) in values.iter().enumerate() {
            if i > 0 {
                std::thread::sleep(self.config.inter_test_rest);
            }
            results.push(self.run_length_campaign(value));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_monotonic_in_probe_outcomes() {
        let all_failed = vec![ProbeOutcome::Failed; 7];
        assert_eq!(CampaignOutcome::from_probes(&all_failed), CampaignOutcome::DeviceCrashed);

        let mut mixed = vec![ProbeOutcome::Success; 3];
        mixed.extend(vec![ProbeOutcome::Failed; 4]);
        assert_eq!(CampaignOutcome::from_probes(&mixed), CampaignOutcome::PartialRecovery);

        let all_ok = vec![ProbeOutcome::Success; 7];
        assert_eq!(CampaignOutcome::from_probes(&all_ok), CampaignOutcome::FullRecovery);
    }

    #[test]
    fn test_exceptions_count_as_non_recovered() {
        let probes = vec![
            ProbeOutcome::Success,
            ProbeOutcome::Exception,
            ProbeOutcome::Success,
        ];
        assert_eq!(CampaignOutcome::from_probes(&probes), CampaignOutcome::PartialRecovery);
    }

    #[test]
    fn test_single_failed_probe_downgrades_full_recovery() {
        let mut probes = vec![ProbeOutcome::Success; 6];
        probes.push(ProbeOutcome::Failed);
        assert_eq!(CampaignOutcome::from_probes(&probes), CampaignOutcome::PartialRecovery);
    }
}
