use serde::Serialize;

use super::recovery::{CampaignOutcome, RecoveryCampaignResult};

/// Process-lifetime counters owned by a test session. Updated by every
/// connection attempt across every campaign; reset only by creating a new
/// session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignStatistics {
    pub total_attempts: u64,
    pub successful: u64,
    pub failed: u64,
    pub scan_failures: u64,
    pub connect_failures: u64,
    pub pairing_rejections: u64,
    pub no_response: u64,
}

impl CampaignStatistics {
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.successful as f64 / self.total_attempts as f64
        }
    }
}

/// Sweep-level security verdict. Precedence is strict: a crashed or
/// partially-recovered campaign dominates the report no matter how many
/// other campaigns passed cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityAssessment {
    VulnerabilityFound,
    AbnormalBehavior,
    NoVulnerability,
}

impl std::fmt::Display for SecurityAssessment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VulnerabilityFound => write!(f, "vulnerability found/suspected"),
            Self::AbnormalBehavior => write!(f, "abnormal behavior observed"),
            Self::NoVulnerability => write!(f, "no vulnerability observed"),
        }
    }
}

pub fn assess_sweep(results: &[RecoveryCampaignResult]) -> SecurityAssessment {
    if results
        .iter()
        .any(|r| matches!(r.overall, CampaignOutcome::DeviceCrashed | CampaignOutcome::PartialRecovery))
    {
        SecurityAssessment::VulnerabilityFound
    } else if results
        .iter()
        .any(|r| matches!(r.overall, CampaignOutcome::FailedPreConnection))
    {
        // The device could not even be reached for a baseline connection.
        // Degraded, but nothing was confirmed against it.
        SecurityAssessment::AbnormalBehavior
    } else {
        SecurityAssessment::NoVulnerability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::recovery::ProbeOutcome;

    fn campaign(overall: CampaignOutcome) -> RecoveryCampaignResult {
        RecoveryCampaignResult {
            parameter_name: "max_rx_bytes",
            parameter_value: 0,
            pre_connection: !matches!(overall, CampaignOutcome::FailedPreConnection),
            attack_response: None,
            attack_elapsed_ms: None,
            recovery_attempts: vec![ProbeOutcome::Success],
            overall,
        }
    }

    #[test]
    fn test_crashed_campaign_dominates_clean_ones() {
        let results = vec![
            campaign(CampaignOutcome::FullRecovery),
            campaign(CampaignOutcome::DeviceCrashed),
            campaign(CampaignOutcome::FullRecovery),
        ];
        assert_eq!(assess_sweep(&results), SecurityAssessment::VulnerabilityFound);
    }

    #[test]
    fn test_partial_recovery_escalates() {
        let results = vec![
            campaign(CampaignOutcome::FullRecovery),
            campaign(CampaignOutcome::PartialRecovery),
        ];
        assert_eq!(assess_sweep(&results), SecurityAssessment::VulnerabilityFound);
    }

    #[test]
    fn test_unreachable_device_is_abnormal() {
        let results = vec![
            campaign(CampaignOutcome::FailedPreConnection),
            campaign(CampaignOutcome::FullRecovery),
        ];
        assert_eq!(assess_sweep(&results), SecurityAssessment::AbnormalBehavior);
    }

    #[test]
    fn test_all_clean_is_no_vulnerability() {
        let results = vec![campaign(CampaignOutcome::FullRecovery)];
        assert_eq!(assess_sweep(&results), SecurityAssessment::NoVulnerability);
    }

    #[test]
    fn test_success_rate() {
        let stats = CampaignStatistics {
            total_attempts: 8,
            successful: 6,
            failed: 2,
            ..Default::default()
        };
        assert!((stats.success_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CampaignStatistics::default().success_rate(), 0.0);
    }
}
