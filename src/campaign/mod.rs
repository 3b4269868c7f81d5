pub mod availability;
pub mod pairing;
pub mod recovery;
pub mod stats;

pub use availability::AvailabilityReport;
pub use pairing::{KeySizeTest, PairingSweepResult};
pub use recovery::{
    CampaignConfig, CampaignOutcome, ProbeOutcome, RecoveryCampaignResult, TestSession,
};
pub use stats::{assess_sweep, CampaignStatistics, SecurityAssessment};
