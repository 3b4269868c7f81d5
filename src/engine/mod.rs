pub mod remote;
pub mod retry;

pub use remote::RemoteEngine;
pub use retry::{with_retries, RetryPolicy};

use crate::errors::HarnessError;

/// A single protocol round-trip outcome as reported by the external
/// fuzzing engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioResponse {
    /// A captured response, pre-stringified by the engine.
    Packet(String),
    /// The operation completed but no response frame was captured.
    Empty,
    /// The engine's explicit error sentinel.
    ErrorSentinel,
}

impl RadioResponse {
    /// Text handed to the classifier. `Empty` means the collaborator
    /// returned no response object at all.
    pub fn classifier_input(&self) -> Option<&str> {
        match self {
            RadioResponse::Packet(text) => Some(text),
            RadioResponse::Empty => None,
            RadioResponse::ErrorSentinel => Some("ERROR"),
        }
    }

    /// True for the explicit error sentinel; the retry engine treats this
    /// the same as a raised fault.
    pub fn is_failure(&self) -> bool {
        matches!(self, RadioResponse::ErrorSentinel)
    }
}

/// Narrow interface over the external BLE protocol-fuzzing engine. The
/// classifier and orchestrator only ever see this seam, so the retry and
/// recovery state machines are testable against a deterministic stub.
pub trait FuzzEngine {
    fn scan(&mut self) -> Result<RadioResponse, HarnessError>;
    fn connect(&mut self) -> Result<RadioResponse, HarnessError>;
    fn send_length_fuzz(&mut self, max_rx_bytes: u16) -> Result<RadioResponse, HarnessError>;
    fn send_pairing_fuzz(&mut self, max_key_size: u8) -> Result<RadioResponse, HarnessError>;
    /// Best-effort disconnect; callers swallow failures.
    fn terminate(&mut self) -> Result<(), HarnessError>;
    fn save_capture(&mut self, filename: &str) -> Result<(), HarnessError>;
}
