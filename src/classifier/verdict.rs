use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic outcome of a classified protocol response, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    PartialSuccess,
    Warning,
    Error,
    NoResponse,
    Unknown,
}

impl ResponseStatus {
    /// Returns a numeric rank where lower values indicate a better outcome.
    /// Success = 0, PartialSuccess = 1, Warning = 2, Error = 3,
    /// NoResponse = 4, Unknown = 5.
    pub fn severity(&self) -> u8 {
        match self {
            ResponseStatus::Success => 0,
            ResponseStatus::PartialSuccess => 1,
            ResponseStatus::Warning => 2,
            ResponseStatus::Error => 3,
            ResponseStatus::NoResponse => 4,
            ResponseStatus::Unknown => 5,
        }
    }

    /// A connection attempt is treated as established for Success and
    /// PartialSuccess alike.
    pub fn is_usable(&self) -> bool {
        self.severity() <= 1
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::PartialSuccess => write!(f, "partial_success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::NoResponse => write!(f, "no_response"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Protocol action that produced the response under classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Scan,
    Connect,
    LengthFuzz,
    MtuExchange,
    PairingFuzz,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Scan => "scan_req",
            Operation::Connect => "connection_request",
            Operation::LengthFuzz => "length_request",
            Operation::MtuExchange => "mtu_request",
            Operation::PairingFuzz => "pairing_request",
        }
    }
}

/// Where in a test campaign the response was observed. Post-attack
/// classifications unlock hints that only make sense after a perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPhase {
    Baseline,
    Attack,
    PostAttack,
}

/// Inferred protocol layer, informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolLayer {
    LinkLayer,
    Att,
    L2cap,
    Hci,
    SecurityManager,
    Unknown,
}

impl std::fmt::Display for ProtocolLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LinkLayer => write!(f, "LL (Link Layer)"),
            Self::Att => write!(f, "ATT"),
            Self::L2cap => write!(f, "L2CAP"),
            Self::Hci => write!(f, "HCI"),
            Self::SecurityManager => write!(f, "SM (Security Manager)"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One entry in a verdict's error details: either an HCI/LL error code
/// extracted from the response text, or a codeless failure description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode {
    pub code: Option<u16>,
    pub description: String,
}

/// Structured verdict produced once per classified response.
///
/// `status` and `is_error` may legitimately disagree: operation-specific
/// evidence of a working exchange keeps `status = success` even when the
/// text happens to embed a hex token that resolves in the error-code table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseVerdict {
    pub operation: Operation,
    pub timestamp: DateTime<Utc>,
    pub raw_response: String,
    pub status: ResponseStatus,
    pub protocol_layer: ProtocolLayer,
    pub is_error: bool,
    pub error_details: Vec<ErrorCode>,
    pub success_indicators: Vec<String>,
    pub warning_indicators: Vec<String>,
    pub vulnerability_hints: Vec<String>,
    pub recommended_action: String,
}

impl ResponseVerdict {
    /// Truncated response text for console output.
    pub fn response_summary(&self) -> &str {
        let end = self
            .raw_response
            .char_indices()
            .nth(100)
            .map(|(i, _)| i)
            .unwrap_or(self.raw_response.len());
        &self.raw_response[..end]
    }

    pub fn has_vulnerability_hints(&self) -> bool {
        !self.vulnerability_hints.is_empty()
    }
}
