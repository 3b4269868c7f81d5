//! Fixed lookup tables owned by the classifier: HCI/LL error codes, the
//! connection-phase LL PDU map, and the ordered indicator lists. All static,
//! no lifecycle beyond process start.

/// HCI/LL error-code descriptions indexed by code value, 0x00..=0x3F.
const HCI_ERROR_DESCRIPTIONS: [&str; 64] = [
    "Success",
    "Unknown HCI Command",
    "Unknown Connection Identifier",
    "Hardware Failure",
    "Page Timeout",
    "Authentication Failure",
    "Pin or Key Missing",
    "Memory Capacity Exceeded",
    "Connection Timeout",
    "Connection Limit Exceeded",
    "Synchronous Connection Limit Exceeded",
    "ACL Connection Already Exists",
    "Command Disallowed",
    "Connection Rejected due to Limited Resources",
    "Connection Rejected due to Security Reasons",
    "Connection Rejected due to Unacceptable BD_ADDR",
    "Connection Accept Timeout Exceeded",
    "Unsupported Feature or Parameter Value",
    "Invalid HCI Command Parameters",
    "Remote User Terminated Connection",
    "Remote Device Terminated Connection due to Low Resources",
    "Remote Device Terminated Connection due to Power Off",
    "Connection Terminated by Local Host",
    "Repeated Attempts",
    "Pairing Not Allowed",
    "Unknown LMP PDU",
    "Unsupported Remote Feature / Unsupported LMP Feature",
    "SCO Offset Rejected",
    "SCO Interval Rejected",
    "SCO Air Mode Rejected",
    "Invalid LMP Parameters / Invalid LL Parameters",
    "Unspecified Error",
    "Unsupported LMP Parameter Value / Unsupported LL Parameter Value",
    "Role Change Not Allowed",
    "LMP Response Timeout / LL Response Timeout",
    "LMP Error Transaction Collision / LL Procedure Collision",
    "LMP PDU Not Allowed",
    "Encryption Mode Not Acceptable",
    "Link Key Cannot be Changed",
    "Requested QoS Not Supported",
    "Instant Passed",
    "Pairing with Unit Key Not Supported",
    "Different Transaction Collision",
    "Reserved",
    "QoS Unacceptable Parameter",
    "QoS Rejected",
    "Channel Classification Not Supported",
    "Insufficient Security",
    "Parameter Out Of Mandatory Range",
    "Reserved",
    "Role Switch Pending",
    "Reserved",
    "Reserved Slot Violation",
    "Role Switch Failed",
    "Extended Inquiry Response Too Large",
    "Secure Simple Pairing Not Supported by Host",
    "Host Busy - Pairing",
    "Connection Rejected due to No Suitable Channel Found",
    "Controller Busy",
    "Unacceptable Connection Parameters",
    "Advertising Timeout",
    "Connection Terminated due to MIC Failure",
    "Connection Failed to be Established",
    "MAC Connection Failed",
];

pub fn hci_error_description(code: u16) -> Option<&'static str> {
    HCI_ERROR_DESCRIPTIONS.get(code as usize).copied()
}

/// Link-layer PDUs seen during the connection phase, with what their
/// presence means for link state.
pub const LL_CONNECTION_PDUS: &[(&str, &str)] = &[
    ("LL_SLAVE_FEATURE_REQ", "Slave Feature Request - Connection established"),
    ("LL_FEATURE_RSP", "Feature Response"),
    ("LL_VERSION_IND", "Version Indication"),
    ("LL_PING_REQ", "Ping Request"),
    ("LL_PING_RSP", "Ping Response"),
    ("LL_LENGTH_REQ", "Length Request"),
    ("LL_LENGTH_RSP", "Length Response"),
    ("LL_ENC_REQ", "Encryption Request"),
    ("LL_ENC_RSP", "Encryption Response"),
    ("LL_START_ENC_REQ", "Start Encryption Request"),
    ("LL_START_ENC_RSP", "Start Encryption Response"),
    ("LL_TERMINATE_IND", "Connection Termination Indication"),
];

/// Connection-success indicators, scanned in order; first match wins.
/// LL_SLAVE_FEATURE_REQ leads deliberately: naive matchers flag it as an
/// error even though its presence proves the link came up.
pub const CONNECTION_SUCCESS_INDICATORS: &[&str] = &[
    "LL_SLAVE_FEATURE_REQ",
    "LL_FEATURE_RSP",
    "LL_VERSION_IND",
    "ATT_Exchange_MTU_Request",
    "ATT_Exchange_MTU_Response",
    "connected",
    "connection",
    "CONNECTED",
    "CONNECTION",
];

/// Connection-failure tokens, matched case-insensitively and only after
/// the success indicators have been ruled out.
pub const CONNECTION_FAILURE_INDICATORS: &[&str] = &["error", "failed", "reject", "timeout"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_table_covers_full_range() {
        assert_eq!(hci_error_description(0x00), Some("Success"));
        assert_eq!(hci_error_description(0x08), Some("Connection Timeout"));
        assert_eq!(hci_error_description(0x3F), Some("MAC Connection Failed"));
        assert_eq!(hci_error_description(0x40), None);
    }

    #[test]
    fn test_feature_req_leads_success_indicators() {
        assert_eq!(CONNECTION_SUCCESS_INDICATORS[0], "LL_SLAVE_FEATURE_REQ");
    }

    #[test]
    fn test_terminate_ind_is_a_known_pdu() {
        assert!(LL_CONNECTION_PDUS.iter().any(|(name, _)| *name == "LL_TERMINATE_IND"));
    }
}
