//! Response classification. Disambiguates raw protocol response text into an
//! operation-aware status. The ordered indicator scanning here is the key
//! correctness property: a matcher that stops at substring checks for
//! "error" misclassifies legitimate link-layer PDUs as failures.

use chrono::Utc;

use super::hints::detect_hints;
use super::tables::{
    hci_error_description, CONNECTION_FAILURE_INDICATORS, CONNECTION_SUCCESS_INDICATORS,
    LL_CONNECTION_PDUS,
};
use super::verdict::{
    ErrorCode, Operation, ProtocolLayer, ResponseStatus, ResponseVerdict, TestPhase,
};

/// Outcome of the operation-specific branch, folded into the verdict before
/// final status resolution.
struct BranchResult {
    status: ResponseStatus,
    success_indicators: Vec<String>,
    warning_indicators: Vec<String>,
    error_details: Vec<ErrorCode>,
    vulnerability_hints: Vec<String>,
}

impl BranchResult {
    fn new() -> Self {
        Self {
            status: ResponseStatus::Unknown,
            success_indicators: Vec::new(),
            warning_indicators: Vec::new(),
            error_details: Vec::new(),
            vulnerability_hints: Vec::new(),
        }
    }
}

/// Classify a protocol response. `None` means the collaborator produced no
/// response object at all; that short-circuits everything else.
pub fn classify(response: Option<&str>, operation: Operation, phase: TestPhase) -> ResponseVerdict {
    let Some(text) = response else {
        return ResponseVerdict {
            operation,
            timestamp: Utc::now(),
            raw_response: String::new(),
            status: ResponseStatus::NoResponse,
            protocol_layer: ProtocolLayer::Unknown,
            is_error: true,
            error_details: vec![ErrorCode {
                code: None,
                description: "No response from device".to_string(),
            }],
            success_indicators: Vec::new(),
            warning_indicators: Vec::new(),
            vulnerability_hints: Vec::new(),
            recommended_action: "Check if device is online or restart the device".to_string(),
        };
    };

    let mut branch = match operation {
        Operation::Connect => analyze_connection(text),
        Operation::LengthFuzz => analyze_length(text),
        Operation::Scan => analyze_scan(text),
        Operation::MtuExchange => analyze_mtu(text),
        Operation::PairingFuzz => analyze_pairing(text),
    };

    // Error-code extraction runs on every classified response, independent
    // of the status derived above.
    let codes = extract_error_codes(text);
    let is_error = !codes.is_empty();
    branch.error_details.extend(codes);

    branch.vulnerability_hints.extend(detect_hints(text, operation, phase));

    // Operation-specific evidence of a working exchange takes precedence
    // over an incidental hex-token match.
    let status = match branch.status {
        ResponseStatus::Success | ResponseStatus::PartialSuccess => branch.status,
        _ if is_error => ResponseStatus::Error,
        ResponseStatus::Unknown => {
            if !branch.success_indicators.is_empty() {
                ResponseStatus::Success
            } else if !branch.warning_indicators.is_empty() {
                ResponseStatus::Warning
            } else {
                ResponseStatus::Unknown
            }
        }
        other => other,
    };

    ResponseVerdict {
        operation,
        timestamp: Utc::now(),
        raw_response: text.to_string(),
        status,
        protocol_layer: detect_protocol_layer(text, operation),
        is_error,
        error_details: branch.error_details,
        success_indicators: branch.success_indicators,
        warning_indicators: branch.warning_indicators,
        vulnerability_hints: branch.vulnerability_hints,
        recommended_action: recommend_action(status, operation),
    }
}

/// An empty or placeholder response body. The capture backend stringifies a
/// payload-less frame as "Empty".
pub(crate) fn is_empty_response(text: &str) -> bool {
    text.trim().is_empty() || text == "Empty"
}

fn analyze_connection(text: &str) -> BranchResult {
    let mut result = BranchResult::new();

    // 1. Success indicators, first match wins. LL_SLAVE_FEATURE_REQ gets a
    //    special annotation because it is the PDU naive matchers get wrong.
    for indicator in CONNECTION_SUCCESS_INDICATORS {
        if text.contains(indicator) {
            result.status = ResponseStatus::Success;
            result
                .success_indicators
                .push(format!("Found connection success indicator: {indicator}"));
            if *indicator == "LL_SLAVE_FEATURE_REQ" {
                result.success_indicators.push(
                    "Link Layer Feature Request - Connection established successfully".to_string(),
                );
            }
            break;
        }
    }

    // 2. Failure indicators, only once success has been ruled out.
    if result.status == ResponseStatus::Unknown {
        let lower = text.to_lowercase();
        for indicator in CONNECTION_FAILURE_INDICATORS {
            if lower.contains(indicator) {
                result.status = ResponseStatus::Error;
                result
                    .warning_indicators
                    .push(format!("Found connection failure indicator: {indicator}"));
                result.error_details.push(ErrorCode {
                    code: None,
                    description: format!("Connection failure indicator: {indicator}"),
                });
                break;
            }
        }
    }

    // 3. Any known connection-phase LL PDU still proves the link came up,
    //    just in a non-standard response format.
    if result.status == ResponseStatus::Unknown {
        for (pdu, meaning) in LL_CONNECTION_PDUS {
            if text.contains(pdu) {
                result.status = ResponseStatus::Success;
                result
                    .success_indicators
                    .push(format!("Link Layer interaction: {pdu} - {meaning}"));
                result.warning_indicators.push(
                    "Connection response format non-standard, but Link Layer interaction exists"
                        .to_string(),
                );
                break;
            }
        }
    }

    // 4. Bare BLE framing with no recognizable payload.
    if result.status == ResponseStatus::Unknown && (text.contains("BTLE") || text.contains("BLE")) {
        result.status = ResponseStatus::PartialSuccess;
        result
            .warning_indicators
            .push("Received BLE frame packet, but no clear connection status".to_string());
    }

    result
}

fn analyze_length(text: &str) -> BranchResult {
    let mut result = BranchResult::new();

    if text.contains("LL_LENGTH_RSP") {
        result.status = ResponseStatus::Success;
        result.success_indicators.push("Received length response".to_string());

        // A zero-valued byte count violates the protocol floor even though
        // the exchange itself completed.
        if text.contains("max_rx_bytes=0") || text.contains("max_tx_bytes=0") {
            result.warning_indicators.push(
                "Length response contains zero value - may not comply with specifications"
                    .to_string(),
            );
            result
                .vulnerability_hints
                .push("SweynTooth-like vulnerability: zero length response".to_string());
        }
    } else if is_empty_response(text) {
        result.status = ResponseStatus::NoResponse;
        result.warning_indicators.push("No response to length request".to_string());
        result
            .vulnerability_hints
            .push("Device may not handle abnormal length requests".to_string());
    } else if text.contains("LL_") {
        result.status = ResponseStatus::PartialSuccess;
        result
            .warning_indicators
            .push("Received unexpected Link Layer response".to_string());
    } else if text.to_lowercase().contains("error") {
        result.status = ResponseStatus::Error;
        result.warning_indicators.push("Length request returned error".to_string());
        result.error_details.push(ErrorCode {
            code: None,
            description: "Length request returned error".to_string(),
        });
    }

    result
}

fn analyze_scan(text: &str) -> BranchResult {
    let mut result = BranchResult::new();
    let lower = text.to_lowercase();

    if lower.contains("scanning") || lower.contains("advertising") {
        result.status = ResponseStatus::Success;
        result.success_indicators.push("Scan operation normal".to_string());
    } else if lower.contains("error") || text == "None" {
        result.status = ResponseStatus::Error;
        result.warning_indicators.push("Scan failed".to_string());
        result.error_details.push(ErrorCode {
            code: None,
            description: "Scan failed".to_string(),
        });
    } else {
        result.status = ResponseStatus::PartialSuccess;
        result.warning_indicators.push("Ambiguous scan response".to_string());
    }

    result
}

fn analyze_mtu(text: &str) -> BranchResult {
    let mut result = BranchResult::new();
    let lower = text.to_lowercase();

    if lower.contains("mtu") || lower.contains("exchange") {
        result.status = ResponseStatus::Success;
        result.success_indicators.push("MTU exchange normal".to_string());
    } else if is_empty_response(text) {
        result.status = ResponseStatus::NoResponse;
        result.warning_indicators.push("No response to MTU request".to_string());
    }

    result
}

fn analyze_pairing(text: &str) -> BranchResult {
    let mut result = BranchResult::new();
    let lower = text.to_lowercase();

    if lower.contains("pairing") || lower.contains("security") {
        result.status = ResponseStatus::Success;
        result.success_indicators.push("Pairing process started".to_string());
    } else if lower.contains("reject") || lower.contains("invalid") {
        result.status = ResponseStatus::Error;
        result.warning_indicators.push("Pairing request rejected".to_string());
        result.error_details.push(ErrorCode {
            code: None,
            description: "Pairing request rejected".to_string(),
        });
    }

    result
}

/// Scan the text for 2-4 digit hexadecimal tokens and resolve them against
/// the HCI/LL error-code table.
fn extract_error_codes(text: &str) -> Vec<ErrorCode> {
    let hex_pattern = regex::Regex::new(r"0x[0-9a-fA-F]{2,4}").unwrap();
    let mut details = Vec::new();

    for m in hex_pattern.find_iter(text) {
        if let Ok(value) = u16::from_str_radix(&m.as_str()[2..], 16) {
            details.push(ErrorCode {
                code: Some(value),
                description: hci_error_description(value)
                    .unwrap_or("Unknown error code")
                    .to_string(),
            });
        }
    }

    details
}

fn detect_protocol_layer(text: &str, operation: Operation) -> ProtocolLayer {
    if text.contains("LL_") {
        ProtocolLayer::LinkLayer
    } else if text.contains("ATT_") {
        ProtocolLayer::Att
    } else if text.contains("L2CAP") {
        ProtocolLayer::L2cap
    } else if text.contains("HCI") {
        ProtocolLayer::Hci
    } else if text.contains("SM_") {
        ProtocolLayer::SecurityManager
    } else {
        match operation {
            Operation::Scan => ProtocolLayer::Hci,
            Operation::Connect | Operation::LengthFuzz => ProtocolLayer::LinkLayer,
            Operation::MtuExchange => ProtocolLayer::Att,
            Operation::PairingFuzz => ProtocolLayer::SecurityManager,
        }
    }
}

fn recommend_action(status: ResponseStatus, operation: Operation) -> String {
    // Operation-specific overrides
    if operation == Operation::Connect && status == ResponseStatus::Error {
        return "Check if device is in advertising state, adjust scan parameters".to_string();
    }
    if operation == Operation::LengthFuzz && status == ResponseStatus::NoResponse {
        return "Device may be sensitive to abnormal length requests, retest with a protocol-valid value"
            .to_string();
    }

    match status {
        ResponseStatus::Success => "Proceed to next operation",
        ResponseStatus::PartialSuccess => "Observe device behavior, consider retrying",
        ResponseStatus::Warning => "Observe device behavior, consider retrying",
        ResponseStatus::Error => "Check device status and connection parameters",
        ResponseStatus::NoResponse => "Wait for device recovery or restart the device",
        ResponseStatus::Unknown => "Further analysis required",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_request_classifies_as_success() {
        // Regression guard: LL_SLAVE_FEATURE_REQ proves the link came up and
        // must never be treated as a failure.
        let verdict = classify(
            Some("BTLE / LL_SLAVE_FEATURE_REQ features=0x01"),
            Operation::Connect,
            TestPhase::Baseline,
        );
        assert_eq!(verdict.status, ResponseStatus::Success);
        assert!(verdict
            .success_indicators
            .iter()
            .any(|s| s.contains("LL_SLAVE_FEATURE_REQ")));
    }

    #[test]
    fn test_feature_request_beats_embedded_hex_token() {
        let verdict = classify(
            Some("LL_SLAVE_FEATURE_REQ status=0x08"),
            Operation::Connect,
            TestPhase::Baseline,
        );
        // The hex token resolves in the error table and sets is_error, but
        // the operation-specific success evidence keeps status = success.
        assert_eq!(verdict.status, ResponseStatus::Success);
        assert!(verdict.is_error);
        assert_eq!(verdict.error_details[0].code, Some(0x08));
        assert_eq!(verdict.error_details[0].description, "Connection Timeout");
    }

    #[test]
    fn test_absent_response_is_no_response_for_every_operation() {
        for operation in [
            Operation::Scan,
            Operation::Connect,
            Operation::LengthFuzz,
            Operation::MtuExchange,
            Operation::PairingFuzz,
        ] {
            let verdict = classify(None, operation, TestPhase::Baseline);
            assert_eq!(verdict.status, ResponseStatus::NoResponse);
            assert!(verdict.is_error);
            assert!(!verdict.error_details.is_empty());
        }
    }

    #[test]
    fn test_connection_failure_tokens_case_insensitive() {
        let verdict = classify(Some("TIMEOUT waiting for CONNECT_IND"), Operation::Connect, TestPhase::Baseline);
        assert_eq!(verdict.status, ResponseStatus::Error);
        assert_eq!(
            verdict.recommended_action,
            "Check if device is in advertising state, adjust scan parameters"
        );
    }

    #[test]
    fn test_nonstandard_ll_pdu_still_counts_as_connected() {
        let verdict = classify(Some("LL_PING_RSP"), Operation::Connect, TestPhase::Baseline);
        assert_eq!(verdict.status, ResponseStatus::Success);
        assert!(verdict
            .warning_indicators
            .iter()
            .any(|w| w.contains("non-standard")));
    }

    #[test]
    fn test_bare_ble_frame_is_partial_success() {
        let verdict = classify(Some("BTLE frame len=12"), Operation::Connect, TestPhase::Baseline);
        assert_eq!(verdict.status, ResponseStatus::PartialSuccess);
    }

    #[test]
    fn test_zero_length_response_is_success_with_hints() {
        let verdict = classify(
            Some("LL_LENGTH_RSP max_rx_bytes=0 max_tx_bytes=27"),
            Operation::LengthFuzz,
            TestPhase::Attack,
        );
        assert_eq!(verdict.status, ResponseStatus::Success);
        assert!(verdict.has_vulnerability_hints());
        assert!(verdict
            .warning_indicators
            .iter()
            .any(|w| w.contains("zero value")));
    }

    #[test]
    fn test_empty_length_response_hints_silent_failure() {
        let verdict = classify(Some("Empty"), Operation::LengthFuzz, TestPhase::Attack);
        assert_eq!(verdict.status, ResponseStatus::NoResponse);
        assert!(verdict.has_vulnerability_hints());
        assert_eq!(
            verdict.recommended_action,
            "Device may be sensitive to abnormal length requests, retest with a protocol-valid value"
        );
    }

    #[test]
    fn test_unexpected_ll_pdu_during_length_fuzz() {
        let verdict = classify(
            Some("LL_SLAVE_FEATURE_REQ"),
            Operation::LengthFuzz,
            TestPhase::Attack,
        );
        assert_eq!(verdict.status, ResponseStatus::PartialSuccess);
        assert!(verdict
            .vulnerability_hints
            .iter()
            .any(|h| h.contains("state machine")));
    }

    #[test]
    fn test_error_code_extraction_is_order_preserving() {
        let text = "rejected 0x3E then 0x05 then 0xABCD";
        let first = classify(Some(text), Operation::Connect, TestPhase::Baseline);
        let second = classify(Some(text), Operation::Connect, TestPhase::Baseline);

        let codes: Vec<Option<u16>> = first.error_details.iter().map(|d| d.code).collect();
        assert!(codes.ends_with(&[Some(0x3E), Some(0x05), Some(0xABCD)]));
        assert_eq!(first.error_details, second.error_details);
        assert_eq!(
            first.error_details.last().unwrap().description,
            "Unknown error code"
        );
    }

    #[test]
    fn test_scan_success_on_advertising() {
        let verdict = classify(Some("device advertising on ch37"), Operation::Scan, TestPhase::Baseline);
        assert_eq!(verdict.status, ResponseStatus::Success);
    }

    #[test]
    fn test_scan_ambiguous_response() {
        let verdict = classify(Some("0b0100"), Operation::Scan, TestPhase::Baseline);
        assert_eq!(verdict.status, ResponseStatus::PartialSuccess);
    }

    #[test]
    fn test_mtu_empty_response() {
        let verdict = classify(Some(""), Operation::MtuExchange, TestPhase::Baseline);
        assert_eq!(verdict.status, ResponseStatus::NoResponse);
    }

    #[test]
    fn test_pairing_rejection() {
        let verdict = classify(
            Some("SM request rejected by peer"),
            Operation::PairingFuzz,
            TestPhase::Baseline,
        );
        // "rejected" contains "reject"; pairing-family success tokens are
        // checked first, and "security" is absent here.
        assert_eq!(verdict.status, ResponseStatus::Error);
        assert!(!verdict.error_details.is_empty());
    }

    #[test]
    fn test_pairing_response_is_security_manager_layer() {
        let verdict = classify(
            Some("SM_Pairing_Response max_key_size=16"),
            Operation::PairingFuzz,
            TestPhase::Baseline,
        );
        assert_eq!(verdict.status, ResponseStatus::Success);
        assert_eq!(verdict.protocol_layer, ProtocolLayer::SecurityManager);
    }

    #[test]
    fn test_layer_inferred_from_operation_when_text_is_opaque() {
        let verdict = classify(Some("raw bytes"), Operation::LengthFuzz, TestPhase::Attack);
        assert_eq!(verdict.protocol_layer, ProtocolLayer::LinkLayer);
    }
}
