//! Vulnerability hint detection. Pure function of the response text, the
//! operation, and the campaign phase; all rules are independent and every
//! matching rule contributes a hint.

use super::analyze::is_empty_response;
use super::verdict::{Operation, TestPhase};

pub fn detect_hints(text: &str, operation: Operation, phase: TestPhase) -> Vec<String> {
    let mut hints = Vec::new();

    if operation == Operation::LengthFuzz {
        // Silence under a length attack is itself a signal, not merely an
        // error: the state machine may have frozen.
        if is_empty_response(text) {
            hints.push(
                "Device has no response to abnormal length request - may trigger SweynTooth vulnerability"
                    .to_string(),
            );
        }

        if text.contains("max_rx_bytes=0") || text.contains("max_tx_bytes=0") {
            hints.push(
                "Device accepts zero value length parameters - potential protocol stack vulnerability"
                    .to_string(),
            );
        }

        // A feature request in the middle of a length transaction means the
        // peer's procedure ordering is off.
        if text.contains("LL_SLAVE_FEATURE_REQ") {
            hints.push(
                "Received feature request after length request - state machine may be abnormal"
                    .to_string(),
            );
        }
    }

    if operation == Operation::Connect
        && phase == TestPhase::PostAttack
        && text.contains("LL_TERMINATE_IND")
    {
        hints.push(
            "Abnormal connection termination after attack - may indicate denial of service"
                .to_string(),
        );
    }

    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_length_response_hint() {
        let hints = detect_hints("", Operation::LengthFuzz, TestPhase::Attack);
        assert!(hints.iter().any(|h| h.contains("no response")));
    }

    #[test]
    fn test_zero_length_hint() {
        let hints = detect_hints(
            "LL_LENGTH_RSP max_rx_bytes=0 max_tx_bytes=27",
            Operation::LengthFuzz,
            TestPhase::Attack,
        );
        assert!(hints.iter().any(|h| h.contains("zero value length")));
    }

    #[test]
    fn test_post_attack_termination_hint() {
        let hints = detect_hints("LL_TERMINATE_IND", Operation::Connect, TestPhase::PostAttack);
        assert_eq!(hints.len(), 1);
        assert!(hints[0].contains("denial of service"));
    }

    #[test]
    fn test_baseline_termination_gives_no_hint() {
        let hints = detect_hints("LL_TERMINATE_IND", Operation::Connect, TestPhase::Baseline);
        assert!(hints.is_empty());
    }

    #[test]
    fn test_state_confusion_rules_can_co_occur() {
        // Zero-value field and an out-of-order feature request in the same
        // response trip two independent rules.
        let hints = detect_hints(
            "LL_SLAVE_FEATURE_REQ max_rx_bytes=0",
            Operation::LengthFuzz,
            TestPhase::Attack,
        );
        assert_eq!(hints.len(), 2);
    }
}
