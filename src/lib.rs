//! BLE protocol-fuzzing harness core: an operation-aware response
//! classifier and a retry/recovery test orchestrator driving an external
//! fuzzing engine over its control socket.

pub mod campaign;
pub mod classifier;
pub mod cli;
pub mod engine;
pub mod errors;
pub mod reporting;
