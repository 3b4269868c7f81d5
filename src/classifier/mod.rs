pub mod analyze;
pub mod hints;
pub mod tables;
pub mod verdict;

pub use analyze::classify;
pub use verdict::{
    ErrorCode, Operation, ProtocolLayer, ResponseStatus, ResponseVerdict, TestPhase,
};
