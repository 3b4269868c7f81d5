pub mod types;

pub use types::HarnessError;
