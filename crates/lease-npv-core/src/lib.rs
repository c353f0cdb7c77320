pub mod cash_flows;
pub mod error;
pub mod lease_npv;
pub mod time_value;
pub mod types;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "currency")]
pub mod currency;

#[cfg(feature = "report")]
pub mod report;

pub use error::LeaseNpvError;
pub use types::*;

/// Standard result type for all lease-npv operations
pub type LeaseNpvResult<T> = Result<T, LeaseNpvError>;
