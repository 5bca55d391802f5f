//! Attesta Platform: the action layer over the identity directory, the
//! credential engine, and the credit ledger.
//!
//! Paid actions consume credits first and only then run.

pub mod error;
pub mod platform;

pub use error::PlatformError;
pub use platform::Platform;
