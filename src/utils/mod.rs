// Utility functions
pub mod error;
pub mod otp;

pub use error::*;
pub use otp::*;
