//! Core business logic abstractions

pub mod action;
pub mod config;
pub mod log;
pub mod rate;

// Re-export main types for cleaner imports
pub use action::RestartAction;
pub use rate::{RateSource, RateValue, Record};
