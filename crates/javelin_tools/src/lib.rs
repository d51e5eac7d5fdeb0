//! Javelin Tools
//!
//! Command-line utilities around the Javelin parser: parsing files with problem
//! reports and inspecting the generated parse tables.

pub mod cli;
pub mod summary;

pub use summary::UnitSummary;
