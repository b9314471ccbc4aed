//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - loan records and the per-render store (`LoanRecord`, `LoanStore`)
//! - the fixed weekday enumeration (`IssueWeekday`)
//! - aggregation outputs (`DerivedView`)
//! - run settings (`DashboardConfig`)

pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod strategy;

pub use types::*;
pub use view::*;
