//! Data-to-chart aggregation layer.
//!
//! Pure functions over a `LoanStore`:
//!
//! - grouped views for charts (`views`)
//! - scalar headline metrics (`metrics`)

pub mod metrics;
pub mod views;

pub use metrics::*;
pub use views::*;
