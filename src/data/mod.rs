//! Synthetic loan data for trying the dashboard without the real dataset.

pub mod sample;

pub use sample::*;
