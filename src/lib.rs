//! `loan-insights` library crate.
//!
//! The binary (`loans`) is a thin wrapper around this library so that:
//!
//! - the aggregation layer is testable without spawning processes
//! - pages can be rendered to text, JSON, or the terminal UI from the same code
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod select;
pub mod tui;
