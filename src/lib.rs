//! `rate-sheet` library crate.
//!
//! The binary (`ratesheet`) is a thin wrapper around this library so that:
//!
//! - the series engine and report assembly are testable without the network
//! - data sources can be swapped behind `data::RateSource`

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod series;
