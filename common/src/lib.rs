//! Types shared between the slicing engine and anything driving it.

pub mod config;
pub mod progress;
