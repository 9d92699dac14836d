//! Configuration types and loaders for memviz.
//!
//! This crate owns the on-disk settings schema so the binary and panels share
//! a single source of truth.

pub mod settings;

pub use settings::{ProcessesSettings, RamSettings, Settings};
