//! Core infrastructure for memviz.
//!
//! This crate provides the building blocks shared by the application shell
//! and all panels: the event model, an event bus, a timer queue for delayed
//! follow-ups, the per-panel tick coordinator, a bounded history buffer, the
//! panel registry, and the logging subsystem.

pub mod bus;
pub mod event;
pub mod history;
pub mod logging;
pub mod module;
pub mod registry;
pub mod state;
pub mod tick;
pub mod timer;
