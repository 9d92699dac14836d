//! TUI rendering layer for memviz.
//!
//! Provides the dashboard layout, the shell chrome around the panels, and
//! the trait panels implement to draw themselves. All rendering uses
//! [`ratatui`]; this crate owns the visual presentation while `memviz_core`
//! owns the state.

pub mod layout;
pub mod renderer;
pub mod shell;
