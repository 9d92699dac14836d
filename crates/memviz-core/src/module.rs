use std::any::Any;

use crate::event::{Event, Scheduled};

/// Lines a panel contributes to the footer while it has focus.
#[derive(Debug, Default)]
pub struct StatusContribution {
    /// Key hints specific to the panel.
    pub hints: Vec<String>,
    /// Short live readings (e.g. `"RAM 41.2%"`).
    pub readings: Vec<String>,
}

/// A memviz panel.
///
/// Panels follow a reactive contract: [`init`](Module::init) produces the
/// event that seeds the panel's tick schedule, and
/// [`update`](Module::update) consumes one event at a time, mutating the
/// panel's state and returning at most one delayed follow-up for the host to
/// publish later.
///
/// Rendering is handled separately via `memviz_ui::renderer::PanelRenderer`.
/// Panels are registered with [`crate::registry::ModuleRegistry`].
pub trait Module {
    /// Unique registry key (e.g. `"procs"`, `"ram"`).
    fn id(&self) -> &'static str;

    /// Human-readable name shown in the top bar and the panel border.
    fn title(&self) -> &'static str;

    /// Event that starts the panel's tick schedule, published immediately.
    ///
    /// The default implementation schedules nothing.
    fn init(&mut self) -> Option<Event> {
        None
    }

    /// Handle an event delivered by the registry.
    ///
    /// The default implementation ignores everything.
    fn update(&mut self, _ev: &Event) -> Option<Scheduled> {
        None
    }

    /// Footer lines shown while this panel has focus.
    fn status(&self) -> StatusContribution {
        StatusContribution::default()
    }

    /// Return `self` as `&dyn Any` to enable downcasting for type-aware
    /// rendering in memviz-ui.
    fn as_any(&self) -> &dyn Any;
}
