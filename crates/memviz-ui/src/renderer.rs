use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
    Frame,
};

/// Trait for panels that draw themselves into a dashboard slot.
///
/// Implement this alongside `memviz_core::module::Module`. The app wires
/// renderers to panels at registration time via [`std::any::Any`]
/// downcasting, so no rendering types leak into memviz-core.
pub trait PanelRenderer {
    /// Render the panel into `area`. `focused` is true when the panel
    /// currently receives key events.
    fn render_panel(&self, f: &mut Frame, area: Rect, focused: bool);
}

/// Bordered block for a panel, highlighted when focused.
pub fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {title} "))
}
