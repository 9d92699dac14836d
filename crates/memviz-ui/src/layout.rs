use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions of the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct DashboardRects {
    pub top: Rect,
    pub panels: Rect,
    pub footer: Rect,
}

/// Top bar, panel area, footer. The footer is dropped first when the
/// terminal is too short to hold everything.
pub fn dashboard_layout(area: Rect, footer_height: u16) -> DashboardRects {
    let footer_height = footer_height.min(area.height.saturating_sub(2));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // top bar
            Constraint::Min(1),                // panels
            Constraint::Length(footer_height), // footer
        ])
        .split(area);

    DashboardRects {
        top: chunks[0],
        panels: chunks[1],
        footer: chunks[2],
    }
}

/// Split the panel area into `count` equal-width columns.
pub fn panel_columns(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let constraints = vec![Constraint::Ratio(1, count as u32); count];
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
        .to_vec()
}
