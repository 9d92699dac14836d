use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::layout::DashboardRects;

/// Rows the footer needs: a border plus hints and the latest warning.
pub const FOOTER_HEIGHT: u16 = 3;

const GLOBAL_HINTS: &str = "q quit  Tab focus";

pub struct ShellView<'a> {
    pub focused_title: &'a str,
    pub status_line: &'a str,
    pub uptime: String,
    /// Key hints from the focused panel.
    pub hints: Vec<String>,
    /// Live readings from the focused panel.
    pub readings: Vec<String>,
    /// Most recent warning or error from the log, if any.
    pub warning: Option<String>,
}

pub fn render_shell(
    f: &mut Frame,
    rects: DashboardRects,
    view: ShellView<'_>,
    panels: impl FnOnce(&mut Frame, Rect),
) {
    let top = Paragraph::new(Line::from(vec![
        Span::styled("memviz", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " | {} | {} | up {}",
            view.focused_title, view.status_line, view.uptime
        )),
    ]));
    f.render_widget(top, rects.top);

    panels(f, rects.panels);

    if rects.footer.height == 0 {
        return;
    }

    let mut help = vec![Span::raw(GLOBAL_HINTS)];
    for hint in view.hints {
        help.push(Span::raw("  "));
        help.push(Span::raw(hint));
    }
    for reading in view.readings {
        help.push(Span::raw("  "));
        help.push(Span::styled(reading, Style::default().fg(Color::Cyan)));
    }

    let mut lines = vec![Line::from(help)];
    if let Some(warning) = view.warning {
        lines.push(Line::from(Span::styled(
            warning,
            Style::default().fg(Color::Yellow),
        )));
    }

    let footer = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, rects.footer);
}
