use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use memviz_core::module::Module;
use memviz_sampler::COLUMNS;
use memviz_ui::renderer::{panel_block, PanelRenderer};

use crate::ProcessesModule;

const WIDTHS: [Constraint; 5] = [
    Constraint::Length(10),
    Constraint::Min(12),
    Constraint::Length(6),
    Constraint::Length(8),
    Constraint::Length(13),
];

impl PanelRenderer for ProcessesModule {
    fn render_panel(&self, f: &mut Frame, area: Rect, focused: bool) {
        let title = if self.is_paused() {
            format!("{} (paused)", self.title())
        } else {
            self.title().to_string()
        };
        let block = panel_block(&title, focused);

        if self.rows().is_empty() {
            let waiting = Paragraph::new(Line::from("waiting for first sample".dark_gray()))
                .block(block);
            f.render_widget(waiting, area);
            return;
        }

        let header = Row::new(COLUMNS.map(Cell::from))
            .style(Style::default().add_modifier(Modifier::BOLD));

        // Right-align the numeric columns.
        let rows = self.rows().iter().map(|row| {
            let [user, command, count, cpu, memory] = row.cells();
            Row::new([
                Cell::from(user.to_string()),
                Cell::from(command.to_string()),
                Cell::from(Line::from(count.to_string()).right_aligned()),
                Cell::from(Line::from(cpu.to_string()).right_aligned()),
                Cell::from(Line::from(memory.to_string()).right_aligned()),
            ])
        });

        let highlight = if focused {
            Style::default().bg(Color::Cyan).fg(Color::Black)
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        };

        let table = Table::new(rows, WIDTHS)
            .header(header)
            .block(block)
            .row_highlight_style(highlight);

        let mut state = TableState::default().with_selected(self.selected());
        f.render_stateful_widget(table, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use memviz_core::event::{Event, PanelId};
    use memviz_sampler::{CounterSource, Pid, ProcessCounters, SourceError, SystemCounters};
    use ratatui::{backend::TestBackend, Terminal};

    struct OneProcess;

    impl CounterSource for OneProcess {
        fn system_totals(&self) -> Result<SystemCounters, SourceError> {
            Ok(SystemCounters::default())
        }
        fn process_ids(&self) -> Result<Vec<Pid>, SourceError> {
            Ok(vec![1])
        }
        fn read_process(&self, _pid: Pid) -> Result<ProcessCounters, SourceError> {
            Ok(ProcessCounters {
                command: "systemd".into(),
                cpu_ticks: 0,
                resident_pages: 1024,
                shared_pages: 0,
                uid: 0,
            })
        }
    }

    fn module() -> ProcessesModule {
        let owners: HashMap<u32, String> = [(0, "root".to_string())].into();
        ProcessesModule::new(
            PanelId::from(1),
            Duration::from_secs(1),
            Box::new(OneProcess),
            Box::new(owners),
            4096,
        )
    }

    fn render_to_text(m: &ProcessesModule, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                m.render_panel(f, area, true);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol().to_string())
            .collect()
    }

    #[test]
    fn empty_panel_shows_placeholder() {
        let text = render_to_text(&module(), 60, 6);
        assert!(text.contains("Processes"));
        assert!(text.contains("waiting for first sample"));
    }

    #[test]
    fn table_shows_header_and_rows() {
        let mut m = module();
        m.update(&Event::unscoped_tick());
        let text = render_to_text(&m, 70, 8);
        assert!(text.contains("USER"));
        assert!(text.contains("MEM (MiB)"));
        assert!(text.contains("systemd"));
        assert!(text.contains("4.00 MiB"));
        assert!(text.contains("1x"));
    }

    #[test]
    fn zero_area_does_not_panic() {
        let mut m = module();
        m.update(&Event::unscoped_tick());
        let _ = render_to_text(&m, 2, 2);
    }
}
