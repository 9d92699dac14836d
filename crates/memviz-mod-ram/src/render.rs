use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    widgets::{Axis, Chart, Dataset, GraphType, LineGauge},
    Frame,
};

use memviz_core::module::Module;
use memviz_sampler::format::format_percent;
use memviz_ui::renderer::{panel_block, PanelRenderer};

use crate::RamModule;

fn usage_color(pct: f64) -> Color {
    if pct >= 90.0 {
        Color::Red
    } else if pct >= 75.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

impl PanelRenderer for RamModule {
    fn render_panel(&self, f: &mut Frame, area: Rect, focused: bool) {
        let title = if self.is_paused() {
            format!("{} (paused)", self.title())
        } else {
            self.title().to_string()
        };
        let block = panel_block(&title, focused);
        let inner = block.inner(area);
        f.render_widget(block, area);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let [gauge_row, _, chart_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(inner);

        self.render_gauge(f, gauge_row);
        if chart_area.height >= 3 {
            self.render_chart(f, chart_area);
        }
    }
}

impl RamModule {
    fn render_gauge(&self, f: &mut Frame, row: Rect) {
        let pct = self.latest().unwrap_or(0.0);
        let label = match self.latest() {
            Some(v) => format!("Used {}", format_percent(v)),
            None => "Used --%".to_string(),
        };
        let area = Rect {
            width: row.width.min(self.gauge_width()),
            ..row
        };
        let gauge = LineGauge::default()
            .ratio((pct / 100.0).clamp(0.0, 1.0))
            .label(label)
            .filled_style(Style::default().fg(usage_color(pct)))
            .unfilled_style(Style::default().fg(Color::DarkGray));
        f.render_widget(gauge, area);
    }

    fn render_chart(&self, f: &mut Frame, area: Rect) {
        let points: Vec<(f64, f64)> = self
            .history()
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.value))
            .collect();

        let x_max = self.history().capacity().saturating_sub(1).max(1) as f64;
        let time_labels = match (self.history().oldest(), self.history().latest()) {
            (Some(first), Some(last)) => vec![
                first.at.format("%H:%M:%S").to_string(),
                last.at.format("%H:%M:%S").to_string(),
            ],
            _ => vec![String::new(), String::new()],
        };

        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points);

        let chart = Chart::new(vec![dataset])
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::DarkGray))
                    .bounds([0.0, x_max])
                    .labels(time_labels),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::DarkGray))
                    .bounds([0.0, 100.0])
                    .labels(["0%", "50%", "100%"]),
            );
        f.render_widget(chart, area);
    }
}
