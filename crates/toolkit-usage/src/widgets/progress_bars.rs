use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Gauge},
    Frame,
};

use crate::AppState;

pub struct ProgressBarsWidget;

impl ProgressBarsWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let title = match state.selected_tool() {
            Some(tool) => format!("{} Quota", tool.name()),
            None => "Quota".to_string(),
        };

        let quota_gauge = if state.session.tier().is_unlimited() {
            Gauge::default()
                .block(Block::bordered().title(title))
                .gauge_style(Style::default().fg(Color::Magenta))
                .percent(0)
                .label("unlimited")
        } else {
            let usage_percentage = state.get_usage_percentage();
            Gauge::default()
                .block(Block::bordered().title(title))
                .gauge_style(if usage_percentage >= 100.0 {
                    Style::default().fg(Color::Red)
                } else if usage_percentage > 60.0 {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Green)
                })
                .percent(usage_percentage.min(100.0) as u16)
                .label(format!("{:.0}%", usage_percentage))
        };

        frame.render_widget(quota_gauge, chunks[0]);

        let (time_remaining, remaining_fraction) = state.get_time_to_reset_formatted();
        let elapsed_percentage = (1.0 - remaining_fraction) * 100.0;
        let time_gauge = Gauge::default()
            .block(Block::bordered().title("Day (resets 00:00 UTC)"))
            .gauge_style(Style::default().fg(Color::Blue))
            .percent(elapsed_percentage.clamp(0.0, 100.0) as u16)
            .label(format!("{} remaining", time_remaining));

        frame.render_widget(time_gauge, chunks[1]);
    }
}
