use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use toolkit_usage_ledger::Remaining;

use crate::{AppState, ToolRow};

pub struct ToolListWidget;

impl ToolListWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let rows = state.tool_rows();

        let tool_lines: Vec<Line> = if rows.is_empty() {
            vec![Line::from(Span::styled(
                "No tools configured",
                Style::default().fg(Color::Red),
            ))]
        } else {
            rows.iter()
                .enumerate()
                .map(|(index, row)| Self::render_row(row, index == state.selected))
                .collect()
        };

        let tools = Paragraph::new(tool_lines)
            .block(Block::bordered().title("Tools"))
            .alignment(Alignment::Left);

        frame.render_widget(tools, area);
    }

    fn render_row(row: &ToolRow, selected: bool) -> Line<'static> {
        let marker = if selected { "> " } else { "  " };
        let name_style = if selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let (quota, quota_color) = match row.remaining {
            Remaining::Unlimited => (format!("{} used, unlimited", row.used), Color::Magenta),
            Remaining::Limited(0) => (
                format!("{}/{} used, limit reached", row.used, row.limit),
                Color::Red,
            ),
            Remaining::Limited(left) => (
                format!("{}/{} used, {} left", row.used, row.limit, left),
                if left * 5 <= row.limit {
                    Color::Yellow
                } else {
                    Color::Green
                },
            ),
        };

        Line::from(vec![
            Span::styled(format!("{}{:<18}", marker, row.name), name_style),
            Span::styled(quota, Style::default().fg(quota_color)),
        ])
    }
}
