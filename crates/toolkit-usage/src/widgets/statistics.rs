use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::AppState;

pub struct StatisticsWidget;

impl StatisticsWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let session = &state.session;
        let monthly = session.usage_this_month();
        let used_today: u32 = state.tool_rows().iter().map(|row| row.used).sum();

        let mut stats_text = vec![
            Line::from(vec![
                Span::styled("Session: ", Style::default().fg(Color::White)),
                Span::styled(
                    if session.is_signed_in() {
                        "Signed in (usage saved)".to_string()
                    } else {
                        "Guest (usage not saved)".to_string()
                    },
                    Style::default()
                        .fg(if session.is_signed_in() {
                            Color::Green
                        } else {
                            Color::Yellow
                        })
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Uses Today: ", Style::default().fg(Color::White)),
                Span::styled(
                    format!("{}", used_today),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("This Month: ", Style::default().fg(Color::White)),
                Span::styled(
                    format!(
                        "{} uses, {} tools",
                        monthly.total_uses(),
                        monthly.distinct_tools()
                    ),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if let Some(error) = &state.error_message {
            stats_text.push(Line::from(vec![
                Span::styled("Error: ", Style::default().fg(Color::Red)),
                Span::styled(
                    error.chars().take(50).collect::<String>()
                        + if error.chars().count() > 50 { "..." } else { "" },
                    Style::default().fg(Color::Red),
                ),
            ]));
        } else {
            stats_text.push(Line::from(vec![
                Span::styled("Last Update: ", Style::default().fg(Color::White)),
                Span::styled(
                    state.last_update.format("%H:%M:%S UTC").to_string(),
                    Style::default().fg(Color::Cyan),
                ),
            ]));
        }

        let stats = Paragraph::new(stats_text)
            .block(Block::bordered().title("Statistics"))
            .alignment(Alignment::Left);

        frame.render_widget(stats, area);
    }
}
