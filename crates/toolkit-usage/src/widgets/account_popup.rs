use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use crate::AppState;

pub struct AccountPopupWidget;

impl AccountPopupWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let popup_area = centered_rect(60, 80, area);

        frame.render_widget(Clear, popup_area);

        let account_text = Self::create_account_text(state);

        let popup = Paragraph::new(account_text)
            .block(
                Block::bordered()
                    .title("Account")
                    .title_alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Cyan)),
            )
            .alignment(Alignment::Left);

        frame.render_widget(popup, popup_area);
    }

    fn create_account_text(state: &AppState) -> Vec<Line> {
        let session = &state.session;
        let monthly = session.usage_this_month();
        let value_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let mut account_text = vec![
            Line::from(vec![
                Span::styled("Name: ", Style::default().fg(Color::White)),
                Span::styled(session.name().to_string(), value_style),
            ]),
            Line::from(vec![
                Span::styled("Plan: ", Style::default().fg(Color::White)),
                Span::styled(session.tier().description(), value_style),
            ]),
        ];

        if session.is_signed_in() {
            account_text.push(Line::from(vec![
                Span::styled("Member Since: ", Style::default().fg(Color::White)),
                Span::styled(session.join_date().format("%Y-%m-%d").to_string(), value_style),
            ]));
        } else {
            account_text.push(Line::from(vec![Span::styled(
                "Guest session: usage is kept in memory only",
                Style::default().fg(Color::Gray),
            )]));
        }

        account_text.extend(vec![
            Line::from(" "),
            Line::from(vec![Span::styled(
                format!("Usage in {}-{:02}:", monthly.year(), monthly.month()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(vec![
                Span::styled("  Total Uses: ", Style::default().fg(Color::White)),
                Span::styled(format!("{}", monthly.total_uses()), value_style),
            ]),
            Line::from(vec![
                Span::styled("  Tools Used: ", Style::default().fg(Color::White)),
                Span::styled(format!("{}", monthly.distinct_tools()), value_style),
            ]),
        ]);

        for tool_id in monthly.tools_used() {
            account_text.push(Line::from(vec![Span::styled(
                format!("    {}", tool_id),
                Style::default().fg(Color::Gray),
            )]));
        }

        account_text.extend(vec![
            Line::from(" "),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "s",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to close", Style::default().fg(Color::Gray)),
            ]),
        ]);

        account_text
    }
}
