use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use crate::AppState;

pub struct ToolDetailsPopupWidget;

impl ToolDetailsPopupWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let popup_area = centered_rect(60, 70, area);

        // Clear the area first
        frame.render_widget(Clear, popup_area);

        let title = state
            .selected_tool()
            .map(|tool| tool.name().to_string())
            .unwrap_or_else(|| "Tool".to_string());
        let details_text = Self::create_details_text(state);

        let popup = Paragraph::new(details_text)
            .block(
                Block::bordered()
                    .title(title)
                    .title_alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Cyan)),
            )
            .alignment(Alignment::Left);

        frame.render_widget(popup, popup_area);
    }

    fn create_details_text(state: &AppState) -> Vec<Line> {
        let Some(tool) = state.selected_tool() else {
            return vec![Line::from("No tool selected")];
        };
        let session = &state.session;
        let used = session.usage_today(tool.id());
        let remaining = session.get_remaining_usage(tool.id(), tool.daily_limit());
        let allowed = session.can_use_tool(tool.id(), tool.daily_limit());

        let mut details_text = vec![
            Line::from(vec![
                Span::styled("Used Today: ", Style::default().fg(Color::White)),
                Span::styled(
                    format!("{}", used),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Free Limit: ", Style::default().fg(Color::White)),
                Span::styled(
                    format!("{} per day", tool.daily_limit()),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(vec![
                Span::styled("Remaining: ", Style::default().fg(Color::White)),
                Span::styled(
                    remaining.to_string(),
                    Style::default()
                        .fg(if allowed { Color::Green } else { Color::Red })
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(" "),
            Line::from(vec![Span::styled(
                "Variants:",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )]),
        ];

        for (variant, unlocked) in session.variants(tool.id()).unwrap_or_default() {
            let (label, color) = if unlocked {
                (variant.id().to_string(), Color::White)
            } else {
                (format!("{} (Pro)", variant.id()), Color::DarkGray)
            };
            details_text.push(Line::from(vec![
                Span::styled("  ", Style::default()),
                Span::styled(label, Style::default().fg(color)),
            ]));
        }

        if !allowed {
            details_text.push(Line::from(" "));
            details_text.push(Line::from(vec![Span::styled(
                "Daily limit reached. Upgrade to Pro for unlimited use.",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            )]));
        }

        details_text.extend(vec![
            Line::from(" "),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "d",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to close", Style::default().fg(Color::Gray)),
            ]),
        ]);

        details_text
    }
}
