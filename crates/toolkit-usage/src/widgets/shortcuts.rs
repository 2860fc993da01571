use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::AppState;

pub struct ShortcutsWidget;

impl ShortcutsWidget {
    pub fn render(frame: &mut Frame, area: Rect, _state: &AppState) {
        let key_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let text_style = Style::default().fg(Color::Gray);

        let shortcuts_text = vec![Line::from(vec![
            Span::styled("Press ", text_style),
            Span::styled("q", key_style),
            Span::styled(" to quit, ", text_style),
            Span::styled("r", key_style),
            Span::styled(" to refresh, ", text_style),
            Span::styled("↑/↓", key_style),
            Span::styled(" to select, ", text_style),
            Span::styled("d", key_style),
            Span::styled(" for details, ", text_style),
            Span::styled("s", key_style),
            Span::styled(" for account", text_style),
        ])];

        let shortcuts = Paragraph::new(shortcuts_text).alignment(Alignment::Center);

        frame.render_widget(shortcuts, area);
    }
}
