//! TUI widget modules

pub mod account_popup;
pub mod header;
pub mod popup;
pub mod progress_bars;
pub mod shortcuts;
pub mod statistics;
pub mod tool_list;

pub use account_popup::*;
pub use header::*;
pub use popup::*;
pub use progress_bars::*;
pub use shortcuts::*;
pub use statistics::*;
pub use tool_list::*;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
