use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use folio_core::scene::Stage;

use crate::app::ViewState;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, stage: &Stage, view: &ViewState) {
        let theme = &view.theme;

        let (status_text, status_color) = match &view.status_message {
            Some(msg) => (format!(" {}", msg), theme.warning),
            None => {
                let title = stage
                    .page(view.section)
                    .map(|p| p.content().title.as_str())
                    .unwrap_or("");
                let mode = if view.transitioning { "MOVING" } else { "READY" };
                (
                    format!(" {} | {}/{} | {}", mode, view.section + 1, view.total, title),
                    theme.fg0,
                )
            }
        };

        let help_hint = " q:quit j/k:step g/G:first/last 1-0:jump tab:menu p:pause ";
        let padding_len = (area.width as usize)
            .saturating_sub(status_text.chars().count() + help_hint.len());

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(status_color).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
