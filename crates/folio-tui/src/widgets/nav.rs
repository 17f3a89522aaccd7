use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use folio_core::scene::Stage;

use crate::app::ViewState;

/// Section menu. Highlights the section the presentation is moving to.
pub struct NavWidget;

impl NavWidget {
    pub fn render(frame: &mut Frame, area: Rect, stage: &Stage, view: &ViewState) {
        let theme = &view.theme;

        let items: Vec<ListItem> = stage
            .pages()
            .iter()
            .map(|page| {
                let key = match page.index() {
                    i @ 0..=8 => format!("{} ", i + 1),
                    9 => "0 ".to_string(),
                    _ => "  ".to_string(),
                };
                let style = if page.index() == view.section {
                    Style::default().fg(theme.active).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.fg1)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(key, Style::default().fg(theme.grey)),
                    Span::styled(page.content().title.clone(), style),
                ]))
            })
            .collect();

        let title = if view.transitioning { " Sections ~ " } else { " Sections " };
        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::LEFT)
                    .border_style(Style::default().fg(theme.border))
                    .style(Style::default().bg(theme.bg1)),
            )
            .highlight_style(Style::default().bg(theme.bg2));

        let mut state = ListState::default().with_selected(Some(view.section));
        frame.render_stateful_widget(list, area, &mut state);
    }
}
