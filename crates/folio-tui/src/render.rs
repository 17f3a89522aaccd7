use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use folio_core::scene::Stage;
use folio_core::Renderer;

use crate::app::ViewState;
use crate::widgets::{NavWidget, StageWidget, StatusBarWidget};

/// Width of the section menu in columns
const NAV_WIDTH: u16 = 28;

/// Draw one full frame: stage, optional section menu, status bar
pub fn draw(frame: &mut Frame, stage: &Stage, view: &ViewState) {
    let size = frame.area();

    // Main layout: content + status bar
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(size);

    if view.show_nav && main_layout[0].width > NAV_WIDTH * 2 {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(NAV_WIDTH)])
            .split(main_layout[0]);
        StageWidget::render(frame, columns[0], stage, view);
        NavWidget::render(frame, columns[1], stage, view);
    } else {
        StageWidget::render(frame, main_layout[0], stage, view);
    }
    StatusBarWidget::render(frame, main_layout[1], stage, view);
}

/// Frame-loop renderer drawing into a ratatui terminal
pub struct TerminalRenderer<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    view: ViewState,
}

impl<'a, B: Backend> TerminalRenderer<'a, B> {
    pub fn new(terminal: &'a mut Terminal<B>, view: ViewState) -> Self {
        Self { terminal, view }
    }
}

impl<B: Backend> Renderer for TerminalRenderer<'_, B> {
    fn render(&mut self, stage: &Stage) -> anyhow::Result<()> {
        let view = &self.view;
        self.terminal.draw(|frame| draw(frame, stage, view))?;
        Ok(())
    }
}
