use glam::Vec3;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use folio_core::scene::{Page, Stage};

use crate::app::ViewState;
use crate::theme::blend;

/// Share of the viewport height a focused page fills
const PAGE_FILL: f32 = 0.8;

/// Terminal cells are roughly twice as tall as wide
const CELL_ASPECT: f32 = 2.0;

/// Pages fainter than this are not drawn
const MIN_OPACITY: f32 = 0.02;

/// Draws the visible pages as seen from the stage camera
pub struct StageWidget;

impl StageWidget {
    pub fn render(frame: &mut Frame, area: Rect, stage: &Stage, view: &ViewState) {
        let theme = &view.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        let mut visible: Vec<(f32, &Page, Rect)> = stage
            .pages()
            .iter()
            .filter(|page| page.is_visible() && page.opacity() >= MIN_OPACITY)
            .filter_map(|page| {
                let distance = (page.node().translation - stage.camera().position()).length();
                project_page(stage, page, area).map(|rect| (distance, page, rect))
            })
            .collect();
        // Far pages first so nearer ones draw over them
        visible.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (_, page, rect) in visible {
            render_page(frame, rect, page, stage.len(), view);
        }
    }
}

fn render_page(frame: &mut Frame, rect: Rect, page: &Page, total: usize, view: &ViewState) {
    let theme = &view.theme;
    let alpha = page.opacity();
    let border = if page.index() == view.section {
        theme.active
    } else {
        theme.border
    };

    let block = Block::default()
        .title(format!(" {} ", page.content().title))
        .title_alignment(Alignment::Center)
        .title_bottom(Line::from(format!(" {}/{} ", page.index() + 1, total)).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(blend(border, theme.bg0, alpha)))
        .style(Style::default().bg(blend(theme.bg1, theme.bg0, alpha)));

    let heading = Line::from(Span::styled(
        page.content().title.clone(),
        Style::default()
            .fg(blend(theme.accent, theme.bg0, alpha))
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);

    let mut lines = vec![heading, Line::default()];
    lines.extend(page.content().body.lines().map(|line| {
        Line::from(Span::styled(
            line.to_string(),
            Style::default().fg(blend(theme.fg1, theme.bg0, alpha)),
        ))
    }));

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        rect,
    );
}

/// Screen rectangle of `page` within `area`, clipped, or `None` when the
/// page is behind the camera or entirely off screen.
pub fn project_page(stage: &Stage, page: &Page, area: Rect) -> Option<Rect> {
    let camera = stage.camera();
    let layout = stage.layout();
    let node = page.node();

    let offset = node.translation - camera.position();
    let distance = offset.dot(camera.forward());
    if distance <= f32::EPSILON {
        return None;
    }
    let perspective = layout.camera_standoff / distance;

    let rows_per_unit = area.height as f32 * PAGE_FILL / layout.page_height;
    let cols_per_unit = rows_per_unit * CELL_ASPECT;

    let right = camera.rotation() * Vec3::X;
    let up = camera.rotation() * Vec3::Y;
    let center_x = area.x as f32 + area.width as f32 / 2.0 + offset.dot(right) * perspective * cols_per_unit;
    let center_y = area.y as f32 + area.height as f32 / 2.0 - offset.dot(up) * perspective * rows_per_unit;
    let width = layout.page_width * node.scale.x * perspective * cols_per_unit;
    let height = layout.page_height * node.scale.y * perspective * rows_per_unit;

    clip(
        center_x - width / 2.0,
        center_y - height / 2.0,
        center_x + width / 2.0,
        center_y + height / 2.0,
        area,
    )
}

fn clip(left: f32, top: f32, right: f32, bottom: f32, area: Rect) -> Option<Rect> {
    if ![left, top, right, bottom].iter().all(|v| v.is_finite()) {
        return None;
    }
    let x0 = left.round().max(area.left() as f32);
    let y0 = top.round().max(area.top() as f32);
    let x1 = right.round().min(area.right() as f32);
    let y1 = bottom.round().min(area.bottom() as f32);
    // A border needs at least two cells each way
    if x1 - x0 < 2.0 || y1 - y0 < 2.0 {
        return None;
    }
    Some(Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16))
}
