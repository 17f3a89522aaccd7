use glam::Vec3;
use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::deck::Deck;
use crate::error::SceneError;

use super::camera::{Camera, CameraPose};
use super::page::{Page, PageVisual};

/// Everything the presentation draws: the pages and the camera looking at them
#[derive(Debug, Clone)]
pub struct Stage {
    pages: Vec<Page>,
    camera: Camera,
    layout: LayoutConfig,
}

impl Stage {
    /// Build one page per deck entry and frame the first one.
    ///
    /// Page 0 starts at the active rest state; all others are hidden at the
    /// inactive rest state.
    pub fn new(deck: &Deck, layout: LayoutConfig) -> crate::Result<Self> {
        let inactive = PageVisual::inactive(&layout);
        let mut pages = Vec::with_capacity(deck.len());

        for (index, definition) in deck.pages().iter().enumerate() {
            let mut page = Page::new(index, definition.clone(), &layout);
            if index == 0 {
                page.show();
                page.apply_visual(PageVisual::ACTIVE);
            } else {
                page.hide();
                page.apply_visual(inactive);
            }
            page.update_transform_sync()?;
            debug!(page = page.id(), y = page.anchor().y, "Created page");
            pages.push(page);
        }

        let mut stage = Self {
            pages,
            camera: Camera::default(),
            layout,
        };
        let pose = stage.camera_pose_for(0).ok_or(SceneError::PageMissing(0))?;
        stage.camera.set_pose(pose)?;

        info!(pages = stage.pages.len(), "Stage ready");
        Ok(stage)
    }

    /// Where the camera rests when `index` is in focus
    pub fn camera_pose_for(&self, index: usize) -> Option<CameraPose> {
        let anchor = self.pages.get(index)?.anchor();
        Some(CameraPose {
            position: anchor + Vec3::new(0.0, 0.0, self.layout.camera_standoff),
            target: anchor,
        })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Indices of pages sitting exactly at the active rest state
    pub fn focused_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.is_visible() && p.visual().approx_eq(&PageVisual::ACTIVE, 1e-6))
            .map(|p| p.index())
            .collect()
    }
}
