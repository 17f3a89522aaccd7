use glam::{Mat4, Quat, Vec3};

use crate::config::LayoutConfig;
use crate::deck::PageDefinition;
use crate::error::SceneError;

pub type PageId = u32;

/// The three properties a transition interpolates per page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageVisual {
    pub opacity: f32,
    pub scale: f32,
    pub depth: f32,
}

impl PageVisual {
    /// Rest state of the page in focus
    pub const ACTIVE: Self = Self {
        opacity: 1.0,
        scale: 1.0,
        depth: 0.0,
    };

    /// Rest state of every page out of focus
    pub fn inactive(layout: &LayoutConfig) -> Self {
        Self {
            opacity: 0.0,
            scale: layout.inactive_scale,
            depth: layout.inactive_depth,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.opacity.is_finite() && self.scale.is_finite() && self.depth.is_finite()
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.opacity - other.opacity).abs() <= epsilon
            && (self.scale - other.scale).abs() <= epsilon
            && (self.depth - other.depth).abs() <= epsilon
    }
}

/// Local transform of a page's scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Node {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Pages hang directly off the scene root, so local is world
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// The 3D plane drawn behind the overlay
#[derive(Debug, Clone, PartialEq)]
pub struct BackingPlane {
    pub width: f32,
    pub height: f32,
    pub opacity: f32,
    /// Blending is only needed while the plane is see-through
    pub transparent: bool,
}

/// Content layer positioned in 3D but rendered separately from the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub opacity: f32,
    pub content: PageDefinition,
}

/// A renderable page: a scene node carrying a backing plane and an overlay
#[derive(Debug, Clone)]
pub struct Page {
    index: usize,
    anchor: Vec3,
    node: Node,
    backing: BackingPlane,
    overlay: Overlay,
    visible: bool,
    overlay_scale: f32,
}

impl Page {
    /// Create a hidden, fully transparent page anchored at `index * spacing` below the origin
    pub fn new(index: usize, definition: PageDefinition, layout: &LayoutConfig) -> Self {
        let anchor = Vec3::new(0.0, -(index as f32) * layout.page_spacing, 0.0);
        Self {
            index,
            anchor,
            node: Node::at(anchor),
            backing: BackingPlane {
                width: layout.page_width,
                height: layout.page_height,
                opacity: 0.0,
                transparent: true,
            },
            overlay: Overlay {
                position: anchor,
                rotation: Quat::IDENTITY,
                scale: Vec3::splat(layout.overlay_scale),
                opacity: 0.0,
                content: definition,
            },
            visible: false,
            overlay_scale: layout.overlay_scale,
        }
    }

    pub fn id(&self) -> PageId {
        self.overlay.content.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Fixed position assigned at creation
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    pub fn backing(&self) -> &BackingPlane {
        &self.backing
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn content(&self) -> &PageDefinition {
        &self.overlay.content
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn opacity(&self) -> f32 {
        self.backing.opacity
    }

    /// Clamp to [0, 1] and apply to both the backing plane and the overlay
    pub fn set_opacity(&mut self, opacity: f32) {
        let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
        self.backing.opacity = opacity;
        self.backing.transparent = opacity < 1.0;
        self.overlay.opacity = opacity;
    }

    pub fn visual(&self) -> PageVisual {
        PageVisual {
            opacity: self.backing.opacity,
            scale: self.node.scale.x,
            depth: self.node.translation.z - self.anchor.z,
        }
    }

    /// Write opacity, uniform scale and depth offset. Does not resync the overlay.
    pub fn apply_visual(&mut self, visual: PageVisual) {
        self.set_opacity(visual.opacity);
        self.node.scale = Vec3::splat(visual.scale);
        self.node.translation.z = self.anchor.z + visual.depth;
    }

    /// Copy the node's world transform onto the overlay.
    ///
    /// The overlay does not follow the node on its own; call this after every
    /// change to the node.
    pub fn update_transform_sync(&mut self) -> Result<(), SceneError> {
        let matrix = self.node.world_matrix();
        if !matrix.is_finite() {
            return Err(SceneError::NonFinite {
                what: format!("world transform of page {}", self.id()),
            });
        }
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        self.overlay.position = position;
        self.overlay.rotation = rotation;
        self.overlay.scale = scale * self.overlay_scale;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(index: usize) -> Page {
        Page::new(index, PageDefinition::new(index as u32 + 1, "t", "b"), &LayoutConfig::default())
    }

    #[test]
    fn test_anchor_follows_index() {
        let p = page(3);
        assert_eq!(p.anchor(), Vec3::new(0.0, -54.0, 0.0));
        assert!(!p.is_visible());
        assert_eq!(p.opacity(), 0.0);
    }

    #[test]
    fn test_set_opacity_clamps_both_layers() {
        let mut p = page(0);
        p.set_opacity(1.7);
        assert_eq!(p.opacity(), 1.0);
        assert_eq!(p.overlay().opacity, 1.0);
        assert!(!p.backing().transparent);

        p.set_opacity(-0.3);
        assert_eq!(p.opacity(), 0.0);
        assert!(p.backing().transparent);

        p.set_opacity(f32::NAN);
        assert_eq!(p.opacity(), 0.0);
    }

    #[test]
    fn test_apply_visual_round_trips() {
        let mut p = page(2);
        let visual = PageVisual {
            opacity: 0.4,
            scale: 0.9,
            depth: -1.5,
        };
        p.apply_visual(visual);
        assert!(p.visual().approx_eq(&visual, 1e-6));
        assert_eq!(p.node().translation.y, -36.0);
    }

    #[test]
    fn test_transform_sync_applies_overlay_scale() {
        let mut p = page(1);
        p.apply_visual(PageVisual {
            opacity: 1.0,
            scale: 0.5,
            depth: -2.0,
        });
        p.update_transform_sync().unwrap();

        let overlay = p.overlay();
        assert!((overlay.position - Vec3::new(0.0, -18.0, -2.0)).length() < 1e-5);
        assert!((overlay.scale - Vec3::splat(0.005)).length() < 1e-6);
    }

    #[test]
    fn test_transform_sync_rejects_non_finite() {
        let mut p = page(1);
        p.node_mut().translation.x = f32::INFINITY;
        assert!(matches!(
            p.update_transform_sync(),
            Err(SceneError::NonFinite { .. })
        ));
    }
}
