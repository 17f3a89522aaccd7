//! Scene model shared by the transition driver and the renderers.
//!
//! Pages carry two layers: a backing plane in the 3D scene and an overlay
//! holding the page content. The overlay is positioned from the page node's
//! world transform but is not parented to it, so every node change must be
//! followed by [`Page::update_transform_sync`].

pub mod camera;
pub mod page;
pub mod stage;

pub use camera::{Camera, CameraPose};
pub use page::{BackingPlane, Node, Overlay, Page, PageId, PageVisual};
pub use stage::Stage;
