mod nav;
mod stage_view;
mod status_bar;

pub use nav::NavWidget;
pub use stage_view::{project_page, StageWidget};
pub use status_bar::StatusBarWidget;
