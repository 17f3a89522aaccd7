pub mod app;
pub mod event;
pub mod input;
pub mod render;
pub mod theme;
pub mod widgets;

pub use app::{App, ViewState};
pub use render::TerminalRenderer;
pub use theme::{load_theme, Theme};
