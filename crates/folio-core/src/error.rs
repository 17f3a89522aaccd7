use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Deck error: {0}")]
    Deck(String),

    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("{0}")]
    Other(String),
}

/// Reasons a transition request is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("transition driver is not initialized")]
    NotInitialized,

    #[error("invalid target section {target} (deck has {len} pages)")]
    InvalidTarget { target: usize, len: usize },

    #[error("already at section {0}")]
    AlreadyAtTarget(usize),

    #[error("watchdog deadline out of range for a {0:?} watchdog")]
    DeadlineOverflow(std::time::Duration),
}

/// Failures while writing a frame into the scene.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("non-finite value in {what}")]
    NonFinite { what: String },

    #[error("camera look-at target coincides with its position")]
    DegenerateLookAt,

    #[error("page {0} does not exist")]
    PageMissing(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
