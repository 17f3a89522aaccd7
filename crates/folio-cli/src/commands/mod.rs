pub mod config;
pub mod pages;
pub mod run;
pub mod simulate;

use anyhow::{Context, Result};
use tracing::info;

use folio_core::{Deck, FolioConfig};

/// The configured deck, or the built-in catalog
pub fn load_deck(config: &FolioConfig) -> Result<Deck> {
    match config.deck_path() {
        Some(path) => {
            let deck = Deck::load(&path)
                .with_context(|| format!("Failed to load deck from {}", path.display()))?;
            info!(path = %path.display(), pages = deck.len(), "Using deck file");
            Ok(deck)
        }
        None => Ok(Deck::builtin()),
    }
}
