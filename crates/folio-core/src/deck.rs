//! Page definitions presented by the deck.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Static description of one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDefinition {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl PageDefinition {
    pub fn new(id: u32, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Ordered, non-empty list of pages with unique ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    pages: Vec<PageDefinition>,
}

impl Deck {
    pub fn new(pages: Vec<PageDefinition>) -> crate::Result<Self> {
        if pages.is_empty() {
            return Err(crate::Error::Deck("deck has no pages".to_string()));
        }
        let mut seen = HashSet::new();
        for page in &pages {
            if !seen.insert(page.id) {
                return Err(crate::Error::Deck(format!("duplicate page id {}", page.id)));
            }
        }
        Ok(Self { pages })
    }

    /// Load a deck from a TOML file of `[[pages]]` tables
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        #[derive(Deserialize)]
        struct DeckFile {
            #[serde(default)]
            pages: Vec<PageDefinition>,
        }

        let file: DeckFile = toml::from_str(content)?;
        let deck = Self::new(file.pages)?;
        tracing::debug!(pages = deck.len(), "Loaded deck");
        Ok(deck)
    }

    /// The built-in service catalog
    pub fn builtin() -> Self {
        let pages = vec![
            PageDefinition::new(1, "Service Catalog", "Offerings, levels and terms at a glance.\nScroll to begin."),
            PageDefinition::new(2, "Executive Summary", "What we deliver, for whom, and how engagements are structured."),
            PageDefinition::new(3, "Service Overview", "Five service levels, each building on the one before it."),
            PageDefinition::new(4, "Level 1: Foundations", "Assessment, baseline setup and onboarding."),
            PageDefinition::new(5, "Level 2: Operations", "Day-to-day operation with monthly reporting."),
            PageDefinition::new(6, "Level 3: Optimization", "Continuous tuning against agreed targets."),
            PageDefinition::new(7, "Level 4: Partnership", "Dedicated team and quarterly roadmap reviews."),
            PageDefinition::new(8, "Level 5: Strategic", "Joint planning, custom development and priority support."),
            PageDefinition::new(9, "Terms", "Billing cycles, service windows and cancellation."),
            PageDefinition::new(10, "Conclusion", "Thank you. Get in touch to pick a level."),
        ];
        Self { pages }
    }

    pub fn pages(&self) -> &[PageDefinition] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
