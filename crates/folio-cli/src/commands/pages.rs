use anyhow::Result;

use folio_core::FolioConfig;

pub fn run(config: &FolioConfig) -> Result<()> {
    let deck = super::load_deck(config)?;

    println!("Pages ({}):\n", deck.len());

    for (index, page) in deck.pages().iter().enumerate() {
        println!("  {:>2}. {} (id {})", index + 1, page.title, page.id);
        if let Some(first_line) = page.body.lines().next() {
            println!("      {}", first_line);
        }
    }

    Ok(())
}
