//! Deckcraft - slide decks assembled from generated or imported images
//!
//! A deck is an ordered list of slides, each rendered as a single full-bleed
//! image. Decks are either planned from a brief and generated slide by slide
//! through pluggable AI backends, or imported from an existing `.pptx` file.
//! Finished decks are exported back to `.pptx`.
//!
//! # Features
//!
//! - **Orchestration**: plan, then generate every slide sequentially, then
//!   edit or retry individual slides, with per-call timeouts and atomic state
//!   updates observable through a watch channel
//! - **Pluggable backends**: [`generation::Planner`] and
//!   [`generation::ImageGenerator`] capability traits, with a vendor switch
//! - **PPTX codec**: recover the first picture of every slide, and write
//!   minimal packages with one stretched picture per slide
//!
//! # Example - Round-tripping a package
//!
//! ```no_run
//! use deckcraft::ooxml::pptx::{SlideSize, read_package, write_package};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let entries = read_package(&std::fs::read("deck.pptx")?)?;
//! for entry in &entries {
//!     println!("slide {}: {} ({} bytes)", entry.position, entry.mime_type(), entry.data.len());
//! }
//!
//! let bytes = write_package(
//!     entries.iter().map(|entry| Some(deckcraft::ooxml::pptx::SlideImage::new(&entry.data, entry.format))),
//!     SlideSize::WIDESCREEN,
//! )?;
//! std::fs::write("copy.pptx", bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Editing an imported deck
//!
//! ```no_run
//! use deckcraft::config::DeckConfig;
//! use deckcraft::generation::{ImageGenerator, Planner};
//! use deckcraft::orchestrator::DeckOrchestrator;
//!
//! # async fn run(planner: impl Planner, generator: impl ImageGenerator) -> deckcraft::Result<()> {
//! let orchestrator = DeckOrchestrator::new(planner, generator, DeckConfig::load("deckcraft.yaml")?);
//! orchestrator.import_package(&std::fs::read("deck.pptx")?)?;
//! orchestrator.edit_slide(2, "Make the background dark blue").await?;
//! std::fs::write("deck.pptx", orchestrator.export_package()?)?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod config;
pub mod deck;
pub mod generation;
pub mod ooxml;
pub mod orchestrator;

pub use common::{Error, Result};
pub use config::DeckConfig;
pub use deck::{Deck, ImageData, Slide, SlideState};
pub use orchestrator::DeckOrchestrator;
