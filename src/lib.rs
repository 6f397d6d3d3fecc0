// Pali Families - Core Library
// Compound families and sets over the dictionary: tag parsing, classification,
// group registry, association resolution and HTML rendering.

pub mod error;
pub mod config;
pub mod headword;
pub mod tags;           // Tag fields → group keys, match strategy
pub mod classifier;     // Compound member heuristic
pub mod collation;      // Headword sort order
pub mod registry;       // Discovery-time groups and counts
pub mod db;             // SQLite store
pub mod resolver;       // Headword ↔ group links
pub mod render;         // HTML tables
pub mod export;         // Flashcard TSV
pub mod pipeline;       // End-to-end runs

// Re-export commonly used types
pub use error::{FamilyError, Result};
pub use config::Config;
pub use headword::{base_form, HeadwordRecord};
pub use tags::{parse_tags, MatchStrategy};
pub use classifier::{is_compound_member, CompoundClassifier};
pub use collation::{CodepointCollator, CollationKey, Collator, PaliCollator};
pub use registry::{
    build_compound_registry, build_set_registry, ExportRow, GroupItem, GroupKind, GroupRegistry,
};
pub use db::{
    Event, Group,
    setup_database, load_headwords_csv, insert_headwords, get_all_headwords, get_headword,
    groups_for_headword,
};
pub use resolver::{resolve_associations, ResolutionStats};
pub use render::{render_group, render_group_table, should_show_group_affordance};
pub use export::{flashcard_rows, write_flashcards, FlashcardRow};
pub use pipeline::{run_compound_families, run_family_sets, RunReport, RunWarning};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Date stamp written into flashcard rows
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
