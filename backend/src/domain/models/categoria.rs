//! Domain model for the category map.
use indexmap::IndexMap;

/// Category name to emoji, in display order. The whole map travels as one
/// unit: backup imports replace it wholesale when the backup carries one.
pub type CategoriaMap = IndexMap<String, String>;

/// Emoji assigned to categories auto-registered during client imports.
pub const DEFAULT_CATEGORIA_EMOJI: &str = "🚲";
