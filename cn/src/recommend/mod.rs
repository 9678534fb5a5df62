//! Recommendation matching
//!
//! Keyword-scored catalogue filtering feeding the internal-capability
//! matching prompt. Purely deterministic; keyword extraction and the
//! narrative generation itself live in the stage controller.

mod matcher;

pub use matcher::{ScoredItem, build_products_content, parse_keywords, score_items, select_items};
