//! Catalogue relevance scoring
//!
//! A heuristic pre-filter that keeps the matching prompt within size
//! bounds. Deterministic for identical catalogue and keyword inputs;
//! ties keep catalogue order.

use tracing::debug;

use crate::domain::CatalogueItem;

/// At most this many items flow into the matching prompt
const MAX_SELECTED: usize = 8;

/// Zero-score items are padded in up to this many total items
const MIN_SELECTED: usize = 5;

/// Excerpt size for items scoring above the relevance threshold
const LARGE_EXCERPT_CHARS: usize = 3000;

/// Excerpt size for everything else
const SMALL_EXCERPT_CHARS: usize = 1500;

/// Scores above this get the larger excerpt
const EXCERPT_SCORE_THRESHOLD: u32 = 2;

/// Parse the keyword-extraction output into a normalized keyword list
///
/// The generation capability returns a comma-separated list. Keywords
/// are lower-cased, trimmed, de-duplicated in order.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    debug!(raw_len = raw.len(), "parse_keywords: called");
    let mut keywords = Vec::new();
    for part in raw.split(',') {
        let keyword = part.trim().trim_matches('.').to_lowercase();
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }
    keywords
}

/// A catalogue item with its relevance score
#[derive(Debug, Clone)]
pub struct ScoredItem {
    pub item: CatalogueItem,
    pub score: u32,
}

/// Score every catalogue item against the extracted keywords
///
/// +3 for each keyword found in the name, +2 for each found in the
/// description. Case-insensitive substring matching.
pub fn score_items(items: &[CatalogueItem], keywords: &[String]) -> Vec<ScoredItem> {
    debug!(item_count = items.len(), keyword_count = keywords.len(), "score_items: called");
    items
        .iter()
        .map(|item| {
            let name = item.name.to_lowercase();
            let description = item.description.to_lowercase();
            let mut score = 0;
            for keyword in keywords {
                if name.contains(keyword.as_str()) {
                    score += 3;
                }
                if description.contains(keyword.as_str()) {
                    score += 2;
                }
            }
            ScoredItem {
                item: item.clone(),
                score,
            }
        })
        .collect()
}

/// Pick the items that flow into the matching prompt
///
/// Positive-score items are ranked descending (stable, so ties keep
/// catalogue order) and capped at 8. When fewer than 5 items score
/// positive, zero-score items are padded in, in catalogue order, up to
/// 5 or the catalogue size, whichever is smaller.
pub fn select_items(scored: Vec<ScoredItem>) -> Vec<ScoredItem> {
    debug!(scored_count = scored.len(), "select_items: called");
    let mut positive: Vec<ScoredItem> = scored.iter().filter(|s| s.score > 0).cloned().collect();
    positive.sort_by(|a, b| b.score.cmp(&a.score));
    positive.truncate(MAX_SELECTED);

    if positive.len() < MIN_SELECTED {
        for candidate in scored.iter().filter(|s| s.score == 0) {
            if positive.len() >= MIN_SELECTED {
                break;
            }
            positive.push(candidate.clone());
        }
    }

    debug!(selected_count = positive.len(), "select_items: done");
    positive
}

/// Render the selected items into the prompt's catalogue section
///
/// Higher-scoring items carry a larger excerpt of their document text.
pub fn build_products_content(selected: &[ScoredItem]) -> String {
    debug!(selected_count = selected.len(), "build_products_content: called");
    let mut sections = Vec::with_capacity(selected.len());
    for scored in selected {
        let limit = if scored.score > EXCERPT_SCORE_THRESHOLD {
            LARGE_EXCERPT_CHARS
        } else {
            SMALL_EXCERPT_CHARS
        };
        let excerpt: String = scored.item.doc_text.chars().take(limit).collect();

        let mut section = format!("=== {} ===\n{}", scored.item.name, scored.item.description);
        if !excerpt.is_empty() {
            section.push('\n');
            section.push_str(&excerpt);
        }
        sections.push(section);
    }
    sections.join("\n\n")
}
