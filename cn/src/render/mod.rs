//! Document rendering
//!
//! Turns the final document text into a binary artifact. The generated
//! text carries markdown-ish noise (double asterisks, box-drawing
//! separators) that must be stripped before layout; heading detection
//! is the renderer's concern, not the pipeline's.

use thiserror::Error;
use tracing::debug;

/// Rendering failures
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to render document: {0}")]
    Failed(String),
}

/// Renders final document text into a distributable binary artifact
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document_text: &str, title: &str) -> Result<Vec<u8>, RenderError>;
}

/// Separator width in the rendered output
const SEPARATOR_WIDTH: usize = 70;

/// Lines that are all uppercase and longer than this are headings
const HEADING_MIN_CHARS: usize = 5;

/// Plain-text renderer
///
/// Deterministic: identical input text always produces byte-identical
/// output.
#[derive(Debug, Default)]
pub struct PlainTextRenderer;

impl PlainTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

/// All-uppercase and longer than 5 characters means heading
fn is_heading(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() > HEADING_MIN_CHARS
        && trimmed.chars().any(|c| c.is_alphabetic())
        && !trimmed.chars().any(|c| c.is_lowercase())
}

/// A line consisting only of box-drawing or rule characters
fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| matches!(c, '─' | '═' | '━' | '-' | '='))
}

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, document_text: &str, title: &str) -> Result<Vec<u8>, RenderError> {
        debug!(text_len = document_text.len(), %title, "PlainTextRenderer::render: called");

        let mut out = String::new();
        out.push_str(&title.to_uppercase());
        out.push('\n');
        out.push_str(&"=".repeat(SEPARATOR_WIDTH));
        out.push_str("\n\n");

        for line in document_text.lines() {
            let cleaned = line.replace("**", "");

            if is_separator(&cleaned) {
                out.push_str(&"-".repeat(SEPARATOR_WIDTH));
                out.push('\n');
                continue;
            }

            if is_heading(&cleaned) {
                out.push('\n');
                out.push_str(cleaned.trim());
                out.push('\n');
                continue;
            }

            out.push_str(&cleaned);
            out.push('\n');
        }

        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_heuristic() {
        assert!(is_heading("PROJECT OVERVIEW"));
        assert!(is_heading("  SCOPE OF WORK  "));
        assert!(!is_heading("SCOPE")); // exactly 5 chars
        assert!(!is_heading("Project Overview"));
        assert!(!is_heading("1234567890"));
    }

    #[test]
    fn test_separator_detection() {
        assert!(is_separator("────────────"));
        assert!(is_separator("════════"));
        assert!(is_separator("----"));
        assert!(!is_separator("── note ──"));
        assert!(!is_separator(""));
    }

    #[test]
    fn test_render_strips_asterisks() {
        let renderer = PlainTextRenderer::new();
        let bytes = renderer
            .render("The **key** deliverable is **done**.", "Concept Note")
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(!text.contains("**"));
        assert!(text.contains("The key deliverable is done."));
        assert!(text.starts_with("CONCEPT NOTE\n"));
    }

    #[test]
    fn test_render_normalizes_separators() {
        let renderer = PlainTextRenderer::new();
        let bytes = renderer
            .render("PROJECT OVERVIEW\n──────────\nbody text", "title")
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(!text.contains('─'));
        assert!(text.contains(&"-".repeat(70)));
        assert!(text.contains("PROJECT OVERVIEW"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = PlainTextRenderer::new();
        let input = "EXECUTIVE SUMMARY\ntext body\n════\nmore **text**";

        let first = renderer.render(input, "Note").unwrap();
        let second = renderer.render(input, "Note").unwrap();
        assert_eq!(first, second);
    }
}
