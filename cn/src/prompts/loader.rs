//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::PromptError;
use super::embedded;

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.conceptnote/prompts/`)
    user_dir: Option<PathBuf>,
    /// Repo default directory (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at the given directory
    ///
    /// # Arguments
    /// * `root` - Base directory (used to find `.conceptnote/prompts/` and `prompts/`)
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        debug!(?root, "PromptLoader::new: called");
        let user_dir = root.join(".conceptnote/prompts");
        let repo_dir = root.join("prompts");

        let user_dir_exists = user_dir.exists();
        let repo_dir_exists = repo_dir.exists();
        debug!(
            ?user_dir,
            %user_dir_exists,
            ?repo_dir,
            %repo_dir_exists,
            "PromptLoader::new: checking directories"
        );

        Self {
            hbs: Handlebars::new(),
            user_dir: if user_dir_exists { Some(user_dir) } else { None },
            repo_dir: if repo_dir_exists { Some(repo_dir) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Handlebars::new(),
            user_dir: None,
            repo_dir: None,
        }
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.conceptnote/prompts/{name}.pmt`
    /// 2. Repo default: `prompts/{name}.pmt`
    /// 3. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String, PromptError> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path).map_err(|source| PromptError::Io { path, source });
            }
        }

        if let Some(ref repo_dir) = self.repo_dir {
            let path = repo_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in repo");
                return std::fs::read_to_string(&path).map_err(|source| PromptError::Io { path, source });
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(PromptError::NotFound { name: name.to_string() })
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String, PromptError> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;

        self.hbs
            .render_template(&template, context)
            .map_err(|source| PromptError::Render {
                name: template_name.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_preview_embedded() {
        let loader = PromptLoader::embedded_only();
        let rendered = loader
            .render(
                "preview",
                &json!({
                    "raw_input": "A mobile app for farmers",
                    "highlight_points": "offline-first",
                    "pre_qa": "",
                    "supporting_text": "",
                }),
            )
            .unwrap();

        assert!(rendered.contains("A mobile app for farmers"));
        assert!(rendered.contains("offline-first"));
    }

    #[test]
    fn test_render_does_not_escape_html() {
        let loader = PromptLoader::embedded_only();
        let rendered = loader
            .render(
                "keywords",
                &json!({ "preview": "B2B <integration> & sync", "transcript": "" }),
            )
            .unwrap();

        // Triple-stash placeholders must pass text through verbatim
        assert!(rendered.contains("B2B <integration> & sync"));
    }

    #[test]
    fn test_user_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let user_dir = dir.path().join(".conceptnote/prompts");
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(user_dir.join("keywords.pmt"), "OVERRIDE {{{preview}}}").unwrap();

        let loader = PromptLoader::new(dir.path());
        let rendered = loader
            .render("keywords", &json!({ "preview": "payments", "transcript": "" }))
            .unwrap();

        assert_eq!(rendered, "OVERRIDE payments");
    }

    #[test]
    fn test_repo_dir_used_when_no_user_override() {
        let dir = tempfile::tempdir().unwrap();
        let repo_dir = dir.path().join("prompts");
        std::fs::create_dir_all(&repo_dir).unwrap();
        std::fs::write(repo_dir.join("client-name.pmt"), "repo template {{{raw_input}}}").unwrap();

        let loader = PromptLoader::new(dir.path());
        let rendered = loader
            .render(
                "client-name",
                &json!({ "raw_input": "x", "preview": "", "transcript": "" }),
            )
            .unwrap();

        assert!(rendered.starts_with("repo template"));
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        let result = loader.render("nonexistent-template", &json!({}));
        assert!(matches!(result, Err(PromptError::NotFound { .. })));
    }
}
