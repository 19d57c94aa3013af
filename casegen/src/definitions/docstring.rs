//! Doc-comment definitions for generated source.

use crate::definitions::render::{Render, RenderError};

/// A documentation block attached to a generated definition.
///
/// Quote runs around the input are stripped on construction, so text lifted
/// straight out of quoted source keeps only its content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocstringDef {
    value: String,
}

impl DocstringDef {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: strip_quotes(&value.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn is_multi_line(&self) -> bool {
        self.value.contains('\n')
    }

    /// Render as an item doc comment (`///` lines). Empty docstrings render
    /// as nothing.
    pub fn render_item(&self) -> String {
        self.render_with_prefix("///")
    }

    /// Render as a module-header doc comment (`//!` lines).
    pub fn render_module(&self) -> String {
        self.render_with_prefix("//!")
    }

    fn render_with_prefix(&self, prefix: &str) -> String {
        if self.value.is_empty() {
            return String::new();
        }
        self.value
            .lines()
            .map(|line| {
                if line.is_empty() {
                    prefix.to_string()
                } else {
                    format!("{} {}", prefix, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Render for DocstringDef {
    fn render(&self) -> Result<String, RenderError> {
        Ok(self.render_item())
    }
}

impl From<&str> for DocstringDef {
    fn from(value: &str) -> Self {
        DocstringDef::new(value)
    }
}

fn strip_quotes(value: &str) -> String {
    value.trim_matches(['"', '\'']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_are_stripped() {
        assert_eq!(DocstringDef::new("\"\"\"Example.\"\"\"").value(), "Example.");
        assert_eq!(DocstringDef::new("'quoted'").value(), "quoted");
        assert_eq!(DocstringDef::new("plain").value(), "plain");
    }

    #[test]
    fn test_empty_renders_as_nothing() {
        assert_eq!(DocstringDef::empty().render_item(), "");
        assert_eq!(DocstringDef::empty().render().unwrap(), "");
    }

    #[test]
    fn test_single_line_rendering() {
        let doc = DocstringDef::new("Example docstring.");
        assert!(!doc.is_multi_line());
        assert_eq!(doc.render_item(), "/// Example docstring.");
        assert_eq!(doc.render_module(), "//! Example docstring.");
    }

    #[test]
    fn test_multi_line_rendering() {
        let doc = DocstringDef::new("First line.\n\nSecond paragraph.");
        assert!(doc.is_multi_line());
        assert_eq!(
            doc.render_item(),
            "/// First line.\n///\n/// Second paragraph."
        );
    }
}
