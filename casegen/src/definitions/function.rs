//! Function definitions for generated source.

use std::fmt::Write as _;

use crate::definitions::docstring::DocstringDef;
use crate::definitions::render::{indent, rust_type, Render, RenderError};
use crate::discover::Signature;

const DEFAULT_BODY: &str = "unimplemented!();";

/// A function to be emitted into a generated test module.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub doc: DocstringDef,
    pub signature: Signature,
    pub body: String,
    /// Outer attributes, rendered one per line above the function.
    pub attributes: Vec<String>,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: DocstringDef::empty(),
            signature: Signature::empty(),
            body: DEFAULT_BODY.to_string(),
            attributes: Vec::new(),
        }
    }

    /// A `#[test]` stub with the placeholder body.
    pub fn test_fn(name: impl Into<String>) -> Self {
        Self::new(name).with_attribute("#[test]")
    }

    pub fn with_doc(mut self, doc: impl Into<DocstringDef>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = if body.is_empty() {
            DEFAULT_BODY.to_string()
        } else {
            body
        };
        self
    }

    /// Add an outer attribute, once.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        if !self.attributes.contains(&attribute) {
            self.attributes.push(attribute);
        }
        self
    }

    fn rendered_params(&self) -> String {
        self.signature
            .params
            .iter()
            .map(|p| match &p.ty {
                Some(ty) => format!("{}: {}", p.name, rust_type(ty)),
                None => format!("{}: _", p.name),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Render for FunctionDef {
    fn render(&self) -> Result<String, RenderError> {
        let mut out = String::new();
        let doc = self.doc.render_item();
        if !doc.is_empty() {
            let _ = writeln!(out, "{}", doc);
        }
        for attribute in &self.attributes {
            let _ = writeln!(out, "{}", attribute);
        }
        let _ = writeln!(out, "fn {}({}) {{", self.name, self.rendered_params());
        let _ = writeln!(out, "{}", indent(&self.body, 4));
        out.push('}');
        Ok(out)
    }
}
