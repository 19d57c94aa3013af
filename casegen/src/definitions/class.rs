//! Struct definitions for generated source.

use std::fmt::Write as _;

use crate::definitions::docstring::DocstringDef;
use crate::definitions::function::FunctionDef;
use crate::definitions::render::{indent, rust_type, Render, RenderError};
use crate::discover::Param;

/// A struct to be emitted into a generated module, with optional methods.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub doc: DocstringDef,
    /// Derive names, rendered as a single `#[derive(..)]` attribute.
    pub derives: Vec<String>,
    pub fields: Vec<Param>,
    pub methods: Vec<FunctionDef>,
}

impl StructDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: DocstringDef::empty(),
            derives: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<DocstringDef>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_derive(mut self, derive: impl Into<String>) -> Self {
        let derive = derive.into();
        if !self.derives.contains(&derive) {
            self.derives.push(derive);
        }
        self
    }

    pub fn with_field(mut self, field: Param) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: FunctionDef) -> Self {
        self.methods.push(method);
        self
    }
}

impl Render for StructDef {
    fn render(&self) -> Result<String, RenderError> {
        let mut out = String::new();
        let doc = self.doc.render_item();
        if !doc.is_empty() {
            let _ = writeln!(out, "{}", doc);
        }
        if !self.derives.is_empty() {
            let _ = writeln!(out, "#[derive({})]", self.derives.join(", "));
        }
        if self.fields.is_empty() {
            let _ = writeln!(out, "pub struct {};", self.name);
        } else {
            let _ = writeln!(out, "pub struct {} {{", self.name);
            for field in &self.fields {
                let ty = field
                    .ty
                    .as_ref()
                    .map(rust_type)
                    .unwrap_or_else(|| "()".to_string());
                let _ = writeln!(out, "    pub {}: {},", field.name, ty);
            }
            let _ = writeln!(out, "}}");
        }
        if !self.methods.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "impl {} {{", self.name);
            let rendered: Vec<String> = self
                .methods
                .iter()
                .map(|m| m.render())
                .collect::<Result<_, _>>()?;
            let _ = writeln!(out, "{}", indent(&rendered.join("\n\n"), 4));
            let _ = write!(out, "}}");
        }
        Ok(out.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Origin, TypeExpr};

    #[test]
    fn test_unit_struct() {
        let def = StructDef::new("Marker").with_doc("A marker.");
        assert_eq!(
            def.render().unwrap(),
            "/// A marker.\npub struct Marker;"
        );
    }

    #[test]
    fn test_struct_with_fields_and_derives() {
        let def = StructDef::new("Widget")
            .with_derive("Debug")
            .with_derive("Clone")
            .with_derive("Debug")
            .with_field(Param::new("count", TypeExpr::atom(Origin::Int)))
            .with_field(Param::new(
                "label",
                TypeExpr::optional(TypeExpr::atom(Origin::Str)),
            ));
        assert_eq!(
            def.render().unwrap(),
            "#[derive(Debug, Clone)]\npub struct Widget {\n    pub count: i64,\n    pub label: Option<String>,\n}"
        );
    }

    #[test]
    fn test_struct_with_method() {
        let def = StructDef::new("Holder")
            .with_field(Param::new("value", TypeExpr::atom(Origin::Int)))
            .with_method(FunctionDef::new("check").with_body("self.value;"));
        let rendered = def.render().unwrap();
        assert!(rendered.contains("impl Holder {"));
        assert!(rendered.contains("    fn check() {"));
        assert!(rendered.ends_with("}"));
    }
}
