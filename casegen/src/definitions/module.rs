//! Module definitions: the top-level unit the emitter renders to a file.

use crate::definitions::class::StructDef;
use crate::definitions::docstring::DocstringDef;
use crate::definitions::function::FunctionDef;
use crate::definitions::imports::ImportDef;
use crate::definitions::render::{Render, RenderError};

/// One definition inside a generated module.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Function(FunctionDef),
    Struct(StructDef),
}

impl Render for Definition {
    fn render(&self) -> Result<String, RenderError> {
        match self {
            Definition::Function(def) => def.render(),
            Definition::Struct(def) => def.render(),
        }
    }
}

impl From<FunctionDef> for Definition {
    fn from(def: FunctionDef) -> Self {
        Definition::Function(def)
    }
}

impl From<StructDef> for Definition {
    fn from(def: StructDef) -> Self {
        Definition::Struct(def)
    }
}

/// A complete generated source module: header doc, imports, definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDef {
    pub name: String,
    pub doc: DocstringDef,
    pub imports: Vec<ImportDef>,
    pub definitions: Vec<Definition>,
}

impl ModuleDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: DocstringDef::empty(),
            imports: Vec::new(),
            definitions: Vec::new(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<DocstringDef>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_import(mut self, import: ImportDef) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_definition(mut self, definition: impl Into<Definition>) -> Self {
        self.definitions.push(definition.into());
        self
    }
}

impl Render for ModuleDef {
    fn render(&self) -> Result<String, RenderError> {
        let mut sections: Vec<String> = Vec::new();
        let header = self.doc.render_module();
        if !header.is_empty() {
            sections.push(header);
        }
        if !self.imports.is_empty() {
            let imports: Vec<String> = self
                .imports
                .iter()
                .map(|import| import.render())
                .collect::<Result<_, _>>()?;
            sections.push(imports.join("\n"));
        }
        for definition in &self.definitions {
            sections.push(definition.render()?);
        }
        let mut out = sections.join("\n\n");
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_sections_in_order() {
        let module = ModuleDef::new("test_example_module")
            .with_doc("Tests for example_module.")
            .with_import(ImportDef::named("crate::example_module", "temp_func"))
            .with_definition(FunctionDef::test_fn("test_temp_func"));
        assert_eq!(
            module.render().unwrap(),
            "//! Tests for example_module.\n\n\
             use crate::example_module::temp_func;\n\n\
             #[test]\nfn test_temp_func() {\n    unimplemented!();\n}\n"
        );
    }

    #[test]
    fn test_empty_module_renders_empty_line() {
        let module = ModuleDef::new("empty");
        assert_eq!(module.render().unwrap(), "\n");
    }

    #[test]
    fn test_import_error_propagates() {
        use crate::definitions::imports::ImportDef;
        use crate::discover::{Object, Value};

        let module = ModuleDef::new("bad").with_import(ImportDef::for_object(
            "crate::m",
            Object::Value(Value::Str("Hello".to_string())),
        ));
        assert!(module.render().is_err());
    }
}
