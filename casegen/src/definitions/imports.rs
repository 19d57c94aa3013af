//! Import (use-statement) definitions for generated source.

use std::path::Path;

use crate::definitions::render::{Render, RenderError};
use crate::discover::{Module, Object};

/// What an import brings into scope.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportTarget {
    /// A name known up front.
    Named(String),
    /// A discovered runtime object; its name is derived at render time.
    Discovered(Object),
}

/// A single `use` statement for a generated test module.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDef {
    /// The `::`-joined module path, e.g. `crate::example_module`.
    pub module: String,
    /// The imported object; `None` imports the module itself.
    pub target: Option<ImportTarget>,
}

impl ImportDef {
    /// Import the module itself.
    pub fn module_import(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            target: None,
        }
    }

    /// Import a known name from a module.
    pub fn named(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            target: Some(ImportTarget::Named(name.into())),
        }
    }

    /// Import a discovered object from its defining module.
    pub fn for_object(module: impl Into<String>, object: Object) -> Self {
        Self {
            module: module.into(),
            target: Some(ImportTarget::Discovered(object)),
        }
    }
}

impl Render for ImportDef {
    fn render(&self) -> Result<String, RenderError> {
        match &self.target {
            None => Ok(format!("use {};", self.module)),
            Some(ImportTarget::Named(name)) => Ok(format!("use {}::{};", self.module, name)),
            Some(ImportTarget::Discovered(object)) => match object.name() {
                Some(name) => Ok(format!("use {}::{};", self.module, name)),
                None => Err(RenderError::missing_name(format!("{:?}", object))),
            },
        }
    }
}

/// The `::`-joined module path of a module's source file relative to a
/// package root, e.g. `src/pkg/widgets.rs` under `src` becomes
/// `crate::pkg::widgets`.
pub fn rust_module_path(module: &Module, root: &Path) -> String {
    let relative = module.path.strip_prefix(root).unwrap_or(&module.path);
    let mut segments: Vec<String> = vec!["crate".to_string()];
    let mut components = relative.components().peekable();
    while let Some(component) = components.next() {
        let part = component.as_os_str().to_string_lossy().into_owned();
        if components.peek().is_none() {
            // Final component: drop the source-file extension.
            let stem = Path::new(&part)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(part);
            segments.push(stem);
        } else {
            segments.push(part);
        }
    }
    segments.join("::")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::{FunctionObject, Signature, Value};
    use std::path::PathBuf;

    #[test]
    fn test_module_import() {
        let import = ImportDef::module_import("crate::example_module");
        assert_eq!(import.render().unwrap(), "use crate::example_module;");
    }

    #[test]
    fn test_named_import() {
        let import = ImportDef::named("crate::example_module", "temp_func");
        assert_eq!(
            import.render().unwrap(),
            "use crate::example_module::temp_func;"
        );
    }

    #[test]
    fn test_discovered_object_import() {
        let object = Object::Function(FunctionObject::new("temp_func", Signature::empty()));
        let import = ImportDef::for_object("crate::example_module", object);
        assert_eq!(
            import.render().unwrap(),
            "use crate::example_module::temp_func;"
        );
    }

    #[test]
    fn test_nameless_object_is_a_render_error() {
        let object = Object::Value(Value::Str("Hello".to_string()));
        let import = ImportDef::for_object("crate::example_module", object);
        assert!(matches!(
            import.render(),
            Err(RenderError::MissingName { .. })
        ));
    }

    #[test]
    fn test_rust_module_path() {
        let root = PathBuf::from("/project/src");
        let module = Module::new("widgets", "/project/src/pkg/widgets.rs");
        assert_eq!(rust_module_path(&module, &root), "crate::pkg::widgets");

        let module = Module::new("top", "/project/src/top.rs");
        assert_eq!(rust_module_path(&module, &root), "crate::top");
    }
}
