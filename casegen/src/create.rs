//! Test-file generation pipeline: discovery in, rendered test files out.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::definitions::{
    rust_module_path, DocstringDef, FunctionDef, ImportDef, ModuleDef, Render, RenderError,
};
use crate::discover::{standardize_paths, Module, ModuleRegistry, Object};

/// Failures in the generation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateError {
    /// A definition could not be rendered to source text.
    Render(RenderError),
    /// A filesystem operation failed.
    Io { path: PathBuf, message: String },
}

impl fmt::Display for CreateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateError::Render(err) => write!(f, "Render error: {}", err),
            CreateError::Io { path, message } => {
                write!(f, "I/O error at {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for CreateError {}

impl From<RenderError> for CreateError {
    fn from(err: RenderError) -> Self {
        CreateError::Render(err)
    }
}

/// Create test files for every module discovered under `src`, writing one
/// `test_<module>.rs` per module into `dst`. Returns the created paths.
///
/// Unloadable modules are skipped by discovery as usual; an empty result
/// means nothing was discovered under `src`.
pub fn create_tests(
    registry: &ModuleRegistry,
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, CreateError> {
    let src = standardize_paths(src.as_ref())
        .into_iter()
        .next()
        .unwrap_or_else(|| src.as_ref().to_path_buf());
    let dst = dst.as_ref();

    let mut created = Vec::new();
    let mut first = true;
    for module in registry.find_modules(src.as_path()) {
        if first {
            std::fs::create_dir_all(dst).map_err(|e| CreateError::Io {
                path: dst.to_path_buf(),
                message: e.to_string(),
            })?;
            first = false;
        }
        let definition = test_module_def(&module, &src);
        let text = definition.render()?;
        let file = dst.join(format!("test_{}.rs", file_stem_for(&module.name)));
        std::fs::write(&file, text).map_err(|e| CreateError::Io {
            path: file.clone(),
            message: e.to_string(),
        })?;
        created.push(file);
    }
    Ok(created)
}

/// Build the test-module definition for one discovered module: an import per
/// named member, and one `#[test]` stub per member.
pub fn test_module_def(module: &Module, src: &Path) -> ModuleDef {
    let module_path = rust_module_path(module, src);
    let mut def = ModuleDef::new(format!("test_{}", file_stem_for(&module.name)))
        .with_doc(DocstringDef::new(format!("Tests for {}.", module.name)));
    for (_, object) in module.members() {
        // Values have no importable name of their own; their module binding
        // is enough for the stub.
        if let Some(name) = object.name() {
            def = def.with_import(ImportDef::named(&module_path, name));
        }
    }
    for (name, object) in module.members() {
        let stub = FunctionDef::test_fn(format!("test_{}", snake_case(name)))
            .with_doc(DocstringDef::new(format!("Test for {}.", describe(object, name))));
        def = def.with_definition(stub);
    }
    def
}

fn describe(object: &Object, name: &str) -> String {
    match object {
        Object::Function(_) => format!("the function {}", name),
        Object::Class(_) => format!("the class {}", name),
        Object::Value(value) => format!("the module value {} ({})", name, value),
    }
}

fn file_stem_for(module_name: &str) -> String {
    module_name.replace("::", "_").replace(['.', '-'], "_")
}

/// Lower-case a member name for use in a test-function identifier.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}
