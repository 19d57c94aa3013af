//! Structured definitions rendered to Rust source text.
//!
//! The emitter is the narrow collaborator the generation pipeline hands its
//! output to: build a [`ModuleDef`] out of imports, functions, and structs,
//! then [`Render`] it to the text of a test file. Rendering is plain string
//! building; the only failure mode is an import target with no derivable
//! name.

pub mod class;
pub mod docstring;
pub mod function;
pub mod imports;
pub mod module;
pub mod render;

pub use class::StructDef;
pub use docstring::DocstringDef;
pub use function::FunctionDef;
pub use imports::{rust_module_path, ImportDef, ImportTarget};
pub use module::{Definition, ModuleDef};
pub use render::{indent, rust_type, Render, RenderError};
