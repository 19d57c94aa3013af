//! Rendering support for generated source definitions.

use std::fmt;

use crate::types::{Origin, TypeExpr};

/// Failures while rendering a definition to source text.
///
/// `MissingName` is the one fatal-by-design user-facing failure in the whole
/// system: an import target that has no derivable name cannot be rendered,
/// and the caller is told so instead of silently emitting broken source.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// An import target object lacking a derivable name.
    MissingName { context: String },
}

impl RenderError {
    pub fn missing_name(context: impl Into<String>) -> Self {
        RenderError::MissingName {
            context: context.into(),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingName { context } => {
                write!(f, "Object must have a name to import - {}", context)
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Anything that can be rendered to source text.
pub trait Render {
    fn render(&self) -> Result<String, RenderError>;
}

/// Indent every non-empty line by `width` spaces.
pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Best-effort Rust spelling of a type expression, used when emitting typed
/// stubs. Types with no direct Rust counterpart fall back to their display
/// rendering.
pub fn rust_type(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Atom(origin) => rust_atom(origin).to_string(),
        TypeExpr::Generic { origin, args } => match origin {
            Origin::List => format!("Vec<{}>", rust_args(args)),
            Origin::Set => format!("std::collections::HashSet<{}>", rust_args(args)),
            Origin::FrozenSet => format!("std::collections::BTreeSet<{}>", rust_args(args)),
            Origin::Dict => format!("std::collections::HashMap<{}>", rust_args(args)),
            Origin::Tuple => {
                // A variadic tuple is a homogeneous sequence.
                if args.last() == Some(&TypeExpr::Ellipsis) && args.len() == 2 {
                    format!("Vec<{}>", rust_type(&args[0]))
                } else {
                    format!("({})", rust_args(args))
                }
            }
            Origin::Optional => format!("Option<{}>", rust_args(args)),
            Origin::Named(name) | Origin::Enum(name) => {
                format!("{}<{}>", name, rust_args(args))
            }
            _ => ty.to_string(),
        },
        TypeExpr::Literal(_) | TypeExpr::Ellipsis => ty.to_string(),
    }
}

fn rust_atom(origin: &Origin) -> &str {
    match origin {
        Origin::Bool => "bool",
        Origin::Int => "i64",
        Origin::Float => "f64",
        Origin::Complex => "(f64, f64)",
        Origin::Str => "String",
        Origin::Bytes => "Vec<u8>",
        Origin::NoneType => "()",
        Origin::Named(name) | Origin::Enum(name) => name,
        // Unparametrized generic origins have no Rust spelling of their own.
        Origin::List => "Vec<_>",
        Origin::Set => "std::collections::HashSet<_>",
        Origin::FrozenSet => "std::collections::BTreeSet<_>",
        Origin::Dict => "std::collections::HashMap<_, _>",
        Origin::Tuple => "(_,)",
        Origin::Union | Origin::Optional => "_",
    }
}

fn rust_args(args: &[TypeExpr]) -> String {
    args.iter()
        .map(rust_type)
        .collect::<Vec<_>>()
        .join(", ")
}
