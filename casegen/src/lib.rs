//! # Casegen - Type-Driven Test-Case Expansion and Scaffolding
//!
//! Casegen expands type annotations into finite sets of representative
//! instantiations for exhaustive parametrized testing, discovers runtime
//! objects registered under a source tree, and scaffolds test files for
//! them.
//!
//! ## Quick Start
//!
//! ```rust
//! use casegen::{expand_type_default, Expansion, Origin, TypeExpr};
//!
//! // Optional[int] expands to {int, None}.
//! let ty = TypeExpr::optional(TypeExpr::atom(Origin::Int));
//! let result = expand_type_default(&ty);
//! assert!(result.contains(&Expansion::Ty(TypeExpr::atom(Origin::Int))));
//! assert!(result.contains(&Expansion::Ty(TypeExpr::atom(Origin::NoneType))));
//! ```

// Public modules
pub mod config;
pub mod create;
pub mod definitions;
pub mod discover;
pub mod expand;
pub mod parametric;
pub mod plugin;
pub mod types;

// Re-export the main public API
pub use config::{ConfigError, CustomHandler, ExpansionConfig};
pub use create::{create_tests, test_module_def, CreateError};
pub use definitions::{
    Definition, DocstringDef, FunctionDef, ImportDef, ModuleDef, Render, RenderError, StructDef,
};
pub use discover::{
    find_module_objects, source_filter, standardize_paths, ClassObject, Diagnostic,
    DiscoveredObject, FunctionObject, LoadError, Module, ModuleRegistry, Object, Param, Signature,
    Value,
};
#[cfg(feature = "manifest")]
pub use discover::{Manifest, ManifestError};
pub use expand::{
    expand_type, expand_type_default, sorted_expansions, ExpandedType, Expansion,
};
pub use parametric::{
    build_parametric_call, register_parametrize, supports_parametrize, ParamSource,
    ParametricCall, ParametrizeError, ParametrizeMarker, Registrar,
};
pub use plugin::{collection_hook, default_dst, default_src, CreateOptions};
pub use types::{LiteralValue, Origin, TypeExpr};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expansion_config_defaults() {
        let config = ExpansionConfig::default();
        assert_eq!(config.max_elements, 5);
        assert_eq!(config.max_depth, 5);
    }

    #[test]
    fn test_public_api_round_trip() {
        let ty = TypeExpr::dict_of(
            TypeExpr::atom(Origin::Str),
            TypeExpr::optional(TypeExpr::atom(Origin::Int)),
        );
        let result = expand_type_default(&ty);
        assert_eq!(result.len(), 2);
    }
}
