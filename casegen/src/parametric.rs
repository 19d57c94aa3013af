//! Parametrization bridge: expands declared argument types into registered
//! test parametrizations.
//!
//! The bridge sits between the expansion engine and an external test runner.
//! Given a declarative marker (argument names plus explicit types, or a
//! callable whose signature supplies them), it expands every argument type,
//! takes the Cartesian product across arguments, and hands the resulting
//! argument tuples to the runner through the [`Registrar`] trait. Binding the
//! argument names to an actual test function is the runner's job.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::config::ExpansionConfig;
use crate::discover::Signature;
use crate::expand::{expand_type, sorted_expansions, Expansion};
use crate::types::{LiteralValue, Origin, TypeExpr};

/// Predefined literal table for `bool`.
pub fn bool_literal() -> TypeExpr {
    TypeExpr::literal(vec![LiteralValue::Bool(false), LiteralValue::Bool(true)])
}

/// Predefined literal table for `int`.
pub fn int_literal() -> TypeExpr {
    TypeExpr::literal((0..10).map(LiteralValue::Int).collect())
}

/// Predefined literal table for `str`.
pub fn str_literal() -> TypeExpr {
    TypeExpr::literal(
        ["", "a", "b", "c", "1", "2", "3", "example"]
            .iter()
            .map(|s| LiteralValue::Str(s.to_string()))
            .collect(),
    )
}

/// The predefined type-to-literal mapping for common built-in types.
pub fn predefined_literal(origin: &Origin) -> Option<TypeExpr> {
    match origin {
        Origin::Bool => Some(bool_literal()),
        Origin::Int => Some(int_literal()),
        Origin::Str => Some(str_literal()),
        _ => None,
    }
}

/// Whether a type can seed concrete parametrized values: it is a literal
/// enumeration itself, or its origin has a predefined literal table.
pub fn supports_parametrize(ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Literal(_) => true,
        _ => ty
            .origin()
            .is_some_and(|origin| predefined_literal(origin).is_some()),
    }
}

/// The concrete values a type contributes to a parametrization, capped at
/// `config.max_elements` (first-N in table order). `None` when the type has
/// no finite enumeration policy.
pub fn literal_values(ty: &TypeExpr, config: &ExpansionConfig) -> Option<Vec<LiteralValue>> {
    let table = match ty {
        TypeExpr::Literal(values) => values.clone(),
        _ => match ty.origin().and_then(predefined_literal)? {
            TypeExpr::Literal(values) => values,
            _ => return None,
        },
    };
    Some(table.into_iter().take(config.max_elements).collect())
}

/// Where a marker's argument types come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSource {
    /// An explicit type per declared argument name.
    Types(Vec<TypeExpr>),
    /// A callable or class; argument names and types derive from its
    /// signature or constructor.
    Callable { name: String, signature: Signature },
}

/// A declarative per-test parametrization request.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametrizeMarker {
    pub argnames: Vec<String>,
    pub source: ParamSource,
    /// Explicit case identifiers; generated from type renderings when absent.
    pub ids: Option<Vec<String>>,
    /// Pass-through keyword options for the external runner.
    pub options: BTreeMap<String, String>,
}

impl ParametrizeMarker {
    /// Marker with explicit argument names and types.
    pub fn from_types(argnames: &[&str], types: Vec<TypeExpr>) -> Self {
        Self {
            argnames: argnames.iter().map(|s| s.to_string()).collect(),
            source: ParamSource::Types(types),
            ids: None,
            options: BTreeMap::new(),
        }
    }

    /// Marker deriving argument names and types from a callable's signature.
    pub fn from_callable(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            argnames: Vec::new(),
            source: ParamSource::Callable {
                name: name.into(),
                signature,
            },
            ids: None,
            options: BTreeMap::new(),
        }
    }

    pub fn with_ids(mut self, ids: Vec<String>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// The materialized registration payload handed to the external runner: one
/// row of argument values per generated case.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricCall {
    pub argnames: Vec<String>,
    pub argvalues: Vec<Vec<Expansion>>,
    pub ids: Vec<String>,
    pub options: BTreeMap<String, String>,
}

impl ParametricCall {
    pub fn case_count(&self) -> usize {
        self.argvalues.len()
    }
}

/// Failures while materializing a marker. Binding failures (argument names
/// not matching the test callable) are the runner's concern, not ours.
#[derive(Debug, Clone, PartialEq)]
pub enum ParametrizeError {
    /// Declared argument names and explicit types disagree in count.
    ArityMismatch { argnames: usize, types: usize },
    /// Explicit ids were supplied but do not match the generated case count.
    IdCountMismatch { ids: usize, cases: usize },
    /// The marker declares no arguments at all.
    NoArguments,
}

impl fmt::Display for ParametrizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParametrizeError::ArityMismatch { argnames, types } => write!(
                f,
                "Arity mismatch: {} argument name(s) but {} type(s)",
                argnames, types
            ),
            ParametrizeError::IdCountMismatch { ids, cases } => write!(
                f,
                "Id count mismatch: {} id(s) for {} case(s)",
                ids, cases
            ),
            ParametrizeError::NoArguments => write!(f, "Marker declares no arguments"),
        }
    }
}

impl std::error::Error for ParametrizeError {}

/// The external runner's parametrization registration API.
pub trait Registrar {
    fn parametrize(&mut self, call: ParametricCall);
}

/// Materialize a marker into a parametric call, expanding every argument
/// type with the fixed default configuration.
pub fn build_parametric_call(
    marker: &ParametrizeMarker,
) -> Result<ParametricCall, ParametrizeError> {
    let (base_name, argnames, types) = resolve_arguments(marker)?;
    if argnames.is_empty() {
        return Err(ParametrizeError::NoArguments);
    }

    let config = ExpansionConfig::default();
    let per_arg: Vec<Vec<Expansion>> = types
        .iter()
        .map(|ty| sorted_expansions(&expand_type(ty, &config)))
        .collect();

    // Cartesian product across arguments; identical rows collapse.
    let mut seen: HashSet<Vec<Expansion>> = HashSet::new();
    let mut argvalues: Vec<Vec<Expansion>> = Vec::new();
    for row in cartesian_rows(&per_arg) {
        if seen.insert(row.clone()) {
            argvalues.push(row);
        }
    }

    let ids = match &marker.ids {
        Some(ids) => {
            if ids.len() != argvalues.len() {
                return Err(ParametrizeError::IdCountMismatch {
                    ids: ids.len(),
                    cases: argvalues.len(),
                });
            }
            ids.clone()
        }
        None => argvalues.iter().map(|row| case_id(&base_name, row)).collect(),
    };

    Ok(ParametricCall {
        argnames,
        argvalues,
        ids,
        options: marker.options.clone(),
    })
}

/// Materialize a marker and register it with the runner.
pub fn register_parametrize(
    marker: &ParametrizeMarker,
    registrar: &mut dyn Registrar,
) -> Result<(), ParametrizeError> {
    let call = build_parametric_call(marker)?;
    registrar.parametrize(call);
    Ok(())
}

fn resolve_arguments(
    marker: &ParametrizeMarker,
) -> Result<(String, Vec<String>, Vec<TypeExpr>), ParametrizeError> {
    match &marker.source {
        ParamSource::Types(types) => {
            if marker.argnames.len() != types.len() {
                return Err(ParametrizeError::ArityMismatch {
                    argnames: marker.argnames.len(),
                    types: types.len(),
                });
            }
            Ok((
                marker.argnames.join("-"),
                marker.argnames.clone(),
                types.clone(),
            ))
        }
        ParamSource::Callable { name, signature } => {
            let argnames = signature.param_names();
            let types = signature
                .params
                .iter()
                // Unannotated parameters degrade to an opaque named type, the
                // same atomic fallback the engine applies.
                .map(|p| p.ty.clone().unwrap_or_else(|| TypeExpr::named("untyped")))
                .collect();
            Ok((name.clone(), argnames, types))
        }
    }
}

fn cartesian_rows(per_arg: &[Vec<Expansion>]) -> Vec<Vec<Expansion>> {
    let mut acc: Vec<Vec<Expansion>> = vec![Vec::new()];
    for candidates in per_arg {
        let mut next = Vec::with_capacity(acc.len() * candidates.len());
        for prefix in &acc {
            for candidate in candidates {
                let mut row = prefix.clone();
                row.push(candidate.clone());
                next.push(row);
            }
        }
        acc = next;
    }
    acc
}

/// Human-readable case identifier: the declared/callable name plus the
/// bracketed rendering of the case's representative types.
fn case_id(base: &str, row: &[Expansion]) -> String {
    let rendered: Vec<String> = row.iter().map(ToString::to_string).collect();
    format!("{}[{}]", base, rendered.join("-"))
}
