//! The type-expansion engine: maps a type expression to the finite set of
//! representative instantiations standing in for its (possibly infinite)
//! value space.
//!
//! Expansion is pure and total: it performs no I/O, never fails, and degrades
//! to returning the type itself for anything it does not recognize. Results
//! are sets; duplicate instantiations collapse through structural equality.

use std::collections::HashSet;
use std::fmt;

use crate::config::ExpansionConfig;
use crate::types::{Origin, TypeExpr};

/// One concrete instantiation of a parametrized type, e.g. "a list of ints"
/// as opposed to the open family "a list of T".
///
/// Equality and hashing are structural, derived from the primary origin and
/// the ordered argument tuple, recursively. Two instantiations differing only
/// in argument order are distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedType {
    /// The unparametrized origin being instantiated.
    pub primary: Origin,
    /// The chosen arguments, one per declared position, in declared order.
    pub args: Vec<Expansion>,
}

impl ExpandedType {
    pub fn new(primary: Origin, args: Vec<Expansion>) -> Self {
        Self { primary, args }
    }
}

impl fmt::Display for ExpandedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.primary)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, "]")
    }
}

/// A member of an expansion result set: either a type standing as its own
/// representative, or one concrete instantiation of a parametrized type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expansion {
    Ty(TypeExpr),
    Instance(ExpandedType),
}

impl fmt::Display for Expansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expansion::Ty(ty) => write!(f, "{}", ty),
            Expansion::Instance(expanded) => write!(f, "{}", expanded),
        }
    }
}

impl From<TypeExpr> for Expansion {
    fn from(ty: TypeExpr) -> Self {
        Expansion::Ty(ty)
    }
}

impl From<ExpandedType> for Expansion {
    fn from(expanded: ExpandedType) -> Self {
        Expansion::Instance(expanded)
    }
}

/// Handler category chosen for a type expression before dispatch.
///
/// Classification is a closed decision: every expression falls into exactly
/// one category, and the fallback makes expansion total over arbitrary input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    /// Predefined leaf type; its own representative.
    Leaf,
    /// Custom-handler override registered for the origin.
    Custom,
    /// Literal enumeration or ellipsis marker; opaque terminal value.
    Literal,
    /// Union, optional, or enumeration; union of branch expansions.
    Sum,
    /// Collection, tuple, or parametrized user generic; Cartesian product
    /// across argument positions.
    Product,
    /// Anything else; treated as opaque/atomic.
    Fallback,
}

fn classify(ty: &TypeExpr, config: &ExpansionConfig) -> Category {
    let origin = match ty {
        TypeExpr::Literal(_) | TypeExpr::Ellipsis => return Category::Literal,
        TypeExpr::Atom(origin) | TypeExpr::Generic { origin, .. } => origin,
    };
    // The leaf check precedes the override table: primitive leaves are the
    // recursion terminator and cannot be re-opened.
    if origin.is_leaf() {
        return Category::Leaf;
    }
    if config.handler_for(origin).is_some() {
        return Category::Custom;
    }
    if origin.is_sum() {
        return Category::Sum;
    }
    if origin.is_product() || matches!(ty, TypeExpr::Generic { .. }) {
        return Category::Product;
    }
    Category::Fallback
}

/// Expand a type expression into its finite set of representative
/// instantiations, using the given configuration.
///
/// Never fails: unrecognized or structureless input yields the singleton set
/// containing the expression itself.
pub fn expand_type(ty: &TypeExpr, config: &ExpansionConfig) -> HashSet<Expansion> {
    expand_at_depth(ty, config, 0)
}

/// Expand a type expression with the default configuration.
pub fn expand_type_default(ty: &TypeExpr) -> HashSet<Expansion> {
    expand_type(ty, &ExpansionConfig::default())
}

fn singleton(ty: &TypeExpr) -> HashSet<Expansion> {
    let mut set = HashSet::with_capacity(1);
    set.insert(Expansion::Ty(ty.clone()));
    set
}

fn expand_at_depth(ty: &TypeExpr, config: &ExpansionConfig, depth: usize) -> HashSet<Expansion> {
    match classify(ty, config) {
        Category::Leaf | Category::Literal | Category::Fallback => singleton(ty),
        Category::Custom => match ty.origin().and_then(|origin| config.handler_for(origin)) {
            Some(handler) => handler(ty, config),
            // Classification saw a handler; a miss here means the origin was
            // lost, so degrade rather than guess.
            None => singleton(ty),
        },
        Category::Sum => {
            if depth >= config.max_depth {
                return singleton(ty);
            }
            expand_sum(ty, config, depth)
        }
        Category::Product => {
            if depth >= config.max_depth {
                return singleton(ty);
            }
            expand_product(ty, config, depth)
        }
    }
}

/// Sum types: the flattened union of every branch's expansion. `Optional[T]`
/// contributes an explicit `NoneType` member alongside `T`'s expansion. At
/// most `max_elements` branches are expanded, in declaration order.
fn expand_sum(ty: &TypeExpr, config: &ExpansionConfig, depth: usize) -> HashSet<Expansion> {
    let (origin, args) = match ty {
        TypeExpr::Generic { origin, args } => (origin, args.as_slice()),
        _ => return singleton(ty),
    };
    if args.is_empty() {
        return singleton(ty);
    }
    let mut out = HashSet::new();
    for branch in args.iter().take(config.max_elements) {
        out.extend(expand_at_depth(branch, config, depth + 1));
    }
    if matches!(origin, Origin::Optional) {
        out.insert(Expansion::Ty(TypeExpr::Atom(Origin::NoneType)));
    }
    out
}

/// Product types: expand every argument position independently, then take the
/// Cartesian product across positions, preserving declared argument order in
/// each resulting instantiation. Ellipsis markers pass through opaque, so an
/// ellipsis-terminated tuple keeps its trailing `...` argument.
fn expand_product(ty: &TypeExpr, config: &ExpansionConfig, depth: usize) -> HashSet<Expansion> {
    let (origin, args) = match ty {
        TypeExpr::Generic { origin, args } => (origin, args.as_slice()),
        _ => return singleton(ty),
    };
    if args.is_empty() {
        return singleton(ty);
    }
    let positions: Vec<Vec<Expansion>> = args
        .iter()
        .map(|arg| expand_at_depth(arg, config, depth + 1).into_iter().collect())
        .collect();
    cartesian_product(&positions)
        .into_iter()
        .map(|combo| Expansion::Instance(ExpandedType::new(origin.clone(), combo)))
        .collect()
}

/// All combinations across candidate positions, left to right.
fn cartesian_product(positions: &[Vec<Expansion>]) -> Vec<Vec<Expansion>> {
    let mut acc: Vec<Vec<Expansion>> = vec![Vec::new()];
    for candidates in positions {
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

/// Render-sort a result set into a deterministic sequence.
///
/// Expansion results compare as sets; callers that need a reproducible
/// ordering (parametrization identifiers, generated output) sort by display
/// rendering.
pub fn sorted_expansions(set: &HashSet<Expansion>) -> Vec<Expansion> {
    let mut out: Vec<Expansion> = set.iter().cloned().collect();
    out.sort_by_key(|e| e.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LiteralValue;

    fn atom(origin: Origin) -> TypeExpr {
        TypeExpr::atom(origin)
    }

    fn expand(ty: &TypeExpr) -> HashSet<Expansion> {
        expand_type_default(ty)
    }

    fn set_of(members: Vec<Expansion>) -> HashSet<Expansion> {
        members.into_iter().collect()
    }

    #[test]
    fn test_base_types_are_their_own_representative() {
        for origin in [
            Origin::Bool,
            Origin::Int,
            Origin::Float,
            Origin::Complex,
            Origin::Str,
            Origin::Bytes,
            Origin::NoneType,
        ] {
            let ty = atom(origin);
            assert_eq!(expand(&ty), set_of(vec![Expansion::Ty(ty.clone())]));
        }
    }

    #[test]
    fn test_unsupported_type_falls_back_to_itself() {
        let ty = TypeExpr::named("DummyClass");
        assert_eq!(expand(&ty), set_of(vec![Expansion::Ty(ty.clone())]));
    }

    #[test]
    fn test_product_types() {
        let int = || atom(Origin::Int);
        let str_ = || atom(Origin::Str);

        let cases: Vec<(TypeExpr, Vec<ExpandedType>)> = vec![
            (
                TypeExpr::list_of(int()),
                vec![ExpandedType::new(Origin::List, vec![int().into()])],
            ),
            (
                TypeExpr::list_of(TypeExpr::list_of(int())),
                vec![ExpandedType::new(
                    Origin::List,
                    vec![ExpandedType::new(Origin::List, vec![int().into()]).into()],
                )],
            ),
            (
                TypeExpr::dict_of(str_(), int()),
                vec![ExpandedType::new(
                    Origin::Dict,
                    vec![str_().into(), int().into()],
                )],
            ),
            (
                TypeExpr::dict_of(str_(), TypeExpr::list_of(int())),
                vec![ExpandedType::new(
                    Origin::Dict,
                    vec![
                        str_().into(),
                        ExpandedType::new(Origin::List, vec![int().into()]).into(),
                    ],
                )],
            ),
            (
                TypeExpr::tuple_of(vec![int()]),
                vec![ExpandedType::new(Origin::Tuple, vec![int().into()])],
            ),
            (
                TypeExpr::tuple_of(vec![int(), str_()]),
                vec![ExpandedType::new(
                    Origin::Tuple,
                    vec![int().into(), str_().into()],
                )],
            ),
            (
                TypeExpr::variadic_tuple_of(int()),
                vec![ExpandedType::new(
                    Origin::Tuple,
                    vec![int().into(), TypeExpr::Ellipsis.into()],
                )],
            ),
            (
                TypeExpr::tuple_of(vec![int(), TypeExpr::dict_of(str_(), int())]),
                vec![ExpandedType::new(
                    Origin::Tuple,
                    vec![
                        int().into(),
                        ExpandedType::new(Origin::Dict, vec![str_().into(), int().into()]).into(),
                    ],
                )],
            ),
            (
                TypeExpr::set_of(str_()),
                vec![ExpandedType::new(Origin::Set, vec![str_().into()])],
            ),
            (
                TypeExpr::frozenset_of(str_()),
                vec![ExpandedType::new(Origin::FrozenSet, vec![str_().into()])],
            ),
        ];
        for (ty, expected) in cases {
            let expected: HashSet<Expansion> =
                expected.into_iter().map(Expansion::Instance).collect();
            assert_eq!(expand(&ty), expected, "expanding {}", ty);
        }
    }

    #[test]
    fn test_tuple_with_union_position_fans_out() {
        let ty = TypeExpr::tuple_of(vec![
            atom(Origin::Int),
            TypeExpr::union_of(vec![atom(Origin::Float), atom(Origin::Str)]),
        ]);
        let expected = set_of(vec![
            ExpandedType::new(
                Origin::Tuple,
                vec![atom(Origin::Int).into(), atom(Origin::Float).into()],
            )
            .into(),
            ExpandedType::new(
                Origin::Tuple,
                vec![atom(Origin::Int).into(), atom(Origin::Str).into()],
            )
            .into(),
        ]);
        assert_eq!(expand(&ty), expected);
    }

    #[test]
    fn test_sum_types() {
        let cases: Vec<(TypeExpr, Vec<TypeExpr>)> = vec![
            (
                TypeExpr::union_of(vec![atom(Origin::Int), atom(Origin::Str)]),
                vec![atom(Origin::Int), atom(Origin::Str)],
            ),
            (
                TypeExpr::union_of(vec![
                    atom(Origin::Int),
                    atom(Origin::Str),
                    atom(Origin::Float),
                ]),
                vec![atom(Origin::Int), atom(Origin::Str), atom(Origin::Float)],
            ),
            (
                TypeExpr::optional(atom(Origin::Int)),
                vec![atom(Origin::Int), atom(Origin::NoneType)],
            ),
            (
                TypeExpr::optional(TypeExpr::optional(atom(Origin::Int))),
                vec![atom(Origin::Int), atom(Origin::NoneType)],
            ),
            (
                TypeExpr::optional(TypeExpr::union_of(vec![
                    atom(Origin::Int),
                    atom(Origin::Str),
                ])),
                vec![atom(Origin::Int), atom(Origin::Str), atom(Origin::NoneType)],
            ),
        ];
        for (ty, expected) in cases {
            let expected: HashSet<Expansion> = expected.into_iter().map(Expansion::Ty).collect();
            assert_eq!(expand(&ty), expected, "expanding {}", ty);
        }
    }

    #[test]
    fn test_literal_types_are_opaque() {
        let ty = TypeExpr::literal(vec![
            LiteralValue::from("a"),
            LiteralValue::from("b"),
            LiteralValue::from("c"),
        ]);
        assert_eq!(expand(&ty), set_of(vec![Expansion::Ty(ty.clone())]));
    }

    #[test]
    fn test_ellipsis_is_opaque() {
        assert_eq!(
            expand(&TypeExpr::Ellipsis),
            set_of(vec![Expansion::Ty(TypeExpr::Ellipsis)])
        );
    }

    #[test]
    fn test_enum_expands_as_sum_over_variants() {
        let ty = TypeExpr::enum_of(
            "Color",
            vec![
                TypeExpr::literal(vec![LiteralValue::from("red")]),
                TypeExpr::literal(vec![LiteralValue::from("green")]),
            ],
        );
        let expected = set_of(vec![
            Expansion::Ty(TypeExpr::literal(vec![LiteralValue::from("red")])),
            Expansion::Ty(TypeExpr::literal(vec![LiteralValue::from("green")])),
        ]);
        assert_eq!(expand(&ty), expected);
    }

    #[test]
    fn test_union_of_products() {
        let ty = TypeExpr::union_of(vec![
            TypeExpr::list_of(atom(Origin::Str)),
            TypeExpr::list_of(atom(Origin::Int)),
            TypeExpr::list_of(atom(Origin::Float)),
        ]);
        let expected = set_of(vec![
            ExpandedType::new(Origin::List, vec![atom(Origin::Str).into()]).into(),
            ExpandedType::new(Origin::List, vec![atom(Origin::Int).into()]).into(),
            ExpandedType::new(Origin::List, vec![atom(Origin::Float).into()]).into(),
        ]);
        assert_eq!(expand(&ty), expected);
    }

    #[test]
    fn test_list_of_union_fans_out() {
        let ty = TypeExpr::list_of(TypeExpr::union_of(vec![
            atom(Origin::Str),
            atom(Origin::Int),
        ]));
        let expected = set_of(vec![
            ExpandedType::new(Origin::List, vec![atom(Origin::Str).into()]).into(),
            ExpandedType::new(Origin::List, vec![atom(Origin::Int).into()]).into(),
        ]);
        assert_eq!(expand(&ty), expected);
    }

    #[test]
    fn test_list_of_union_of_dict_and_optional() {
        let ty = TypeExpr::list_of(TypeExpr::union_of(vec![
            TypeExpr::dict_of(atom(Origin::Str), atom(Origin::Int)),
            TypeExpr::optional(atom(Origin::Int)),
        ]));
        let expected = set_of(vec![
            ExpandedType::new(
                Origin::List,
                vec![
                    ExpandedType::new(
                        Origin::Dict,
                        vec![atom(Origin::Str).into(), atom(Origin::Int).into()],
                    )
                    .into(),
                ],
            )
            .into(),
            ExpandedType::new(Origin::List, vec![atom(Origin::NoneType).into()]).into(),
            ExpandedType::new(Origin::List, vec![atom(Origin::Int).into()]).into(),
        ]);
        assert_eq!(expand(&ty), expected);
    }

    #[test]
    fn test_optional_membership() {
        let result = expand(&TypeExpr::optional(atom(Origin::Int)));
        assert!(result.contains(&Expansion::Ty(atom(Origin::NoneType))));
        assert!(result.contains(&Expansion::Ty(atom(Origin::Int))));
    }

    #[test]
    fn test_union_has_no_implicit_none() {
        let result = expand(&TypeExpr::union_of(vec![
            atom(Origin::Int),
            atom(Origin::Str),
        ]));
        assert!(!result.contains(&Expansion::Ty(atom(Origin::NoneType))));
        assert!(result.contains(&Expansion::Ty(atom(Origin::Int))));
        assert!(result.contains(&Expansion::Ty(atom(Origin::Str))));
    }

    #[test]
    fn test_union_equals_union_of_branch_expansions() {
        let a = TypeExpr::list_of(atom(Origin::Int));
        let b = TypeExpr::optional(atom(Origin::Str));
        let joint = expand(&TypeExpr::union_of(vec![a.clone(), b.clone()]));
        let mut separate = expand(&a);
        separate.extend(expand(&b));
        assert_eq!(joint, separate);
    }

    #[test]
    fn test_dict_of_optional_value() {
        let result = expand(&TypeExpr::dict_of(
            atom(Origin::Str),
            TypeExpr::optional(atom(Origin::Int)),
        ));
        assert!(result.contains(
            &ExpandedType::new(
                Origin::Dict,
                vec![atom(Origin::Str).into(), atom(Origin::Int).into()],
            )
            .into()
        ));
        assert!(result.contains(
            &ExpandedType::new(
                Origin::Dict,
                vec![atom(Origin::Str).into(), atom(Origin::NoneType).into()],
            )
            .into()
        ));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_custom_handler_overrides_builtin() {
        let config = ExpansionConfig::default().with_handler(Origin::List, |_ty, _config| {
            [Expansion::Ty(TypeExpr::atom(Origin::Int))]
                .into_iter()
                .collect()
        });
        let result = expand_type(&TypeExpr::list_of(atom(Origin::Str)), &config);
        assert_eq!(result, set_of(vec![Expansion::Ty(atom(Origin::Int))]));
    }

    #[test]
    fn test_custom_handler_does_not_reopen_leaves() {
        let config = ExpansionConfig::default().with_handler(Origin::Int, |_ty, _config| {
            [Expansion::Ty(TypeExpr::atom(Origin::Str))]
                .into_iter()
                .collect()
        });
        // The leaf check precedes the override table.
        let result = expand_type(&atom(Origin::Int), &config);
        assert_eq!(result, set_of(vec![Expansion::Ty(atom(Origin::Int))]));
    }

    #[test]
    fn test_max_depth_degrades_to_atomic_fallback() {
        let config = ExpansionConfig::default().with_max_depth(2);
        // Three levels of nesting; the innermost list is beyond the ceiling.
        let inner = TypeExpr::list_of(atom(Origin::Int));
        let middle = TypeExpr::list_of(inner.clone());
        let outer = TypeExpr::list_of(middle);
        let result = expand_type(&outer, &config);
        let expected = set_of(vec![
            ExpandedType::new(
                Origin::List,
                vec![
                    ExpandedType::new(Origin::List, vec![Expansion::Ty(inner)]).into(),
                ],
            )
            .into(),
        ]);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_max_elements_truncates_union_branches() {
        let config = ExpansionConfig::default().with_max_elements(2);
        let ty = TypeExpr::union_of(vec![
            atom(Origin::Int),
            atom(Origin::Str),
            atom(Origin::Float),
            atom(Origin::Bytes),
        ]);
        let result = expand_type(&ty, &config);
        // First-N truncation in declaration order.
        let expected = set_of(vec![
            Expansion::Ty(atom(Origin::Int)),
            Expansion::Ty(atom(Origin::Str)),
        ]);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let ty = TypeExpr::dict_of(
            TypeExpr::union_of(vec![atom(Origin::Str), atom(Origin::Int)]),
            TypeExpr::optional(TypeExpr::list_of(atom(Origin::Bool))),
        );
        let first = expand(&ty);
        let second = expand(&ty);
        assert_eq!(first, second);
    }

    #[test]
    fn test_user_generic_expands_as_product() {
        let ty = TypeExpr::generic(
            Origin::Named("Pair".to_string()),
            vec![TypeExpr::optional(atom(Origin::Int)), atom(Origin::Str)],
        );
        let result = expand(&ty);
        let expected = set_of(vec![
            ExpandedType::new(
                Origin::Named("Pair".to_string()),
                vec![atom(Origin::Int).into(), atom(Origin::Str).into()],
            )
            .into(),
            ExpandedType::new(
                Origin::Named("Pair".to_string()),
                vec![atom(Origin::NoneType).into(), atom(Origin::Str).into()],
            )
            .into(),
        ]);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_sorted_expansions_is_stable() {
        let result = expand(&TypeExpr::union_of(vec![
            atom(Origin::Str),
            atom(Origin::Int),
            atom(Origin::Float),
        ]));
        let ordered = sorted_expansions(&result);
        let rendered: Vec<String> = ordered.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["float", "int", "str"]);
    }

    #[test]
    fn test_argument_order_distinguishes_instances() {
        let ab = ExpandedType::new(
            Origin::Dict,
            vec![atom(Origin::Str).into(), atom(Origin::Int).into()],
        );
        let ba = ExpandedType::new(
            Origin::Dict,
            vec![atom(Origin::Int).into(), atom(Origin::Str).into()],
        );
        assert_ne!(ab, ba);
    }
}
