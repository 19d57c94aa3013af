//! Type expressions and the identity tokens the expansion engine dispatches on.

use std::fmt;

/// Stable identity token for an unparametrized type.
///
/// This is the "origin" of a type expression: the list-kind of a
/// list-of-int, the union-kind of a union, or the type itself when it is not
/// generic. Handler classification and the custom-handler table are both
/// keyed by `Origin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    Bool,
    Int,
    Float,
    Complex,
    Str,
    Bytes,
    NoneType,
    List,
    Set,
    FrozenSet,
    Dict,
    Tuple,
    Union,
    Optional,
    /// A user-defined enumeration, expanded as a sum over its variants.
    Enum(String),
    /// A user-defined or otherwise opaque type, identified by name.
    Named(String),
}

impl Origin {
    /// Whether this origin belongs to the predefined-leaf set: types with no
    /// further expansion, returned as their own representative.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Origin::Bool
                | Origin::Int
                | Origin::Float
                | Origin::Complex
                | Origin::Str
                | Origin::Bytes
                | Origin::NoneType
        )
    }

    /// Whether this origin names a sum type (exactly one of several branches).
    pub fn is_sum(&self) -> bool {
        matches!(self, Origin::Union | Origin::Optional | Origin::Enum(_))
    }

    /// Whether this origin names a built-in product type (an aggregation of
    /// typed positions).
    pub fn is_product(&self) -> bool {
        matches!(
            self,
            Origin::List | Origin::Set | Origin::FrozenSet | Origin::Dict | Origin::Tuple
        )
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Bool => write!(f, "bool"),
            Origin::Int => write!(f, "int"),
            Origin::Float => write!(f, "float"),
            Origin::Complex => write!(f, "complex"),
            Origin::Str => write!(f, "str"),
            Origin::Bytes => write!(f, "bytes"),
            Origin::NoneType => write!(f, "None"),
            Origin::List => write!(f, "list"),
            Origin::Set => write!(f, "set"),
            Origin::FrozenSet => write!(f, "frozenset"),
            Origin::Dict => write!(f, "dict"),
            Origin::Tuple => write!(f, "tuple"),
            Origin::Union => write!(f, "Union"),
            Origin::Optional => write!(f, "Optional"),
            Origin::Enum(name) => write!(f, "{}", name),
            Origin::Named(name) => write!(f, "{}", name),
        }
    }
}

/// A scalar constant usable inside a literal type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(v) => write!(f, "{}", v),
            LiteralValue::Int(v) => write!(f, "{}", v),
            LiteralValue::Str(v) => write!(f, "\"{}\"", v),
        }
    }
}

impl From<bool> for LiteralValue {
    fn from(v: bool) -> Self {
        LiteralValue::Bool(v)
    }
}

impl From<i64> for LiteralValue {
    fn from(v: i64) -> Self {
        LiteralValue::Int(v)
    }
}

impl From<&str> for LiteralValue {
    fn from(v: &str) -> Self {
        LiteralValue::Str(v.to_string())
    }
}

/// An immutable type annotation: a base type, a parametrized generic, a
/// literal enumeration, or the variadic-tuple ellipsis marker.
///
/// Type expressions are plain values with structural equality and hashing, so
/// they participate directly in the set-based deduplication the expansion
/// engine relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// An unparametrized type.
    Atom(Origin),
    /// A parametrized generic with its declared type arguments in order.
    Generic { origin: Origin, args: Vec<TypeExpr> },
    /// A finite enumeration of concrete values; never expanded further.
    Literal(Vec<LiteralValue>),
    /// The `...` marker of a variadic tuple; always opaque.
    Ellipsis,
}

impl TypeExpr {
    pub fn atom(origin: Origin) -> Self {
        TypeExpr::Atom(origin)
    }

    pub fn generic(origin: Origin, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Generic { origin, args }
    }

    /// An opaque user-defined type, identified only by name.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Atom(Origin::Named(name.into()))
    }

    pub fn literal(values: Vec<LiteralValue>) -> Self {
        TypeExpr::Literal(values)
    }

    pub fn list_of(elem: TypeExpr) -> Self {
        TypeExpr::generic(Origin::List, vec![elem])
    }

    pub fn set_of(elem: TypeExpr) -> Self {
        TypeExpr::generic(Origin::Set, vec![elem])
    }

    pub fn frozenset_of(elem: TypeExpr) -> Self {
        TypeExpr::generic(Origin::FrozenSet, vec![elem])
    }

    pub fn dict_of(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::generic(Origin::Dict, vec![key, value])
    }

    pub fn tuple_of(args: Vec<TypeExpr>) -> Self {
        TypeExpr::generic(Origin::Tuple, args)
    }

    /// An ellipsis-terminated homogeneous tuple, e.g. `tuple[int, ...]`.
    pub fn variadic_tuple_of(elem: TypeExpr) -> Self {
        TypeExpr::generic(Origin::Tuple, vec![elem, TypeExpr::Ellipsis])
    }

    pub fn union_of(branches: Vec<TypeExpr>) -> Self {
        TypeExpr::generic(Origin::Union, branches)
    }

    /// Sugar for `Union[T, NoneType]`.
    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::generic(Origin::Optional, vec![inner])
    }

    /// A user-defined enumeration over the given variant types.
    pub fn enum_of(name: impl Into<String>, variants: Vec<TypeExpr>) -> Self {
        TypeExpr::generic(Origin::Enum(name.into()), variants)
    }

    /// The origin of this expression, when it has one. Literal and ellipsis
    /// expressions have no origin; they are terminal markers.
    pub fn origin(&self) -> Option<&Origin> {
        match self {
            TypeExpr::Atom(origin) | TypeExpr::Generic { origin, .. } => Some(origin),
            TypeExpr::Literal(_) | TypeExpr::Ellipsis => None,
        }
    }

    /// The declared type arguments, in order. Empty for non-generic
    /// expressions.
    pub fn args(&self) -> &[TypeExpr] {
        match self {
            TypeExpr::Generic { args, .. } => args,
            _ => &[],
        }
    }

    /// Parse a type expression from its display-style rendering, e.g.
    /// `"list[int]"`, `"dict[str, Optional[int]]"`, `"tuple[int, ...]"`.
    ///
    /// Unknown bare names parse as opaque named types. Returns `None` for
    /// structurally malformed input (unbalanced brackets, empty arguments).
    pub fn parse(text: &str) -> Option<TypeExpr> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text == "..." {
            return Some(TypeExpr::Ellipsis);
        }
        match text.find('[') {
            None => {
                if text.contains(']') || text.contains(',') {
                    return None;
                }
                Some(atom_from_name(text))
            }
            Some(open) => {
                if !text.ends_with(']') {
                    return None;
                }
                let head = text[..open].trim();
                let inner = &text[open + 1..text.len() - 1];
                let args = split_top_level(inner)?
                    .iter()
                    .map(|part| TypeExpr::parse(part))
                    .collect::<Option<Vec<_>>>()?;
                if args.is_empty() {
                    return None;
                }
                let origin = match atom_from_name(head) {
                    TypeExpr::Atom(origin) => origin,
                    _ => return None,
                };
                Some(TypeExpr::generic(origin, args))
            }
        }
    }
}

fn atom_from_name(name: &str) -> TypeExpr {
    let origin = match name {
        "bool" => Origin::Bool,
        "int" => Origin::Int,
        "float" => Origin::Float,
        "complex" => Origin::Complex,
        "str" => Origin::Str,
        "bytes" => Origin::Bytes,
        "None" | "NoneType" => Origin::NoneType,
        "list" => Origin::List,
        "set" => Origin::Set,
        "frozenset" => Origin::FrozenSet,
        "dict" => Origin::Dict,
        "tuple" => Origin::Tuple,
        "Union" => Origin::Union,
        "Optional" => Origin::Optional,
        other => Origin::Named(other.to_string()),
    };
    TypeExpr::Atom(origin)
}

/// Split a bracketed argument list on commas at the top nesting level.
fn split_top_level(text: &str) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut current = String::new();
    for ch in text.chars() {
        match ch {
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(ch),
        }
    }
    if depth != 0 {
        return None;
    }
    let last = current.trim().to_string();
    if last.is_empty() {
        // A trailing comma leaves an empty final segment.
        if !parts.is_empty() {
            return None;
        }
    } else {
        parts.push(last);
    }
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Atom(origin) => write!(f, "{}", origin),
            TypeExpr::Generic { origin, args } => {
                write!(f, "{}[", origin)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, "]")
            }
            TypeExpr::Literal(values) => {
                write!(f, "Literal[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            TypeExpr::Ellipsis => write!(f, "..."),
        }
    }
}
