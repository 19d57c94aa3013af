//! Configuration for the type-expansion engine.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::expand::Expansion;
use crate::types::{Origin, TypeExpr};

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid element cap (must be > 0)
    InvalidMaxElements(usize),
    /// Invalid recursion ceiling (must be > 0)
    InvalidMaxDepth(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidMaxElements(n) => {
                write!(f, "Invalid max elements: {} (must be > 0)", n)
            }
            ConfigError::InvalidMaxDepth(n) => {
                write!(f, "Invalid max depth: {} (must be > 0)", n)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// An override expansion policy for one type origin.
///
/// Custom handlers are consulted before every built-in handler, so a handler
/// registered for `Origin::List` replaces the product handler for all list
/// expressions. Handlers receive the full type expression and the active
/// configuration, and may recurse back into [`crate::expand::expand_type`].
pub type CustomHandler =
    Arc<dyn Fn(&TypeExpr, &ExpansionConfig) -> HashSet<Expansion> + Send + Sync>;

/// Configuration for type expansion.
///
/// Read-only after construction; cloning is cheap (handlers are shared) and a
/// single configuration may be reused across any number of `expand_type`
/// calls, including from multiple threads.
#[derive(Clone)]
pub struct ExpansionConfig {
    /// Cap on enumerated branches per sum type and on values taken from a
    /// predefined literal table. Truncation is first-N in declaration order.
    pub max_elements: usize,
    /// Recursion ceiling; at the ceiling the engine degrades to the atomic
    /// fallback instead of descending further.
    pub max_depth: usize,
    custom_handlers: HashMap<Origin, CustomHandler>,
}

impl ExpansionConfig {
    /// Create a new configuration with validation.
    pub fn new(max_elements: usize, max_depth: usize) -> Result<Self, ConfigError> {
        if max_elements == 0 {
            return Err(ConfigError::InvalidMaxElements(max_elements));
        }
        if max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(max_depth));
        }
        Ok(Self {
            max_elements,
            max_depth,
            custom_handlers: HashMap::new(),
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_elements == 0 {
            return Err(ConfigError::InvalidMaxElements(self.max_elements));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        Ok(())
    }

    /// Set the element cap.
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    /// Set the recursion ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Register a custom handler for a type origin, replacing any previous
    /// handler for that origin.
    pub fn with_handler<F>(mut self, origin: Origin, handler: F) -> Self
    where
        F: Fn(&TypeExpr, &ExpansionConfig) -> HashSet<Expansion> + Send + Sync + 'static,
    {
        self.custom_handlers.insert(origin, Arc::new(handler));
        self
    }

    /// Register a custom handler in place.
    pub fn register_handler<F>(&mut self, origin: Origin, handler: F)
    where
        F: Fn(&TypeExpr, &ExpansionConfig) -> HashSet<Expansion> + Send + Sync + 'static,
    {
        self.custom_handlers.insert(origin, Arc::new(handler));
    }

    /// Look up the custom handler registered for an origin, if any.
    pub fn handler_for(&self, origin: &Origin) -> Option<&CustomHandler> {
        self.custom_handlers.get(origin)
    }

    /// Number of registered custom handlers.
    pub fn handler_count(&self) -> usize {
        self.custom_handlers.len()
    }
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_elements: 5,
            max_depth: 5,
            custom_handlers: HashMap::new(),
        }
    }
}

impl fmt::Debug for ExpansionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionConfig")
            .field("max_elements", &self.max_elements)
            .field("max_depth", &self.max_depth)
            .field("custom_handlers", &self.custom_handlers.len())
            .finish()
    }
}
