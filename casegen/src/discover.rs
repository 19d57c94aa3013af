//! Discovery of registered runtime objects under a source tree.
//!
//! There is no dynamic module loading to lean on, so discovery walks an
//! ahead-of-time-registered module table: each entry pairs a module name and
//! source path with a loader that produces the module's member objects on
//! demand. Running a loader is the moral equivalent of executing a module's
//! top-level code — it may have arbitrary side effects, and it may fail.
//! A failing loader is recorded as a low-severity diagnostic and skipped;
//! a single broken module never aborts discovery of the rest of the tree.
//!
//! Nothing is cached: every walk re-runs the loaders, sequentially and in
//! registration order, because loading can have ordering-sensitive side
//! effects.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::types::TypeExpr;

/// A module-level runtime constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    None,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::None => write!(f, "None"),
        }
    }
}

/// One parameter of a callable signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    /// Declared annotation; `None` for unannotated parameters.
    pub ty: Option<TypeExpr>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
        }
    }

    pub fn unannotated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
        }
    }
}

/// The declared parameters of a function or constructor, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Param>,
}

impl Signature {
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn param_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }
}

/// A function defined at module level.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionObject {
    pub name: String,
    pub signature: Signature,
}

impl FunctionObject {
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
        }
    }
}

/// A class defined at module level, with its constructor signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassObject {
    pub name: String,
    pub constructor: Signature,
}

impl ClassObject {
    pub fn new(name: impl Into<String>, constructor: Signature) -> Self {
        Self {
            name: name.into(),
            constructor,
        }
    }
}

/// A runtime object a module can define: a function, a class, or a
/// module-level value.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Function(FunctionObject),
    Class(ClassObject),
    Value(Value),
}

impl Object {
    pub fn is_function(&self) -> bool {
        matches!(self, Object::Function(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Object::Class(_))
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Object::Value(_))
    }

    /// The callable signature of this object, if it has one: a function's
    /// own signature, or a class's constructor.
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Object::Function(function) => Some(&function.signature),
            Object::Class(class) => Some(&class.constructor),
            Object::Value(_) => None,
        }
    }

    /// The object's own name, if it carries one. Values are named only by
    /// their module binding.
    pub fn name(&self) -> Option<&str> {
        match self {
            Object::Function(function) => Some(&function.name),
            Object::Class(class) => Some(&class.name),
            Object::Value(_) => None,
        }
    }
}

/// A loaded module: a name, its source path, and its member objects in
/// definition order.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub path: PathBuf,
    members: Vec<(String, Object)>,
}

impl Module {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            members: Vec::new(),
        }
    }

    /// Member enumeration order is definition order.
    pub fn members(&self) -> &[(String, Object)] {
        &self.members
    }

    pub fn with_function(mut self, name: impl Into<String>, signature: Signature) -> Self {
        let name = name.into();
        self.members.push((
            name.clone(),
            Object::Function(FunctionObject::new(name, signature)),
        ));
        self
    }

    pub fn with_class(mut self, name: impl Into<String>, constructor: Signature) -> Self {
        let name = name.into();
        self.members
            .push((name.clone(), Object::Class(ClassObject::new(name, constructor))));
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.members.push((name.into(), Object::Value(value)));
        self
    }

    pub fn push_member(&mut self, name: impl Into<String>, object: Object) {
        self.members.push((name.into(), object));
    }
}

/// A named runtime object yielded once during a walk, paired with its
/// defining module's identity.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredObject {
    /// Name of the defining module.
    pub module: String,
    /// Source path of the defining module.
    pub path: PathBuf,
    /// The member's binding name inside the module.
    pub name: String,
    pub object: Object,
}

/// Why a module failed to load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The module's source is malformed and cannot be executed.
    Syntax { message: String },
    /// Executing the module's top-level code failed.
    Import { message: String },
    /// The entry has no loader at all.
    MissingLoader,
}

impl LoadError {
    pub fn syntax(message: impl Into<String>) -> Self {
        LoadError::Syntax {
            message: message.into(),
        }
    }

    pub fn import(message: impl Into<String>) -> Self {
        LoadError::Import {
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Syntax { message } => write!(f, "Syntax error: {}", message),
            LoadError::Import { message } => write!(f, "Import error: {}", message),
            LoadError::MissingLoader => write!(f, "No loader registered"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Low-severity record of a module skipped during a walk. Diagnostics are
/// accumulated on the walk itself and never surfaced as errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub module: String,
    pub error: LoadError,
}

type LoaderFn = dyn Fn() -> Result<Module, LoadError> + Send + Sync;

/// Produces a module on demand. Running the loader executes the module's
/// "top-level code"; side effects are the caller's contract to accept.
pub type ModuleLoader = Arc<LoaderFn>;

struct Entry {
    name: String,
    path: PathBuf,
    loader: Option<ModuleLoader>,
}

/// Ordered table of registered modules, walked by the discovery operations.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<Entry>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module loader under a name and source path. Registration
    /// order is walk order.
    pub fn register<F>(&mut self, name: impl Into<String>, path: impl Into<PathBuf>, loader: F)
    where
        F: Fn() -> Result<Module, LoadError> + Send + Sync + 'static,
    {
        self.entries.push(Entry {
            name: name.into(),
            path: path.into(),
            loader: Some(Arc::new(loader)),
        });
    }

    /// Register a prebuilt module; the loader yields a clone on every walk.
    pub fn register_module(&mut self, module: Module) {
        let name = module.name.clone();
        let path = module.path.clone();
        self.register(name, path, move || Ok(module.clone()));
    }

    /// Register an entry with no loader; walks record it as skipped.
    pub fn register_unloadable(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.push(Entry {
            name: name.into(),
            path: path.into(),
            loader: None,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Load a single module by registered name. `None` when the name is
    /// unknown or the load fails.
    pub fn load_from_name(&self, name: &str) -> Option<Module> {
        let entry = self.entries.iter().find(|e| e.name == name)?;
        let loader = entry.loader.as_ref()?;
        loader().ok()
    }

    /// Lazily walk every registered module whose source path lies under any
    /// of the given roots. Loaders run sequentially as the iterator advances;
    /// failures are recorded on the walk and skipped.
    pub fn find_modules(&self, paths: impl IntoRoots) -> ModuleWalk<'_> {
        ModuleWalk {
            entries: self.entries.iter(),
            roots: standardize_paths(paths),
            diagnostics: Vec::new(),
        }
    }

    /// Lazily walk every member object of every module under the given
    /// roots, in module member order, optionally filtered by a predicate.
    pub fn find_objects<'a>(
        &'a self,
        paths: impl IntoRoots,
        filter_func: Option<Box<dyn Fn(&DiscoveredObject) -> bool + 'a>>,
    ) -> ObjectWalk<'a> {
        ObjectWalk {
            modules: self.find_modules(paths),
            pending: VecDeque::new(),
            filter: filter_func,
        }
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Iterator over successfully loaded modules; collects per-module load
/// failures as diagnostics instead of raising them.
pub struct ModuleWalk<'a> {
    entries: std::slice::Iter<'a, Entry>,
    roots: Vec<PathBuf>,
    diagnostics: Vec<Diagnostic>,
}

impl ModuleWalk<'_> {
    /// Modules skipped so far, with the reason each was skipped.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl Iterator for ModuleWalk<'_> {
    type Item = Module;

    fn next(&mut self) -> Option<Module> {
        for entry in self.entries.by_ref() {
            let absolute = standardize_path(&entry.path);
            if !self.roots.iter().any(|root| absolute.starts_with(root)) {
                continue;
            }
            match &entry.loader {
                None => self.diagnostics.push(Diagnostic {
                    module: entry.name.clone(),
                    error: LoadError::MissingLoader,
                }),
                Some(loader) => match loader() {
                    Ok(module) => return Some(module),
                    Err(error) => self.diagnostics.push(Diagnostic {
                        module: entry.name.clone(),
                        error,
                    }),
                },
            }
        }
        None
    }
}

/// Iterator over discovered member objects across a module walk.
pub struct ObjectWalk<'a> {
    modules: ModuleWalk<'a>,
    pending: VecDeque<DiscoveredObject>,
    filter: Option<Box<dyn Fn(&DiscoveredObject) -> bool + 'a>>,
}

impl ObjectWalk<'_> {
    /// Modules skipped so far, with the reason each was skipped.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.modules.diagnostics()
    }
}

impl Iterator for ObjectWalk<'_> {
    type Item = DiscoveredObject;

    fn next(&mut self) -> Option<DiscoveredObject> {
        loop {
            while let Some(obj) = self.pending.pop_front() {
                let keep = match &self.filter {
                    Some(filter) => filter(&obj),
                    None => true,
                };
                if keep {
                    return Some(obj);
                }
            }
            let module = self.modules.next()?;
            for (name, object) in module.members() {
                self.pending.push_back(DiscoveredObject {
                    module: module.name.clone(),
                    path: module.path.clone(),
                    name: name.clone(),
                    object: object.clone(),
                });
            }
        }
    }
}

/// Enumerate one module's members, optionally filtered.
pub fn find_module_objects<'a>(
    module: &'a Module,
    filter_func: Option<&'a dyn Fn(&DiscoveredObject) -> bool>,
) -> impl Iterator<Item = DiscoveredObject> + 'a {
    module
        .members()
        .iter()
        .map(move |(name, object)| DiscoveredObject {
            module: module.name.clone(),
            path: module.path.clone(),
            name: name.clone(),
            object: object.clone(),
        })
        .filter(move |obj| match filter_func {
            Some(filter) => filter(obj),
            None => true,
        })
}

/// Search-root input: a single path or any collection of paths.
pub trait IntoRoots {
    fn into_roots(self) -> Vec<PathBuf>;
}

impl IntoRoots for &Path {
    fn into_roots(self) -> Vec<PathBuf> {
        vec![self.to_path_buf()]
    }
}

impl IntoRoots for PathBuf {
    fn into_roots(self) -> Vec<PathBuf> {
        vec![self]
    }
}

impl IntoRoots for &PathBuf {
    fn into_roots(self) -> Vec<PathBuf> {
        vec![self.clone()]
    }
}

impl IntoRoots for &str {
    fn into_roots(self) -> Vec<PathBuf> {
        vec![PathBuf::from(self)]
    }
}

impl<P: AsRef<Path>> IntoRoots for Vec<P> {
    fn into_roots(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

impl<P: AsRef<Path>> IntoRoots for &[P] {
    fn into_roots(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

impl<P: AsRef<Path>, const N: usize> IntoRoots for [P; N] {
    fn into_roots(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

fn standardize_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Normalize search-root input to absolute paths.
pub fn standardize_paths(paths: impl IntoRoots) -> Vec<PathBuf> {
    paths
        .into_roots()
        .iter()
        .map(|p| standardize_path(p))
        .collect()
}

/// Whether an object's defining module lies under the given root.
pub fn is_defined_under(obj: &DiscoveredObject, root: &Path) -> bool {
    if obj.path.as_os_str().is_empty() {
        return false;
    }
    standardize_path(&obj.path).starts_with(standardize_path(root))
}

/// The standard "objects defined under this source tree" predicate: the
/// defining module has a real source path, and that path lies under `root`.
pub fn source_filter(root: impl AsRef<Path>) -> impl Fn(&DiscoveredObject) -> bool {
    let root = standardize_path(root.as_ref());
    move |obj| is_defined_under(obj, &root)
}

#[cfg(feature = "manifest")]
pub use manifest::{Manifest, ManifestError};

#[cfg(feature = "manifest")]
mod manifest {
    //! JSON object-table loading for the module registry.

    use std::fmt;
    use std::path::{Path, PathBuf};

    use serde::Deserialize;

    use super::{LoadError, Module, ModuleRegistry, Object, Param, Signature, Value};
    use crate::types::TypeExpr;

    /// A declarative object table: the ahead-of-time equivalent of a source
    /// tree of loadable modules.
    #[derive(Debug, Clone, Deserialize)]
    pub struct Manifest {
        pub modules: Vec<ManifestModule>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ManifestModule {
        pub name: String,
        pub path: PathBuf,
        #[serde(default)]
        pub members: Vec<ManifestMember>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ManifestMember {
        pub name: String,
        pub kind: String,
        #[serde(default)]
        pub params: Vec<ManifestParam>,
        #[serde(default)]
        pub value: Option<serde_json::Value>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ManifestParam {
        pub name: String,
        #[serde(rename = "type", default)]
        pub ty: Option<String>,
    }

    /// Manifest-level failures: the file itself is unreadable or not valid
    /// JSON. Per-module problems are deferred to load time instead.
    #[derive(Debug)]
    pub enum ManifestError {
        Io {
            path: PathBuf,
            message: String,
        },
        Parse {
            path: PathBuf,
            message: String,
        },
    }

    impl fmt::Display for ManifestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ManifestError::Io { path, message } => {
                    write!(f, "Failed to read manifest {}: {}", path.display(), message)
                }
                ManifestError::Parse { path, message } => {
                    write!(f, "Failed to parse manifest {}: {}", path.display(), message)
                }
            }
        }
    }

    impl std::error::Error for ManifestError {}

    impl Manifest {
        /// Read and parse a manifest file.
        pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            serde_json::from_str(&text).map_err(|e| ManifestError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    }

    fn convert_member(member: &ManifestMember) -> Result<(String, Object), LoadError> {
        let object = match member.kind.as_str() {
            "function" | "class" => {
                let params = member
                    .params
                    .iter()
                    .map(|p| match &p.ty {
                        None => Ok(Param::unannotated(&p.name)),
                        Some(text) => match TypeExpr::parse(text) {
                            Some(ty) => Ok(Param::new(&p.name, ty)),
                            None => Err(LoadError::syntax(format!(
                                "malformed type annotation '{}' on parameter '{}'",
                                text, p.name
                            ))),
                        },
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let signature = Signature::new(params);
                if member.kind == "function" {
                    Object::Function(super::FunctionObject::new(&member.name, signature))
                } else {
                    Object::Class(super::ClassObject::new(&member.name, signature))
                }
            }
            "value" => {
                let value = match &member.value {
                    None | Some(serde_json::Value::Null) => Value::None,
                    Some(serde_json::Value::Bool(v)) => Value::Bool(*v),
                    Some(serde_json::Value::Number(n)) => match n.as_i64() {
                        Some(v) => Value::Int(v),
                        None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
                    },
                    Some(serde_json::Value::String(v)) => Value::Str(v.clone()),
                    Some(other) => {
                        return Err(LoadError::import(format!(
                            "unsupported value for member '{}': {}",
                            member.name, other
                        )));
                    }
                };
                Object::Value(value)
            }
            other => {
                return Err(LoadError::import(format!(
                    "unknown member kind '{}' for member '{}'",
                    other, member.name
                )));
            }
        };
        Ok((member.name.clone(), object))
    }

    fn convert_module(module: &ManifestModule) -> Result<Module, LoadError> {
        let mut out = Module::new(&module.name, &module.path);
        for member in &module.members {
            let (name, object) = convert_member(member)?;
            out.push_member(name, object);
        }
        Ok(out)
    }

    impl ModuleRegistry {
        /// Build a registry from a JSON manifest. Malformed member entries do
        /// not fail here; they make that module's loader fail at walk time,
        /// so one bad module is skipped exactly like any other load failure.
        pub fn from_manifest(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
            let manifest = Manifest::from_file(path)?;
            let mut registry = ModuleRegistry::new();
            for module in manifest.modules {
                let name = module.name.clone();
                let path = module.path.clone();
                registry.register(name, path, move || convert_module(&module));
            }
            Ok(registry)
        }
    }
}
