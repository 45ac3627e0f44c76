// Capability Ports - contracts for components referenced from a config
//
// The builder never calls these operations. It only checks that the
// referenced component is registered and exports the operation it needs.

use crate::domain::constants::{BASIC_ENGINE, CRON_EXTENSION, DEFAULT_NOTIFIER, STAGER_EXTENSION};
use crate::domain::{CapabilityRef, Config, OptionSet};
use crate::error::CapabilityViolation;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a component once the runtime drives it
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("Init failed: {0}")]
    InitFailed(String),

    #[error("Listen failed: {0}")]
    ListenFailed(String),
}

/// Execution engine: `init(options, meta)`
pub trait Engine: Send + Sync {
    fn init(&self, options: &OptionSet, meta: &OptionSet) -> Result<(), CapabilityError>;
}

/// Notification transport: `listen(config, events)`
pub trait Notifier: Send + Sync {
    fn listen(&self, config: &Config, events: &[String]) -> Result<(), CapabilityError>;
}

/// Persistence backend: `config()`
pub trait PersistenceBackend: Send + Sync {
    fn config(&self) -> OptionSet;
}

/// Extension: `init(options)`
pub trait Extension: Send + Sync {
    fn init(&self, options: &OptionSet) -> Result<(), CapabilityError>;
}

/// An exported operation, `name/arity`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Export {
    name: Cow<'static, str>,
    arity: usize,
}

impl Export {
    pub const ENGINE_INIT: Export = Export::from_static("init", 2);
    pub const NOTIFIER_LISTEN: Export = Export::from_static("listen", 2);
    pub const BACKEND_CONFIG: Export = Export::from_static("config", 0);
    pub const EXTENSION_INIT: Export = Export::from_static("init", 1);

    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            arity,
        }
    }

    const fn from_static(name: &'static str, arity: usize) -> Self {
        Self {
            name: Cow::Borrowed(name),
            arity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

impl FromStr for Export {
    type Err = String;

    /// Parses `name/arity`, e.g. `init/1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arity) = s
            .rsplit_once('/')
            .ok_or_else(|| format!("expected name/arity, got {:?}", s))?;
        if name.is_empty() {
            return Err(format!("missing operation name in {:?}", s));
        }
        let arity = arity
            .parse()
            .map_err(|_| format!("invalid arity in {:?}", s))?;
        Ok(Export::new(name, arity))
    }
}

#[derive(Default, Clone)]
struct Component {
    exports: BTreeSet<Export>,
    engine: Option<Arc<dyn Engine>>,
    notifier: Option<Arc<dyn Notifier>>,
    backend: Option<Arc<dyn PersistenceBackend>>,
    extension: Option<Arc<dyn Extension>>,
}

/// Registry of components that config options may reference
///
/// A reference is resolvable once anything is registered under it. Typed
/// registration records the matching export; `declare` records exports for
/// components the runtime provides without handing over an implementation.
#[derive(Default, Clone)]
pub struct CapabilityRegistry {
    components: HashMap<CapabilityRef, Component>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry declaring the built-in engine, notifier, cron and stager extensions
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.declare(BASIC_ENGINE, [Export::ENGINE_INIT]);
        registry.declare(DEFAULT_NOTIFIER, [Export::NOTIFIER_LISTEN]);
        registry.declare(CRON_EXTENSION, [Export::EXTENSION_INIT]);
        registry.declare(STAGER_EXTENSION, [Export::EXTENSION_INIT]);
        registry
    }

    pub fn declare(&mut self, capability: CapabilityRef, exports: impl IntoIterator<Item = Export>) {
        self.components
            .entry(capability)
            .or_default()
            .exports
            .extend(exports);
    }

    pub fn register_engine(&mut self, capability: CapabilityRef, engine: impl Engine + 'static) {
        let component = self.components.entry(capability).or_default();
        component.exports.insert(Export::ENGINE_INIT);
        component.engine = Some(Arc::new(engine));
    }

    pub fn register_notifier(
        &mut self,
        capability: CapabilityRef,
        notifier: impl Notifier + 'static,
    ) {
        let component = self.components.entry(capability).or_default();
        component.exports.insert(Export::NOTIFIER_LISTEN);
        component.notifier = Some(Arc::new(notifier));
    }

    pub fn register_backend(
        &mut self,
        capability: CapabilityRef,
        backend: impl PersistenceBackend + 'static,
    ) {
        let component = self.components.entry(capability).or_default();
        component.exports.insert(Export::BACKEND_CONFIG);
        component.backend = Some(Arc::new(backend));
    }

    pub fn register_extension(
        &mut self,
        capability: CapabilityRef,
        extension: impl Extension + 'static,
    ) {
        let component = self.components.entry(capability).or_default();
        component.exports.insert(Export::EXTENSION_INIT);
        component.extension = Some(Arc::new(extension));
    }

    pub fn is_resolvable(&self, capability: &CapabilityRef) -> bool {
        self.components.contains_key(capability)
    }

    /// Exports of a registered component
    pub fn exports(&self, capability: &CapabilityRef) -> Option<&BTreeSet<Export>> {
        self.components.get(capability).map(|c| &c.exports)
    }

    /// Check that `capability` resolves and exports `export`
    pub fn require(
        &self,
        capability: &CapabilityRef,
        export: &Export,
    ) -> Result<(), CapabilityViolation> {
        let component = self
            .components
            .get(capability)
            .ok_or(CapabilityViolation::Unresolvable)?;
        if component.exports.contains(export) {
            Ok(())
        } else {
            Err(CapabilityViolation::MissingExport(export.clone()))
        }
    }

    pub fn engine(&self, capability: &CapabilityRef) -> Option<Arc<dyn Engine>> {
        self.components.get(capability)?.engine.clone()
    }

    pub fn notifier(&self, capability: &CapabilityRef) -> Option<Arc<dyn Notifier>> {
        self.components.get(capability)?.notifier.clone()
    }

    pub fn backend(&self, capability: &CapabilityRef) -> Option<Arc<dyn PersistenceBackend>> {
        self.components.get(capability)?.backend.clone()
    }

    pub fn extension(&self, capability: &CapabilityRef) -> Option<Arc<dyn Extension>> {
        self.components.get(capability)?.extension.clone()
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.components.keys().map(CapabilityRef::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CapabilityRegistry")
            .field("components", &names)
            .finish()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Component that implements every capability and does nothing
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NoopComponent;

    impl Engine for NoopComponent {
        fn init(&self, _options: &OptionSet, _meta: &OptionSet) -> Result<(), CapabilityError> {
            Ok(())
        }
    }

    impl Notifier for NoopComponent {
        fn listen(&self, _config: &Config, _events: &[String]) -> Result<(), CapabilityError> {
            Ok(())
        }
    }

    impl PersistenceBackend for NoopComponent {
        fn config(&self) -> OptionSet {
            OptionSet::new()
        }
    }

    impl Extension for NoopComponent {
        fn init(&self, _options: &OptionSet) -> Result<(), CapabilityError> {
            Ok(())
        }
    }
}
