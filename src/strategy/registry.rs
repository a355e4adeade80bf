//! Strategy name resolution
//!
//! Lookup order for a mode name:
//!
//! 1. blank name -> [`ConfigError::EmptyMode`]
//! 2. built-in short name
//! 3. `<namespace>.<method>`, split on the last `.`, against registered
//!    external factories

use ahash::AHashMap;

use super::{ResponseGenerator, StrategyFactory, builtin};
use crate::config::{ConfigError, ModeSettings};

/// A group of external strategies published under one namespace
pub trait StrategyProvider {
    fn namespace(&self) -> &str;

    /// `(method, factory)` pairs
    fn factories(&self) -> Vec<(&'static str, StrategyFactory)>;
}

pub struct StrategyRegistry {
    builtins: AHashMap<&'static str, StrategyFactory>,
    external: AHashMap<String, AHashMap<String, StrategyFactory>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyRegistry {
    /// Registry holding only the built-in strategies
    #[must_use]
    pub fn new() -> Self {
        let mut builtins: AHashMap<&'static str, StrategyFactory> =
            AHashMap::with_capacity(builtin::BUILTINS.len());
        for &(name, factory) in builtin::BUILTINS {
            builtins.insert(name, factory);
        }
        Self {
            builtins,
            external: AHashMap::new(),
        }
    }

    pub fn register_external(
        &mut self,
        namespace: impl Into<String>,
        method: impl Into<String>,
        factory: StrategyFactory,
    ) -> &mut Self {
        self.external
            .entry(namespace.into())
            .or_default()
            .insert(method.into(), factory);
        self
    }

    pub fn register_provider<P: StrategyProvider + ?Sized>(&mut self, provider: &P) -> &mut Self {
        let namespace = provider.namespace().to_string();
        for (method, factory) in provider.factories() {
            self.register_external(namespace.clone(), method, factory);
        }
        self
    }

    #[must_use]
    pub fn is_builtin(&self, mode: &str) -> bool {
        self.builtins.contains_key(mode)
    }

    /// Resolve `mode` and build its generator with the scoped settings
    pub fn load(
        &self,
        mode: &str,
        settings: &ModeSettings,
    ) -> Result<Box<dyn ResponseGenerator>, ConfigError> {
        let mode = mode.trim();
        if mode.is_empty() {
            return Err(ConfigError::EmptyMode);
        }

        if let Some(factory) = self.builtins.get(mode) {
            log::debug!("using built-in response strategy {mode}");
            return factory(settings);
        }

        let factory = self.lookup_external(mode)?;
        log::debug!("using external response strategy {mode}");
        factory(settings)
    }

    fn lookup_external(&self, mode: &str) -> Result<StrategyFactory, ConfigError> {
        let Some((namespace, method)) = mode.rsplit_once('.') else {
            return Err(ConfigError::NotQualified(mode.to_string()));
        };
        if namespace.is_empty() || method.is_empty() {
            return Err(ConfigError::NotQualified(mode.to_string()));
        }

        let methods = self
            .external
            .get(namespace)
            .ok_or_else(|| ConfigError::UnknownNamespace(namespace.to_string()))?;
        methods
            .get(method)
            .copied()
            .ok_or_else(|| ConfigError::UnknownMethod {
                namespace: namespace.to_string(),
                method: method.to_string(),
            })
    }
}
