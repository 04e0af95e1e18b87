//! Registry for all state fee providers and their ports.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ports::{CityFeePort, PortError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Upper-case two-letter state code.
pub struct StateId(pub String);

impl StateId {
    /// Normalize a state code.
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a state and its human-friendly name.
pub struct StateMeta {
    /// Unique identifier.
    pub id: StateId,
    /// Display name.
    pub name: String,
}

/// Fee provider for a single state.
pub struct FeePlugin {
    /// Static metadata describing the state.
    pub meta: StateMeta,
    /// Implementation for resolving city fees.
    pub fee_port: Arc<dyn CityFeePort>,
}

/// Registry that resolves fee providers by state code.
pub struct FeeRegistry {
    plugins: HashMap<StateId, FeePlugin>,
}

impl FeeRegistry {
    /// Build a registry from the provided plugin list.
    ///
    /// When two plugins cover the same state, the later one wins.
    #[must_use]
    pub fn new(plugins: Vec<FeePlugin>) -> Self {
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.meta.id.clone(), plugin))
            .collect();
        Self {
            plugins: plugins_map,
        }
    }

    /// Return metadata for all registered states.
    #[must_use]
    pub fn states(&self) -> Vec<StateMeta> {
        let mut states: Vec<StateMeta> = self
            .plugins
            .values()
            .map(|plugin| plugin.meta.clone())
            .collect();
        states.sort_by(|left, right| left.id.0.cmp(&right.id.0));
        states
    }

    /// Look up the plugin for the given state.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedState`] when no plugin is registered.
    pub fn plugin(&self, state: &StateId) -> Result<&FeePlugin, PortError> {
        self.plugins
            .get(state)
            .ok_or_else(|| PortError::UnsupportedState(state.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::ports::{CityFees, CityQuery};

    struct NamedPort {
        meta: StateMeta,
        label: &'static str,
    }

    #[async_trait]
    impl CityFeePort for NamedPort {
        fn state(&self) -> &StateMeta {
            &self.meta
        }

        async fn lookup(&self, _query: &CityQuery) -> Result<CityFees, PortError> {
            Ok(CityFees::unmatched(self.label))
        }
    }

    fn plugin(code: &str, label: &'static str) -> FeePlugin {
        let meta = StateMeta {
            id: StateId::new(code),
            name: code.to_owned(),
        };
        FeePlugin {
            meta: meta.clone(),
            fee_port: Arc::new(NamedPort { meta, label }),
        }
    }

    #[tokio::test]
    async fn later_plugin_for_same_state_wins() {
        let registry = FeeRegistry::new(vec![plugin("tx", "static"), plugin("TX", "remote")]);
        let found = registry.plugin(&StateId::new("tx")).expect("texas registered");
        let fees = found
            .fee_port
            .lookup(&CityQuery::new("Dallas", "TX"))
            .await
            .expect("lookup succeeds");
        assert_eq!(fees.city_name, "remote");
        assert_eq!(registry.states().len(), 1);
    }

    #[test]
    fn unknown_state_is_unsupported() {
        let registry = FeeRegistry::new(vec![plugin("TX", "static")]);
        assert!(matches!(
            registry.plugin(&StateId::new("OK")),
            Err(PortError::UnsupportedState(code)) if code == "OK"
        ));
    }
}
