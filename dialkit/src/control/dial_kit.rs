use super::config::DialConfig;
use super::dial_store::{DialStore, Subscription};
use super::resolve::ResolvedValues;
use crate::core::prelude::*;

/// A host's handle to one registered panel.
///
/// ```rust
/// let store = DialStore::new();
/// let kit = DialKit::create(
///     &store,
///     "Card",
///     DialConfigBuilder::new()
///         .slider("radius", 12.0, (0.0, 48.0), 1.0)
///         .build(),
/// );
/// let radius = kit.values()?.float("radius");
/// kit.destroy();
/// ```
#[derive(Debug)]
pub struct DialKit {
    store: DialStore,
    panel_id: String,
}

impl DialKit {
    /// Registers `config` under a fresh id derived from `name`
    pub fn create(store: &DialStore, name: &str, config: DialConfig) -> Self {
        let panel_id = store.next_panel_id(name);
        Self::with_id(store, &panel_id, name, config)
    }

    /// Registers (or re-registers) `config` under a caller-chosen id
    pub fn with_id(
        store: &DialStore,
        panel_id: &str,
        name: &str,
        config: DialConfig,
    ) -> Self {
        store.register_panel(panel_id, name, config);
        Self {
            store: store.clone(),
            panel_id: panel_id.to_string(),
        }
    }

    pub fn panel_id(&self) -> &str {
        &self.panel_id
    }

    pub fn store(&self) -> &DialStore {
        &self.store
    }

    /// Current values shaped like the config. Fails once destroyed.
    pub fn values(&self) -> Result<ResolvedValues> {
        self.store.get_resolved_values(&self.panel_id)
    }

    /// Calls `listener` with fresh values after every change to the panel
    pub fn subscribe(
        &self,
        listener: impl Fn(&ResolvedValues) + 'static,
    ) -> Result<Subscription> {
        let store = self.store.downgrade();
        let panel_id = self.panel_id.clone();
        self.store.subscribe(&self.panel_id, move |_| {
            let Some(store) = store.upgrade() else {
                return;
            };
            match store.get_resolved_values(&panel_id) {
                Ok(values) => listener(&values),
                Err(e) => warn!("Skipping update for {}: {}", panel_id, e),
            }
        })
    }

    /// Calls `listener` with the action's path whenever one is triggered
    pub fn on_action(
        &self,
        listener: impl Fn(&str) + 'static,
    ) -> Result<Subscription> {
        self.store.subscribe_actions(&self.panel_id, listener)
    }

    /// Unregisters the panel. Calling it again does nothing.
    pub fn destroy(&self) {
        self.store.unregister_panel(&self.panel_id);
    }
}
