//! The panel registry: owns every panel's schema, live values, presets and
//! spring modes, and tells subscribers when any of it changes.
//!
//! A [`DialStore`] is a cheap, cloneable handle. All clones share one store,
//! so a host can hand the same store to its adapters and to its own code. It
//! is single-threaded by construction (`Rc`/`RefCell`); no internal borrow is
//! ever held while listeners run, which lets listeners read from and write to
//! the store they are listening to.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::config::DialConfig;
use super::resolve::{ResolvedValues, build_resolved_values, resolve_schema};
use super::ui_controls::{
    ControlKind, ControlMeta, ControlValue, ControlValues, leaf_controls,
};
use crate::core::prelude::*;
use crate::core::util::round_value;
use crate::motion::SpringMode;
use crate::runtime::serialization::{DialSettings, PanelState};
use crate::runtime::storage::PresetStorage;

pub const DEFAULT_MAX_NOTIFY_DEPTH: usize = 16;

/// What changed in a single panel
#[derive(Clone, Debug, PartialEq)]
pub enum PanelEvent {
    /// The panel was registered again with a (possibly) new schema
    Registered,
    ValueChanged { path: String },
    PresetSaved { preset_id: String },
    PresetLoaded { preset_id: String },
    PresetDeleted { preset_id: String },
    ActivePresetCleared,
    SpringModeChanged { path: String, mode: SpringMode },
}

/// Panels coming and going
#[derive(Clone, Debug, PartialEq)]
pub enum RegistryEvent {
    Registered { id: String },
    Unregistered { id: String },
}

/// A named snapshot of a panel's values
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub values: ControlValues,
}

/// Everything an adapter needs to draw a panel
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PanelSummary {
    pub id: String,
    pub name: String,
    pub controls: Vec<ControlMeta>,
    pub values: ControlValues,
}

type PanelListener = Rc<dyn Fn(&PanelEvent)>;
type RegistryListener = Rc<dyn Fn(&RegistryEvent)>;
type ActionListener = Rc<dyn Fn(&str)>;

struct Listeners<F: ?Sized>(Vec<(u64, Rc<F>)>);

impl<F: ?Sized> Listeners<F> {
    fn add(&mut self, id: u64, listener: Rc<F>) {
        self.0.push((id, listener));
    }

    fn remove(&mut self, id: u64) {
        self.0.retain(|(listener_id, _)| *listener_id != id);
    }

    fn snapshot(&self) -> Vec<Rc<F>> {
        self.0.iter().map(|(_, listener)| listener.clone()).collect()
    }
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<F: ?Sized> std::fmt::Debug for Listeners<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listeners({})", self.0.len())
    }
}

#[derive(Debug)]
struct Panel {
    id: String,
    name: String,
    schema: DialConfig,
    controls: Vec<ControlMeta>,
    /// `path => descriptor` for every non-folder control
    leaves: HashMap<String, ControlMeta>,
    values: ControlValues,
    presets: Vec<Preset>,
    active_preset_id: Option<String>,
    /// Explicit mode choices. Springs without an entry report the mode their
    /// current value implies.
    spring_modes: HashMap<String, SpringMode>,
    listeners: Listeners<dyn Fn(&PanelEvent)>,
    action_listeners: Listeners<dyn Fn(&str)>,
}

impl Panel {
    fn new(id: &str, name: &str, schema: DialConfig) -> Self {
        let resolved = resolve_schema(&schema);
        Self {
            id: id.to_string(),
            name: name.to_string(),
            leaves: index_leaves(&resolved.controls),
            controls: resolved.controls,
            values: resolved.defaults,
            schema,
            presets: vec![],
            active_preset_id: None,
            spring_modes: HashMap::default(),
            listeners: Listeners::default(),
            action_listeners: Listeners::default(),
        }
    }

    /// Swaps in a new schema. Editable values survive where the path still
    /// exists with the same kind of value; everything else, constants
    /// included, starts from the new defaults.
    fn replace_schema(&mut self, name: &str, schema: DialConfig) {
        let resolved = resolve_schema(&schema);
        let leaves = index_leaves(&resolved.controls);
        let values = resolved
            .defaults
            .into_iter()
            .map(|(path, default)| match self.values.get(&path) {
                Some(current)
                    if leaves.contains_key(&path)
                        && current.same_kind(&default) =>
                {
                    (path, current.clone())
                }
                _ => (path, default),
            })
            .collect();

        self.spring_modes.retain(|path, _| {
            leaves.get(path).is_some_and(|control| control.is_spring())
        });
        self.name = name.to_string();
        self.schema = schema;
        self.controls = resolved.controls;
        self.leaves = leaves;
        self.values = values;
    }

    fn summary(&self) -> PanelSummary {
        PanelSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            controls: self.controls.clone(),
            values: self.values.clone(),
        }
    }

    fn resolved_values(&self) -> ResolvedValues {
        build_resolved_values(&self.schema, &self.values, "")
    }

    fn leaf(&self, path: &str) -> Result<&ControlMeta> {
        match self.leaves.get(path) {
            Some(control) => Ok(control),
            None if self.values.contains_key(path) => Err(DialError::ReadOnly {
                panel: self.id.clone(),
                path: path.to_string(),
            }),
            None => Err(self.invalid_path(path)),
        }
    }

    fn invalid_path(&self, path: &str) -> DialError {
        DialError::InvalidPath {
            panel: self.id.clone(),
            path: path.to_string(),
        }
    }

    /// Validates and stores `value`, returning whether doing so cleared the
    /// active preset
    fn set_value(&mut self, path: &str, value: ControlValue) -> Result<bool> {
        let control = self.leaf(path)?;
        if control.is_action() {
            return Err(self.invalid_path(path));
        }
        if !control.accepts(&value) {
            return Err(DialError::TypeMismatch {
                path: path.to_string(),
                expected: control.expected_kind().to_string(),
            });
        }
        if let Some(reason) = invalid_reason(&value) {
            return Err(DialError::InvalidValue {
                path: path.to_string(),
                reason,
            });
        }

        let value = match (&control.kind, value) {
            (ControlKind::Slider { step, .. }, ControlValue::Number(v)) => {
                ControlValue::Number(round_value(v, *step))
            }
            (_, value) => value,
        };

        let cleared = self.invalidate_active_preset(path, &value);
        self.values.insert(path.to_string(), value);
        Ok(cleared)
    }

    /// The active preset stays active only while the live values still match
    /// it. A dangling active id is always dropped.
    fn invalidate_active_preset(
        &mut self,
        path: &str,
        value: &ControlValue,
    ) -> bool {
        let Some(active_id) = &self.active_preset_id else {
            return false;
        };
        let still_matches = self
            .presets
            .iter()
            .find(|preset| &preset.id == active_id)
            .is_some_and(|preset| preset.values.get(path) == Some(value));

        if !still_matches {
            self.active_preset_id = None;
        }
        !still_matches
    }

    /// Copies preset values over the live ones. Constants, paths the schema
    /// no longer has, and paths whose kind changed are ignored.
    fn apply_overlay(&mut self, values: &ControlValues) {
        for (path, value) in values {
            if !self.leaves.contains_key(path) {
                continue;
            }
            let Some(slot) = self.values.get_mut(path) else {
                continue;
            };
            if !slot.same_kind(value) {
                continue;
            }
            *slot = value.clone();
            if value.as_spring().is_some() {
                self.spring_modes.remove(path);
            }
        }
    }

    fn spring_mode(&self, path: &str) -> Result<SpringMode> {
        let control = self.leaf(path)?;
        if !control.is_spring() {
            return Err(self.invalid_path(path));
        }
        let mode = self.spring_modes.get(path).copied().unwrap_or_else(|| {
            self.values
                .get(path)
                .and_then(ControlValue::as_spring)
                .map(|spring| spring.implied_mode())
                .unwrap_or_default()
        });
        Ok(mode)
    }

    fn preset_index(&self, preset_id: &str) -> Result<usize> {
        self.presets
            .iter()
            .position(|preset| preset.id == preset_id)
            .ok_or_else(|| DialError::PresetNotFound {
                panel: self.id.clone(),
                preset: preset_id.to_string(),
            })
    }

    fn state(&self) -> PanelState {
        PanelState::new(self.presets.clone(), self.active_preset_id.clone())
    }

    fn restore(&mut self, state: PanelState) {
        self.presets = state.presets;
        let Some(active_id) = state.active_preset_id else {
            return;
        };
        if let Ok(index) = self.preset_index(&active_id) {
            let values = self.presets[index].values.clone();
            self.apply_overlay(&values);
            self.active_preset_id = Some(active_id);
        }
    }
}

/// Values that could not be written back out as JSON, or that would make the
/// spring math blow up
fn invalid_reason(value: &ControlValue) -> Option<String> {
    match value {
        ControlValue::Number(v) if !v.is_finite() => {
            Some(format!("{} is not a finite number", v))
        }
        ControlValue::Spring(spring) => spring
            .invalid_field()
            .map(|field| format!("spring field `{}` is out of range", field)),
        _ => None,
    }
}

fn index_leaves(controls: &[ControlMeta]) -> HashMap<String, ControlMeta> {
    leaf_controls(controls)
        .into_iter()
        .map(|control| (control.path.clone(), control.clone()))
        .collect()
}

#[derive(Debug, Default)]
struct StoreState {
    panels: IndexMap<String, Panel>,
    registry_listeners: Listeners<dyn Fn(&RegistryEvent)>,
}

struct StoreInner {
    state: RefCell<StoreState>,
    storage: Option<Box<dyn PresetStorage>>,
    max_notify_depth: usize,
    notify_depth: Cell<usize>,
    panel_counter: Cell<u64>,
    preset_counter: Cell<u64>,
    subscription_counter: Cell<u64>,
}

impl StoreInner {
    fn next_subscription_id(&self) -> u64 {
        let id = self.subscription_counter.get() + 1;
        self.subscription_counter.set(id);
        id
    }

    fn remove_listener(&self, kind: &SubscriptionKind, id: u64) {
        let mut state = self.state.borrow_mut();
        match kind {
            SubscriptionKind::Registry => state.registry_listeners.remove(id),
            SubscriptionKind::Panel(panel_id) => {
                if let Some(panel) = state.panels.get_mut(panel_id) {
                    panel.listeners.remove(id);
                }
            }
            SubscriptionKind::Actions(panel_id) => {
                if let Some(panel) = state.panels.get_mut(panel_id) {
                    panel.action_listeners.remove(id);
                }
            }
        }
    }
}

/// Restores the notification depth even if a listener panics
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[derive(Debug)]
enum SubscriptionKind {
    Registry,
    Panel(String),
    Actions(String),
}

/// Returned by every `subscribe*` call. Dropping it keeps the listener
/// registered; call [`Subscription::unsubscribe`] to remove it. Listeners
/// registered on a panel are also dropped when that panel is unregistered.
#[derive(Debug)]
pub struct Subscription {
    store: Weak<StoreInner>,
    kind: SubscriptionKind,
    id: u64,
    active: Cell<bool>,
}

impl Subscription {
    /// Safe to call any number of times, including from inside the listener
    /// itself while it is being delivered to
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(inner) = self.store.upgrade() {
            inner.remove_listener(&self.kind, self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl std::fmt::Debug for StoreInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DialStore")
    }
}

#[derive(Default)]
pub struct DialStoreBuilder {
    storage: Option<Box<dyn PresetStorage>>,
    max_notify_depth: Option<usize>,
}

impl DialStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage(mut self, storage: impl PresetStorage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn settings(mut self, settings: &DialSettings) -> Self {
        self.max_notify_depth = Some(settings.max_notify_depth);
        self
    }

    pub fn max_notify_depth(mut self, depth: usize) -> Self {
        self.max_notify_depth = Some(depth);
        self
    }

    pub fn build(self) -> DialStore {
        DialStore {
            inner: Rc::new(StoreInner {
                state: RefCell::new(StoreState::default()),
                storage: self.storage,
                max_notify_depth: self
                    .max_notify_depth
                    .unwrap_or(DEFAULT_MAX_NOTIFY_DEPTH)
                    .max(1),
                notify_depth: Cell::new(0),
                panel_counter: Cell::new(0),
                preset_counter: Cell::new(0),
                subscription_counter: Cell::new(0),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DialStore {
    inner: Rc<StoreInner>,
}

/// Non-owning reference to a [`DialStore`], for listeners that need to call
/// back into the store without keeping it alive
#[derive(Clone, Debug)]
pub struct WeakDialStore {
    inner: Weak<StoreInner>,
}

impl WeakDialStore {
    pub fn upgrade(&self) -> Option<DialStore> {
        self.inner.upgrade().map(|inner| DialStore { inner })
    }
}

impl Default for DialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DialStore {
    pub fn new() -> Self {
        DialStoreBuilder::new().build()
    }

    pub fn builder() -> DialStoreBuilder {
        DialStoreBuilder::new()
    }

    pub fn with_storage(storage: impl PresetStorage + 'static) -> Self {
        DialStoreBuilder::new().storage(storage).build()
    }

    pub fn downgrade(&self) -> WeakDialStore {
        WeakDialStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Yields `"{name}-{n}"` with `n` unique for the lifetime of this store
    pub fn next_panel_id(&self, name: &str) -> String {
        let n = self.inner.panel_counter.get() + 1;
        self.inner.panel_counter.set(n);
        format!("{}-{}", name, n)
    }

    /// Registers a panel, or re-registers an existing one. Re-registering
    /// keeps presets, subscribers and any value whose path and kind survived
    /// the schema change.
    pub fn register_panel(&self, id: &str, name: &str, schema: DialConfig) {
        let existed = {
            let mut state = self.inner.state.borrow_mut();
            match state.panels.get_mut(id) {
                Some(panel) => {
                    panel.replace_schema(name, schema);
                    true
                }
                None => {
                    let mut panel = Panel::new(id, name, schema);
                    if let Some(persisted) = self.load_persisted(id) {
                        panel.restore(persisted);
                    }
                    state.panels.insert(id.to_string(), panel);
                    false
                }
            }
        };

        debug!(
            "{} panel {} ({})",
            ternary!(existed, "Re-registered", "Registered"),
            id,
            name
        );
        if existed {
            self.emit_panel(id, PanelEvent::Registered);
        }
        self.emit_registry(RegistryEvent::Registered { id: id.to_string() });
    }

    /// Removes the panel along with its subscribers. Unknown ids are a no-op.
    pub fn unregister_panel(&self, id: &str) {
        let removed = self.inner.state.borrow_mut().panels.shift_remove(id);
        if removed.is_some() {
            debug!("Unregistered panel {}", id);
            self.emit_registry(RegistryEvent::Unregistered {
                id: id.to_string(),
            });
        }
    }

    pub fn has_panel(&self, id: &str) -> bool {
        self.inner.state.borrow().panels.contains_key(id)
    }

    /// All panels in registration order
    pub fn get_panels(&self) -> Vec<PanelSummary> {
        self.inner
            .state
            .borrow()
            .panels
            .values()
            .map(Panel::summary)
            .collect()
    }

    pub fn get_panel(&self, id: &str) -> Result<PanelSummary> {
        self.with_panel(id, |panel| Ok(panel.summary()))
    }

    /// Flat `path => value` map
    pub fn get_values(&self, id: &str) -> Result<ControlValues> {
        self.with_panel(id, |panel| Ok(panel.values.clone()))
    }

    /// Values nested the way the schema nests them
    pub fn get_resolved_values(&self, id: &str) -> Result<ResolvedValues> {
        self.with_panel(id, |panel| Ok(panel.resolved_values()))
    }

    pub fn update_value(
        &self,
        id: &str,
        path: &str,
        value: impl Into<ControlValue>,
    ) -> Result<()> {
        let value = value.into();
        let cleared =
            self.with_panel_mut(id, |panel| panel.set_value(path, value))?;
        trace!("{}: {} updated", id, path);
        if cleared {
            self.persist(id);
        }
        self.emit_panel(
            id,
            PanelEvent::ValueChanged {
                path: path.to_string(),
            },
        );
        Ok(())
    }

    /// Fires the action at `path`. Only action listeners hear about it; the
    /// panel's values are untouched.
    pub fn trigger_action(&self, id: &str, path: &str) -> Result<()> {
        let listeners = self.with_panel(id, |panel| {
            let control = panel.leaf(path)?;
            if !control.is_action() {
                return Err(panel.invalid_path(path));
            }
            Ok(panel.action_listeners.snapshot())
        })?;
        debug!("{}: action {} triggered", id, path);
        self.deliver(|| {
            for listener in &listeners {
                listener(path);
            }
        });
        Ok(())
    }

    pub fn subscribe(
        &self,
        id: &str,
        listener: impl Fn(&PanelEvent) + 'static,
    ) -> Result<Subscription> {
        let listener: PanelListener = Rc::new(listener);
        let subscription_id = self.inner.next_subscription_id();
        self.with_panel_mut(id, |panel| {
            panel.listeners.add(subscription_id, listener);
            Ok(())
        })?;
        Ok(self.subscription(
            SubscriptionKind::Panel(id.to_string()),
            subscription_id,
        ))
    }

    pub fn subscribe_global(
        &self,
        listener: impl Fn(&RegistryEvent) + 'static,
    ) -> Subscription {
        let listener: RegistryListener = Rc::new(listener);
        let subscription_id = self.inner.next_subscription_id();
        self.inner
            .state
            .borrow_mut()
            .registry_listeners
            .add(subscription_id, listener);
        self.subscription(SubscriptionKind::Registry, subscription_id)
    }

    pub fn subscribe_actions(
        &self,
        id: &str,
        listener: impl Fn(&str) + 'static,
    ) -> Result<Subscription> {
        let listener: ActionListener = Rc::new(listener);
        let subscription_id = self.inner.next_subscription_id();
        self.with_panel_mut(id, |panel| {
            panel.action_listeners.add(subscription_id, listener);
            Ok(())
        })?;
        Ok(self.subscription(
            SubscriptionKind::Actions(id.to_string()),
            subscription_id,
        ))
    }

    /// Snapshots the current values under `name` and makes the new preset
    /// active
    pub fn save_preset(&self, id: &str, name: &str) -> Result<Preset> {
        let preset = self.with_panel_mut(id, |panel| {
            let preset = Preset {
                id: self.next_preset_id(panel),
                name: name.to_string(),
                values: panel.values.clone(),
            };
            panel.presets.push(preset.clone());
            panel.active_preset_id = Some(preset.id.clone());
            Ok(preset)
        })?;

        info!("{}: saved preset \"{}\" ({})", id, name, preset.id);
        self.persist(id);
        self.emit_panel(
            id,
            PanelEvent::PresetSaved {
                preset_id: preset.id.clone(),
            },
        );
        Ok(preset)
    }

    /// The default name for the next preset. The unsaved baseline counts as
    /// version 1, so the first saved preset is "Version 2".
    pub fn next_preset_name(&self, id: &str) -> Result<String> {
        self.with_panel(id, |panel| {
            Ok(format!("Version {}", panel.presets.len() + 2))
        })
    }

    /// Overlays the preset's values and makes it active. Subscribers are
    /// notified once for the whole load.
    pub fn load_preset(&self, id: &str, preset_id: &str) -> Result<()> {
        self.with_panel_mut(id, |panel| {
            let index = panel.preset_index(preset_id)?;
            let values = panel.presets[index].values.clone();
            panel.apply_overlay(&values);
            panel.active_preset_id = Some(preset_id.to_string());
            Ok(())
        })?;

        info!("{}: loaded preset {}", id, preset_id);
        self.persist(id);
        self.emit_panel(
            id,
            PanelEvent::PresetLoaded {
                preset_id: preset_id.to_string(),
            },
        );
        Ok(())
    }

    /// Removes the preset. Live values stay as they are; the active marker
    /// is cleared if it pointed at the deleted preset.
    pub fn delete_preset(&self, id: &str, preset_id: &str) -> Result<()> {
        self.with_panel_mut(id, |panel| {
            let index = panel.preset_index(preset_id)?;
            panel.presets.remove(index);
            if panel.active_preset_id.as_deref() == Some(preset_id) {
                panel.active_preset_id = None;
            }
            Ok(())
        })?;

        info!("{}: deleted preset {}", id, preset_id);
        self.persist(id);
        self.emit_panel(
            id,
            PanelEvent::PresetDeleted {
                preset_id: preset_id.to_string(),
            },
        );
        Ok(())
    }

    pub fn clear_active_preset_id(&self, id: &str) -> Result<()> {
        self.with_panel_mut(id, |panel| {
            panel.active_preset_id = None;
            Ok(())
        })?;
        self.persist(id);
        self.emit_panel(id, PanelEvent::ActivePresetCleared);
        Ok(())
    }

    pub fn get_presets(&self, id: &str) -> Result<Vec<Preset>> {
        self.with_panel(id, |panel| Ok(panel.presets.clone()))
    }

    pub fn get_active_preset_id(&self, id: &str) -> Result<Option<String>> {
        self.with_panel(id, |panel| Ok(panel.active_preset_id.clone()))
    }

    pub fn get_spring_mode(&self, id: &str, path: &str) -> Result<SpringMode> {
        self.with_panel(id, |panel| panel.spring_mode(path))
    }

    /// Switches the editing mode of the spring at `path`, converting its value
    /// into the new mode's fields so the motion stays (approximately) the
    /// same
    pub fn update_spring_mode(
        &self,
        id: &str,
        path: &str,
        mode: SpringMode,
    ) -> Result<()> {
        let cleared = self.with_panel_mut(id, |panel| {
            let current = panel.spring_mode(path)?;
            let spring = panel
                .values
                .get(path)
                .and_then(ControlValue::as_spring)
                .cloned()
                .unwrap_or_default();
            let converted = spring.convert(current, mode);
            let cleared =
                panel.set_value(path, ControlValue::Spring(converted))?;
            panel.spring_modes.insert(path.to_string(), mode);
            Ok(cleared)
        })?;

        debug!("{}: {} switched to {:?} mode", id, path, mode);
        if cleared {
            self.persist(id);
        }
        self.emit_panel(
            id,
            PanelEvent::SpringModeChanged {
                path: path.to_string(),
                mode,
            },
        );
        Ok(())
    }

    /// The persistable part of a panel
    pub fn export_panel_state(&self, id: &str) -> Result<PanelState> {
        self.with_panel(id, |panel| Ok(panel.state()))
    }

    fn with_panel<R>(
        &self,
        id: &str,
        f: impl FnOnce(&Panel) -> Result<R>,
    ) -> Result<R> {
        let state = self.inner.state.borrow();
        let panel = state
            .panels
            .get(id)
            .ok_or_else(|| DialError::PanelNotFound(id.to_string()))?;
        f(panel)
    }

    fn with_panel_mut<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Panel) -> Result<R>,
    ) -> Result<R> {
        let mut state = self.inner.state.borrow_mut();
        let panel = state
            .panels
            .get_mut(id)
            .ok_or_else(|| DialError::PanelNotFound(id.to_string()))?;
        f(panel)
    }

    fn subscription(&self, kind: SubscriptionKind, id: u64) -> Subscription {
        Subscription {
            store: Rc::downgrade(&self.inner),
            kind,
            id,
            active: Cell::new(true),
        }
    }

    /// Preset ids are unique per panel even when presets were restored from
    /// storage with ids from an earlier session
    fn next_preset_id(&self, panel: &Panel) -> String {
        loop {
            let n = self.inner.preset_counter.get() + 1;
            self.inner.preset_counter.set(n);
            let id = format!("preset-{}", n);
            if panel.preset_index(&id).is_err() {
                return id;
            }
        }
    }

    fn load_persisted(&self, id: &str) -> Option<PanelState> {
        let storage = self.inner.storage.as_ref()?;
        match storage.load(id) {
            Ok(state) => state,
            Err(e) => {
                warn!("Unable to load presets for {}: {}", id, e);
                None
            }
        }
    }

    fn persist(&self, id: &str) {
        let Some(storage) = &self.inner.storage else {
            return;
        };
        let Ok(state) = self.export_panel_state(id) else {
            return;
        };
        if let Err(e) = storage.save(id, &state) {
            error!("Unable to persist presets for {}: {}", id, e);
        }
    }

    fn emit_panel(&self, id: &str, event: PanelEvent) {
        let listeners = match self.inner.state.borrow().panels.get(id) {
            Some(panel) => panel.listeners.snapshot(),
            None => return,
        };
        self.deliver(|| {
            for listener in &listeners {
                listener(&event);
            }
        });
    }

    fn emit_registry(&self, event: RegistryEvent) {
        let listeners =
            self.inner.state.borrow().registry_listeners.snapshot();
        self.deliver(|| {
            for listener in &listeners {
                listener(&event);
            }
        });
    }

    /// Runs one notification pass. Listeners may mutate the store, which
    /// starts a nested pass; passes nested deeper than `max_notify_depth` are
    /// dropped.
    fn deliver(&self, notify: impl FnOnce()) {
        let depth = &self.inner.notify_depth;
        if depth.get() >= self.inner.max_notify_depth {
            warn!(
                "Notify depth limit ({}) reached; skipping nested pass",
                self.inner.max_notify_depth
            );
            return;
        }
        depth.set(depth.get() + 1);
        let _guard = DepthGuard { depth };
        notify();
    }
}
