//! Realms: the per-embedding registry of bridged host objects.
//!
//! A realm hands out at most one live wrapper per host object, so bridging
//! the same object twice yields the same value. The identity caches hold
//! only weak references: neither the host object nor its wrapper is kept
//! alive by being cached.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::bridge::{BridgeValue, HostObject, HostValue, SmartLink};
use crate::value::Value;

/// What happens when a script writes a property a sandboxed host object
/// does not have yet.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum NewPropertyPolicy {
    /// The write goes through. Once created, the property is subject to
    /// the allow-lists like any other.
    #[default]
    Allow,
    /// The write goes through and the script keeps read and write access
    /// to the property it created.
    TrackCreated,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SandboxConfig {
    pub new_properties: NewPropertyPolicy,
}

impl SandboxConfig {
    #[must_use]
    pub fn new_properties(mut self, policy: NewPropertyPolicy) -> Self {
        self.new_properties = policy;
        self
    }
}

/// Identity of a host object: the address of its `Rc` allocation. The
/// allocation cannot be reused while a cache entry holds a `Weak` to it.
type NativeKey = *const ();

fn native_key(native: &Rc<dyn HostObject>) -> NativeKey {
    Rc::as_ptr(native).cast::<()>()
}

/// Entries at which a cache first sweeps dead entries on insert.
const MIN_SWEEP: usize = 64;

struct CacheEntry<W> {
    native: Weak<dyn HostObject>,
    wrapper: Weak<W>,
}

impl<W> CacheEntry<W> {
    fn is_live(&self) -> bool {
        self.native.strong_count() > 0 && self.wrapper.strong_count() > 0
    }
}

struct IdentityCache<W> {
    entries: FxHashMap<NativeKey, CacheEntry<W>>,
    sweep_at: usize,
}

impl<W> Default for IdentityCache<W> {
    fn default() -> Self {
        IdentityCache {
            entries: FxHashMap::default(),
            sweep_at: MIN_SWEEP,
        }
    }
}

impl<W> IdentityCache<W> {
    fn get(&self, native: &Rc<dyn HostObject>) -> Option<Rc<W>> {
        let entry = self.entries.get(&native_key(native))?;
        if entry.native.strong_count() == 0 {
            return None;
        }
        entry.wrapper.upgrade()
    }

    fn insert(&mut self, native: &Rc<dyn HostObject>, wrapper: &Rc<W>) {
        if self.entries.len() >= self.sweep_at {
            self.purge();
            self.sweep_at = (self.entries.len() * 2).max(MIN_SWEEP);
        }
        self.entries.insert(
            native_key(native),
            CacheEntry {
                native: Rc::downgrade(native),
                wrapper: Rc::downgrade(wrapper),
            },
        );
    }

    fn purge(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live());
        before - self.entries.len()
    }

    fn live(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_live()).count()
    }
}

struct WellKnown {
    native: Weak<dyn HostObject>,
    value: Value,
}

#[derive(Default)]
struct RealmInner {
    config: SandboxConfig,
    well_known: RefCell<FxHashMap<NativeKey, WellKnown>>,
    bridges: RefCell<IdentityCache<BridgeValue>>,
    links: RefCell<IdentityCache<SmartLink>>,
}

/// A cheaply clonable handle on a realm.
#[derive(Clone, Default)]
pub struct Realm(Rc<RealmInner>);

impl Realm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SandboxConfig) -> Self {
        Realm(Rc::new(RealmInner {
            config,
            ..RealmInner::default()
        }))
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.0.config
    }

    /// Whether both handles refer to the same realm.
    pub fn ptr_eq(&self, other: &Realm) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Make `value` the canonical script value for `native` in
    /// [`SmartLink::make`]. Registered values live as long as the realm.
    pub fn register_well_known(&self, native: &Rc<dyn HostObject>, value: Value) {
        self.0.well_known.borrow_mut().insert(
            native_key(native),
            WellKnown {
                native: Rc::downgrade(native),
                value,
            },
        );
    }

    pub fn lookup_well_known(&self, native: &Rc<dyn HostObject>) -> Option<Value> {
        self.0
            .well_known
            .borrow()
            .get(&native_key(native))
            .filter(|entry| entry.native.strong_count() > 0)
            .map(|entry| entry.value.clone())
    }

    /// Bring a host value into the script as an unrestricted bridge.
    pub fn from_native(&self, native: HostValue) -> Value {
        match native {
            HostValue::Object(object) => object
                .bookmarked_value()
                .unwrap_or_else(|| self.bridge(object)),
            HostValue::Array(items) => Value::array(
                items
                    .into_iter()
                    .map(|item| self.from_native(item))
                    .collect(),
            ),
            // Only objects need a realm, so this cannot fail.
            primitive => Value::from_native(primitive, None).unwrap_or_default(),
        }
    }

    /// Bring a host value into the script through the sandbox.
    pub fn make_link(&self, native: HostValue) -> Value {
        SmartLink::make(native, self)
    }

    /// The bridge for `native`, reusing a live one.
    pub fn bridge(&self, native: Rc<dyn HostObject>) -> Value {
        if let Some(bridge) = self.0.bridges.borrow().get(&native) {
            tracing::trace!(native = %native.display(), "bridge cache hit");
            return Value::Bridge(bridge);
        }
        let bridge = Rc::new(BridgeValue::new(self.clone(), Rc::clone(&native)));
        self.0.bridges.borrow_mut().insert(&native, &bridge);
        Value::Bridge(bridge)
    }

    /// The smart link for `native`, reusing a live one.
    pub(crate) fn link(&self, native: Rc<dyn HostObject>) -> Value {
        if let Some(link) = self.0.links.borrow().get(&native) {
            tracing::trace!(native = %native.display(), "link cache hit");
            return Value::Link(link);
        }
        let link = Rc::new(SmartLink::new(self.clone(), Rc::clone(&native)));
        self.0.links.borrow_mut().insert(&native, &link);
        Value::Link(link)
    }

    /// Drop cache entries whose host object or wrapper is gone. Returns
    /// how many were removed.
    pub fn purge_dead_entries(&self) -> usize {
        let removed = self.0.bridges.borrow_mut().purge() + self.0.links.borrow_mut().purge();
        self.0
            .well_known
            .borrow_mut()
            .retain(|_, entry| entry.native.strong_count() > 0);
        tracing::debug!(removed, "purged bridge caches");
        removed
    }

    /// Live bridge wrappers currently cached.
    pub fn cached_bridges(&self) -> usize {
        self.0.bridges.borrow().live()
    }

    /// Live smart links currently cached.
    pub fn cached_links(&self) -> usize {
        self.0.links.borrow().live()
    }
}

impl fmt::Debug for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Realm")
            .field("config", &self.0.config)
            .field("bridges", &self.cached_bridges())
            .field("links", &self.cached_links())
            .finish_non_exhaustive()
    }
}
