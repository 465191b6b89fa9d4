use std::borrow::Cow;
use std::cell::{OnceCell, Ref, RefCell};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::atom::{rank_order, Atom};
use crate::descriptor::AtomType;
use crate::error::AtomError;
use crate::pool::{self, Payload, PoolKind};
use crate::scalar::{format_double, Double, Integer};
use crate::text::{Utf16Text, Utf8Text};

type Store = RefCell<BTreeMap<String, Atom>>;

/// Anything usable as an object key. Keys are compared by their string
/// coercion, so `1` and `"1"` name the same entry.
pub trait ObjectKey {
    fn object_key(&self) -> Cow<'_, str>;
}

impl ObjectKey for str {
    fn object_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl ObjectKey for String {
    fn object_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl ObjectKey for Atom {
    fn object_key(&self) -> Cow<'_, str> {
        match self {
            Atom::Utf8(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_text()),
        }
    }
}

impl ObjectKey for Utf8Text {
    fn object_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl ObjectKey for Utf16Text {
    fn object_key(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string_escaped())
    }
}

impl ObjectKey for i64 {
    fn object_key(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl ObjectKey for Integer {
    fn object_key(&self) -> Cow<'_, str> {
        Cow::Owned(self.value().to_string())
    }
}

impl ObjectKey for Double {
    fn object_key(&self) -> Cow<'_, str> {
        Cow::Owned(format_double(self.value()))
    }
}

/// String-keyed map of atoms, enumerated in key order.
pub struct Object {
    slot: OnceCell<Payload<Store>>,
}

impl Object {
    /// An empty object that allocates nothing until first use.
    pub fn new() -> Object {
        Object {
            slot: OnceCell::new(),
        }
    }

    pub fn new_allocated() -> Result<Object, AtomError> {
        Object::from_map(BTreeMap::new())
    }

    pub fn from_map(entries: BTreeMap<String, Atom>) -> Result<Object, AtomError> {
        let payload = pool::alloc(PoolKind::Object, RefCell::new(entries))?;
        Ok(Object {
            slot: OnceCell::from(payload),
        })
    }

    fn read(&self) -> Option<Ref<'_, BTreeMap<String, Atom>>> {
        self.slot.get().map(|p| p.borrow())
    }

    fn store(&self) -> Result<&Store, AtomError> {
        if self.slot.get().is_none() {
            let payload = pool::alloc(PoolKind::Object, RefCell::new(BTreeMap::new()))?;
            let _ = self.slot.set(payload);
        }
        self.slot
            .get()
            .map(|p| &***p)
            .ok_or_else(|| AtomError::Internal("object store missing after allocation".into()))
    }

    pub fn len(&self) -> usize {
        self.read().map_or(0, |m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_allocated(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Value under `key`, or a clone of `default` when absent.
    pub fn get<K: ObjectKey + ?Sized>(&self, key: &K, default: &Atom) -> Atom {
        self.lookup(key).unwrap_or_else(|| default.clone())
    }

    pub fn lookup<K: ObjectKey + ?Sized>(&self, key: &K) -> Option<Atom> {
        let key = key.object_key();
        self.read().and_then(|m| m.get(key.as_ref()).cloned())
    }

    pub fn has<K: ObjectKey + ?Sized>(&self, key: &K) -> bool {
        let key = key.object_key();
        self.read().is_some_and(|m| m.contains_key(key.as_ref()))
    }

    pub fn set<K: ObjectKey + ?Sized>(
        &self,
        key: &K,
        value: impl Into<Atom>,
    ) -> Result<(), AtomError> {
        let value = value.into();
        let key = key.object_key().into_owned();
        let old = self.store()?.borrow_mut().insert(key, value);
        drop(old);
        Ok(())
    }

    /// Delete `key`; returns whether it was present.
    pub fn remove<K: ObjectKey + ?Sized>(&self, key: &K) -> bool {
        self.remove_entry(key).is_some()
    }

    /// Delete `key` and return its value, or `Undefined` when absent.
    pub fn take<K: ObjectKey + ?Sized>(&self, key: &K) -> Atom {
        self.remove_entry(key).unwrap_or_default()
    }

    fn remove_entry<K: ObjectKey + ?Sized>(&self, key: &K) -> Option<Atom> {
        let key = key.object_key();
        let store = self.slot.get()?;
        let mut map = store.borrow_mut();
        map.remove(key.as_ref())
    }

    pub fn clear(&self) {
        let old = self
            .slot
            .get()
            .map(|s| std::mem::take(&mut *s.borrow_mut()));
        drop(old);
    }

    pub fn keys(&self) -> Vec<String> {
        self.read()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn values(&self) -> Vec<Atom> {
        self.read()
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of `(key, value)` pairs in key order.
    pub fn entries(&self) -> Vec<(String, Atom)> {
        self.read()
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> std::vec::IntoIter<(String, Atom)> {
        self.entries().into_iter()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        match (self.slot.get(), other.slot.get()) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn share_count(&self) -> usize {
        self.slot.get().map_or(0, pool::share_count)
    }

    pub fn cast(atom: &Atom) -> Result<Object, AtomError> {
        match atom {
            Atom::Object(o) => Ok(o.clone()),
            other => Err(AtomError::mismatch(AtomType::Object, other.type_id())),
        }
    }

    pub fn is_object(atom: &Atom) -> bool {
        matches!(atom, Atom::Object(_))
    }

    pub fn deep_copy(&self) -> Result<Object, AtomError> {
        if !self.is_allocated() {
            return Ok(Object::new());
        }
        let mut map = BTreeMap::new();
        for (key, value) in self.entries() {
            map.insert(key, value.deep_copy()?);
        }
        Object::from_map(map)
    }
}

impl Default for Object {
    fn default() -> Self {
        Object::new()
    }
}

impl Clone for Object {
    fn clone(&self) -> Self {
        let payload = self
            .slot
            .get_or_init(|| pool::alloc_granted(PoolKind::Object, RefCell::new(BTreeMap::new())));
        Object {
            slot: OnceCell::from(Rc::clone(payload)),
        }
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.read() {
            Some(map) => f.debug_map().entries(map.iter()).finish(),
            None => f.write_str("{}"),
        }
    }
}

pub(crate) fn compare(lhs: &Atom, rhs: &Atom) -> Ordering {
    let (Atom::Object(a), Atom::Object(b)) = (lhs, rhs) else {
        return rank_order(lhs, rhs);
    };
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }
    let (left, right) = (a.entries(), b.entries());
    left.len().cmp(&right.len()).then_with(|| {
        for ((lk, lv), (rk, rv)) in left.iter().zip(right.iter()) {
            let ord = lk.cmp(rk).then_with(|| lv.compare(rv));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    })
}
