use std::cell::{OnceCell, Ref, RefCell};
use std::cmp::Ordering;
use std::rc::Rc;

use crate::atom::{rank_order, Atom};
use crate::descriptor::AtomType;
use crate::error::AtomError;
use crate::pool::{self, Payload, PoolKind};

type Store = RefCell<Vec<Atom>>;

/// Dense, index-addressed sequence of atoms.
///
/// Removing an element shifts every later element down by one; writing past
/// the end grows the array, filling the gap with `Undefined`.
pub struct Array {
    slot: OnceCell<Payload<Store>>,
}

impl Array {
    /// An empty array that allocates nothing until first use.
    pub fn new() -> Array {
        Array {
            slot: OnceCell::new(),
        }
    }

    pub fn new_allocated() -> Result<Array, AtomError> {
        Array::from_vec(Vec::new())
    }

    /// `len` elements, all `Null`.
    pub fn with_len(len: usize) -> Result<Array, AtomError> {
        let mut items = Vec::new();
        items.try_reserve_exact(len).map_err(|_| AtomError::AllocationFailure {
            kind: PoolKind::Array,
        })?;
        items.resize(len, Atom::Null);
        Array::from_vec(items)
    }

    pub fn from_vec(items: Vec<Atom>) -> Result<Array, AtomError> {
        let payload = pool::alloc(PoolKind::Array, RefCell::new(items))?;
        Ok(Array {
            slot: OnceCell::from(payload),
        })
    }

    fn read(&self) -> Option<Ref<'_, Vec<Atom>>> {
        self.slot.get().map(|p| p.borrow())
    }

    fn store(&self) -> Result<&Store, AtomError> {
        if self.slot.get().is_none() {
            let payload = pool::alloc(PoolKind::Array, RefCell::new(Vec::new()))?;
            let _ = self.slot.set(payload);
        }
        self.slot
            .get()
            .map(|p| &***p)
            .ok_or_else(|| AtomError::Internal("array store missing after allocation".into()))
    }

    pub fn len(&self) -> usize {
        self.read().map_or(0, |v| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a backing store exists yet.
    pub fn is_allocated(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Element at `index`, or a clone of `default` when out of range.
    pub fn get(&self, index: usize, default: &Atom) -> Atom {
        self.at(index).unwrap_or_else(|| default.clone())
    }

    pub fn at(&self, index: usize) -> Option<Atom> {
        self.read().and_then(|v| v.get(index).cloned())
    }

    /// Store `value` at `index`, growing the array with `Undefined` as needed.
    pub fn set(&self, index: usize, value: impl Into<Atom>) -> Result<(), AtomError> {
        let value = value.into();
        let old = {
            let mut items = self.store()?.borrow_mut();
            if index >= items.len() {
                let len = index.checked_add(1).ok_or(AtomError::AllocationFailure {
                    kind: PoolKind::Array,
                })?;
                let cur = items.len();
                items
                    .try_reserve(len - cur)
                    .map_err(|_| AtomError::AllocationFailure {
                        kind: PoolKind::Array,
                    })?;
                items.resize(len, Atom::Undefined);
            }
            std::mem::replace(&mut items[index], value)
        };
        // The replaced value may own the last handle to a container; release it
        // outside the borrow.
        drop(old);
        Ok(())
    }

    /// Append `value`; returns its index.
    pub fn push(&self, value: impl Into<Atom>) -> Result<usize, AtomError> {
        let value = value.into();
        let mut items = self.store()?.borrow_mut();
        items.push(value);
        Ok(items.len() - 1)
    }

    /// Remove the element at `index`, shifting later elements down.
    pub fn remove(&self, index: usize) -> Option<Atom> {
        let store = self.slot.get()?;
        let mut items = store.borrow_mut();
        if index < items.len() {
            Some(items.remove(index))
        } else {
            None
        }
    }

    /// Remove and return the last element, or `Undefined` when empty.
    pub fn pop(&self) -> Atom {
        self.slot
            .get()
            .and_then(|s| s.borrow_mut().pop())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        let old = self
            .slot
            .get()
            .map(|s| std::mem::take(&mut *s.borrow_mut()));
        drop(old);
    }

    /// Snapshot of the current elements.
    pub fn to_vec(&self) -> Vec<Atom> {
        self.read().map(|v| v.clone()).unwrap_or_default()
    }

    /// Iterate over a snapshot; mutation during iteration is not observed.
    pub fn iter(&self) -> std::vec::IntoIter<Atom> {
        self.to_vec().into_iter()
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        match (self.slot.get(), other.slot.get()) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Handles sharing the store; 0 while unallocated.
    pub fn share_count(&self) -> usize {
        self.slot.get().map_or(0, pool::share_count)
    }

    pub fn cast(atom: &Atom) -> Result<Array, AtomError> {
        match atom {
            Atom::Array(a) => Ok(a.clone()),
            other => Err(AtomError::mismatch(AtomType::Array, other.type_id())),
        }
    }

    pub fn is_array(atom: &Atom) -> bool {
        matches!(atom, Atom::Array(_))
    }

    /// Recursively copy into a fresh store.
    pub fn deep_copy(&self) -> Result<Array, AtomError> {
        if !self.is_allocated() {
            return Ok(Array::new());
        }
        let items = self
            .to_vec()
            .iter()
            .map(Atom::deep_copy)
            .collect::<Result<Vec<_>, _>>()?;
        Array::from_vec(items)
    }
}

impl Default for Array {
    fn default() -> Self {
        Array::new()
    }
}

impl Clone for Array {
    /// Shares the store, allocating it first if this handle is still lazy so
    /// both handles see later mutations.
    fn clone(&self) -> Self {
        let payload = self
            .slot
            .get_or_init(|| pool::alloc_granted(PoolKind::Array, RefCell::new(Vec::new())));
        Array {
            slot: OnceCell::from(Rc::clone(payload)),
        }
    }
}

impl std::fmt::Debug for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.read() {
            Some(items) => f.debug_list().entries(items.iter()).finish(),
            None => f.write_str("[]"),
        }
    }
}

pub(crate) fn compare(lhs: &Atom, rhs: &Atom) -> Ordering {
    let (Atom::Array(a), Atom::Array(b)) = (lhs, rhs) else {
        return rank_order(lhs, rhs);
    };
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }
    let (left, right) = (a.to_vec(), b.to_vec());
    left.len()
        .cmp(&right.len())
        .then_with(|| left.iter().cmp(right.iter()))
}
