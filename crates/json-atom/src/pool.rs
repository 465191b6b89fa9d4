//! Per-kind payload pools.
//!
//! Every heap payload (double, text, array, object) lives in a reference-counted
//! [`Block`] handed out by the pool of its kind. The pool keeps live/peak counts
//! so leaks and double releases are observable, and can be given a capacity after
//! which fresh allocations fail with [`AtomError::AllocationFailure`].
//!
//! Pools are thread-local: values are `Rc`-based and never cross threads.

use std::cell::RefCell;
use std::ops::Deref;
use std::rc::Rc;

use log::warn;

use crate::error::AtomError;

/// The payload kinds that are pool-allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Double,
    Utf8Text,
    Utf16Text,
    Array,
    Object,
}

impl PoolKind {
    pub const ALL: [PoolKind; 5] = [
        PoolKind::Double,
        PoolKind::Utf8Text,
        PoolKind::Utf16Text,
        PoolKind::Array,
        PoolKind::Object,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Snapshot of one pool's accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolUsage {
    /// Blocks currently alive.
    pub live: usize,
    /// Highest `live` value seen since the last [`reset_peak`].
    pub peak: usize,
    /// Blocks handed out since thread start.
    pub allocated: u64,
    pub capacity: Option<usize>,
}

thread_local! {
    static POOLS: RefCell<[PoolUsage; 5]> = RefCell::new([PoolUsage::default(); 5]);
}

/// A pooled payload: the value plus the pool it must be returned to.
///
/// Shared singletons (Double zero, empty texts) are built with no kind and are
/// never accounted.
#[derive(Debug)]
pub struct Block<T> {
    kind: Option<PoolKind>,
    value: T,
}

impl<T> Deref for Block<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> Drop for Block<T> {
    fn drop(&mut self) {
        if let Some(kind) = self.kind {
            // Thread teardown may already have destroyed the pool table.
            let _ = POOLS.try_with(|pools| {
                let mut pools = pools.borrow_mut();
                let usage = &mut pools[kind.index()];
                usage.live = usage.live.saturating_sub(1);
            });
        }
    }
}

pub(crate) type Payload<T> = Rc<Block<T>>;

fn acquire(kind: PoolKind, bounded: bool) -> Result<(), AtomError> {
    POOLS.with(|pools| {
        let mut pools = pools.borrow_mut();
        let usage = &mut pools[kind.index()];
        if bounded {
            if let Some(cap) = usage.capacity {
                if usage.live >= cap {
                    warn!("{kind:?} pool refused allocation: capacity {cap} reached");
                    return Err(AtomError::AllocationFailure { kind });
                }
            }
        }
        usage.live += 1;
        usage.allocated += 1;
        usage.peak = usage.peak.max(usage.live);
        Ok(())
    })
}

/// Allocate a block from `kind`'s pool, honouring its capacity.
pub(crate) fn alloc<T>(kind: PoolKind, value: T) -> Result<Payload<T>, AtomError> {
    acquire(kind, true)?;
    Ok(Rc::new(Block {
        kind: Some(kind),
        value,
    }))
}

/// Allocate a block that is accounted but never refused. Used where the
/// signature cannot fail (copying a lazily-empty container).
pub(crate) fn alloc_granted<T>(kind: PoolKind, value: T) -> Payload<T> {
    let _ = acquire(kind, false);
    Rc::new(Block {
        kind: Some(kind),
        value,
    })
}

/// Build an unaccounted block for a process-lifetime singleton.
pub(crate) fn singleton<T>(value: T) -> Payload<T> {
    Rc::new(Block { kind: None, value })
}

pub fn usage(kind: PoolKind) -> PoolUsage {
    POOLS.with(|pools| pools.borrow()[kind.index()])
}

/// Limit the number of live blocks of `kind`; `None` removes the limit.
pub fn set_capacity(kind: PoolKind, capacity: Option<usize>) {
    POOLS.with(|pools| pools.borrow_mut()[kind.index()].capacity = capacity);
}

pub fn reset_peak(kind: PoolKind) {
    POOLS.with(|pools| {
        let mut pools = pools.borrow_mut();
        let usage = &mut pools[kind.index()];
        usage.peak = usage.live;
    });
}

/// Number of handles sharing a payload.
pub(crate) fn share_count<T>(payload: &Payload<T>) -> usize {
    Rc::strong_count(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_drop_balance_live_count() {
        let before = usage(PoolKind::Double);
        let a = alloc(PoolKind::Double, 1.5).unwrap();
        let b = Rc::clone(&a);
        assert_eq!(usage(PoolKind::Double).live, before.live + 1);
        assert_eq!(share_count(&a), 2);
        drop(a);
        assert_eq!(usage(PoolKind::Double).live, before.live + 1);
        drop(b);
        assert_eq!(usage(PoolKind::Double).live, before.live);
    }

    #[test]
    fn capacity_refuses_then_recovers() {
        let base = usage(PoolKind::Object).live;
        set_capacity(PoolKind::Object, Some(base + 1));
        let first = alloc(PoolKind::Object, ()).unwrap();
        let err = alloc(PoolKind::Object, ()).unwrap_err();
        assert!(matches!(
            err,
            AtomError::AllocationFailure {
                kind: PoolKind::Object
            }
        ));
        let granted = alloc_granted(PoolKind::Object, ());
        assert_eq!(usage(PoolKind::Object).live, base + 2);
        drop(first);
        drop(granted);
        set_capacity(PoolKind::Object, None);
        assert!(alloc(PoolKind::Object, ()).is_ok());
    }

    #[test]
    fn singletons_are_not_accounted() {
        let before = usage(PoolKind::Utf8Text);
        let s = singleton(String::new());
        assert_eq!(usage(PoolKind::Utf8Text), before);
        drop(s);
        assert_eq!(usage(PoolKind::Utf8Text), before);
    }
}
