//! Mutable collections: [`Array`] and [`Object`].
//!
//! Both are shared-mutable handles. Cloning shares the backing store, so a
//! change made through one handle is visible through every other; use
//! `deep_copy` for an independent copy. A default-constructed container holds
//! no store until it is first mutated or cloned.

pub(crate) mod array;
pub(crate) mod object;

pub use array::Array;
pub use object::{Object, ObjectKey};
