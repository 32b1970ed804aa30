//! Canonical in-memory model representations.
//!
//! Loaders in [`crate::compat`] convert external formats into these types;
//! [`crate::inference`] traverses them.

pub mod gbdt;
