//! Persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the synchronous key-value contract hosts persist through.
//! - Layer the typed selection list (JSON array of ids) on top of it.
//!
//! # Invariants
//! - Stores are not transactional across calls; callers re-read before every
//!   write.
//! - Unreadable selection data is treated as an empty selection.

pub mod kv_repo;
pub mod selection_repo;
