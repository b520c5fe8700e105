//! Todo domain model.
//!
//! # Responsibility
//! - Define the canonical record and the input shapes derived from it.
//! - Own validation rules so repository and service share one definition.
//!
//! # Invariants
//! - Every todo is identified by a storage-assigned `TodoId`.
//! - Deletion is permanent; there are no tombstones.

pub mod todo;
