//! Index layer implementation
//!
//! Equality indexes maintained by the storage engine for every
//! PRIMARY KEY / UNIQUE column.

pub mod hash_index;

pub use hash_index::HashIndex;
