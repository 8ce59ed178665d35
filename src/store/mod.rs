//! Persistent storage module
//!
//! This module contains the key-value backends and the session history kept
//! on top of them.

pub mod kv;
pub mod session_store;

// Re-export main types
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use session_store::{SessionRecord, SessionStore, StoreSnapshot, MAX_RECORDS};
