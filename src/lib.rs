//! SQLite-backed user store.
//!
//! # Intention
//!
//! - Provide create/list/update/delete access to the `Users` and `UserData`
//!   tables of an existing SQLite database file.
//! - Encapsulate SQLite-specific logic, types, and error handling.
//!
//! # Architectural Boundaries
//!
//! - The schema is owned by the embedding application; this crate never
//!   creates or migrates tables.
//! - Every operation opens its own connection and drops it before returning.
//! - Add and delete issue two statements without a transaction, so a failure
//!   between them can leave the two tables out of sync.

pub mod error;
pub mod sqlite;
pub mod store;

pub use error::{Result, StoreError};
pub use sqlite::SqliteConfig;
pub use store::{UserRecord, UserStore};
