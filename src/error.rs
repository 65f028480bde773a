use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot open database at {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("user with ID {id} does not exist")]
    UserNotFound { id: i64 },

    #[error("user {username:?} does not exist")]
    UsernameNotFound { username: String },
}

impl StoreError {
    /// True for either of the not-found variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::UserNotFound { .. } | StoreError::UsernameNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
