use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{Result, StoreError};
use crate::sqlite::SqliteConfig;

/// A user as seen through the join of `Users` and `UserData`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub surname: String,
    pub description: String,
}

impl UserRecord {
    /// Create an unsaved record; the id is assigned by [`UserStore::add_user`].
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        surname: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            username: username.into(),
            name: name.into(),
            surname: surname.into(),
            description: description.into(),
        }
    }
}

/// CRUD access to the `Users` / `UserData` tables.
///
/// Holds only configuration. Each call opens its own connection, which is
/// closed when it goes out of scope, including on error paths.
#[derive(Debug, Clone)]
pub struct UserStore {
    config: SqliteConfig,
}

impl UserStore {
    pub fn new(config: SqliteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Resolve a username (case-insensitively) to its user ID.
    ///
    /// Returns `None` when no row matches. If several rows share the
    /// username, the last one returned by SQLite wins.
    pub fn lookup_id_by_username(&self, username: &str) -> Result<Option<i64>> {
        let conn = self.config.open()?;
        lookup_id(&conn, &username.to_lowercase())
    }

    /// Insert a user into `Users` and its profile into `UserData`.
    ///
    /// An existing username is only warned about; the insert still happens
    /// and the new row gets its own ID. The two inserts are not atomic.
    pub fn add_user(&self, record: &UserRecord) -> Result<i64> {
        let username = record.username.to_lowercase();
        let conn = self
            .config
            .open()
            .inspect_err(|e| error!(%username, error = %e, "open for add failed"))?;

        let existing = lookup_id(&conn, &username)
            .inspect_err(|e| error!(%username, error = %e, "duplicate check failed"))?;
        if let Some(existing) = existing {
            warn!(%username, user_id = existing, "user already exists");
        }

        conn.execute("INSERT INTO Users VALUES (NULL, ?1)", params![username])
            .inspect_err(|e| error!(%username, error = %e, "insert into Users failed"))?;

        let user_id = lookup_id(&conn, &username)
            .inspect_err(|e| error!(%username, error = %e, "post-insert lookup failed"))?;
        let Some(user_id) = user_id else {
            error!(%username, "inserted user not found");
            return Err(StoreError::UsernameNotFound { username });
        };

        conn.execute(
            "INSERT INTO UserData VALUES (?1, ?2, ?3, ?4)",
            params![user_id, record.name, record.surname, record.description],
        )
        .inspect_err(|e| error!(user_id, error = %e, "insert into UserData failed"))?;

        debug!(%username, user_id, "added user");
        Ok(user_id)
    }

    /// Remove a user's `UserData` row, then its `Users` row.
    ///
    /// The ID must map to a username that resolves back to the same ID.
    pub fn delete_user(&self, id: i64) -> Result<()> {
        let conn = self.config.open()?;

        let username: Option<String> = conn
            .query_row(
                "SELECT Username FROM Users WHERE ID = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(username) = username else {
            return Err(StoreError::UserNotFound { id });
        };
        // Lookups match the lowercase form, so a mixed-case stored name never resolves.
        if lookup_id(&conn, &username.to_lowercase())? != Some(id) {
            return Err(StoreError::UserNotFound { id });
        }

        conn.execute("DELETE FROM UserData WHERE UserID = ?1", params![id])?;
        conn.execute("DELETE FROM Users WHERE ID = ?1", params![id])?;

        debug!(%username, user_id = id, "deleted user");
        Ok(())
    }

    /// All users that have both a `Users` and a `UserData` row, in the
    /// order SQLite returns the join.
    pub fn list_users(&self) -> Result<Vec<UserRecord>> {
        let conn = self.config.open()?;

        let mut stmt = conn.prepare(
            "SELECT ID, Username, Name, Surname, Description \
             FROM Users, UserData WHERE Users.ID = UserData.UserID",
        )?;
        let users = stmt
            .query_map([], |row| {
                Ok(UserRecord {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    name: row.get(2)?,
                    surname: row.get(3)?,
                    description: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(count = users.len(), "listed users");
        Ok(users)
    }

    /// Overwrite the profile fields of the user named by `record.username`.
    ///
    /// `record.id` is ignored; the ID and username are never changed.
    pub fn update_user(&self, record: &UserRecord) -> Result<()> {
        let username = record.username.to_lowercase();
        let conn = self.config.open()?;

        let Some(user_id) = lookup_id(&conn, &username)? else {
            return Err(StoreError::UsernameNotFound { username });
        };

        conn.execute(
            "UPDATE UserData SET Name = ?1, Surname = ?2, Description = ?3 WHERE UserID = ?4",
            params![record.name, record.surname, record.description, user_id],
        )?;

        debug!(%username, user_id, "updated user");
        Ok(())
    }
}

/// `username` must already be lowercase.
fn lookup_id(conn: &Connection, username: &str) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT ID FROM Users WHERE Username = ?1")?;
    let mut rows = stmt.query(params![username])?;

    let mut user_id = None;
    while let Some(row) = rows.next()? {
        user_id = Some(row.get(0)?);
    }
    Ok(user_id)
}
