//! Queries on the `users` table

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::database::{constraint_violation, Database};
use crate::error::{Error, Result};
use crate::types::User;

const USER_COLUMNS: &str = "user_id, username, email, password, created_at, token";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        created_at: row.get(4)?,
        token: row.get(5)?,
    })
}

/// Look up a single user by one of its unique columns
pub(super) fn query_user(conn: &Connection, column: UserKey, value: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column.as_str());
    let user = conn.query_row(&sql, params![value], user_from_row).optional()?;
    Ok(user)
}

/// Unique columns a user can be looked up by
#[derive(Debug, Clone, Copy)]
pub(super) enum UserKey {
    Id,
    Username,
    Email,
}

impl UserKey {
    fn as_str(self) -> &'static str {
        match self {
            UserKey::Id => "user_id",
            UserKey::Username => "username",
            UserKey::Email => "email",
        }
    }
}

impl Database {
    /// All users, oldest first
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM users ORDER BY created_at, user_id",
                USER_COLUMNS
            ))?;
            let users = stmt
                .query_map([], user_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(users)
        })
        .await
    }

    /// Insert a new user. Username and email uniqueness is enforced by the table.
    pub async fn insert_user(&self, user: User) -> Result<User> {
        self.run(move |conn| {
            let inserted = conn.execute(
                &format!("INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)", USER_COLUMNS),
                params![
                    user.user_id,
                    user.username,
                    user.email,
                    user.password,
                    user.created_at,
                    user.token,
                ],
            );

            match inserted {
                Ok(_) => Ok(user),
                Err(err) => Err(match constraint_violation(&err) {
                    Some(msg) if msg.contains("users.username") => Error::Conflict(format!(
                        "An account with username \"{}\" already exists",
                        user.username
                    )),
                    Some(msg) if msg.contains("users.email") => Error::Conflict(format!(
                        "An account with email \"{}\" already exists",
                        user.email
                    )),
                    Some(msg) if msg.contains("users.user_id") => Error::IdCollision(user.user_id),
                    _ => err.into(),
                }),
            }
        })
        .await
    }

    pub async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>> {
        self.find_user(UserKey::Id, user_id).await
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_user(UserKey::Username, username).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_user(UserKey::Email, email).await
    }

    async fn find_user(&self, key: UserKey, value: &str) -> Result<Option<User>> {
        let value = value.to_owned();
        self.run(move |conn| query_user(conn, key, &value)).await
    }

    /// Replace the stored token of a user
    pub async fn update_token(&self, user_id: &str, token: &str) -> Result<()> {
        let user_id = user_id.to_owned();
        let token = token.to_owned();
        self.run(move |conn| {
            let updated = conn.execute(
                "UPDATE users SET token = ?1 WHERE user_id = ?2",
                params![token, user_id],
            )?;
            if updated == 0 {
                return Err(Error::NotFound(format!("User with id {} not found", user_id)));
            }
            Ok(())
        })
        .await
    }

    /// Delete the user with this email, returning the number of rows removed
    pub async fn delete_user_by_email(&self, email: &str) -> Result<usize> {
        self.delete_user(UserKey::Email, email).await
    }

    /// Delete the user with this id, returning the number of rows removed
    pub async fn delete_user_by_id(&self, user_id: &str) -> Result<usize> {
        self.delete_user(UserKey::Id, user_id).await
    }

    async fn delete_user(&self, key: UserKey, value: &str) -> Result<usize> {
        let value = value.to_owned();
        self.run(move |conn| {
            let sql = format!("DELETE FROM users WHERE {} = ?1", key.as_str());
            Ok(conn.execute(&sql, params![value])?)
        })
        .await
    }
}
