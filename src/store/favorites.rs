//! Queries on the `favorite_routes` table

use chrono::Utc;
use rusqlite::{params, Row};

use super::database::{constraint_violation, Database};
use super::routes::query_route;
use super::users::{query_user, UserKey};
use crate::error::{Error, Result};
use crate::types::FavoriteRoute;

fn favorite_from_row(row: &Row<'_>) -> rusqlite::Result<FavoriteRoute> {
    Ok(FavoriteRoute {
        route_id: row.get(0)?,
        user_id: row.get(1)?,
        route_name: row.get(2)?,
        username: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn user_not_found(user_id: &str) -> Error {
    Error::NotFound(format!("User with id {} not found", user_id))
}

impl Database {
    /// Favorites of a user, oldest first. Does not check that the user exists.
    pub async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<FavoriteRoute>> {
        let user_id = user_id.to_owned();
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT route_id, user_id, route_name, username, created_at \
                 FROM favorite_routes WHERE user_id = ?1 ORDER BY created_at, route_id",
            )?;
            let favorites = stmt
                .query_map(params![user_id], favorite_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(favorites)
        })
        .await
    }

    /// Bookmark a route for a user. Both must exist; the pair must be new.
    pub async fn add_favorite(&self, route_id: &str, user_id: &str) -> Result<FavoriteRoute> {
        let route_id = route_id.to_owned();
        let user_id = user_id.to_owned();
        self.run(move |conn| {
            let tx = conn.transaction()?;

            let route = query_route(&tx, &route_id)?
                .ok_or_else(|| Error::NotFound(format!("Route with id {} not found", route_id)))?;
            let user = query_user(&tx, UserKey::Id, &user_id)?.ok_or_else(|| user_not_found(&user_id))?;

            let favorite = FavoriteRoute {
                route_id: route.route_id,
                user_id: user.user_id,
                route_name: route.route_name,
                username: user.username,
                created_at: Utc::now(),
            };

            let inserted = tx.execute(
                "INSERT INTO favorite_routes (route_id, user_id, route_name, username, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    favorite.route_id,
                    favorite.user_id,
                    favorite.route_name,
                    favorite.username,
                    favorite.created_at,
                ],
            );

            if let Err(err) = inserted {
                return Err(match constraint_violation(&err) {
                    Some(msg) if msg.contains("favorite_routes.") => Error::Conflict(format!(
                        "Route {} is already a favorite of user {}",
                        favorite.route_id, favorite.user_id
                    )),
                    _ => err.into(),
                });
            }

            tx.commit()?;
            Ok(favorite)
        })
        .await
    }

    /// Remove a bookmark. The user must exist and must have favorited the route.
    pub async fn remove_favorite(&self, route_id: &str, user_id: &str) -> Result<usize> {
        let route_id = route_id.to_owned();
        let user_id = user_id.to_owned();
        self.run(move |conn| {
            let tx = conn.transaction()?;

            if query_user(&tx, UserKey::Id, &user_id)?.is_none() {
                return Err(user_not_found(&user_id));
            }

            let removed = tx.execute(
                "DELETE FROM favorite_routes WHERE route_id = ?1 AND user_id = ?2",
                params![route_id, user_id],
            )?;
            if removed == 0 {
                return Err(Error::NotFound(format!(
                    "Route {} is not a favorite of user {}",
                    route_id, user_id
                )));
            }

            tx.commit()?;
            Ok(removed)
        })
        .await
    }
}
