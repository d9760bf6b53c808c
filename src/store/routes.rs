//! Queries on the `routes` table

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::database::{constraint_violation, Database};
use crate::error::{Error, Result};
use crate::types::{Route, StartLocation};

const ROUTE_COLUMNS: &str = "route_id, created_by, route_name, start_location, coordinates, \
                             polyline_encoded, img_url, created_at";

/// Rows removed by a route deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteDeletion {
    pub routes: usize,
    pub favorites: usize,
}

fn route_from_row(row: &Row<'_>) -> rusqlite::Result<Route> {
    let start_location: String = row.get(3)?;
    let route_start_location: StartLocation = serde_json::from_str(&start_location)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(Route {
        route_id: row.get(0)?,
        created_by: row.get(1)?,
        route_name: row.get(2)?,
        route_start_location,
        route_coordinates: row.get(4)?,
        route_polyline_encoded: row.get(5)?,
        route_img_url: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn query_routes(conn: &Connection, filter: &str, values: &[&str]) -> Result<Vec<Route>> {
    let sql = format!(
        "SELECT {} FROM routes {} ORDER BY created_at, route_id",
        ROUTE_COLUMNS, filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let routes = stmt
        .query_map(rusqlite::params_from_iter(values), route_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(routes)
}

pub(super) fn query_route(conn: &Connection, route_id: &str) -> Result<Option<Route>> {
    let sql = format!("SELECT {} FROM routes WHERE route_id = ?1", ROUTE_COLUMNS);
    let route = conn.query_row(&sql, params![route_id], route_from_row).optional()?;
    Ok(route)
}

impl Database {
    /// All routes, oldest first
    pub async fn list_routes(&self) -> Result<Vec<Route>> {
        self.run(|conn| query_routes(conn, "", &[])).await
    }

    pub async fn find_route(&self, route_id: &str) -> Result<Option<Route>> {
        let route_id = route_id.to_owned();
        self.run(move |conn| query_route(conn, &route_id)).await
    }

    /// Routes starting in `city` (already normalized), optionally only those by `created_by`
    pub async fn routes_by_city(&self, city: &str, created_by: Option<&str>) -> Result<Vec<Route>> {
        let city = city.to_owned();
        let created_by = created_by.map(str::to_owned);
        self.run(move |conn| match created_by {
            Some(username) => query_routes(
                conn,
                "WHERE start_city = ?1 AND created_by = ?2",
                &[city.as_str(), username.as_str()],
            ),
            None => query_routes(conn, "WHERE start_city = ?1", &[city.as_str()]),
        })
        .await
    }

    /// Routes submitted by `username`
    pub async fn routes_by_creator(&self, username: &str) -> Result<Vec<Route>> {
        let username = username.to_owned();
        self.run(move |conn| query_routes(conn, "WHERE created_by = ?1", &[username.as_str()]))
            .await
    }

    /// Insert a new route
    pub async fn insert_route(&self, route: Route) -> Result<Route> {
        self.run(move |conn| {
            let start_location = serde_json::to_string(&route.route_start_location)?;
            let inserted = conn.execute(
                "INSERT INTO routes (route_id, created_by, route_name, start_city, start_location, \
                 coordinates, polyline_encoded, img_url, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    route.route_id,
                    route.created_by,
                    route.route_name,
                    route.route_start_location.city,
                    start_location,
                    route.route_coordinates,
                    route.route_polyline_encoded,
                    route.route_img_url,
                    route.created_at,
                ],
            );

            match inserted {
                Ok(_) => Ok(route),
                Err(err) => Err(match constraint_violation(&err) {
                    Some(msg) if msg.contains("routes.route_id") => Error::IdCollision(route.route_id),
                    _ => err.into(),
                }),
            }
        })
        .await
    }

    /// Delete one route and every favorite pointing at it
    pub async fn delete_route(&self, route_id: &str) -> Result<RouteDeletion> {
        let route_id = route_id.to_owned();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let favorites = tx.execute(
                "DELETE FROM favorite_routes WHERE route_id = ?1",
                params![route_id],
            )?;
            let routes = tx.execute("DELETE FROM routes WHERE route_id = ?1", params![route_id])?;
            if routes == 0 {
                return Err(Error::NotFound(format!("Route with id {} not found", route_id)));
            }
            tx.commit()?;
            Ok(RouteDeletion { routes, favorites })
        })
        .await
    }

    /// Delete every route and every favorite
    pub async fn delete_all_routes(&self) -> Result<RouteDeletion> {
        self.run(|conn| {
            let tx = conn.transaction()?;
            let favorites = tx.execute("DELETE FROM favorite_routes", [])?;
            let routes = tx.execute("DELETE FROM routes", [])?;
            tx.commit()?;
            Ok(RouteDeletion { routes, favorites })
        })
        .await
    }
}
