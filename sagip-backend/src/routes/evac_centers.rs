use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, OptionalExtension, Row, params};
use sagip_types::{EvacCenterInput, json_list};
use serde::Serialize;
use serde_json::Value;

use super::{
    Deleted,
    extract::{Path, Payload},
};
use crate::{
    AppState,
    db::{self, non_blank},
    error::ApiError,
};

const NOT_FOUND: &str = "Evacuation center not found";

const COLUMNS: &str = "id, name, address, barangay_id, lat, lng, capacity, current_occupancy, \
     services, status, contact_number, created_at, updated_at";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacCenter {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub barangay_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub capacity: i64,
    pub current_occupancy: i64,
    /// Stored as a JSON string, decoded on the way out.
    pub services: Vec<String>,
    pub status: String,
    pub contact_number: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl EvacCenter {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let services: String = row.get(8)?;
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            address: row.get(2)?,
            barangay_id: row.get(3)?,
            lat: row.get(4)?,
            lng: row.get(5)?,
            capacity: row.get(6)?,
            current_occupancy: row.get(7)?,
            services: json_list::parse(Value::String(services)),
            status: row.get(9)?,
            contact_number: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<EvacCenter, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM evac_centers WHERE id = ?1"),
        [id],
        EvacCenter::from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<EvacCenter>>, ApiError> {
    let centers = state.db.with(|conn| {
        let mut statement =
            conn.prepare(&format!("SELECT {COLUMNS} FROM evac_centers ORDER BY id"))?;
        let rows = statement
            .query_map([], EvacCenter::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    Ok(Json(centers))
}

fn check_counts(input: &EvacCenterInput) -> Result<(), ApiError> {
    if input.capacity.is_some_and(|capacity| capacity < 0)
        || input.current_occupancy.is_some_and(|occupancy| occupancy < 0)
    {
        return Err(ApiError::BadRequest(
            "Capacity and occupancy must not be negative".to_string(),
        ));
    }
    Ok(())
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EvacCenter>, ApiError> {
    Ok(Json(state.db.with(|conn| fetch(conn, id))?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(input): Payload<EvacCenterInput>,
) -> Result<(StatusCode, Json<EvacCenter>), ApiError> {
    let Some(name) = non_blank(input.name.clone()) else {
        return Err(ApiError::missing_fields(&["name"]));
    };
    check_counts(&input)?;

    let services = json_list::encode(&input.services.unwrap_or_default());
    let now = db::now();

    let center = state.db.with(|conn| {
        conn.execute(
            "INSERT INTO evac_centers (name, address, barangay_id, lat, lng, capacity,
                 current_occupancy, services, status, contact_number, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                name,
                input.address,
                input.barangay_id,
                input.lat,
                input.lng,
                input.capacity.unwrap_or(0),
                input.current_occupancy.unwrap_or(0),
                services,
                input.status.unwrap_or_default().as_str(),
                input.contact_number,
                now,
            ],
        )?;
        fetch(conn, conn.last_insert_rowid())
    })?;

    Ok((StatusCode::CREATED, Json(center)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Payload(input): Payload<EvacCenterInput>,
) -> Result<Json<EvacCenter>, ApiError> {
    check_counts(&input)?;

    let center = state.db.with(|conn| {
        let current = fetch(conn, id)?;
        let services = input.services.unwrap_or(current.services);

        conn.execute(
            "UPDATE evac_centers SET name = ?1, address = ?2, barangay_id = ?3, lat = ?4, lng = ?5,
                 capacity = ?6, current_occupancy = ?7, services = ?8, status = ?9,
                 contact_number = ?10, updated_at = ?11
             WHERE id = ?12",
            params![
                non_blank(input.name).unwrap_or(current.name),
                input.address.or(current.address),
                input.barangay_id.or(current.barangay_id),
                input.lat.or(current.lat),
                input.lng.or(current.lng),
                input.capacity.unwrap_or(current.capacity),
                input.current_occupancy.unwrap_or(current.current_occupancy),
                json_list::encode(&services),
                input
                    .status
                    .map(|s| s.as_str().to_string())
                    .unwrap_or(current.status),
                input.contact_number.or(current.contact_number),
                db::now(),
                id,
            ],
        )?;
        fetch(conn, id)
    })?;

    Ok(Json(center))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    state.db.with(|conn| {
        if conn.execute("DELETE FROM evac_centers WHERE id = ?1", [id])? == 0 {
            return Err(ApiError::NotFound(NOT_FOUND.to_string()));
        }
        Ok(())
    })?;

    Ok(Json(Deleted::new(id)))
}
