use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, OptionalExtension, Row, params};
use sagip_types::{IncidentReportInput, IncidentStatus, json_list};
use serde::{Deserialize, Serialize};

use super::{
    Deleted,
    extract::{Path, Payload, Query},
};
use crate::{
    AppState,
    db::{self, non_blank},
    error::ApiError,
};

const NOT_FOUND: &str = "Report not found";

const COLUMNS: &str = "id, reporter_name, reporter_contact, type, description, latitude, \
     longitude, address, image_urls, status, barangay_id, created_at, updated_at";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    pub id: i64,
    pub reporter_name: String,
    pub reporter_contact: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    /// JSON-encoded list, returned as stored.
    pub image_urls: String,
    pub status: String,
    pub barangay_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl IncidentReport {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            reporter_name: row.get(1)?,
            reporter_contact: row.get(2)?,
            kind: row.get(3)?,
            description: row.get(4)?,
            latitude: row.get(5)?,
            longitude: row.get(6)?,
            address: row.get(7)?,
            image_urls: row.get(8)?,
            status: row.get(9)?,
            barangay_id: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<IncidentReport, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM incident_reports WHERE id = ?1"),
        [id],
        IncidentReport::from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListQuery {
    pub barangay_id: Option<String>,
    pub status: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<IncidentReport>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| IncidentStatus::normalize(s).as_str());

    let reports = state.db.with(|conn| {
        let mut statement = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM incident_reports
             WHERE (?1 IS NULL OR barangay_id = ?1) AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = statement
            .query_map(params![query.barangay_id, status], IncidentReport::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    Ok(Json(reports))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IncidentReport>, ApiError> {
    Ok(Json(state.db.with(|conn| fetch(conn, id))?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(input): Payload<IncidentReportInput>,
) -> Result<(StatusCode, Json<IncidentReport>), ApiError> {
    let (Some(kind), Some(description)) = (non_blank(input.kind), non_blank(input.description))
    else {
        return Err(ApiError::missing_fields(&["description", "type"]));
    };

    let reporter_name = non_blank(input.reporter_name).unwrap_or_else(|| "Anonymous".to_string());
    let status = input.status.unwrap_or_default();
    let image_urls = json_list::encode(&input.image_urls.unwrap_or_default());
    let now = db::now();

    let report = state.db.with(|conn| {
        conn.execute(
            "INSERT INTO incident_reports (reporter_name, reporter_contact, type, description,
                 latitude, longitude, address, image_urls, status, barangay_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                reporter_name,
                input.reporter_contact,
                kind,
                description,
                input.latitude,
                input.longitude,
                input.address,
                image_urls,
                status.as_str(),
                input.barangay_id,
                now,
            ],
        )?;
        fetch(conn, conn.last_insert_rowid())
    })?;

    log::info!("Incident report {} filed ({})", report.id, report.kind);
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Payload(input): Payload<IncidentReportInput>,
) -> Result<Json<IncidentReport>, ApiError> {
    let report = state.db.with(|conn| {
        let current = fetch(conn, id)?;
        let image_urls = match input.image_urls {
            Some(urls) => json_list::encode(&urls),
            None => current.image_urls,
        };

        conn.execute(
            "UPDATE incident_reports SET reporter_name = ?1, reporter_contact = ?2, type = ?3,
                 description = ?4, latitude = ?5, longitude = ?6, address = ?7, image_urls = ?8,
                 status = ?9, barangay_id = ?10, updated_at = ?11
             WHERE id = ?12",
            params![
                non_blank(input.reporter_name).unwrap_or(current.reporter_name),
                input.reporter_contact.or(current.reporter_contact),
                non_blank(input.kind).unwrap_or(current.kind),
                non_blank(input.description).unwrap_or(current.description),
                input.latitude.or(current.latitude),
                input.longitude.or(current.longitude),
                input.address.or(current.address),
                image_urls,
                input
                    .status
                    .map(|s| s.as_str().to_string())
                    .unwrap_or(current.status),
                input.barangay_id.or(current.barangay_id),
                db::now(),
                id,
            ],
        )?;
        fetch(conn, id)
    })?;

    Ok(Json(report))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    state.db.with(|conn| {
        let removed = conn.execute("DELETE FROM incident_reports WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(ApiError::NotFound(NOT_FOUND.to_string()));
        }
        Ok(())
    })?;

    Ok(Json(Deleted::new(id)))
}
