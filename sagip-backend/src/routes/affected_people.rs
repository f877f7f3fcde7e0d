use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, OptionalExtension, Row, params};
use sagip_types::AffectedPersonInput;
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

const NOT_FOUND: &str = "Person not found";

const COLUMNS: &str =
    "id, name, sex, age, purok, birthday, affected, evacuated, barangay_id, created_at";

/// A resident recorded as affected by an incident in a barangay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedPerson {
    pub id: i64,
    pub name: String,
    pub sex: Option<String>,
    pub age: Option<u32>,
    pub purok: Option<String>,
    pub birthday: Option<String>,
    pub affected: bool,
    pub evacuated: bool,
    pub barangay_id: String,
    pub created_at: String,
}

impl AffectedPerson {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            sex: row.get(2)?,
            age: row.get(3)?,
            purok: row.get(4)?,
            birthday: row.get(5)?,
            affected: row.get(6)?,
            evacuated: row.get(7)?,
            barangay_id: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<AffectedPerson, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM affected_people WHERE id = ?1"),
        [id],
        AffectedPerson::from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub barangay_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AffectedPerson>>, ApiError> {
    let people = state.db.with(|conn| {
        let mut statement = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM affected_people
             WHERE (?1 IS NULL OR barangay_id = ?1)
             ORDER BY id"
        ))?;
        let rows = statement
            .query_map([query.barangay_id], AffectedPerson::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    Ok(Json(people))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AffectedPerson>, ApiError> {
    Ok(Json(state.db.with(|conn| fetch(conn, id))?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(input): Payload<AffectedPersonInput>,
) -> Result<(StatusCode, Json<AffectedPerson>), ApiError> {
    let (Some(name), Some(barangay_id)) = (non_blank(input.name), non_blank(input.barangay_id))
    else {
        return Err(ApiError::missing_fields(&["name", "barangayId"]));
    };

    let person = state.db.with(|conn| {
        conn.execute(
            "INSERT INTO affected_people
                 (name, sex, age, purok, birthday, affected, evacuated, barangay_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                name,
                input.sex,
                input.age,
                input.purok,
                non_blank(input.birthday),
                input.affected.unwrap_or(true),
                input.evacuated.unwrap_or(false),
                barangay_id,
                db::now(),
            ],
        )?;
        fetch(conn, conn.last_insert_rowid())
    })?;

    Ok((StatusCode::CREATED, Json(person)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Payload(input): Payload<AffectedPersonInput>,
) -> Result<Json<AffectedPerson>, ApiError> {
    let person = state.db.with(|conn| {
        let current = fetch(conn, id)?;
        conn.execute(
            "UPDATE affected_people SET name = ?1, sex = ?2, age = ?3, purok = ?4, birthday = ?5,
                 affected = ?6, evacuated = ?7, barangay_id = ?8
             WHERE id = ?9",
            params![
                non_blank(input.name).unwrap_or(current.name),
                input.sex.or(current.sex),
                input.age.or(current.age),
                input.purok.or(current.purok),
                non_blank(input.birthday).or(current.birthday),
                input.affected.unwrap_or(current.affected),
                input.evacuated.unwrap_or(current.evacuated),
                non_blank(input.barangay_id).unwrap_or(current.barangay_id),
                id,
            ],
        )?;
        fetch(conn, id)
    })?;

    Ok(Json(person))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    state.db.with(|conn| {
        if conn.execute("DELETE FROM affected_people WHERE id = ?1", [id])? == 0 {
            return Err(ApiError::NotFound(NOT_FOUND.to_string()));
        }
        Ok(())
    })?;

    Ok(Json(Deleted::new(id)))
}
