use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, OptionalExtension, Row, params};
use sagip_types::ContactInput;
use serde::Serialize;

use super::{
    Deleted,
    extract::{Path, Payload},
};
use crate::{
    AppState,
    db::{self, non_blank},
    error::ApiError,
};

const NOT_FOUND: &str = "Contact not found";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub organization: Option<String>,
    pub phone_number: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub created_at: String,
}

impl Contact {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            organization: row.get(2)?,
            phone_number: row.get(3)?,
            kind: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<Contact, ApiError> {
    conn.query_row(
        "SELECT id, name, organization, phone_number, type, created_at FROM contacts WHERE id = ?1",
        [id],
        Contact::from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = state.db.with(|conn| {
        let mut statement = conn.prepare(
            "SELECT id, name, organization, phone_number, type, created_at FROM contacts ORDER BY id",
        )?;
        let rows = statement
            .query_map([], Contact::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    Ok(Json(contacts))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Contact>, ApiError> {
    Ok(Json(state.db.with(|conn| fetch(conn, id))?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(input): Payload<ContactInput>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let (Some(name), Some(phone_number)) = (non_blank(input.name), non_blank(input.phone_number))
    else {
        return Err(ApiError::missing_fields(&["name", "phoneNumber"]));
    };

    let contact = state.db.with(|conn| {
        conn.execute(
            "INSERT INTO contacts (name, organization, phone_number, type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, input.organization, phone_number, input.kind, db::now()],
        )?;
        fetch(conn, conn.last_insert_rowid())
    })?;

    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Payload(input): Payload<ContactInput>,
) -> Result<Json<Contact>, ApiError> {
    let contact = state.db.with(|conn| {
        let current = fetch(conn, id)?;
        conn.execute(
            "UPDATE contacts SET name = ?1, organization = ?2, phone_number = ?3, type = ?4
             WHERE id = ?5",
            params![
                non_blank(input.name).unwrap_or(current.name),
                input.organization.or(current.organization),
                non_blank(input.phone_number).unwrap_or(current.phone_number),
                input.kind.or(current.kind),
                id,
            ],
        )?;
        fetch(conn, id)
    })?;

    Ok(Json(contact))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    state.db.with(|conn| {
        if conn.execute("DELETE FROM contacts WHERE id = ?1", [id])? == 0 {
            return Err(ApiError::NotFound(NOT_FOUND.to_string()));
        }
        Ok(())
    })?;

    Ok(Json(Deleted::new(id)))
}
