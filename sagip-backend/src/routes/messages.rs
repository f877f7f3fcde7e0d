use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{OptionalExtension, Row, params};
use sagip_types::{MessageInput, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::extract::{Payload, Query};
use crate::{
    AppState,
    db::{self, non_blank},
    error::ApiError,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub conversation_id: String,
    pub sender: String,
    pub body: String,
    pub recipient_role: Option<String>,
    pub created_at: String,
}

impl Message {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            conversation_id: row.get(1)?,
            sender: row.get(2)?,
            body: row.get(3)?,
            recipient_role: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub conversation_id: Option<String>,
    pub recipient_role: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let recipient_role = query
        .recipient_role
        .as_deref()
        .map(|role| UserRole::normalize(role).as_str());

    let messages = state.db.with(|conn| {
        let mut statement = conn.prepare(
            "SELECT id, conversation_id, sender, body, recipient_role, created_at FROM messages
             WHERE (?1 IS NULL OR conversation_id = ?1)
               AND (?2 IS NULL OR recipient_role = ?2)
             ORDER BY created_at, id",
        )?;
        let rows = statement
            .query_map(
                params![query.conversation_id, recipient_role],
                Message::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    Ok(Json(messages))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(input): Payload<MessageInput>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let (Some(sender), Some(body)) = (non_blank(input.sender), non_blank(input.body)) else {
        return Err(ApiError::missing_fields(&["sender", "body"]));
    };
    let conversation_id =
        non_blank(input.conversation_id).unwrap_or_else(|| Uuid::new_v4().to_string());

    let message = state.db.with(|conn| {
        conn.execute(
            "INSERT INTO messages (conversation_id, sender, body, recipient_role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                conversation_id,
                sender,
                body,
                input.recipient_role.map(|r| r.as_str()),
                db::now(),
            ],
        )?;
        conn.query_row(
            "SELECT id, conversation_id, sender, body, recipient_role, created_at FROM messages
             WHERE id = ?1",
            [conn.last_insert_rowid()],
            Message::from_row,
        )
        .optional()?
        .ok_or_else(|| ApiError::Internal("inserted message vanished".to_string()))
    })?;

    Ok((StatusCode::CREATED, Json(message)))
}
