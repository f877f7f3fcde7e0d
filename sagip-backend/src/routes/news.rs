use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, OptionalExtension, Row, params};
use sagip_types::{NewsInput, json_list};
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

const NOT_FOUND: &str = "News video not found";

const COLUMNS: &str = "id, title, description, video_url, thumbnail_url, category, published_at";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsVideo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    /// JSON-encoded list, returned as stored.
    pub category: String,
    pub published_at: String,
}

impl NewsVideo {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            video_url: row.get(3)?,
            thumbnail_url: row.get(4)?,
            category: row.get(5)?,
            published_at: row.get(6)?,
        })
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<NewsVideo, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM news WHERE id = ?1"),
        [id],
        NewsVideo::from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<NewsVideo>>, ApiError> {
    let videos = state.db.with(|conn| {
        let mut statement = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM news ORDER BY published_at DESC, id DESC"
        ))?;
        let rows = statement
            .query_map([], NewsVideo::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    Ok(Json(videos))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsVideo>, ApiError> {
    Ok(Json(state.db.with(|conn| fetch(conn, id))?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(input): Payload<NewsInput>,
) -> Result<(StatusCode, Json<NewsVideo>), ApiError> {
    let (Some(title), Some(video_url)) = (non_blank(input.title), non_blank(input.video_url))
    else {
        return Err(ApiError::missing_fields(&["title", "videoUrl"]));
    };
    let category = json_list::encode(&input.category.unwrap_or_default());

    let video = state.db.with(|conn| {
        conn.execute(
            "INSERT INTO news (title, description, video_url, thumbnail_url, category, published_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                title,
                input.description,
                video_url,
                input.thumbnail_url,
                category,
                db::now(),
            ],
        )?;
        fetch(conn, conn.last_insert_rowid())
    })?;

    Ok((StatusCode::CREATED, Json(video)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Payload(input): Payload<NewsInput>,
) -> Result<Json<NewsVideo>, ApiError> {
    let video = state.db.with(|conn| {
        let current = fetch(conn, id)?;
        let category = match input.category {
            Some(category) => json_list::encode(&category),
            None => current.category,
        };

        conn.execute(
            "UPDATE news SET title = ?1, description = ?2, video_url = ?3, thumbnail_url = ?4,
                 category = ?5
             WHERE id = ?6",
            params![
                non_blank(input.title).unwrap_or(current.title),
                input.description.or(current.description),
                non_blank(input.video_url).unwrap_or(current.video_url),
                input.thumbnail_url.or(current.thumbnail_url),
                category,
                id,
            ],
        )?;
        fetch(conn, id)
    })?;

    Ok(Json(video))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    state.db.with(|conn| {
        if conn.execute("DELETE FROM news WHERE id = ?1", [id])? == 0 {
            return Err(ApiError::NotFound(NOT_FOUND.to_string()));
        }
        Ok(())
    })?;

    Ok(Json(Deleted::new(id)))
}
