use chrono::{DateTime, Utc};
use sagip_types::{NewsInput, json_list};
use serde::Deserialize;

use crate::store::{Editable, Entity, Placement};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawNewsVideo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    #[serde(deserialize_with = "json_list::deserialize")]
    pub category: Vec<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsVideo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub category: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Entity for NewsVideo {
    type Raw = RawNewsVideo;
    type Draft = NewsInput;

    const NAME: &'static str = "news videos";
    const PATH: &'static str = "/api/news";
    const PLACEMENT: Placement = Placement::Prepend;

    fn from_raw(raw: RawNewsVideo) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            video_url: raw.video_url,
            thumbnail_url: raw.thumbnail_url,
            category: raw.category,
            published_at: super::timestamp(raw.published_at.as_deref()),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Editable for NewsVideo {
    type Patch = NewsInput;
}
