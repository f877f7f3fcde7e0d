//! Client-side mirrors of the server's collections.
//!
//! A [`SharedStore`] holds the last loaded copy of one collection. Reads are
//! synchronous snapshots. Writes go to the server first and touch the mirror
//! only once the server has confirmed them, so a failed write leaves the
//! mirror as it was.

use std::{
    sync::{Arc, PoisonError, RwLock, Weak},
    time::Duration,
};

use im::Vector;
use serde::{Serialize, de::DeserializeOwned};
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};

use crate::{backend::Backend, error::ClientError};

/// Where freshly created records go in the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Prepend,
}

/// A record kept in a [`SharedStore`].
pub trait Entity: Clone + Send + Sync + 'static {
    /// Shape of the record as the server sends it.
    type Raw: DeserializeOwned;
    /// Body of a create request.
    type Draft: Serialize + Send + Sync;

    /// Human readable collection name, used in logs.
    const NAME: &'static str;
    /// Collection path, e.g. `/api/alerts`.
    const PATH: &'static str;
    const PLACEMENT: Placement;

    fn from_raw(raw: Self::Raw) -> Self;
    fn id(&self) -> i64;
}

/// Records the server lets clients change and delete by id.
pub trait Editable: Entity {
    type Patch: Serialize + Send + Sync;
}

pub struct SharedStore<E: Entity> {
    backend: Arc<Backend>,
    items: RwLock<Vector<E>>,
}

impl<E: Entity> SharedStore<E> {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self {
            backend,
            items: RwLock::new(Vector::new()),
        }
    }

    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    fn replace(&self, items: Vector<E>) {
        *self.items.write().unwrap_or_else(PoisonError::into_inner) = items;
    }

    fn modify(&self, f: impl FnOnce(&mut Vector<E>)) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut items);
    }

    /// Replaces the mirror with the server's collection.
    ///
    /// Never fails. When the server can't be read the mirror is emptied, the
    /// error logged and `false` returned.
    pub async fn load(&self) -> bool {
        match self.backend.api_get::<Vec<E::Raw>>(E::PATH).await {
            Ok(raw) => {
                let items: Vector<E> = raw.into_iter().map(E::from_raw).collect();
                log::debug!("Loaded {} {}", items.len(), E::NAME);
                self.replace(items);
                true
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", E::NAME);
                self.replace(Vector::new());
                false
            }
        }
    }

    pub fn get(&self) -> Vector<E> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn find(&self, id: i64) -> Option<E> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    fn item_path(id: i64) -> String {
        format!("{}/{id}", E::PATH)
    }

    /// Reads one record straight from the server. The mirror is left alone.
    pub async fn fetch(&self, id: i64) -> Result<E, ClientError> {
        let raw: E::Raw = self.backend.api_get(&Self::item_path(id)).await?;
        Ok(E::from_raw(raw))
    }

    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(items: &mut Vector<E>, item: E) {
        match E::PLACEMENT {
            Placement::Append => items.push_back(item),
            Placement::Prepend => items.push_front(item),
        }
    }

    pub async fn add(&self, draft: &E::Draft) -> Result<E, ClientError> {
        let raw: E::Raw = self.backend.api_post(E::PATH, draft).await?;
        let item = E::from_raw(raw);
        log::info!("Created {} {}", E::NAME, item.id());

        self.modify(|items| Self::insert(items, item.clone()));
        Ok(item)
    }

    /// Reloads the store every `period` until the store is dropped.
    ///
    /// The first reload happens one period from now.
    pub fn spawn_refresh(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.load().await;
            }
        })
    }
}

impl<E: Editable> SharedStore<E> {
    /// Sends the patch and swaps the confirmed record into the mirror.
    pub async fn update(&self, id: i64, patch: &E::Patch) -> Result<E, ClientError> {
        let raw: E::Raw = self.backend.api_put(&Self::item_path(id), patch).await?;
        let item = E::from_raw(raw);

        self.modify(|items| match items.iter().position(|existing| existing.id() == id) {
            Some(index) => {
                items.set(index, item.clone());
            }
            None => Self::insert(items, item.clone()),
        });
        Ok(item)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.backend.api_delete(&Self::item_path(id)).await?;
        log::info!("Deleted {} {id}", E::NAME);

        self.modify(|items| items.retain(|item| item.id() != id));
        Ok(())
    }
}
