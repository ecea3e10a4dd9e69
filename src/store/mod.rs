use crate::error::StoreError;
use crate::models::{Bus, Favorite, Feedback, FeedbackStatus, Stop};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Anything kept in a collection: it owns a string identity assigned on insert.
pub trait Document {
    fn id(&self) -> &str;
    fn assign_id(&mut self, id: String);
}

impl Document for Bus {
    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

macro_rules! string_id_document {
    ($($ty:ty),*) => {
        $(impl Document for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn assign_id(&mut self, id: String) {
                self.id = id;
            }
        })*
    };
}

string_id_document!(Stop, Favorite, Feedback);

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Collections {
    #[serde(default)]
    pub buses: Vec<Bus>,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub favorites: Vec<Favorite>,
    #[serde(default)]
    pub feedback: Vec<Feedback>,
}

impl Collections {
    pub fn is_empty(&self) -> bool {
        self.buses.is_empty()
            && self.stops.is_empty()
            && self.favorites.is_empty()
            && self.feedback.is_empty()
    }

    fn assign_missing_ids(&mut self) {
        fill_ids(&mut self.buses);
        fill_ids(&mut self.stops);
        fill_ids(&mut self.favorites);
        fill_ids(&mut self.feedback);
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn fill_ids<T: Document>(docs: &mut [T]) {
    for doc in docs.iter_mut().filter(|d| d.id().is_empty()) {
        doc.assign_id(new_id());
    }
}

fn insert<T: Document + Clone>(docs: &mut Vec<T>, mut doc: T) -> T {
    doc.assign_id(new_id());
    docs.push(doc.clone());
    doc
}

fn remove<T: Document>(docs: &mut Vec<T>, id: &str) -> bool {
    let before = docs.len();
    docs.retain(|d| d.id() != id);
    docs.len() != before
}

/// Document store backing every collection of the service. Reads hand out
/// point-in-time clones; writes are last-write-wins. When a data file is
/// configured the whole snapshot is rewritten after each mutation.
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<Collections>,
    path: Option<PathBuf>,
}

impl Store {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_collections(mut collections: Collections) -> Self {
        collections.assign_missing_ids();
        Self {
            data: RwLock::new(collections),
            path: None,
        }
    }

    /// Opens the snapshot at `path`, starting empty if it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let collections = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            read_collections(&path).await?
        } else {
            tracing::info!("Data file {:?} not found, starting empty", path);
            Collections::default()
        };

        let mut store = Self::with_collections(collections);
        store.path = Some(path);
        Ok(store)
    }

    /// Loads `path` into the store if, and only if, the store holds nothing.
    pub async fn seed_if_empty(&self, path: &Path) -> Result<bool, StoreError> {
        if !self.data.read().await.is_empty() {
            return Ok(false);
        }

        let mut seed = read_collections(path).await?;
        seed.assign_missing_ids();
        let now = Utc::now();
        for bus in seed.buses.iter_mut() {
            bus.created_at.get_or_insert(now);
        }
        for stop in seed.stops.iter_mut() {
            stop.created_at.get_or_insert(now);
        }

        tracing::info!(
            "Seeding {} buses and {} stops from {:?}",
            seed.buses.len(),
            seed.stops.len(),
            path
        );
        self.mutate(|data| *data = seed).await?;
        Ok(true)
    }

    pub async fn snapshot(&self) -> Collections {
        self.data.read().await.clone()
    }

    pub async fn buses(&self) -> Vec<Bus> {
        self.data.read().await.buses.clone()
    }

    pub async fn bus(&self, id: &str) -> Option<Bus> {
        self.data
            .read()
            .await
            .buses
            .iter()
            .find(|b| b.id() == id)
            .cloned()
    }

    pub async fn insert_bus(&self, bus: Bus) -> Result<Bus, StoreError> {
        self.mutate(|data| insert(&mut data.buses, bus)).await
    }

    /// Replaces the stored bus with the same id. Returns false if it is gone.
    pub async fn replace_bus(&self, bus: Bus) -> Result<bool, StoreError> {
        let id = bus.id().to_string();
        self.mutate(|data| match data.buses.iter_mut().find(|b| b.id() == id) {
            Some(slot) => {
                *slot = bus;
                true
            }
            None => false,
        })
        .await
    }

    pub async fn delete_bus(&self, id: &str) -> Result<bool, StoreError> {
        self.mutate(|data| remove(&mut data.buses, id)).await
    }

    pub async fn stops(&self) -> Vec<Stop> {
        self.data.read().await.stops.clone()
    }

    pub async fn insert_stop(&self, stop: Stop) -> Result<Stop, StoreError> {
        self.mutate(|data| insert(&mut data.stops, stop)).await
    }

    pub async fn favorites(&self) -> Vec<Favorite> {
        self.data.read().await.favorites.clone()
    }

    pub async fn insert_favorite(&self, favorite: Favorite) -> Result<Favorite, StoreError> {
        self.mutate(|data| insert(&mut data.favorites, favorite)).await
    }

    pub async fn delete_favorite(&self, id: &str) -> Result<bool, StoreError> {
        self.mutate(|data| remove(&mut data.favorites, id)).await
    }

    pub async fn feedback(&self) -> Vec<Feedback> {
        self.data.read().await.feedback.clone()
    }

    pub async fn insert_feedback(&self, feedback: Feedback) -> Result<Feedback, StoreError> {
        self.mutate(|data| insert(&mut data.feedback, feedback)).await
    }

    pub async fn set_feedback_status(
        &self,
        id: &str,
        status: FeedbackStatus,
    ) -> Result<bool, StoreError> {
        self.mutate(|data| match data.feedback.iter_mut().find(|f| f.id == id) {
            Some(feedback) => {
                feedback.status = status;
                true
            }
            None => false,
        })
        .await
    }

    /// Applies `f` and persists the result. With a data file, the change only
    /// becomes visible once the snapshot has been written.
    async fn mutate<R>(&self, f: impl FnOnce(&mut Collections) -> R) -> Result<R, StoreError> {
        let mut data = self.data.write().await;
        let Some(path) = &self.path else {
            return Ok(f(&mut *data));
        };

        let mut next = data.clone();
        let out = f(&mut next);
        write_collections(path, &next).await?;
        *data = next;
        Ok(out)
    }
}

async fn read_collections(path: &Path) -> Result<Collections, StoreError> {
    let raw = tokio::fs::read(path).await.map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| StoreError::Json {
        path: path.display().to_string(),
        source,
    })
}

async fn write_collections(path: &Path, data: &Collections) -> Result<(), StoreError> {
    let raw = serde_json::to_vec_pretty(data).map_err(|source| StoreError::Json {
        path: path.display().to_string(),
        source,
    })?;
    tokio::fs::write(path, raw)
        .await
        .map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })
}
