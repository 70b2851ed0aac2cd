//! Fetches categories and meditations and publishes them to observers.

use crate::browse::Catalog;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use zen_backend::{CategoryRow, DataBackend, MeditationRow, RetryPolicy};
use zen_core::types::format_length;
use zen_core::{Category, Meditation};

/// Catalog plus load status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub catalog: Catalog,

    /// A fetch is in flight
    pub loading: bool,

    /// Message from the last failed fetch, cleared when the next one starts
    pub error: Option<String>,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self {
            catalog: Catalog::default(),
            // Nothing is shown until the first load finishes
            loading: true,
            error: None,
        }
    }
}

/// Loads the catalog tables.
pub struct CatalogLoader {
    data: Arc<dyn DataBackend>,
    retry: RetryPolicy,
    state: watch::Sender<CatalogSnapshot>,
}

impl CatalogLoader {
    pub fn new(data: Arc<dyn DataBackend>, retry: RetryPolicy) -> Self {
        let (state, _) = watch::channel(CatalogSnapshot::default());
        Self { data, retry, state }
    }

    /// Watch catalog updates
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.state.subscribe()
    }

    /// Current catalog and status
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.state.borrow().clone()
    }

    /// Fetch categories then meditations.
    ///
    /// On failure the previously loaded catalog is kept and `error` is set.
    pub async fn load(&self) -> Result<()> {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        match self.fetch().await {
            Ok(catalog) => {
                info!(
                    categories = catalog.categories.len(),
                    meditations = catalog.meditations.len(),
                    "Catalog loaded"
                );
                self.state.send_modify(|s| {
                    s.catalog = catalog;
                    s.loading = false;
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load catalog");
                let message = e.user_message();
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(message);
                });
                Err(e)
            }
        }
    }

    /// Refetch everything (pull to refresh)
    pub async fn refresh(&self) -> Result<()> {
        debug!("Refreshing catalog");
        self.load().await
    }

    async fn fetch(&self) -> Result<Catalog> {
        let data = &self.data;

        let categories = self
            .retry
            .run("list_categories", move || async move { data.list_categories().await })
            .await?;
        let meditations = self
            .retry
            .run("list_meditations", move || async move { data.list_meditations().await })
            .await?;

        Ok(Catalog {
            categories: categories.into_iter().map(category_from_row).collect(),
            meditations: meditations.into_iter().map(meditation_from_row).collect(),
        })
    }
}

/// Reshape a `categories` row
pub fn category_from_row(row: CategoryRow) -> Category {
    Category {
        id: row.id,
        name: row.name,
        description: row.description,
    }
}

/// Reshape a `meditations` row for display
pub fn meditation_from_row(row: MeditationRow) -> Meditation {
    Meditation {
        id: row.id,
        title: row.title,
        description: row.description,
        category: row.category_id,
        length: format_length(row.duration_minutes),
        duration_minutes: row.duration_minutes,
        audio_url: row.audio_url,
        image_url: row.image_url,
        featured: row.featured,
        created_at: row.created_at,
    }
}
