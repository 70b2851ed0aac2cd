//! Catalog loader tests against an in-memory data backend.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zen_backend::{
    BackendError, BackendErrorKind, CategoryRow, DataBackend, MeditationRow, NewProfile,
    ProfileRow, RetryPolicy,
};
use zen_catalog::{CatalogLoader, DiscoverFilter};
use zen_core::{CategoryId, MeditationId, UserId};

#[derive(Default)]
struct FakeCatalog {
    categories: Mutex<Vec<CategoryRow>>,
    meditations: Mutex<Vec<MeditationRow>>,
    meditation_calls: AtomicU32,
    /// Transient failures to return before succeeding
    transient_failures: AtomicU32,
    /// Permanent failure for every meditations call
    broken: Mutex<Option<BackendError>>,
}

impl FakeCatalog {
    fn seeded() -> Self {
        let fake = Self::default();
        *fake.categories.lock().unwrap() = vec![
            CategoryRow {
                id: CategoryId::new("breath"),
                name: "Breathwork".into(),
                description: None,
                created_at: None,
            },
            CategoryRow {
                id: CategoryId::new("sleep"),
                name: "Sleep".into(),
                description: Some("Wind down".into()),
                created_at: None,
            },
        ];
        *fake.meditations.lock().unwrap() = vec![
            row("m2", "Night Sky", "sleep", 20, false),
            row("m1", "Dune Sunrise", "breath", 10, true),
        ];
        fake
    }
}

fn row(id: &str, title: &str, category: &str, minutes: u32, featured: bool) -> MeditationRow {
    MeditationRow {
        id: MeditationId::new(id),
        title: title.into(),
        description: String::new(),
        category_id: CategoryId::new(category),
        duration_minutes: minutes,
        audio_url: format!("https://cdn.example.com/{}.mp3", id),
        image_url: String::new(),
        featured,
        created_at: "2024-05-01T00:00:00Z".into(),
        updated_at: None,
        categories: None,
    }
}

#[async_trait]
impl DataBackend for FakeCatalog {
    async fn fetch_profile(&self, _user_id: &UserId) -> zen_backend::Result<ProfileRow> {
        Err(BackendError::api(BackendErrorKind::NotFound, 406, "no rows"))
    }

    async fn find_profile_by_email(&self, _email: &str) -> zen_backend::Result<Option<ProfileRow>> {
        Ok(None)
    }

    async fn create_profile(&self, _profile: &NewProfile) -> zen_backend::Result<ProfileRow> {
        Err(BackendError::AuthRequired)
    }

    async fn list_favorites(&self, _user_id: &UserId) -> zen_backend::Result<Vec<MeditationId>> {
        Ok(Vec::new())
    }

    async fn insert_favorite(&self, _user_id: &UserId, _id: &MeditationId) -> zen_backend::Result<()> {
        Ok(())
    }

    async fn delete_favorite(&self, _user_id: &UserId, _id: &MeditationId) -> zen_backend::Result<()> {
        Ok(())
    }

    async fn list_categories(&self) -> zen_backend::Result<Vec<CategoryRow>> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn list_meditations(&self) -> zen_backend::Result<Vec<MeditationRow>> {
        self.meditation_calls.fetch_add(1, Ordering::SeqCst);

        if self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(BackendError::api(BackendErrorKind::Server, 503, "Service Unavailable"));
        }
        if let Some(kind) = self.broken.lock().unwrap().as_ref().map(BackendError::kind) {
            return Err(BackendError::api(kind, 400, "permission denied for table meditations"));
        }
        Ok(self.meditations.lock().unwrap().clone())
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        multiplier: 2.0,
    }
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_load_reshapes_rows() {
    let data = Arc::new(FakeCatalog::seeded());
    let loader = CatalogLoader::new(data, fast_retry());

    loader.load().await.unwrap();
    let snapshot = loader.snapshot();

    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.catalog.categories.len(), 2);

    // Backend order (newest first) is preserved
    let titles: Vec<_> = snapshot.catalog.meditations.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Night Sky", "Dune Sunrise"]);
    assert_eq!(snapshot.catalog.meditations[0].length, "20m");
    assert_eq!(
        snapshot.catalog.category_name(&CategoryId::new("sleep")),
        Some("Sleep")
    );
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let data = Arc::new(FakeCatalog::seeded());
    data.transient_failures.store(2, Ordering::SeqCst);
    let loader = CatalogLoader::new(data.clone(), fast_retry());

    loader.load().await.unwrap();
    assert_eq!(data.meditation_calls.load(Ordering::SeqCst), 3);
    assert_eq!(loader.snapshot().catalog.meditations.len(), 2);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_data() {
    let data = Arc::new(FakeCatalog::seeded());
    let loader = CatalogLoader::new(data.clone(), fast_retry());
    loader.load().await.unwrap();

    *data.broken.lock().unwrap() = Some(BackendError::api(BackendErrorKind::Unauthorized, 401, ""));
    data.meditations.lock().unwrap().clear();

    let err = loader.refresh().await.unwrap_err();
    let snapshot = loader.snapshot();

    assert_eq!(snapshot.error, Some(err.user_message()));
    assert_eq!(
        snapshot.error.as_deref(),
        Some("permission denied for table meditations")
    );
    assert!(!snapshot.loading);
    assert_eq!(snapshot.catalog.meditations.len(), 2);
    // Permanent errors are not retried
    assert_eq!(data.meditation_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_next_load_clears_error() {
    let data = Arc::new(FakeCatalog::seeded());
    *data.broken.lock().unwrap() = Some(BackendError::AuthRequired);
    let loader = CatalogLoader::new(data.clone(), fast_retry());

    assert!(loader.load().await.is_err());
    assert!(loader.snapshot().error.is_some());

    *data.broken.lock().unwrap() = None;
    loader.refresh().await.unwrap();
    assert!(loader.snapshot().error.is_none());
}

#[tokio::test]
async fn test_observers_see_loaded_catalog() {
    let data = Arc::new(FakeCatalog::seeded());
    let loader = CatalogLoader::new(data, fast_retry());
    let mut rx = loader.subscribe();
    assert!(rx.borrow_and_update().loading);

    loader.load().await.unwrap();
    assert!(rx.has_changed().unwrap());

    let snapshot = rx.borrow_and_update().clone();
    let filter = DiscoverFilter {
        query: "dune".into(),
        ..DiscoverFilter::default()
    };
    assert_eq!(snapshot.catalog.discover(&filter).len(), 1);
    assert_eq!(snapshot.catalog.featured().len(), 1);
}
