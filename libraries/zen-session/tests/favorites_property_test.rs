//! Property-based tests for the favorites set
//!
//! The local set must always mirror what the backend stored, whatever
//! sequence of mutations and failures happens.

use async_trait::async_trait;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use zen_backend::{
    BackendError, CategoryRow, DataBackend, MeditationRow, NewProfile, ProfileRow,
};
use zen_core::{MeditationId, UserId};
use zen_session::{FavoriteOutcome, FavoritesSet};

// ===== Helpers =====

#[derive(Default)]
struct FlakyFavorites {
    rows: Mutex<BTreeSet<MeditationId>>,
    offline: AtomicBool,
}

impl FlakyFavorites {
    fn check(&self) -> zen_backend::Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(BackendError::Unreachable("offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DataBackend for FlakyFavorites {
    async fn fetch_profile(&self, _user_id: &UserId) -> zen_backend::Result<ProfileRow> {
        Err(BackendError::AuthRequired)
    }

    async fn find_profile_by_email(&self, _email: &str) -> zen_backend::Result<Option<ProfileRow>> {
        Ok(None)
    }

    async fn create_profile(&self, _profile: &NewProfile) -> zen_backend::Result<ProfileRow> {
        Err(BackendError::AuthRequired)
    }

    async fn list_favorites(&self, _user_id: &UserId) -> zen_backend::Result<Vec<MeditationId>> {
        self.check()?;
        Ok(self.rows.lock().unwrap().iter().cloned().collect())
    }

    async fn insert_favorite(&self, _user_id: &UserId, id: &MeditationId) -> zen_backend::Result<()> {
        self.check()?;
        self.rows.lock().unwrap().insert(id.clone());
        Ok(())
    }

    async fn delete_favorite(&self, _user_id: &UserId, id: &MeditationId) -> zen_backend::Result<()> {
        self.check()?;
        self.rows.lock().unwrap().remove(id);
        Ok(())
    }

    async fn list_categories(&self) -> zen_backend::Result<Vec<CategoryRow>> {
        Ok(Vec::new())
    }

    async fn list_meditations(&self) -> zen_backend::Result<Vec<MeditationRow>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Remove(u8),
    Toggle(u8),
    GoOffline,
    GoOnline,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6).prop_map(Op::Add),
        (0u8..6).prop_map(Op::Remove),
        (0u8..6).prop_map(Op::Toggle),
        Just(Op::GoOffline),
        Just(Op::GoOnline),
    ]
}

fn id(n: u8) -> MeditationId {
    MeditationId::new(format!("m{}", n))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// ===== Property Tests =====

proptest! {
    /// Property: after every operation the local set equals the stored rows
    #[test]
    fn local_set_mirrors_backend(ops in prop::collection::vec(arbitrary_op(), 1..40)) {
        runtime().block_on(async {
            let backend = Arc::new(FlakyFavorites::default());
            let favorites = FavoritesSet::new(backend.clone());
            favorites.load(&UserId::new("u1")).await.unwrap();

            for op in ops {
                let _ = match op {
                    Op::Add(n) => favorites.add(&id(n)).await.map(Some),
                    Op::Remove(n) => favorites.remove(&id(n)).await.map(Some),
                    Op::Toggle(n) => favorites.toggle(&id(n)).await.map(Some),
                    Op::GoOffline => {
                        backend.offline.store(true, Ordering::SeqCst);
                        Ok(None)
                    }
                    Op::GoOnline => {
                        backend.offline.store(false, Ordering::SeqCst);
                        Ok(None)
                    }
                };

                let stored: Vec<_> = backend.rows.lock().unwrap().iter().cloned().collect();
                assert_eq!(favorites.ids().await, stored);
            }
        });
    }

    /// Property: without an owner nothing reaches the backend
    #[test]
    fn anonymous_mutations_redirect(ops in prop::collection::vec(arbitrary_op(), 1..20)) {
        runtime().block_on(async {
            let backend = Arc::new(FlakyFavorites::default());
            let favorites = FavoritesSet::new(backend.clone());

            for op in ops {
                let outcome = match op {
                    Op::Add(n) => favorites.add(&id(n)).await.unwrap(),
                    Op::Remove(n) => favorites.remove(&id(n)).await.unwrap(),
                    Op::Toggle(n) => favorites.toggle(&id(n)).await.unwrap(),
                    Op::GoOffline | Op::GoOnline => continue,
                };
                assert_eq!(outcome, FavoriteOutcome::RedirectToAuth);
            }

            assert!(backend.rows.lock().unwrap().is_empty());
            assert!(favorites.ids().await.is_empty());
        });
    }
}
