//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use cakestore::application::context::RequestContext;
use cakestore::application::repos::{CakesRepo, HealthRepo, RepoError};
use cakestore::domain::entities::CakeRecord;

/// Behaves like the Postgres store: reads skip soft-deleted rows and
/// `find_all` orders by rating then title.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<i64, CakeRecord>>,
    next_id: AtomicUsize,
    lookups: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn raw(&self, id: i64) -> Option<CakeRecord> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn check_online(&self) -> Result<(), RepoError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }

    fn write_active(&self, cake: &CakeRecord) -> Result<(), RepoError> {
        self.check_online()?;
        let mut rows = self.rows.lock().unwrap();
        match rows.get(&cake.id) {
            Some(existing) if existing.deleted_at.is_none() => {
                rows.insert(cake.id, cake.clone());
                Ok(())
            }
            _ => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CakesRepo for MemoryStore {
    async fn save(&self, _ctx: &RequestContext, cake: &mut CakeRecord) -> Result<(), RepoError> {
        self.check_online()?;
        cake.id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.rows.lock().unwrap().insert(cake.id, cake.clone());
        Ok(())
    }

    async fn update(&self, _ctx: &RequestContext, cake: &CakeRecord) -> Result<(), RepoError> {
        self.write_active(cake)
    }

    async fn delete(&self, _ctx: &RequestContext, cake: &CakeRecord) -> Result<(), RepoError> {
        self.write_active(cake)
    }

    async fn find_all(&self, _ctx: &RequestContext) -> Result<Vec<CakeRecord>, RepoError> {
        self.check_online()?;
        let mut cakes: Vec<CakeRecord> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|cake| cake.deleted_at.is_none())
            .cloned()
            .collect();
        cakes.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(cakes)
    }

    async fn find_by_id(
        &self,
        _ctx: &RequestContext,
        id: i64,
    ) -> Result<Option<CakeRecord>, RepoError> {
        self.check_online()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&id)
            .filter(|cake| cake.deleted_at.is_none())
            .cloned())
    }
}

#[async_trait]
impl HealthRepo for MemoryStore {
    async fn ping(&self) -> Result<(), RepoError> {
        self.check_online()
    }
}
