//! In-memory storage implementation for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::TripStorage;
use crate::types::*;

/// In-memory trip store keyed by join code.
///
/// Mutations go through a single `RwLock`, which gives the per-trip
/// serialization the reconciliation cycle requires as long as callers finish
/// one mutation before starting the next.
#[derive(Debug, Clone)]
pub struct MemoryTripStore {
    trips: Arc<RwLock<HashMap<String, Trip>>>,
}

impl MemoryTripStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            trips: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.trips.write().unwrap().clear();
    }
}

impl Default for MemoryTripStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TripStorage for MemoryTripStore {
    async fn save_trip(&mut self, trip: &Trip) -> TripResult<()> {
        self.trips
            .write()
            .unwrap()
            .insert(trip.code.clone(), trip.clone());
        Ok(())
    }

    async fn get_trip(&self, code: &str) -> TripResult<Option<Trip>> {
        Ok(self.trips.read().unwrap().get(code).cloned())
    }

    async fn list_trips(&self) -> TripResult<Vec<Trip>> {
        Ok(self.trips.read().unwrap().values().cloned().collect())
    }

    async fn update_trip(&mut self, trip: &Trip) -> TripResult<()> {
        let mut trips = self.trips.write().unwrap();
        if trips.contains_key(&trip.code) {
            trips.insert(trip.code.clone(), trip.clone());
            Ok(())
        } else {
            Err(TripError::TripNotFound(trip.code.clone()))
        }
    }

    async fn delete_trip(&mut self, code: &str) -> TripResult<()> {
        if self.trips.write().unwrap().remove(code).is_some() {
            Ok(())
        } else {
            Err(TripError::TripNotFound(code.to_string()))
        }
    }
}
