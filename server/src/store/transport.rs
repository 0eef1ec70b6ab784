//! GeofenceTransport trait definition

use async_trait::async_trait;

use super::types::{ListPage, PutGeofence, PutOutcome, StoreError};

/// Credentialed access to a remote geofencing service.
///
/// Implementations report failures promptly; retries and deadlines belong to
/// the caller.
#[async_trait]
pub trait GeofenceTransport: Send + Sync {
    /// Create or replace a geofence in a collection
    async fn put_geofence(
        &self,
        collection: &str,
        request: PutGeofence,
    ) -> Result<PutOutcome, StoreError>;

    /// Fetch one page of geofences, starting at `next_token` when given
    async fn list_geofences(
        &self,
        collection: &str,
        next_token: Option<&str>,
    ) -> Result<ListPage, StoreError>;

    /// Remove a geofence from a collection
    async fn delete_geofence(&self, collection: &str, geofence_id: &str)
    -> Result<(), StoreError>;
}
