//! Boundary to the remote record store.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::errors::StoreError;

/// One user's slice of a collection, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    pub collection: String,
    pub owner_field: String,
    pub owner_id: String,
    pub order_by: String,
    pub descending: bool,
}

/// Full result sets pushed by a live subscription. An `Err` item means the
/// listener failed and will deliver nothing further.
pub type UpdateStream = BoxStream<'static, Result<Vec<Value>, StoreError>>;

/// Releases a live listener. Consuming the handle makes a second release
/// impossible.
pub trait SubscriptionHandle: Send {
    fn unsubscribe(self: Box<Self>);
}

pub struct Subscription {
    pub updates: UpdateStream,
    pub handle: Box<dyn SubscriptionHandle>,
}

#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn fetch(&self, query: &CollectionQuery) -> Result<Vec<Value>, StoreError>;

    async fn subscribe(&self, query: &CollectionQuery) -> Result<Subscription, StoreError>;

    async fn write(&self, collection: &str, document: Value) -> Result<(), StoreError>;

    /// Process-wide toggle; enabling an enabled network is a no-op.
    async fn enable_network(&self) -> Result<(), StoreError>;

    async fn disable_network(&self) -> Result<(), StoreError>;
}
