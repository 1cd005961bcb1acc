use crate::models::{Listing, ListingUpdate};
use crate::query::{ListingFilter, ListingQuery};
use async_trait::async_trait;
use bson::oid::ObjectId;
use thiserror::Error;

pub mod memory;
pub mod mongo;

pub use memory::InMemoryListingStore;
pub use mongo::MongoListingStore;

/// Engagement counters that can only be incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Likes,
    Views,
}

impl Counter {
    pub fn field(&self) -> &'static str {
        match self {
            Counter::Likes => "likeCount",
            Counter::Views => "viewCount",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("listing not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for the listing collection. Every method is a single
/// storage operation.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert(&self, listing: Listing) -> StoreResult<Listing>;
    async fn find(&self, query: &ListingQuery) -> StoreResult<Vec<Listing>>;
    async fn count(&self, filter: &ListingFilter) -> StoreResult<u64>;
    async fn update(&self, id: &ObjectId, update: &ListingUpdate) -> StoreResult<Listing>;
    async fn delete(&self, id: &ObjectId) -> StoreResult<()>;
    /// Atomically adds one to `counter` and returns the updated listing.
    async fn increment(&self, id: &ObjectId, counter: Counter) -> StoreResult<Listing>;
    /// Atomically adds one to the view counter and returns the listing as it
    /// was before the increment.
    async fn record_view(&self, id: &ObjectId) -> StoreResult<Listing>;
    /// Distinct titles then distinct locations of listings whose title or
    /// location contains `needle`, ignoring case.
    async fn suggestion_candidates(&self, needle: &str) -> StoreResult<Vec<String>>;
    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
