//! In-memory implementation of [`ListingStore`].
//!
//! Listings live in a `Vec` behind a `tokio::sync::RwLock`, kept in
//! insertion order. Nothing is durable; the store exists for tests and for
//! running the API without MongoDB. Mutations take the write lock, which
//! also makes counter increments atomic.
use super::{Counter, ListingStore, StoreError, StoreResult};
use crate::models::{Listing, ListingUpdate};
use crate::query::{contains_ignore_case, ListingFilter, ListingQuery};
use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct InMemoryListingStore {
    listings: Arc<RwLock<Vec<Listing>>>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn insert(&self, listing: Listing) -> StoreResult<Listing> {
        self.listings.write().await.push(listing.clone());
        Ok(listing)
    }

    async fn find(&self, query: &ListingQuery) -> StoreResult<Vec<Listing>> {
        let mut matches: Vec<Listing> = self
            .listings
            .read()
            .await
            .iter()
            .filter(|listing| query.filter.matches(listing))
            .cloned()
            .collect();
        query.sort_listings(&mut matches);

        let remaining = matches.into_iter().skip(query.skip as usize);
        Ok(match query.limit {
            Some(limit) => remaining.take(limit as usize).collect(),
            None => remaining.collect(),
        })
    }

    async fn count(&self, filter: &ListingFilter) -> StoreResult<u64> {
        let listings = self.listings.read().await;
        Ok(listings.iter().filter(|listing| filter.matches(listing)).count() as u64)
    }

    async fn update(&self, id: &ObjectId, update: &ListingUpdate) -> StoreResult<Listing> {
        let mut listings = self.listings.write().await;
        let listing = listings
            .iter_mut()
            .find(|listing| listing.id == *id)
            .ok_or(StoreError::NotFound)?;
        update.apply(listing, Utc::now());
        Ok(listing.clone())
    }

    async fn delete(&self, id: &ObjectId) -> StoreResult<()> {
        let mut listings = self.listings.write().await;
        let index = listings
            .iter()
            .position(|listing| listing.id == *id)
            .ok_or(StoreError::NotFound)?;
        listings.remove(index);
        Ok(())
    }

    async fn increment(&self, id: &ObjectId, counter: Counter) -> StoreResult<Listing> {
        let mut listings = self.listings.write().await;
        let listing = listings
            .iter_mut()
            .find(|listing| listing.id == *id)
            .ok_or(StoreError::NotFound)?;
        match counter {
            Counter::Likes => listing.like_count += 1,
            Counter::Views => listing.view_count += 1,
        }
        Ok(listing.clone())
    }

    async fn record_view(&self, id: &ObjectId) -> StoreResult<Listing> {
        let mut listings = self.listings.write().await;
        let listing = listings
            .iter_mut()
            .find(|listing| listing.id == *id)
            .ok_or(StoreError::NotFound)?;
        let before = listing.clone();
        listing.view_count += 1;
        Ok(before)
    }

    async fn suggestion_candidates(&self, needle: &str) -> StoreResult<Vec<String>> {
        let listings = self.listings.read().await;
        let mut titles: Vec<String> = Vec::new();
        let mut locations: Vec<String> = Vec::new();
        for listing in listings.iter().filter(|listing| {
            contains_ignore_case(&listing.title, needle)
                || contains_ignore_case(&listing.location, needle)
        }) {
            if !titles.contains(&listing.title) {
                titles.push(listing.title.clone());
            }
            if !locations.contains(&listing.location) {
                locations.push(listing.location.clone());
            }
        }
        titles.extend(locations);
        Ok(titles)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, NewListing};
    use crate::query::{SearchParams, TrendingParams};
    use chrono::Duration;

    fn new_listing(title: &str, location: &str, rent: f64) -> NewListing {
        NewListing {
            title: title.to_string(),
            location: location.to_string(),
            rent,
            room_type: "Private".to_string(),
            lifestyle: Vec::new(),
            description: String::new(),
            contact_info: String::new(),
            availability: Availability::Available,
            user_email: "owner@example.com".to_string(),
            user_name: "Owner".to_string(),
        }
    }

    async fn seed(store: &InMemoryListingStore, title: &str, location: &str, rent: f64) -> Listing {
        let listing = new_listing(title, location, rent).into_listing(ObjectId::new(), Utc::now());
        store.insert(listing).await.unwrap()
    }

    #[tokio::test]
    async fn increments_are_counted_individually() {
        let store = InMemoryListingStore::new();
        let listing = seed(&store, "Room", "Dhaka", 100.0).await;
        for _ in 0..3 {
            store.increment(&listing.id, Counter::Views).await.unwrap();
        }
        let liked = store.increment(&listing.id, Counter::Likes).await.unwrap();
        assert_eq!(liked.view_count, 3);
        assert_eq!(liked.like_count, 1);
    }

    #[tokio::test]
    async fn record_view_returns_listing_before_increment() {
        let store = InMemoryListingStore::new();
        let listing = seed(&store, "Room", "Dhaka", 100.0).await;
        for expected in 0..3 {
            let seen = store.record_view(&listing.id).await.unwrap();
            assert_eq!(seen.view_count, expected);
        }
        let stored = store
            .find(&ListingQuery::newest_first(ListingFilter::default()))
            .await
            .unwrap();
        assert_eq!(stored[0].view_count, 3);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = InMemoryListingStore::new();
        let id = ObjectId::new();
        assert!(matches!(
            store.increment(&id, Counter::Views).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.record_view(&id).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.delete(&id).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.update(&id, &ListingUpdate::default()).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn find_sorts_skips_and_limits() {
        let store = InMemoryListingStore::new();
        for (title, rent) in [("a", 300.0), ("b", 100.0), ("c", 200.0), ("d", 400.0)] {
            seed(&store, title, "Dhaka", rent).await;
        }
        let mut params = SearchParams::default();
        params.sort = Some("rent".to_string());
        params.order = Some("asc".to_string());
        params.limit = Some("2".to_string());
        params.page = Some("2".to_string());
        let paged = params.to_query();

        let page = store.find(&paged.query).await.unwrap();
        let rents: Vec<f64> = page.iter().map(|l| l.rent).collect();
        assert_eq!(rents, vec![300.0, 400.0]);
        assert_eq!(store.count(&paged.query.filter).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn trending_ignores_unavailable_listings() {
        let store = InMemoryListingStore::new();
        let mut hidden = new_listing("hidden", "Dhaka", 1.0).into_listing(ObjectId::new(), Utc::now());
        hidden.like_count = 100;
        hidden.availability = Availability::NotAvailable;
        store.insert(hidden).await.unwrap();

        let mut older = new_listing("older", "Dhaka", 1.0)
            .into_listing(ObjectId::new(), Utc::now() - Duration::hours(1));
        older.like_count = 2;
        store.insert(older).await.unwrap();
        let mut newer = new_listing("newer", "Dhaka", 1.0).into_listing(ObjectId::new(), Utc::now());
        newer.like_count = 2;
        store.insert(newer).await.unwrap();

        let trending = store.find(&TrendingParams::default().to_query()).await.unwrap();
        let titles: Vec<_> = trending.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn suggestion_candidates_are_distinct_titles_then_locations() {
        let store = InMemoryListingStore::new();
        seed(&store, "Cozy Gulshan room", "Gulshan", 1.0).await;
        seed(&store, "Cozy Gulshan room", "Banani", 1.0).await;
        seed(&store, "Studio", "Gulshan 2", 1.0).await;
        seed(&store, "Flat", "Mirpur", 1.0).await;

        let candidates = store.suggestion_candidates("gulshan").await.unwrap();
        assert_eq!(
            candidates,
            vec!["Cozy Gulshan room", "Studio", "Gulshan", "Banani", "Gulshan 2"]
        );
    }
}
