//! MongoDB implementation of [`ListingStore`].
//!
//! Queries are translated into BSON filter and sort documents. Substring
//! clauses become case-insensitive `$regex` matches on the escaped input, so
//! user text is always matched literally.
use super::{Counter, ListingStore, StoreError, StoreResult};
use crate::models::{Listing, ListingUpdate};
use crate::query::{ListingFilter, ListingQuery, SortDirection, SortKey};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Collection, Database};

pub const COLLECTION: &str = "roommates";

#[derive(Debug, Clone)]
pub struct MongoListingStore {
    db: Database,
    listings: Collection<Listing>,
}

impl MongoListingStore {
    pub fn new(db: &Database) -> Self {
        MongoListingStore {
            db: db.clone(),
            listings: db.collection::<Listing>(COLLECTION),
        }
    }
}

fn contains(value: &str) -> Document {
    doc! { "$regex": regex::escape(value), "$options": "i" }
}

pub fn filter_document(filter: &ListingFilter) -> Document {
    let mut document = Document::new();
    if let Some(text) = &filter.text {
        document.insert(
            "$or",
            vec![
                doc! { "title": contains(text) },
                doc! { "location": contains(text) },
                doc! { "description": contains(text) },
                doc! { "userName": contains(text) },
            ],
        );
    }
    if let Some(location) = &filter.location {
        document.insert("location", contains(location));
    }
    if let Some(room_type) = &filter.room_type {
        document.insert("roomType", room_type.as_str());
    }
    if let Some(availability) = &filter.availability {
        document.insert("availability", availability.as_str());
    }
    if let Some(range) = &filter.rent {
        document.insert("rent", doc! { "$gte": range.min, "$lte": range.max });
    }
    if let Some(email) = &filter.user_email {
        document.insert("userEmail", email.as_str());
    }
    document
}

/// Key order is significant: later keys only break ties.
pub fn sort_document(keys: &[SortKey]) -> Document {
    let mut document = Document::new();
    for key in keys {
        let direction = match key.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };
        document.insert(key.field.name(), direction);
    }
    document
}

pub fn set_document(update: &ListingUpdate) -> Document {
    let mut set = Document::new();
    if let Some(title) = &update.title {
        set.insert("title", title.as_str());
    }
    if let Some(location) = &update.location {
        set.insert("location", location.as_str());
    }
    if let Some(rent) = update.rent {
        set.insert("rent", rent);
    }
    if let Some(room_type) = &update.room_type {
        set.insert("roomType", room_type.as_str());
    }
    if let Some(lifestyle) = &update.lifestyle {
        set.insert("lifestyle", lifestyle.clone());
    }
    if let Some(description) = &update.description {
        set.insert("description", description.as_str());
    }
    if let Some(contact_info) = &update.contact_info {
        set.insert("contactInfo", contact_info.as_str());
    }
    if let Some(availability) = update.availability {
        set.insert("availability", availability.as_str());
    }
    if let Some(email) = &update.user_email {
        set.insert("userEmail", email.as_str());
    }
    if let Some(name) = &update.user_name {
        set.insert("userName", name.as_str());
    }
    set.insert("updatedAt", bson::DateTime::from_chrono(Utc::now()));
    doc! { "$set": set }
}

pub fn suggestion_pipeline(needle: &str) -> Vec<Document> {
    vec![
        doc! {
            "$match": {
                "$or": [
                    { "title": contains(needle) },
                    { "location": contains(needle) },
                ]
            }
        },
        doc! {
            "$group": {
                "_id": Bson::Null,
                "titles": { "$addToSet": "$title" },
                "locations": { "$addToSet": "$location" },
            }
        },
        doc! {
            "$project": {
                "suggestions": { "$concatArrays": ["$titles", "$locations"] }
            }
        },
    ]
}

/// Bounds are clamped to `i64::MAX`; the server rejects larger values.
pub fn find_options(query: &ListingQuery) -> FindOptions {
    let mut options = FindOptions::default();
    options.sort = Some(sort_document(&query.sort));
    if query.skip > 0 {
        options.skip = Some(query.skip.min(i64::MAX as u64));
    }
    options.limit = query
        .limit
        .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));
    options
}

fn returning(document: ReturnDocument) -> FindOneAndUpdateOptions {
    let mut options = FindOneAndUpdateOptions::default();
    options.return_document = Some(document);
    options
}

fn inc_document(counter: Counter) -> Document {
    let mut inc = Document::new();
    inc.insert(counter.field(), 1);
    doc! { "$inc": inc }
}

#[async_trait]
impl ListingStore for MongoListingStore {
    async fn insert(&self, listing: Listing) -> StoreResult<Listing> {
        let result = self.listings.insert_one(&listing, None).await?;
        log::debug!("New listing inserted with id {}", result.inserted_id);
        Ok(listing)
    }

    async fn find(&self, query: &ListingQuery) -> StoreResult<Vec<Listing>> {
        let cursor = self
            .listings
            .find(filter_document(&query.filter), find_options(query))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self, filter: &ListingFilter) -> StoreResult<u64> {
        Ok(self
            .listings
            .count_documents(filter_document(filter), None)
            .await?)
    }

    async fn update(&self, id: &ObjectId, update: &ListingUpdate) -> StoreResult<Listing> {
        self.listings
            .find_one_and_update(doc! { "_id": *id }, set_document(update), returning(ReturnDocument::After))
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: &ObjectId) -> StoreResult<()> {
        let result = self.listings.delete_one(doc! { "_id": *id }, None).await?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn increment(&self, id: &ObjectId, counter: Counter) -> StoreResult<Listing> {
        self.listings
            .find_one_and_update(
                doc! { "_id": *id },
                inc_document(counter),
                returning(ReturnDocument::After),
            )
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn record_view(&self, id: &ObjectId) -> StoreResult<Listing> {
        self.listings
            .find_one_and_update(
                doc! { "_id": *id },
                inc_document(Counter::Views),
                returning(ReturnDocument::Before),
            )
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn suggestion_candidates(&self, needle: &str) -> StoreResult<Vec<String>> {
        let mut cursor = self
            .listings
            .aggregate(suggestion_pipeline(needle), None)
            .await?;
        let Some(group) = cursor.try_next().await? else {
            return Ok(Vec::new());
        };
        Ok(group
            .get_array("suggestions")
            .map(|values| {
                values
                    .iter()
                    .filter_map(|value| value.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SearchParams, SortField, TrendingParams};

    #[test]
    fn search_filter_document() {
        let mut params = SearchParams::default();
        params.search = Some("a.b".to_string());
        params.location = Some("Dhaka".to_string());
        params.room_type = Some("Shared".to_string());
        params.availability = Some("All".to_string());
        params.min_rent = Some("100".to_string());
        let filter = filter_document(&params.to_query().query.filter);

        assert_eq!(
            filter,
            doc! {
                "$or": [
                    { "title": { "$regex": "a\\.b", "$options": "i" } },
                    { "location": { "$regex": "a\\.b", "$options": "i" } },
                    { "description": { "$regex": "a\\.b", "$options": "i" } },
                    { "userName": { "$regex": "a\\.b", "$options": "i" } },
                ],
                "location": { "$regex": "Dhaka", "$options": "i" },
                "roomType": "Shared",
                "rent": { "$gte": 100.0, "$lte": 10000.0 },
            }
        );
    }

    #[test]
    fn trending_sort_document_keeps_key_order() {
        let query = TrendingParams::default().to_query();
        assert_eq!(filter_document(&query.filter), doc! { "availability": "available" });
        let sort = sort_document(&query.sort);
        let keys: Vec<&str> = sort.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["likeCount", "viewCount", "createdAt"]);
        assert_eq!(sort.get_i32("likeCount").unwrap(), -1);
        assert_eq!(
            sort_document(&[SortKey::asc(SortField::Rent)]),
            doc! { "rent": 1 }
        );
    }

    #[test]
    fn set_document_only_contains_present_fields() {
        let update = ListingUpdate {
            rent: Some(650.0),
            lifestyle: Some(vec!["early riser".to_string()]),
            ..Default::default()
        };
        let document = set_document(&update);
        let set = document.get_document("$set").unwrap();
        assert_eq!(set.get_f64("rent").unwrap(), 650.0);
        assert!(set.get_array("lifestyle").is_ok());
        assert!(set.get_datetime("updatedAt").is_ok());
        assert!(!set.contains_key("title"));
        assert!(!set.contains_key("likeCount"));
    }

    #[test]
    fn find_options_clamp_oversized_bounds() {
        let mut query = TrendingParams::default().to_query();
        query.skip = u64::MAX;
        query.limit = Some(u64::MAX);
        let options = find_options(&query);
        assert_eq!(options.skip, Some(i64::MAX as u64));
        assert_eq!(options.limit, Some(i64::MAX));

        query.skip = 0;
        query.limit = Some(6);
        let options = find_options(&query);
        assert_eq!(options.skip, None);
        assert_eq!(options.limit, Some(6));
    }

    #[test]
    fn counters_increment_by_one() {
        assert_eq!(inc_document(Counter::Views), doc! { "$inc": { "viewCount": 1 } });
        assert_eq!(inc_document(Counter::Likes), doc! { "$inc": { "likeCount": 1 } });
    }

    #[test]
    fn suggestion_pipeline_groups_titles_and_locations() {
        let pipeline = suggestion_pipeline("gul");
        assert_eq!(pipeline.len(), 3);
        let group = pipeline[1].get_document("$group").unwrap();
        assert!(group.contains_key("titles"));
        assert!(group.contains_key("locations"));
    }
}
