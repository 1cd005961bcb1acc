//! Translation of loosely-typed listing request parameters into typed
//! queries.
//!
//! Every parameter arrives as an optional string. Parsing never fails: a
//! missing, empty, unparseable or out-of-range value falls back to its
//! documented default. The resulting [`ListingQuery`] is backend-neutral;
//! stores either evaluate it in process ([`ListingFilter::matches`],
//! [`SortKey::compare`]) or translate it into their own query language.
use crate::models::{Availability, Listing};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_MIN_RENT: f64 = 0.0;
pub const DEFAULT_MAX_RENT: f64 = 10_000.0;
pub const DEFAULT_PAGE_SIZE: u64 = 12;
pub const DEFAULT_TRENDING_LIMIT: u64 = 6;
pub const MIN_SUGGESTION_LEN: usize = 2;
pub const MAX_SUGGESTIONS: usize = 10;

/// Sentinel sent by the front end's filter dropdowns meaning "no filter".
const ALL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn parse(order: Option<&str>) -> Self {
        match order {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Rent,
    LikeCount,
    ViewCount,
    Title,
}

impl SortField {
    /// Stored document field name.
    pub fn name(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Rent => "rent",
            SortField::LikeCount => "likeCount",
            SortField::ViewCount => "viewCount",
            SortField::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub const fn asc(field: SortField) -> Self {
        SortKey {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub const fn desc(field: SortField) -> Self {
        SortKey {
            field,
            direction: SortDirection::Desc,
        }
    }

    pub fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        let ordering = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Rent => a.rent.total_cmp(&b.rent),
            SortField::LikeCount => a.like_count.cmp(&b.like_count),
            SortField::ViewCount => a.view_count.cmp(&b.view_count),
            SortField::Title => a.title.cmp(&b.title),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Sort options accepted by `all-items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Newest,
    Oldest,
    Rent,
    Likes,
    Title,
}

impl SortBy {
    fn parse(sort: Option<&str>) -> Self {
        match sort {
            Some("oldest") => SortBy::Oldest,
            Some("rent") => SortBy::Rent,
            Some("likes") => SortBy::Likes,
            Some("title") => SortBy::Title,
            _ => SortBy::Newest,
        }
    }

    /// `newest` and `oldest` have a fixed direction and ignore `order`.
    pub fn key(&self, direction: SortDirection) -> SortKey {
        match self {
            SortBy::Newest => SortKey::desc(SortField::CreatedAt),
            SortBy::Oldest => SortKey::asc(SortField::CreatedAt),
            SortBy::Rent => SortKey {
                field: SortField::Rent,
                direction,
            },
            SortBy::Likes => SortKey {
                field: SortField::LikeCount,
                direction,
            },
            SortBy::Title => SortKey {
                field: SortField::Title,
                direction,
            },
        }
    }
}

/// Inclusive rent bounds. `min > max` is valid and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentRange {
    pub min: f64,
    pub max: f64,
}

impl RentRange {
    pub fn contains(&self, rent: f64) -> bool {
        self.min <= rent && rent <= self.max
    }
}

/// Conjunction of optional predicate clauses over a listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    /// Case-insensitive substring over title, location, description or user name.
    pub text: Option<String>,
    /// Case-insensitive substring over location.
    pub location: Option<String>,
    pub room_type: Option<String>,
    /// Exact match against the stored availability string.
    pub availability: Option<String>,
    pub rent: Option<RentRange>,
    pub user_email: Option<String>,
}

impl ListingFilter {
    pub fn available_only() -> Self {
        ListingFilter {
            availability: Some(Availability::Available.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(text) = &self.text {
            let hit = [
                &listing.title,
                &listing.location,
                &listing.description,
                &listing.user_name,
            ]
            .iter()
            .any(|field| contains_ignore_case(field, text));
            if !hit {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !contains_ignore_case(&listing.location, location) {
                return false;
            }
        }
        if let Some(room_type) = &self.room_type {
            if &listing.room_type != room_type {
                return false;
            }
        }
        if let Some(availability) = &self.availability {
            if listing.availability.as_str() != availability {
                return false;
            }
        }
        if let Some(range) = &self.rent {
            if !range.contains(listing.rent) {
                return false;
            }
        }
        if let Some(email) = &self.user_email {
            if &listing.user_email != email {
                return false;
            }
        }
        true
    }
}

/// A filtered, ordered window over the listing collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub filter: ListingFilter,
    /// Applied in order; later keys break ties of earlier ones.
    pub sort: Vec<SortKey>,
    pub skip: u64,
    /// `None` returns every remaining match.
    pub limit: Option<u64>,
}

impl ListingQuery {
    pub fn newest_first(filter: ListingFilter) -> Self {
        ListingQuery {
            filter,
            sort: vec![SortKey::desc(SortField::CreatedAt)],
            skip: 0,
            limit: None,
        }
    }

    pub fn owned_by(email: &str) -> Self {
        Self::newest_first(ListingFilter {
            user_email: Some(email.to_string()),
            ..Default::default()
        })
    }

    /// Orders `listings` by the sort keys. The sort is stable, so full ties
    /// keep their input order.
    pub fn sort_listings(&self, listings: &mut [Listing]) {
        listings.sort_by(|a, b| {
            self.sort
                .iter()
                .map(|key| key.compare(a, b))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }
}

/// Query string of `GET /roommates`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub available: Option<String>,
}

impl ListParams {
    pub fn to_query(&self) -> ListingQuery {
        let filter = if self.available.as_deref() == Some("true") {
            ListingFilter::available_only()
        } else {
            ListingFilter::default()
        };
        let mut query = ListingQuery::newest_first(filter);
        query.limit = parse_positive(self.limit.as_deref());
        query
    }
}

/// Query string of `GET /roommates/trending`.
#[derive(Debug, Default, Deserialize)]
pub struct TrendingParams {
    pub limit: Option<String>,
}

impl TrendingParams {
    pub fn to_query(&self) -> ListingQuery {
        ListingQuery {
            filter: ListingFilter::available_only(),
            sort: vec![
                SortKey::desc(SortField::LikeCount),
                SortKey::desc(SortField::ViewCount),
                SortKey::desc(SortField::CreatedAt),
            ],
            skip: 0,
            limit: Some(parse_positive(self.limit.as_deref()).unwrap_or(DEFAULT_TRENDING_LIMIT)),
        }
    }
}

/// Query string of `GET /roommates/my-listings`.
#[derive(Debug, Default, Deserialize)]
pub struct OwnerParams {
    pub email: Option<String>,
}

impl OwnerParams {
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }
}

/// Query string of `GET /roommates/all-items`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub search: Option<String>,
    pub location: Option<String>,
    pub room_type: Option<String>,
    pub availability: Option<String>,
    pub min_rent: Option<String>,
    pub max_rent: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A search query together with the page it was asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedQuery {
    pub query: ListingQuery,
    pub page: u64,
    pub limit: u64,
}

impl PagedQuery {
    pub fn page_info(&self, total: u64) -> PageInfo {
        PageInfo::new(self.page, self.limit, total)
    }
}

impl SearchParams {
    pub fn to_query(&self) -> PagedQuery {
        let filter = ListingFilter {
            text: non_empty(self.search.as_deref()).map(str::to_string),
            location: non_empty(self.location.as_deref()).map(str::to_string),
            room_type: selection(self.room_type.as_deref()),
            availability: selection(self.availability.as_deref()),
            rent: Some(RentRange {
                min: parse_number(self.min_rent.as_deref()).unwrap_or(DEFAULT_MIN_RENT),
                max: parse_number(self.max_rent.as_deref()).unwrap_or(DEFAULT_MAX_RENT),
            }),
            user_email: None,
        };
        let direction = SortDirection::parse(self.order.as_deref());
        let sort = SortBy::parse(self.sort.as_deref()).key(direction);

        let page = parse_positive(self.page.as_deref()).unwrap_or(1);
        let limit = parse_positive(self.limit.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE);

        PagedQuery {
            query: ListingQuery {
                filter,
                sort: vec![sort],
                skip: (page - 1).saturating_mul(limit),
                limit: Some(limit),
            },
            page,
            limit,
        }
    }
}

/// Pagination metadata returned alongside a page of listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current: u64,
    pub pages: u64,
    pub total: u64,
}

impl PageInfo {
    pub fn new(current: u64, limit: u64, total: u64) -> Self {
        PageInfo {
            current,
            pages: total.div_ceil(limit.max(1)),
            total,
        }
    }
}

/// Query string of `GET /roommates/search-suggestions`.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionParams {
    pub query: Option<String>,
}

impl SuggestionParams {
    /// The search text, or `None` when it is too short to suggest anything.
    pub fn needle(&self) -> Option<&str> {
        self.query
            .as_deref()
            .filter(|query| query.chars().count() >= MIN_SUGGESTION_LEN)
    }
}

/// Narrows store candidates (distinct titles followed by distinct
/// locations) down to the entries that contain `needle`, keeping discovery
/// order and at most [`MAX_SUGGESTIONS`].
pub fn suggestions(candidates: Vec<String>, needle: &str) -> Vec<String> {
    candidates
        .into_iter()
        .filter(|candidate| contains_ignore_case(candidate, needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn selection(value: Option<&str>) -> Option<String> {
    non_empty(value)
        .filter(|value| *value != ALL)
        .map(str::to_string)
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value >= 1)
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
