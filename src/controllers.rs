use crate::app::AppState;
use crate::error::ApiError;
use crate::models::{
    CreatedListing, Health, LikedListing, Listing, ListingPage, ListingResponse, ListingUpdate,
    Message, NewListing, UpdatedListing,
};
use crate::query::{
    suggestions, ListParams, ListingQuery, OwnerParams, SearchParams, SuggestionParams,
    TrendingParams,
};
use crate::store::Counter;
use actix_web::{delete, get, patch, put, web, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;

pub const BANNER: &str = "RoommateFinder API is running! 🚀";

type ApiResult = Result<HttpResponse, ApiError>;

fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    // An id that is not an ObjectId can never resolve.
    ObjectId::parse_str(id).map_err(|_| ApiError::not_found())
}

fn responses(listings: Vec<Listing>) -> Vec<ListingResponse> {
    listings.into_iter().map(ListingResponse::from).collect()
}

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(Health {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

#[get("/")]
pub async fn banner() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(BANNER)
}

pub async fn not_found() -> ApiResult {
    Err(ApiError::NotFound("Endpoint not found"))
}

//fetch_listings

pub async fn list_listings(state: web::Data<AppState>, qs: web::Query<ListParams>) -> ApiResult {
    let listings = state.store.find(&qs.to_query()).await?;
    Ok(HttpResponse::Ok().json(responses(listings)))
}

pub async fn create_listing(state: web::Data<AppState>, data: web::Json<NewListing>) -> ApiResult {
    let data = data.into_inner();
    data.validate()?;
    let listing = state
        .store
        .insert(data.into_listing(ObjectId::new(), Utc::now()))
        .await?;
    log::info!("New listing created with id {}", listing.id);
    Ok(HttpResponse::Created().json(CreatedListing {
        message: "Roommate listing created".to_string(),
        roommate: listing.into(),
    }))
}

#[get("/all-items")]
pub async fn all_items(state: web::Data<AppState>, qs: web::Query<SearchParams>) -> ApiResult {
    let paged = qs.to_query();
    log::debug!("all-items query: {:?}", paged);
    let (items, total) = futures::try_join!(
        state.store.find(&paged.query),
        state.store.count(&paged.query.filter)
    )?;
    Ok(HttpResponse::Ok().json(ListingPage {
        items: responses(items),
        pagination: paged.page_info(total),
    }))
}

#[get("/trending")]
pub async fn trending(state: web::Data<AppState>, qs: web::Query<TrendingParams>) -> ApiResult {
    let listings = state.store.find(&qs.to_query()).await?;
    Ok(HttpResponse::Ok().json(responses(listings)))
}

#[get("/my-listings")]
pub async fn my_listings(state: web::Data<AppState>, qs: web::Query<OwnerParams>) -> ApiResult {
    let email = qs
        .email()
        .ok_or_else(|| ApiError::MissingParameter("Email required".to_string()))?;
    let listings = state.store.find(&ListingQuery::owned_by(email)).await?;
    Ok(HttpResponse::Ok().json(responses(listings)))
}

#[get("/search-suggestions")]
pub async fn search_suggestions(
    state: web::Data<AppState>,
    qs: web::Query<SuggestionParams>,
) -> ApiResult {
    let Some(needle) = qs.needle() else {
        return Ok(HttpResponse::Ok().json(Vec::<String>::new()));
    };
    let candidates = state.store.suggestion_candidates(needle).await?;
    Ok(HttpResponse::Ok().json(suggestions(candidates, needle)))
}

#[get("/{id}")]
pub async fn get_listing(state: web::Data<AppState>, id: web::Path<String>) -> ApiResult {
    let id = parse_id(&id)?;
    let listing = state.store.record_view(&id).await?;
    Ok(HttpResponse::Ok().json(ListingResponse::from(listing)))
}

#[put("/{id}")]
pub async fn update_listing(
    state: web::Data<AppState>,
    id: web::Path<String>,
    data: web::Json<ListingUpdate>,
) -> ApiResult {
    let id = parse_id(&id)?;
    data.validate()?;
    let updated = state.store.update(&id, &data).await?;
    Ok(HttpResponse::Ok().json(UpdatedListing {
        message: "Roommate listing updated".to_string(),
        updated: updated.into(),
    }))
}

#[delete("/{id}")]
pub async fn delete_listing(state: web::Data<AppState>, id: web::Path<String>) -> ApiResult {
    let id = parse_id(&id)?;
    state.store.delete(&id).await?;
    log::info!("Listing {} deleted", id);
    Ok(HttpResponse::Ok().json(Message {
        message: "Roommate listing deleted".to_string(),
    }))
}

#[patch("/{id}/like")]
pub async fn like_listing(state: web::Data<AppState>, id: web::Path<String>) -> ApiResult {
    let id = parse_id(&id)?;
    let listing = state.store.increment(&id, Counter::Likes).await?;
    Ok(HttpResponse::Ok().json(LikedListing {
        message: "Liked".to_string(),
        like_count: listing.like_count,
    }))
}
