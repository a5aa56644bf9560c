use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    skills::repo::Skill,
    state::AppState,
    users,
};

use super::dto::{
    clamp_pagination, page_count, CreateListingRequest, ListingQuery, ListingsPage,
    UpdateListingRequest, UserListings,
};
use super::repo::{self, Listing, ListingDetail};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(list_listings))
        .route("/listings/user/:user_id", get(user_listings))
        .route("/listings/:id", get(get_listing))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/listings", axum::routing::post(create_listing))
        .route(
            "/listings/:id",
            axum::routing::put(update_listing).delete(delete_listing),
        )
}

fn validate_price(price: f64, max: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price <= 0.0 || price > max {
        return Err(ApiError::Validation(format!(
            "Price must be between 1 and {max}"
        )));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingsPage>, ApiError> {
    let (page, per_page) = clamp_pagination(query.page, query.per_page);
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let search = query.search.as_deref().filter(|s| !s.is_empty());

    let total = repo::count_filtered(&state.db, category, search).await?;
    let listings =
        repo::list_filtered(&state.db, category, search, per_page, (page - 1) * per_page).await?;

    Ok(Json(ListingsPage {
        listings,
        total,
        pages: page_count(total, per_page),
        current_page: page,
        per_page,
    }))
}

#[instrument(skip(state))]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingDetail>, ApiError> {
    let listing = repo::find_detail_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Listing not found".into()))?;
    Ok(Json(listing))
}

#[instrument(skip(state, payload))]
pub async fn create_listing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ListingDetail>), ApiError> {
    let title = payload.title.trim();
    let description = payload.description.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    if description.is_empty() {
        return Err(ApiError::Validation("Description is required".into()));
    }
    validate_price(payload.price_per_hour, state.config.policy.listing_max_price)?;

    if Skill::find_by_id(&state.db, payload.skill_id).await?.is_none() {
        return Err(ApiError::NotFound("Skill not found".into()));
    }

    let listing = Listing::create(
        &state.db,
        user_id,
        payload.skill_id,
        title,
        description,
        payload.price_per_hour,
    )
    .await?;

    let detail = repo::find_detail_by_id(&state.db, listing.id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("listing vanished after insert")))?;

    info!(listing_id = %listing.id, user_id = %user_id, "listing created");
    Ok((StatusCode::CREATED, Json(detail)))
}

#[instrument(skip(state, payload))]
pub async fn update_listing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateListingRequest>,
) -> Result<Json<ListingDetail>, ApiError> {
    let listing = Listing::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Listing not found".into()))?;

    if listing.user_id != user_id {
        warn!(listing_id = %id, user_id = %user_id, "update of foreign listing rejected");
        return Err(ApiError::Forbidden(
            "Only the owner can update this listing".into(),
        ));
    }

    let title = match &payload.title {
        Some(t) => {
            let t = t.trim();
            if t.is_empty() {
                return Err(ApiError::Validation("Title is required".into()));
            }
            t.to_string()
        }
        None => listing.title.clone(),
    };
    let description = match &payload.description {
        Some(d) => {
            let d = d.trim();
            if d.is_empty() {
                return Err(ApiError::Validation("Description is required".into()));
            }
            d.to_string()
        }
        None => listing.description.clone(),
    };
    let price = match payload.price_per_hour {
        Some(p) => {
            validate_price(p, state.config.policy.listing_max_price)?;
            p
        }
        None => listing.price_per_hour,
    };
    let skill_id = match payload.skill_id {
        Some(sid) => {
            if Skill::find_by_id(&state.db, sid).await?.is_none() {
                return Err(ApiError::NotFound("Skill not found".into()));
            }
            sid
        }
        None => listing.skill_id,
    };

    let updated = Listing::update(&state.db, id, skill_id, &title, &description, price).await?;
    let detail = repo::find_detail_by_id(&state.db, updated.id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("listing vanished after update")))?;

    info!(listing_id = %id, user_id = %user_id, "listing updated");
    Ok(Json(detail))
}

#[instrument(skip(state))]
pub async fn delete_listing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let listing = Listing::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Listing not found".into()))?;

    if listing.user_id != user_id {
        warn!(listing_id = %id, user_id = %user_id, "delete of foreign listing rejected");
        return Err(ApiError::Forbidden(
            "Only the owner can delete this listing".into(),
        ));
    }

    Listing::delete(&state.db, id).await?;

    info!(listing_id = %id, user_id = %user_id, "listing deleted");
    Ok(Json(serde_json::json!({
        "message": "Listing deleted successfully"
    })))
}

#[instrument(skip(state))]
pub async fn user_listings(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserListings>, ApiError> {
    let user = users::repo::public_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let listings = repo::list_by_user(&state.db, user_id).await?;

    Ok(Json(UserListings { user, listings }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_bounds() {
        assert!(validate_price(1.0, 999.0).is_ok());
        assert!(validate_price(999.0, 999.0).is_ok());
        assert!(validate_price(0.0, 999.0).is_err());
        assert!(validate_price(-10.0, 999.0).is_err());
        assert!(validate_price(1000.0, 999.0).is_err());
        assert!(validate_price(f64::NAN, 999.0).is_err());
        assert!(validate_price(f64::INFINITY, 999.0).is_err());
    }
}
