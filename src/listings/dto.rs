use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::ListingDetail;
use crate::users::dto::PublicProfile;

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub price_per_hour: f64,
    pub skill_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_per_hour: Option<f64>,
    pub skill_id: Option<Uuid>,
}

/// Query string for the listing index: pagination plus optional filters.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    pub category: Option<String>,
    pub search: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    10
}

pub const MAX_PER_PAGE: i64 = 50;

/// Clamp raw pagination input to sane bounds, returning (page, per_page).
pub fn clamp_pagination(page: i64, per_page: i64) -> (i64, i64) {
    (page.max(1), per_page.clamp(1, MAX_PER_PAGE))
}

/// Total page count for a paginated envelope.
pub fn page_count(total: i64, per_page: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total + per_page - 1) / per_page
    }
}

#[derive(Debug, Serialize)]
pub struct ListingsPage {
    pub listings: Vec<ListingDetail>,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
    pub per_page: i64,
}

/// Listings of one user, with the owner's public profile alongside.
#[derive(Debug, Serialize)]
pub struct UserListings {
    pub user: PublicProfile,
    pub listings: Vec<ListingDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_from_empty_query() {
        let q: ListingQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, 10);
        assert!(q.category.is_none());
        assert!(q.search.is_none());
    }

    #[test]
    fn pagination_clamps_out_of_range_values() {
        assert_eq!(clamp_pagination(0, 10), (1, 10));
        assert_eq!(clamp_pagination(-5, 0), (1, 1));
        assert_eq!(clamp_pagination(3, 1000), (3, MAX_PER_PAGE));
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
    }
}
