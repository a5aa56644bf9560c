use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::listings::repo::ListingDetail;
use crate::users::repo::UserSkillEntry;

/// Public view of a user. Email is deliberately absent: it is only served
/// to the account owner via the auth profile endpoints.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub skills: Vec<UserSkillEntry>,
    pub average_rating: f64,
    pub total_reviews: i64,
}

/// Full public profile page: the profile plus the user's listings.
#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub profile: PublicProfile,
    pub listings: Vec<ListingDetail>,
}

/// Directory entry for the experts listing.
#[derive(Debug, Serialize)]
pub struct ExpertProfile {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub skills: Vec<UserSkillEntry>,
    pub listings_count: i64,
    pub average_rating: f64,
    pub total_reviews: i64,
}
