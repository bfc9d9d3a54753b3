//! Author model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserSnapshot;

/// Display profile of an author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    pub id: Uuid,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub website_url: String,
    pub instagram_url: String,
    pub youtube_url: String,
    pub image_name: String,
}

/// Author as returned by reads, with its owner embedded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(flatten)]
    pub profile: AuthorProfile,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Absent when the owning user no longer resolves
    pub user_created: Option<UserSnapshot>,
}

/// New author creation payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuthor {
    pub name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub website_url: String,
    #[serde(default)]
    pub instagram_url: String,
    #[serde(default)]
    pub youtube_url: String,
    #[serde(default)]
    pub image_name: String,
    pub user_id: Uuid,
}

/// Author update payload
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPatch {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub website_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
    pub image_name: Option<String>,
}

impl AuthorPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.website_url.is_none()
            && self.instagram_url.is_none()
            && self.youtube_url.is_none()
            && self.image_name.is_none()
    }

    /// Apply the supplied fields to `profile`
    pub fn apply(self, profile: &mut AuthorProfile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(first_name) = self.first_name {
            profile.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            profile.last_name = last_name;
        }
        if let Some(website_url) = self.website_url {
            profile.website_url = website_url;
        }
        if let Some(instagram_url) = self.instagram_url {
            profile.instagram_url = instagram_url;
        }
        if let Some(youtube_url) = self.youtube_url {
            profile.youtube_url = youtube_url;
        }
        if let Some(image_name) = self.image_name {
            profile.image_name = image_name;
        }
    }
}
