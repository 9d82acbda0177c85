use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of activity in the home timeline. Exactly one variant per
/// item; matching is exhaustive, so adding a variant breaks every render
/// path loudly instead of falling through a chain of nullable fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FeedItem {
    CreatedRepo {
        repo: FeedRepo,
    },
    NewRelease {
        repo: FeedRepo,
        tag_name: String,
        release_name: Option<String>,
        published_at: Option<DateTime<Utc>>,
    },
    FollowedUser {
        follower: FeedActor,
        followee: FeedActor,
    },
    StarredRepo {
        actor: FeedActor,
        repo: FeedRepo,
    },
    RecommendedRepo {
        repo: FeedRepo,
    },
    ForkedRepo {
        repo: FeedRepo,
        parent_name_with_owner: Option<String>,
    },
    FollowRecommendation {
        actor: FeedActor,
    },
}

impl FeedItem {
    /// Opaque id of the entity the item's action button targets: the repo
    /// for starrable variants, the followee/recommended actor otherwise.
    pub fn subject_id(&self) -> &str {
        match self {
            FeedItem::CreatedRepo { repo }
            | FeedItem::NewRelease { repo, .. }
            | FeedItem::StarredRepo { repo, .. }
            | FeedItem::RecommendedRepo { repo }
            | FeedItem::ForkedRepo { repo, .. } => &repo.id,
            FeedItem::FollowedUser { followee, .. } => &followee.id,
            FeedItem::FollowRecommendation { actor } => &actor.id,
        }
    }

    pub fn relationship_kind(&self) -> RelationshipKind {
        match self {
            FeedItem::CreatedRepo { .. }
            | FeedItem::NewRelease { .. }
            | FeedItem::StarredRepo { .. }
            | FeedItem::RecommendedRepo { .. }
            | FeedItem::ForkedRepo { .. } => RelationshipKind::Star,
            FeedItem::FollowedUser { .. } | FeedItem::FollowRecommendation { .. } => {
                RelationshipKind::Follow
            }
        }
    }

    /// Server-observed relationship state for the subject, as carried by
    /// the feed payload itself. Seeds the side table on arrival.
    pub fn subject_active(&self) -> bool {
        match self {
            FeedItem::CreatedRepo { repo }
            | FeedItem::NewRelease { repo, .. }
            | FeedItem::StarredRepo { repo, .. }
            | FeedItem::RecommendedRepo { repo }
            | FeedItem::ForkedRepo { repo, .. } => repo.viewer_has_starred,
            FeedItem::FollowedUser { followee, .. } => followee.viewer_is_following,
            FeedItem::FollowRecommendation { actor } => actor.viewer_is_following,
        }
    }
}

/// Repository as referenced from a feed item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedRepo {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazer_count: u64,
    pub viewer_has_starred: bool,
}

impl FeedRepo {
    pub fn name_with_owner(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// User or organization as referenced from a feed item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedActor {
    pub id: String,
    pub login: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_org: bool,
    pub viewer_is_following: bool,
}

/// One page of the feed: ordered items plus the cursor bounding the next
/// fetch. No cursor means the stream ends here.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub next_cursor: Option<String>,
}

/// Star or follow - the two relationships a viewer can toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Star,
    Follow,
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipKind::Star => write!(f, "star"),
            RelationshipKind::Follow => write!(f, "follow"),
        }
    }
}

/// Per-entity relationship state, kept in a side table keyed by subject
/// id so every feed item referencing the same entity shares one entry.
///
/// The count is stored as a delta against the last confirmed snapshot,
/// which keeps flag and count consistent by construction: rendering folds
/// `count_delta` into whatever count the snapshot carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipState {
    pub active: bool,
    pub count_delta: i64,
    pub pending: bool,
}

impl RelationshipState {
    /// Fold the optimistic delta into a snapshot count for rendering
    pub fn apply_to(&self, count: u64) -> u64 {
        (count as i64 + self.count_delta).max(0) as u64
    }
}

/// Snapshot of one repository's metadata for the details screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepoDetails {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_name_with_owner: Option<String>,
    pub stargazer_count: u64,
    pub fork_count: u64,
    pub license: Option<String>,
    pub readme: Option<String>,
    pub contributors: Vec<Contributor>,
    pub languages: Vec<LanguageSlice>,
    pub viewer_has_starred: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contributor {
    pub login: String,
    pub contributions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanguageSlice {
    pub name: String,
    pub size_bytes: u64,
}
