use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const FORGE_API_BASE: &str = "https://api.forgefeed.dev/v1";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// One round trip per call, no streaming, no automatic retry. Transient
/// failures are surfaced to the caller; retrying is a user decision
/// (pull-to-refresh, retry button), never ours.
pub struct ForgeClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl ForgeClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(token, FORGE_API_BASE.to_string())
    }

    /// For self-hosted forge instances
    pub fn with_base_url(token: Option<String>, base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("ForgeFeed/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            token,
            base_url,
        }
    }

    /// Fetch one page of the home feed. `cursor = None` means the head page.
    pub async fn fetch_feed(&self, cursor: Option<&str>, per_page: u32) -> Result<FeedPageDto> {
        let url = format!("{}/feed", self.base_url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("per_page", per_page.to_string())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = self.authed(request).send().await?;
        let response = Self::check_status(response, "feed").await?;

        let page: FeedPageDto = response.json().await?;
        tracing::debug!(
            items = page.items.len(),
            has_next = page.next_cursor.is_some(),
            "fetched feed page"
        );
        Ok(page)
    }

    /// Get the details snapshot for one repository
    pub async fn get_repo_details(&self, owner: &str, name: &str) -> Result<RepoDetailsDto> {
        let url = format!("{}/repos/{}/{}", self.base_url, owner, name);

        let response = self.authed(self.client.get(&url)).send().await?;
        let response = Self::check_status(response, &format!("{}/{}", owner, name)).await?;

        let details: RepoDetailsDto = response.json().await?;
        Ok(details)
    }

    /// Star or unstar a repository by its opaque id
    pub async fn set_star(&self, repo_id: &str, active: bool) -> Result<()> {
        self.set_relationship(repo_id, "star", active).await
    }

    /// Follow or unfollow a user or organization by its opaque id
    pub async fn set_follow(&self, subject_id: &str, active: bool) -> Result<()> {
        self.set_relationship(subject_id, "follow", active).await
    }

    /// Revoke an OAuth access token (sign-out)
    pub async fn delete_access_token(&self, token: &str) -> Result<()> {
        let url = format!("{}/oauth/token", self.base_url);

        let response = self
            .authed(self.client.delete(&url))
            .json(&serde_json::json!({ "access_token": token }))
            .send()
            .await?;
        Self::check_status(response, "oauth/token").await?;
        Ok(())
    }

    async fn set_relationship(&self, subject_id: &str, rel: &str, active: bool) -> Result<()> {
        let encoded_id = urlencoding::encode(subject_id);
        let url = format!("{}/subjects/{}/{}", self.base_url, encoded_id, rel);

        let request = if active {
            self.client.put(&url)
        } else {
            self.client.delete(&url)
        };

        let response = self.authed(request).send().await?;
        Self::check_status(response, subject_id).await?;
        tracing::debug!(subject_id, rel, active, "relationship updated");
        Ok(())
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref token) = self.token {
            request.bearer_auth(token)
        } else {
            request
        }
    }

    /// Map the common error statuses; hand back the response for 2xx
    async fn check_status(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(context.to_string()));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ApiError::AuthRequired);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

/// One page of the feed as the backend serializes it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPageDto {
    pub items: Vec<FeedItemDto>,
    pub next_cursor: Option<String>,
}

/// Feed items come over the wire tagged by activity type. Exactly one
/// variant per item; an unknown tag fails deserialization rather than
/// being silently skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedItemDto {
    CreatedRepo {
        repo: RepoSummaryDto,
    },
    NewRelease {
        repo: RepoSummaryDto,
        tag_name: String,
        release_name: Option<String>,
        published_at: Option<DateTime<Utc>>,
    },
    FollowedUser {
        follower: ActorDto,
        followee: ActorDto,
    },
    StarredRepo {
        actor: ActorDto,
        repo: RepoSummaryDto,
    },
    RecommendedRepo {
        repo: RepoSummaryDto,
    },
    ForkedRepo {
        repo: RepoSummaryDto,
        parent_name_with_owner: Option<String>,
    },
    FollowRecommendation {
        actor: ActorDto,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSummaryDto {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazer_count: u64,
    #[serde(default)]
    pub fork_count: u64,
    /// Whether the authenticated viewer has starred this repo
    #[serde(default)]
    pub viewer_has_starred: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorDto {
    pub id: String,
    pub login: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_org: bool,
    /// Whether the authenticated viewer follows this user or org
    #[serde(default)]
    pub viewer_is_following: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoDetailsDto {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_name_with_owner: Option<String>,
    #[serde(default)]
    pub stargazer_count: u64,
    #[serde(default)]
    pub fork_count: u64,
    pub license: Option<String>,
    pub readme: Option<String>,
    #[serde(default)]
    pub contributors: Vec<ContributorDto>,
    #[serde(default)]
    pub languages: Vec<LanguageSliceDto>,
    #[serde(default)]
    pub viewer_has_starred: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorDto {
    pub login: String,
    #[serde(default)]
    pub contributions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageSliceDto {
    pub name: String,
    #[serde(default)]
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_page_deserializes_tagged_variants() {
        let json = r#"{
            "items": [
                {
                    "type": "created_repo",
                    "repo": {
                        "id": "R_1",
                        "name": "forgefeed",
                        "owner": "octocat",
                        "description": "a feed client",
                        "language": "Rust",
                        "stargazer_count": 42,
                        "fork_count": 3
                    }
                },
                {
                    "type": "followed_user",
                    "follower": { "id": "U_1", "login": "octocat", "display_name": null, "avatar_url": null },
                    "followee": { "id": "U_2", "login": "hubot", "display_name": "Hubot", "avatar_url": null, "is_org": false }
                },
                {
                    "type": "follow_recommendation",
                    "actor": { "id": "O_1", "login": "rust-lang", "display_name": null, "avatar_url": null, "is_org": true }
                }
            ],
            "next_cursor": "abc123"
        }"#;

        let page: FeedPageDto = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.next_cursor.as_deref(), Some("abc123"));

        match &page.items[0] {
            FeedItemDto::CreatedRepo { repo } => {
                assert_eq!(repo.id, "R_1");
                assert_eq!(repo.stargazer_count, 42);
            }
            other => panic!("expected created_repo, got {:?}", other),
        }
        match &page.items[1] {
            FeedItemDto::FollowedUser { followee, .. } => assert_eq!(followee.login, "hubot"),
            other => panic!("expected followed_user, got {:?}", other),
        }
        match &page.items[2] {
            FeedItemDto::FollowRecommendation { actor } => assert!(actor.is_org),
            other => panic!("expected follow_recommendation, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_feed_item_tag_is_an_error() {
        let json = r#"{
            "items": [{ "type": "sponsored_post", "repo": { "id": "R_9", "name": "x", "owner": "y" } }],
            "next_cursor": null
        }"#;

        let result: std::result::Result<FeedPageDto, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_repo_details_defaults() {
        // Minimal payload: counts, contributors and languages are optional
        let json = r#"{
            "id": "R_5",
            "owner": "octocat",
            "name": "hello-world",
            "description": null,
            "parent_name_with_owner": null,
            "license": null,
            "readme": null
        }"#;

        let details: RepoDetailsDto = serde_json::from_str(json).unwrap();
        assert_eq!(details.stargazer_count, 0);
        assert!(!details.viewer_has_starred);
        assert!(details.contributors.is_empty());
        assert!(details.languages.is_empty());
    }

    #[test]
    fn test_empty_last_page() {
        let json = r#"{ "items": [], "next_cursor": null }"#;
        let page: FeedPageDto = serde_json::from_str(json).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }
}
