// REST gateway - bridges the HTTP client with the Gateway trait
use async_trait::async_trait;
use forgefeed_api::{
    ApiError, FeedItemDto, ForgeClient, RepoDetailsDto, RepoSummaryDto,
};

use crate::{
    gateway::Gateway,
    models::{Contributor, FeedActor, FeedItem, FeedPage, FeedRepo, LanguageSlice, RepoDetails},
    Error, Result,
};

/// Wrapper around ForgeClient that implements Gateway
pub struct RestGateway {
    client: ForgeClient,
    page_size: u32,
}

impl RestGateway {
    pub fn new(client: ForgeClient, page_size: u32) -> Self {
        Self { client, page_size }
    }
}

#[async_trait]
impl Gateway for RestGateway {
    async fn fetch_feed(&self, cursor: Option<String>) -> Result<FeedPage> {
        let page = self
            .client
            .fetch_feed(cursor.as_deref(), self.page_size)
            .await
            .map_err(api_to_error)?;

        Ok(FeedPage {
            items: page.items.into_iter().map(item_from_dto).collect(),
            next_cursor: page.next_cursor,
        })
    }

    async fn fetch_repo_details(&self, owner: &str, name: &str) -> Result<RepoDetails> {
        let details = self
            .client
            .get_repo_details(owner, name)
            .await
            .map_err(api_to_error)?;

        Ok(details_from_dto(details))
    }

    async fn set_star(&self, repo_id: &str, active: bool) -> Result<()> {
        self.client
            .set_star(repo_id, active)
            .await
            .map_err(api_to_error)
    }

    async fn set_follow(&self, subject_id: &str, active: bool) -> Result<()> {
        self.client
            .set_follow(subject_id, active)
            .await
            .map_err(api_to_error)
    }

    async fn delete_access_token(&self, token: &str) -> Result<()> {
        self.client
            .delete_access_token(token)
            .await
            .map_err(api_to_error)
    }
}

/// Map transport errors onto the core taxonomy. Parse failures become
/// validation errors so the UI treats them as recoverable.
fn api_to_error(err: ApiError) -> Error {
    match err {
        ApiError::AuthRequired => Error::AuthError("gateway rejected credentials".into()),
        ApiError::NotFound(what) => Error::NotFound(what),
        ApiError::RateLimitExceeded => Error::RateLimited,
        ApiError::ParseError(e) => Error::ValidationError(e.to_string()),
        ApiError::NetworkError(e) => Error::NetworkError(e.to_string()),
        ApiError::RequestFailed(msg) => Error::NetworkError(msg),
    }
}

fn item_from_dto(dto: FeedItemDto) -> FeedItem {
    match dto {
        FeedItemDto::CreatedRepo { repo } => FeedItem::CreatedRepo {
            repo: repo_from_dto(repo),
        },
        FeedItemDto::NewRelease {
            repo,
            tag_name,
            release_name,
            published_at,
        } => FeedItem::NewRelease {
            repo: repo_from_dto(repo),
            tag_name,
            release_name,
            published_at,
        },
        FeedItemDto::FollowedUser { follower, followee } => FeedItem::FollowedUser {
            follower: actor_from_dto(follower),
            followee: actor_from_dto(followee),
        },
        FeedItemDto::StarredRepo { actor, repo } => FeedItem::StarredRepo {
            actor: actor_from_dto(actor),
            repo: repo_from_dto(repo),
        },
        FeedItemDto::RecommendedRepo { repo } => FeedItem::RecommendedRepo {
            repo: repo_from_dto(repo),
        },
        FeedItemDto::ForkedRepo {
            repo,
            parent_name_with_owner,
        } => FeedItem::ForkedRepo {
            repo: repo_from_dto(repo),
            parent_name_with_owner,
        },
        FeedItemDto::FollowRecommendation { actor } => FeedItem::FollowRecommendation {
            actor: actor_from_dto(actor),
        },
    }
}

fn repo_from_dto(dto: RepoSummaryDto) -> FeedRepo {
    FeedRepo {
        id: dto.id,
        name: dto.name,
        owner: dto.owner,
        description: dto.description,
        language: dto.language,
        stargazer_count: dto.stargazer_count,
        viewer_has_starred: dto.viewer_has_starred,
    }
}

fn actor_from_dto(dto: forgefeed_api::ActorDto) -> FeedActor {
    FeedActor {
        id: dto.id,
        login: dto.login,
        display_name: dto.display_name,
        avatar_url: dto.avatar_url,
        is_org: dto.is_org,
        viewer_is_following: dto.viewer_is_following,
    }
}

fn details_from_dto(dto: RepoDetailsDto) -> RepoDetails {
    RepoDetails {
        id: dto.id,
        owner: dto.owner,
        name: dto.name,
        description: dto.description,
        parent_name_with_owner: dto.parent_name_with_owner,
        stargazer_count: dto.stargazer_count,
        fork_count: dto.fork_count,
        license: dto.license,
        readme: dto.readme,
        contributors: dto
            .contributors
            .into_iter()
            .map(|c| Contributor {
                login: c.login,
                contributions: c.contributions,
            })
            .collect(),
        languages: dto
            .languages
            .into_iter()
            .map(|l| LanguageSlice {
                name: l.name,
                size_bytes: l.size_bytes,
            })
            .collect(),
        viewer_has_starred: dto.viewer_has_starred,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_page_converts_to_feed_items() {
        let json = r#"{
            "items": [
                {
                    "type": "starred_repo",
                    "actor": { "id": "u1", "login": "octocat", "display_name": null, "avatar_url": null },
                    "repo": { "id": "r1", "name": "hello", "owner": "hubot", "description": null,
                              "language": "Rust", "stargazer_count": 7, "viewer_has_starred": true }
                }
            ],
            "next_cursor": "c1"
        }"#;
        let page: forgefeed_api::FeedPageDto = serde_json::from_str(json).unwrap();

        let items: Vec<FeedItem> = page.items.into_iter().map(item_from_dto).collect();
        assert_eq!(items[0].subject_id(), "r1");
        assert!(items[0].subject_active());
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            api_to_error(ApiError::AuthRequired),
            Error::AuthError(_)
        ));
        assert!(matches!(
            api_to_error(ApiError::RateLimitExceeded),
            Error::RateLimited
        ));
        assert!(matches!(
            api_to_error(ApiError::RequestFailed("503".into())),
            Error::NetworkError(_)
        ));

        let parse_err = serde_json::from_str::<forgefeed_api::FeedPageDto>("{").unwrap_err();
        let mapped = api_to_error(ApiError::ParseError(parse_err));
        assert!(matches!(mapped, Error::ValidationError(_)));
        assert!(mapped.is_recoverable());
    }
}
