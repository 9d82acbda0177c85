// HTTP client for the forge backend gateway
pub mod auth;
pub mod client;

// Re-export common types
pub use client::{
    ActorDto, ApiError, ContributorDto, FeedItemDto, FeedPageDto, ForgeClient, LanguageSliceDto,
    RepoDetailsDto, RepoSummaryDto,
};
