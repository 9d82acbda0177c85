// Client-side core: feed aggregation, optimistic mutations, session state
pub mod config;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod models;
pub mod mutation;
pub mod notify;
pub mod providers;
pub mod relationship;
pub mod screens;
pub mod session;
pub mod token_store;

pub use config::Config;
pub use error::Error;
pub use feed::{FeedAggregator, FeedSnapshot, LoadState};
pub use gateway::Gateway;
pub use mutation::{MutationController, ToggleOutcome};
pub use relationship::RelationshipTable;
pub use session::AuthManager;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
