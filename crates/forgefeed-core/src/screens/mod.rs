// Screen state holders: thin owners of the feed/mutation machinery.
//
// Each screen owns its own aggregator, controller and relationship
// table; nothing is shared across screens. Two screens showing the same
// repo can therefore disagree about its star state for a moment - an
// accepted staleness window, each screen reconciles on its next refresh.
pub mod home;
pub mod landing;
pub mod repo_details;
pub mod settings;

pub use home::HomeScreen;
pub use landing::LandingScreen;
pub use repo_details::{RepoDetailsScreen, RepoDetailsSnapshot};
pub use settings::SettingsScreen;
