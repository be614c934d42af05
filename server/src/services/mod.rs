//! Services composing the row store with the in-memory indexes.

pub(crate) mod friend_graph;
mod notifications;
mod posts;
mod suggestions;
mod timeline;
mod user_search;

pub use friend_graph::{FriendGraphService, GraphError};
pub use notifications::NotificationService;
pub use posts::PostService;
pub use suggestions::{FriendSuggestionService, Suggestion};
pub use timeline::{TimelineAssembler, TimelineConfig, TimelineError};
pub use user_search::UserSearchService;
