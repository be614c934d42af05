//! Domain records shared by the indexes, the services and the row store.

mod edge;
mod ids;
mod notification;
mod post;
mod user;

pub use edge::{EdgeStatus, FriendEdge};
pub use ids::{CommentId, NotificationId, PostId, UserId};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use post::{Comment, LikeToggle, PostRecord};
pub use user::{SearchUser, UserProfile};
