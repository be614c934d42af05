//! In-memory search trees derived from the row store.
//!
//! - [`OrderedKeySet`]: AVL-backed ordered set of usernames (friend lists)
//! - [`RankedPostIndex`]: AVL-backed posts ranked newest first (timelines)
//! - [`PrefixIndex`]: unbalanced BST for case-insensitive username prefixes
//!
//! Nothing here is persisted. Every structure is rebuilt from the store.

mod avl;
mod ordered_key_set;
mod prefix;
mod ranked_posts;

pub use avl::{AvlTree, Iter, KeyOrder, NaturalOrder, RevIter};
pub use ordered_key_set::OrderedKeySet;
pub use prefix::PrefixIndex;
pub use ranked_posts::{PostKey, RankedPostIndex, RecencyOrder};
