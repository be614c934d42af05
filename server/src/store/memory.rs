//! In-memory row store with fault injection.
//!
//! Holds users, friend edges, posts, likes, comments and notifications in
//! plain vectors and maps behind a `RwLock`. Every [`RowStore`] call first consults the fault
//! injector, which can fail reads and writes at configurable rates (driven
//! by a seeded RNG, so runs are reproducible) or deterministically fail the
//! next N writes.
//!
//! The `add_*` seeding helpers and the inspection helpers (`friends_of`,
//! `edges`) bypass fault injection. They are how tests set up and verify
//! store truth.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::store::{RowStore, StoreError};
use crate::types::{
    Comment, CommentId, EdgeStatus, FriendEdge, LikeToggle, NewNotification, Notification,
    NotificationId, PostId, PostRecord, UserId, UserProfile,
};

/// Configuration for fault injection.
#[derive(Debug, Clone, Default)]
pub struct FaultConfig {
    /// Probability of a read error (0.0 - 1.0).
    pub read_error_rate: f64,
    /// Probability of a write error (0.0 - 1.0).
    pub write_error_rate: f64,
}

impl FaultConfig {
    /// Create a fault config with no faults (for baseline testing).
    #[must_use]
    pub fn no_faults() -> Self {
        Self::default()
    }

    /// Create a fault config with low fault rates (for stress testing).
    #[must_use]
    pub const fn low_faults() -> Self {
        Self {
            read_error_rate: 0.01,
            write_error_rate: 0.01,
        }
    }

    /// Create a fault config with high fault rates (for extreme testing).
    #[must_use]
    pub const fn high_faults() -> Self {
        Self {
            read_error_rate: 0.1,
            write_error_rate: 0.2,
        }
    }
}

/// Statistics about store calls.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStoreStats {
    /// Number of read calls.
    pub reads: u64,
    /// Number of write calls.
    pub writes: u64,
    /// Number of injected read errors.
    pub injected_read_errors: u64,
    /// Number of injected write errors.
    pub injected_write_errors: u64,
}

#[derive(Debug)]
struct FaultState {
    config: FaultConfig,
    rng: StdRng,
    fail_next_writes: usize,
    /// Calls that always fail, by operation name.
    failing_operations: Vec<String>,
    stats: MemoryStoreStats,
}

impl FaultState {
    fn should_inject_fault(&mut self, rate: f64) -> bool {
        if rate <= 0.0 {
            return false;
        }
        self.rng.random::<f64>() < rate
    }
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<String, UserProfile>,
    edges: Vec<FriendEdge>,
    posts: Vec<PostRecord>,
    /// `(post, username)` for every like.
    likes: BTreeSet<(PostId, String)>,
    comments: Vec<Comment>,
    notifications: Vec<Notification>,
    last_user_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
    last_notification_id: i64,
    /// Logical clock stamping edges and notifications.
    clock: i64,
}

impl State {
    const fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn edge_between(&self, from: &str, to: &str, status: EdgeStatus) -> Option<usize> {
        self.edges
            .iter()
            .position(|edge| edge.matches(from, to, status))
    }

    fn post_position(&self, id: PostId) -> Option<usize> {
        self.posts.iter().position(|post| post.id == id)
    }

    /// Caller checks that `username` is free.
    fn register(&mut self, username: &str, email: String) -> UserId {
        self.last_user_id += 1;
        let mut profile = UserProfile::new(self.last_user_id, username);
        profile.email = email;
        profile.created_at = self.tick();
        let id = profile.id;
        self.users.insert(username.to_string(), profile);
        id
    }

    fn push_post(&mut self, author: &str, content: &str, created_at: i64) -> PostId {
        self.last_post_id += 1;
        let post = PostRecord::new(self.last_post_id, author, content, created_at);
        let id = post.id;
        self.posts.push(post);
        id
    }
}

/// Thread-safe in-memory [`RowStore`].
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<State>,
    faults: Mutex<FaultState>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store that never injects faults.
    #[must_use]
    pub fn new() -> Self {
        Self::with_faults(0, FaultConfig::no_faults())
    }

    /// Create an empty store with fault injection.
    ///
    /// The seed ensures deterministic behavior - the same seed and the same
    /// call sequence produce the same faults.
    #[must_use]
    pub fn with_faults(seed: u64, config: FaultConfig) -> Self {
        Self {
            state: RwLock::new(State::default()),
            faults: Mutex::new(FaultState {
                config,
                rng: StdRng::seed_from_u64(seed),
                fail_next_writes: 0,
                failing_operations: Vec::new(),
                stats: MemoryStoreStats::default(),
            }),
        }
    }

    /// Update the fault configuration.
    pub fn set_fault_config(&self, config: FaultConfig) -> Result<(), StoreError> {
        self.faults.lock().map_err(|_| StoreError::LockPoisoned)?.config = config;
        Ok(())
    }

    /// Fail the next `count` write calls regardless of the configured rates.
    pub fn fail_next_writes(&self, count: usize) -> Result<(), StoreError> {
        self.faults
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .fail_next_writes = count;
        Ok(())
    }

    /// Make every call to the `RowStore` method named `operation` fail until
    /// [`Self::clear_failing_operations`] is called.
    pub fn fail_operation(&self, operation: &str) -> Result<(), StoreError> {
        self.faults
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .failing_operations
            .push(operation.to_string());
        Ok(())
    }

    pub fn clear_failing_operations(&self) -> Result<(), StoreError> {
        self.faults
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .failing_operations
            .clear();
        Ok(())
    }

    pub fn stats(&self) -> Result<MemoryStoreStats, StoreError> {
        Ok(self
            .faults
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .stats
            .clone())
    }

    /// Register `username`, returning its id. Registering an existing
    /// username returns the id it already has.
    pub fn add_user(&self, username: &str) -> Result<UserId, StoreError> {
        let mut state = self.write_state()?;
        if let Some(existing) = state.users.get(username) {
            return Ok(existing.id);
        }
        Ok(state.register(username, format!("{username}@example.com")))
    }

    /// Store a post by `author` created at `created_at` (seconds).
    ///
    /// Ids are assigned in call order, so posts added later always carry a
    /// larger id.
    pub fn add_post(
        &self,
        author: &str,
        content: &str,
        created_at: i64,
    ) -> Result<PostId, StoreError> {
        Ok(self.write_state()?.push_post(author, content, created_at))
    }

    /// Store a raw edge without any validation.
    pub fn add_edge(
        &self,
        requester: &str,
        addressee: &str,
        status: EdgeStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.write_state()?;
        let created_at = state.tick();
        state.edges.push(FriendEdge {
            requester: requester.to_string(),
            addressee: addressee.to_string(),
            status,
            created_at,
        });
        Ok(())
    }

    /// Accepted friends of `username`, ascending. Ignores fault injection.
    pub fn friends_of(&self, username: &str) -> Result<Vec<String>, StoreError> {
        let state = self.read_state()?;
        let mut friends = accepted_friends(&state, username);
        friends.sort();
        Ok(friends)
    }

    /// Snapshot of every stored edge. Ignores fault injection.
    pub fn edges(&self) -> Result<Vec<FriendEdge>, StoreError> {
        Ok(self.read_state()?.edges.clone())
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state.write().map_err(|_| StoreError::LockPoisoned)
    }

    fn check_read(&self, op: &str) -> Result<(), StoreError> {
        let mut faults = self.faults.lock().map_err(|_| StoreError::LockPoisoned)?;
        faults.stats.reads += 1;
        if faults.failing_operations.iter().any(|failing| failing == op) {
            faults.stats.injected_read_errors += 1;
            return Err(StoreError::InjectedFault(format!("forced read error in {op}")));
        }
        let rate = faults.config.read_error_rate;
        if faults.should_inject_fault(rate) {
            faults.stats.injected_read_errors += 1;
            return Err(StoreError::InjectedFault(format!("simulated read error in {op}")));
        }
        Ok(())
    }

    fn check_write(&self, op: &str) -> Result<(), StoreError> {
        let mut faults = self.faults.lock().map_err(|_| StoreError::LockPoisoned)?;
        faults.stats.writes += 1;
        if faults.fail_next_writes > 0 {
            faults.fail_next_writes -= 1;
            faults.stats.injected_write_errors += 1;
            return Err(StoreError::InjectedFault(format!("forced write error in {op}")));
        }
        if faults.failing_operations.iter().any(|failing| failing == op) {
            faults.stats.injected_write_errors += 1;
            return Err(StoreError::InjectedFault(format!("forced write error in {op}")));
        }
        let rate = faults.config.write_error_rate;
        if faults.should_inject_fault(rate) {
            faults.stats.injected_write_errors += 1;
            return Err(StoreError::InjectedFault(format!("simulated write error in {op}")));
        }
        Ok(())
    }
}

fn accepted_friends(state: &State, username: &str) -> Vec<String> {
    state
        .edges
        .iter()
        .filter(|edge| edge.status == EdgeStatus::Accepted)
        .filter_map(|edge| edge.other(username))
        .map(str::to_string)
        .collect()
}

impl RowStore for MemoryStore {
    fn insert_user(&self, username: &str, email: &str) -> Result<Option<UserId>, StoreError> {
        self.check_write("insert_user")?;
        let mut state = self.write_state()?;
        if state.users.contains_key(username) {
            return Ok(None);
        }
        Ok(Some(state.register(username, email.to_string())))
    }

    fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        self.check_read("user_exists")?;
        Ok(self.read_state()?.users.contains_key(username))
    }

    fn fetch_all_users(&self) -> Result<Vec<UserProfile>, StoreError> {
        self.check_read("fetch_all_users")?;
        Ok(self.read_state()?.users.values().cloned().collect())
    }

    fn fetch_accepted_friend_usernames(&self, username: &str) -> Result<Vec<String>, StoreError> {
        self.check_read("fetch_accepted_friend_usernames")?;
        Ok(accepted_friends(&*self.read_state()?, username))
    }

    fn fetch_pending_request(&self, from: &str, to: &str) -> Result<bool, StoreError> {
        self.check_read("fetch_pending_request")?;
        Ok(self
            .read_state()?
            .edge_between(from, to, EdgeStatus::Pending)
            .is_some())
    }

    fn fetch_incoming_requests(&self, username: &str) -> Result<Vec<String>, StoreError> {
        self.check_read("fetch_incoming_requests")?;
        let state = self.read_state()?;
        let mut incoming: Vec<&FriendEdge> = state
            .edges
            .iter()
            .filter(|edge| edge.status == EdgeStatus::Pending && edge.addressee == username)
            .collect();
        incoming.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(incoming
            .into_iter()
            .map(|edge| edge.requester.clone())
            .collect())
    }

    fn fetch_is_friend(&self, a: &str, b: &str) -> Result<bool, StoreError> {
        self.check_read("fetch_is_friend")?;
        Ok(self
            .read_state()?
            .edge_between(a, b, EdgeStatus::Accepted)
            .is_some())
    }

    fn insert_pending_edge(&self, from: &str, to: &str) -> Result<bool, StoreError> {
        self.check_write("insert_pending_edge")?;
        let mut state = self.write_state()?;
        if !state.users.contains_key(from) || !state.users.contains_key(to) {
            return Ok(false);
        }
        let created_at = state.tick();
        state.edges.push(FriendEdge {
            requester: from.to_string(),
            addressee: to.to_string(),
            status: EdgeStatus::Pending,
            created_at,
        });
        Ok(true)
    }

    fn update_edge_status(
        &self,
        from: &str,
        to: &str,
        status: EdgeStatus,
    ) -> Result<bool, StoreError> {
        self.check_write("update_edge_status")?;
        let mut state = self.write_state()?;
        let Some(position) = state.edge_between(from, to, EdgeStatus::Pending) else {
            return Ok(false);
        };
        state.edges[position].status = status;
        Ok(true)
    }

    fn delete_edge(&self, from: &str, to: &str, status: EdgeStatus) -> Result<bool, StoreError> {
        self.check_write("delete_edge")?;
        let mut state = self.write_state()?;
        let before = state.edges.len();
        state.edges.retain(|edge| !edge.matches(from, to, status));
        Ok(state.edges.len() != before)
    }

    fn insert_post(
        &self,
        author: &str,
        content: &str,
        created_at: i64,
    ) -> Result<Option<PostId>, StoreError> {
        self.check_write("insert_post")?;
        let mut state = self.write_state()?;
        if !state.users.contains_key(author) {
            return Ok(None);
        }
        Ok(Some(state.push_post(author, content, created_at)))
    }

    fn fetch_post(&self, id: PostId) -> Result<Option<PostRecord>, StoreError> {
        self.check_read("fetch_post")?;
        let state = self.read_state()?;
        Ok(state.post_position(id).map(|position| state.posts[position].clone()))
    }

    fn fetch_recent_posts(
        &self,
        author: &str,
        limit: usize,
    ) -> Result<Vec<PostRecord>, StoreError> {
        self.check_read("fetch_recent_posts")?;
        let state = self.read_state()?;
        let mut posts: Vec<PostRecord> = state
            .posts
            .iter()
            .filter(|post| post.author == author)
            .cloned()
            .collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        posts.truncate(limit);
        Ok(posts)
    }

    fn toggle_like(&self, post: PostId, username: &str) -> Result<Option<LikeToggle>, StoreError> {
        self.check_write("toggle_like")?;
        let mut state = self.write_state()?;
        if !state.users.contains_key(username) {
            return Ok(None);
        }
        let Some(position) = state.post_position(post) else {
            return Ok(None);
        };
        let key = (post, username.to_string());
        let toggle = if state.likes.remove(&key) {
            let record = &mut state.posts[position];
            record.like_count = record.like_count.saturating_sub(1);
            LikeToggle::Unliked
        } else {
            state.likes.insert(key);
            let record = &mut state.posts[position];
            record.like_count = record.like_count.saturating_add(1);
            LikeToggle::Liked
        };
        Ok(Some(toggle))
    }

    fn fetch_is_liked(&self, post: PostId, username: &str) -> Result<bool, StoreError> {
        self.check_read("fetch_is_liked")?;
        Ok(self
            .read_state()?
            .likes
            .contains(&(post, username.to_string())))
    }

    fn insert_comment(
        &self,
        post: PostId,
        author: &str,
        content: &str,
        created_at: i64,
    ) -> Result<Option<CommentId>, StoreError> {
        self.check_write("insert_comment")?;
        let mut state = self.write_state()?;
        if !state.users.contains_key(author) {
            return Ok(None);
        }
        let Some(position) = state.post_position(post) else {
            return Ok(None);
        };
        state.last_comment_id += 1;
        let id = CommentId(state.last_comment_id);
        state.comments.push(Comment {
            id,
            post_id: post,
            author: author.to_string(),
            content: content.to_string(),
            created_at,
        });
        let record = &mut state.posts[position];
        record.comment_count = record.comment_count.saturating_add(1);
        Ok(Some(id))
    }

    fn fetch_comments(&self, post: PostId) -> Result<Vec<Comment>, StoreError> {
        self.check_read("fetch_comments")?;
        let state = self.read_state()?;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|comment| comment.post_id == post)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| (comment.created_at, comment.id));
        Ok(comments)
    }

    fn insert_notification(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationId, StoreError> {
        self.check_write("insert_notification")?;
        let mut state = self.write_state()?;
        if !state.users.contains_key(&notification.recipient) {
            return Err(StoreError::NotFound(format!(
                "user {}",
                notification.recipient
            )));
        }
        state.last_notification_id += 1;
        let id = NotificationId(state.last_notification_id);
        let created_at = state.tick();
        state.notifications.push(Notification {
            id,
            recipient: notification.recipient,
            sender: notification.sender,
            kind: notification.kind,
            content: notification.content,
            post_id: notification.post_id,
            created_at,
            is_read: false,
        });
        Ok(id)
    }

    fn fetch_notifications(
        &self,
        recipient: &str,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<Notification>, StoreError> {
        self.check_read("fetch_notifications")?;
        let state = self.read_state()?;
        let mut found: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.recipient == recipient && !(unread_only && n.is_read))
            .cloned()
            .collect();
        found.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        found.truncate(limit);
        Ok(found)
    }

    fn mark_notification_read(&self, id: NotificationId) -> Result<bool, StoreError> {
        self.check_write("mark_notification_read")?;
        let mut state = self.write_state()?;
        match state.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn mark_all_notifications_read(&self, recipient: &str) -> Result<usize, StoreError> {
        self.check_write("mark_all_notifications_read")?;
        let mut state = self.write_state()?;
        let mut changed = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.recipient == recipient && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    fn unread_notification_count(&self, recipient: &str) -> Result<usize, StoreError> {
        self.check_read("unread_notification_count")?;
        Ok(self
            .read_state()?
            .notifications
            .iter()
            .filter(|n| n.recipient == recipient && !n.is_read)
            .count())
    }

    fn delete_notification(&self, id: NotificationId) -> Result<bool, StoreError> {
        self.check_write("delete_notification")?;
        let mut state = self.write_state()?;
        let before = state.notifications.len();
        state.notifications.retain(|n| n.id != id);
        Ok(state.notifications.len() != before)
    }
}
