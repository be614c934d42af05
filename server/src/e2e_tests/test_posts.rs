//! Posts, likes and comments as seen through timelines and inboxes.

use crate::e2e_tests::helpers::{TestApp, contents};
use crate::types::{LikeToggle, NotificationKind};

#[test]
fn test_counts_reach_friend_timeline() {
    let app = TestApp::new(&["alice", "bob", "carol"]);
    app.befriend("alice", "bob");
    app.befriend("alice", "carol");
    let post = app.post("bob", "bob's news", 100);

    let posts = &app.state.posts;
    assert_eq!(posts.toggle_like(post, "alice").unwrap(), Some(LikeToggle::Liked));
    assert_eq!(posts.toggle_like(post, "carol").unwrap(), Some(LikeToggle::Liked));
    posts.add_comment(post, "carol", "congrats").unwrap();

    let timeline = app.timeline("alice", 10);
    assert_eq!(contents(&timeline), vec!["bob's news"]);
    assert_eq!((timeline[0].like_count, timeline[0].comment_count), (2, 1));

    assert_eq!(posts.toggle_like(post, "carol").unwrap(), Some(LikeToggle::Unliked));
    assert_eq!(app.timeline("alice", 10)[0].like_count, 1);
}

#[test]
fn test_created_post_shows_for_friends_only() {
    let app = TestApp::new(&["alice", "bob", "carol"]);
    app.befriend("alice", "bob");
    let post = app
        .state
        .posts
        .create_post("bob", "hello friends")
        .unwrap()
        .unwrap();

    let timeline = app.timeline("alice", 10);
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].id, post);
    assert!(app.timeline("carol", 10).is_empty());
}

#[test]
fn test_like_and_comment_notify_author() {
    let app = TestApp::new(&["alice", "bob"]);
    let post = app.post("alice", "hello", 10);
    app.state.posts.toggle_like(post, "bob").unwrap();
    app.state.posts.add_comment(post, "bob", "hi").unwrap();

    let inbox = app.state.notifications.list("alice", false, 10).unwrap();
    let kinds: Vec<NotificationKind> = inbox.iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::Comment, NotificationKind::Like]);
    assert_eq!(inbox[0].content, "bob commented on your post");
    assert!(app.state.notifications.list("bob", false, 10).unwrap().is_empty());
}

#[test]
fn test_registered_user_can_befriend_after_refresh() {
    let app = TestApp::new(&["alice"]);
    assert!(app.state.search.register("bob", "bob@mail.test").unwrap().is_some());
    assert!(app.state.search.search("b", "alice", 10).unwrap().is_empty());

    app.befriend("alice", "bob");
    app.state.search.refresh().unwrap();
    let found = app.state.search.search("b", "alice", 10).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].is_friend);
}
