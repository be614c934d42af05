//! Username prefix search with per-viewer annotations.

use crate::e2e_tests::helpers::TestApp;
use crate::types::SearchUser;

fn names(users: &[SearchUser]) -> Vec<&str> {
    users.iter().map(SearchUser::username).collect()
}

#[test]
fn test_case_insensitive_prefix() {
    let app = TestApp::new(&["Alice", "alex", "bob", "viewer"]);
    let found = app.state.search.search("al", "viewer", 10).unwrap();
    assert_eq!(names(&found), vec!["alex", "Alice"]);
}

#[test]
fn test_annotations_follow_friend_graph() {
    let app = TestApp::new(&["alice", "bob", "carol"]);
    app.state.search.refresh().unwrap();
    app.befriend("alice", "bob");
    app.state.graph.send_request("alice", "carol").unwrap();

    let found = app.state.search.all_users("alice", 10).unwrap();
    assert_eq!(names(&found), vec!["bob", "carol"]);
    assert!(found[0].is_friend);
    assert!(!found[0].has_pending_request);
    assert!(!found[1].is_friend);
    assert!(found[1].has_pending_request);

    // From carol's side the request is incoming, still pending
    let found = app.state.search.search("ali", "carol", 10).unwrap();
    assert!(found[0].has_pending_request);
}

#[test]
fn test_index_is_a_snapshot_until_refresh() {
    let app = TestApp::new(&["alice"]);
    app.store.add_user("alfred").unwrap();
    assert!(app.state.search.search("alf", "alice", 10).unwrap().is_empty());

    app.state.search.refresh().unwrap();
    assert_eq!(names(&app.state.search.search("alf", "alice", 10).unwrap()), vec!["alfred"]);
}
