//! Mutual friends and suggestions over a small network.

use crate::e2e_tests::helpers::TestApp;

fn network() -> TestApp {
    let app = TestApp::new(&["alice", "bob", "carol", "dave", "erin"]);
    app.befriend("alice", "bob");
    app.befriend("alice", "carol");
    app.befriend("bob", "dave");
    app.befriend("carol", "dave");
    app.befriend("carol", "erin");
    app
}

#[test]
fn test_mutual_friends_ascending() {
    let app = network();
    assert_eq!(
        app.state.suggestions.mutual_friends("alice", "dave").unwrap(),
        vec!["bob", "carol"]
    );
}

#[test]
fn test_suggestions_skip_existing_friends() {
    let app = network();
    let suggested: Vec<(String, usize)> = app
        .state
        .suggestions
        .suggest("alice", 10)
        .unwrap()
        .into_iter()
        .map(|s| (s.username, s.mutual_friends))
        .collect();
    assert_eq!(
        suggested,
        vec![("dave".to_string(), 2), ("erin".to_string(), 1)]
    );
}

#[test]
fn test_suggestions_see_fresh_store_state() {
    let app = network();
    app.befriend("alice", "dave");
    let suggested = app.state.suggestions.suggest("alice", 10).unwrap();
    assert_eq!(suggested.len(), 1);
    assert_eq!(suggested[0].username, "erin");
}
