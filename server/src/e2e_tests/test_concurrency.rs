//! Concurrent mutations against one shared friend graph.

use std::sync::Arc;
use std::thread;

use crate::services::FriendGraphService;
use crate::testing::{numbered_users, store_with_users};

#[test]
fn test_concurrent_requests_keep_cache_consistent() {
    let users = numbered_users(12);
    let names: Vec<&str> = users.iter().map(String::as_str).collect();
    let store = store_with_users(&names).unwrap();
    let graph = Arc::new(FriendGraphService::new(Arc::clone(&store)));

    // Warm every cache entry so all threads race on cached sets
    for user in &users {
        graph.get_friends(user).unwrap();
    }

    let handles: Vec<_> = (0..users.len())
        .map(|i| {
            let graph = Arc::clone(&graph);
            let users = users.clone();
            thread::spawn(move || {
                for offset in 1..users.len() {
                    let other = &users[(i + offset) % users.len()];
                    if graph.send_request(&users[i], other).unwrap() {
                        graph.accept_request(&users[i], other).unwrap();
                    }
                    if offset % 3 == 0 {
                        graph.remove_friend(&users[i], other).unwrap();
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for user in &users {
        assert_eq!(
            graph.get_friends(user).unwrap(),
            store.friends_of(user).unwrap(),
            "cache diverged for {user}"
        );
    }
}
