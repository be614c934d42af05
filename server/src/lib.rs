// Life of a request:
// 1. JSON comes in through the HTTP router
// 2. The handler names the acting user explicitly and calls one service
// 3. For friend mutations:
//     - Validate against the row store
//     - Write the row store
//     - If the write succeeded, update the cached friend sets
//     - Notify the other party (best effort)
//    For timelines:
//     - Resolve friends through the cached friend sets
//     - Fetch recent posts per author
//     - Rank them in a fresh index and return the newest
//    For likes and comments:
//     - Write the row store, which keeps the post's counts
//     - Notify the post's author (best effort)
//
// System components:
//  - Row store (external, behind the `RowStore` trait)
//  - In-memory search trees (AVL sets, ranked posts, prefix index)
//  - Services tying the two together

pub mod config;
pub mod http;
pub mod index;
pub mod services;
pub mod store;
pub mod types;

#[cfg(test)]
mod e2e_tests;
#[cfg(test)]
mod simulation;
