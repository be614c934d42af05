//! End-to-end tests through the services and the in-memory store.
//!
//! Each test builds a fresh [`helpers::TestApp`], drives it the way the HTTP
//! handlers would, and checks both the returned values and store truth.

#![cfg(test)]

mod test_concurrency;
mod test_posts;
mod test_search;
mod test_suggestions;
