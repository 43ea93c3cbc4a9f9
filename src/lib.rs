//! Live position book: consumes an upstream trade feed and serves ordered
//! net-position snapshots per (account, security) pair.

pub mod api;
pub mod book;
pub mod config;
pub mod stream;
pub mod types;
