//! Integration tests for workpool
//!
//! These tests drive real pools and queues through the public API only.
//! Run with: cargo test --test integration

mod helpers;

mod pressure_stream;
mod queue;
mod work_pool;
