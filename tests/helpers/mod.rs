//! Test helpers module
//!
//! This module provides utilities and helpers for testing StallBoard.
//! It includes mock servers for the hosted APIs, a stub login provider,
//! test data builders and a test context over the in-memory store.

#![allow(dead_code)]

pub mod line_mock;
pub mod supabase_mock;
pub mod test_context;
pub mod test_data;

// Each test target uses a different subset of the helpers
#[allow(unused_imports)]
pub use delayed_store::*;
#[allow(unused_imports)]
pub use line_mock::*;
#[allow(unused_imports)]
pub use postal_mock::*;
#[allow(unused_imports)]
pub use supabase_mock::*;
#[allow(unused_imports)]
pub use test_context::*;
#[allow(unused_imports)]
pub use test_data::*;
