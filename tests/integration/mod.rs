//! Integration Test Suite
//!
//! Tests interactions between multiple components:
//! - Backend integrations with cloud emulators
//! - Concurrent operations
//! - Multi-user scenarios

mod backend_tests;
mod concurrent_tests;
mod multiuser_tests;
