//! Test utilities for relcat integration tests
//!
//! `TestFixture` bootstraps a fresh set of system catalogs per test, either
//! in memory or on sled inside a temporary directory.

#![allow(dead_code)]

pub mod test_fixture;
