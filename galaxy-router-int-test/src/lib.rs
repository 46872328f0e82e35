//! Shared fixtures for the galaxy router integration tests.

pub mod test_util;
