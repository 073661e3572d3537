//! Integration test suite for the primer binary.
//!
//! These tests drive the compiled executable through `assert_cmd`. Network
//! failure paths are exercised by pointing `PRIMER_RELEASE_BASE_URL` at a
//! port nothing listens on, so the suite never touches the real release
//! server.

mod cli;
mod self_update;
