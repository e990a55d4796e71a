//! End-to-end tests that drive rig against a fake CMake and a fake game.
//!
//! Unix only: the fakes are shell scripts.

#![cfg(unix)]

mod common;
mod run_tests;
