//! rig-lib: build orchestration for the game
//!
//! This crate provides the steps the `rig` binary sequences:
//! - `deps` / `fetch`: fetch third-party sources once and patch them
//! - `stage`: copy runtime assets into the output directory
//! - `compile`: configure and run the CMake build, then place runtime files
//! - `clean`: remove build and output directories
//! - `launch`: run the built game
//!
//! Every step takes a [`context::BuildContext`]. Steps that run external
//! programs take a [`process::Runner`].
//!
//! rig holds no locks: two concurrent runs against the same repository can
//! corrupt each other's build and output directories.

pub mod clean;
pub mod compile;
pub mod consts;
pub mod context;
pub mod deps;
pub mod fetch;
pub mod launch;
pub mod outcome;
pub mod platform;
pub mod process;
pub mod stage;
pub mod util;
