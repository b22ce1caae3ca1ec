//! # feed-pager-lib
//!
//! `feed-pager-lib` is a collection of utilities used by the `feed-pager` crates:
//! configuration, defaults, and logging setup.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod defaults;
pub mod utils;
