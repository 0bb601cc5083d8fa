//! Core utilities shared by the solbind crates.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod error;
pub mod process;
pub mod utils;
