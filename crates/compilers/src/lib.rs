//! Compiles the solidity contracts of a project with `solc` and generates typed bindings for them
//! with `abigen`.
//!
//! The pipeline reads every `.sol` file below the sources directory, sends them to
//! `solc --standard-json`, prints the diagnostics, writes an `.abi`, `.bin` and `.link` file per
//! contract into the artifacts directory and finally runs `abigen` for every artifact.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub use solbind_artifacts_solc as artifacts;
pub use solbind_core::{error, process, utils};

pub mod artifact_output;
pub mod bindings;
pub mod config;
pub mod report;
pub mod solc;

mod project;

pub use artifact_output::ContractArtifact;
pub use bindings::Abigen;
pub use config::ProjectPathsConfig;
pub use error::{Result, SolcError};
pub use process::Interrupt;
pub use project::{Project, ProjectBuilder, ProjectCompileOutput};
pub use report::Triage;
pub use solc::Solc;
