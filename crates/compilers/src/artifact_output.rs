//! Extraction of per-contract artifacts from the compiler output and their persistence.
//!
//! Every contract produces three files in the artifacts directory, named after the contract:
//! `Greeter.abi` (compact JSON), `Greeter.bin` (hex bytecode as emitted by solc) and
//! `Greeter.link` (compact JSON of the unresolved library link references).

use crate::{
    artifacts::{CompilerOutput, Contract},
    error::{Result, SolcError, SolcIoError},
    utils,
};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

pub const ABI_EXTENSION: &str = "abi";
pub const BIN_EXTENSION: &str = "bin";
pub const LINK_EXTENSION: &str = "link";

/// The persisted outputs of a single contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractArtifact {
    /// Name of the contract, also the file stem of every artifact file
    pub name: String,
    /// The ABI as compact JSON
    pub abi: String,
    /// The bytecode as hex string
    pub bytecode: String,
    /// The link references as compact JSON
    pub link_references: String,
}

impl ContractArtifact {
    /// Extracts the artifacts of the contract `name`
    pub fn new(name: impl Into<String>, contract: &Contract) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            abi: serde_json::to_string(&contract.abi)?,
            bytecode: contract.evm.bytecode.object.clone(),
            link_references: serde_json::to_string(&contract.evm.bytecode.link_references)?,
        })
    }

    /// `<dir>/<name>.abi`
    pub fn abi_file(&self, dir: impl AsRef<Path>) -> PathBuf {
        output_file(dir, &self.name, ABI_EXTENSION)
    }

    /// `<dir>/<name>.bin`
    pub fn bin_file(&self, dir: impl AsRef<Path>) -> PathBuf {
        output_file(dir, &self.name, BIN_EXTENSION)
    }

    /// `<dir>/<name>.link`
    pub fn link_file(&self, dir: impl AsRef<Path>) -> PathBuf {
        output_file(dir, &self.name, LINK_EXTENSION)
    }

    /// Writes all three files into `dir`, replacing existing ones.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<(), SolcIoError> {
        let dir = dir.as_ref();
        for (file, content) in [
            (self.abi_file(dir), &self.abi),
            (self.bin_file(dir), &self.bytecode),
            (self.link_file(dir), &self.link_references),
        ] {
            trace!(file = %file.display(), "writing artifact");
            utils::write_with_mode(&file, content, utils::ARTIFACT_FILE_MODE)?;
        }
        Ok(())
    }

    /// Reads the artifacts of contract `name` back from `dir`
    pub fn read_from(dir: impl AsRef<Path>, name: impl Into<String>) -> Result<Self, SolcIoError> {
        let dir = dir.as_ref();
        let name = name.into();
        let read = |ext: &str| {
            let file = output_file(dir, &name, ext);
            fs::read_to_string(&file).map_err(|err| SolcIoError::new(err, file))
        };
        Ok(Self {
            abi: read(ABI_EXTENSION)?,
            bytecode: read(BIN_EXTENSION)?,
            link_references: read(LINK_EXTENSION)?,
            name,
        })
    }
}

/// Returns `<dir>/<name>.<ext>`
pub fn output_file(dir: impl AsRef<Path>, name: &str, ext: &str) -> PathBuf {
    dir.as_ref().join(format!("{name}.{ext}"))
}

/// Extracts the artifacts of every contract in the output.
///
/// Fails with [`SolcError::MalformedOutput`] if the `contracts` section is missing or malformed.
pub fn output_to_artifacts(output: &CompilerOutput) -> Result<Vec<ContractArtifact>> {
    let contracts = output.contracts().map_err(SolcError::MalformedOutput)?;

    let mut seen = HashSet::new();
    let mut artifacts = Vec::new();
    for (file, contracts) in &contracts {
        for (name, contract) in contracts {
            if !seen.insert(name.as_str()) {
                warn!(%file, contract = %name, "duplicate contract name, overwriting artifacts");
            }
            artifacts.push(ContractArtifact::new(name, contract)?);
        }
    }
    Ok(artifacts)
}

/// Writes the artifacts of every contract in the output to `artifacts_dir`, creating the directory
/// if needed.
///
/// All artifacts are extracted before the first file is written.
pub fn on_output(
    output: &CompilerOutput,
    artifacts_dir: impl AsRef<Path>,
) -> Result<Vec<ContractArtifact>> {
    let artifacts_dir = artifacts_dir.as_ref();
    let artifacts = output_to_artifacts(output)?;

    utils::create_dir_all(artifacts_dir)?;
    for artifact in &artifacts {
        artifact.write_to(artifacts_dir)?;
    }
    debug!(dir = %artifacts_dir.display(), count = artifacts.len(), "wrote artifacts");

    Ok(artifacts)
}
