//! Solc standard-json artifact types.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use serde::{de::Error as _, Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod bytecode;
pub mod contract;
pub mod error;
pub mod output_selection;
pub mod sources;

pub use self::{
    bytecode::{Bytecode, Offsets},
    contract::{Contract, Evm},
    error::{Error, Severity, SourceLocation},
    output_selection::OutputSelection,
    sources::{Source, Sources},
};

use solbind_core::utils::to_slash_lossy;

pub const SOLIDITY: &str = "Solidity";

/// file -> (contract name -> T)
pub type FileToContractsMap<T> = BTreeMap<String, BTreeMap<String, T>>;

/// file -> (contract name -> Contract)
pub type Contracts = FileToContractsMap<Contract>;

/// Input type `solc` expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerInput {
    pub language: String,
    /// source path, relative to the sources directory -> source
    pub sources: BTreeMap<String, Source>,
    pub settings: Settings,
}

/// Default `language` field is set to `"Solidity"`.
impl Default for CompilerInput {
    fn default() -> Self {
        Self {
            language: SOLIDITY.to_string(),
            sources: BTreeMap::new(),
            settings: Settings::default(),
        }
    }
}

impl CompilerInput {
    /// Creates a new [CompilerInput] with default settings and the given sources.
    ///
    /// Paths are written with `/` separators; the map keeps them sorted so the serialized request
    /// is the same for the same set of files.
    pub fn with_sources(sources: &Sources) -> Self {
        let sources = sources
            .iter()
            .map(|(path, source)| (to_slash_lossy(path), source.clone()))
            .collect();
        Self { sources, ..Default::default() }
    }

    /// Sets the settings for compilation
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Whether this input contains any sources at all
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Standard json input settings, only the parts this crate drives.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// This field can be used to select desired outputs based
    /// on file and contract names.
    /// If this field is omitted, then the compiler loads and does type
    /// checking, but will not generate any outputs apart from errors.
    #[serde(default)]
    pub output_selection: OutputSelection,
}

impl Settings {
    /// Creates a new `Settings` instance with the given `output_selection`
    pub fn new(output_selection: impl Into<OutputSelection>) -> Self {
        Self { output_selection: output_selection.into() }
    }
}

/// Output type `solc` produces
///
/// Only `errors` is decoded up front, so every diagnostic can be reported even when the rest of the
/// response is broken. `contracts` is kept as raw JSON and decoded by [`CompilerOutput::contracts`]
/// once the diagnostics have been dealt with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerOutput {
    #[serde(default)]
    pub errors: Vec<Error>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contracts: Option<serde_json::Value>,
}

impl CompilerOutput {
    /// Decodes the raw `solc --standard-json` response.
    ///
    /// The top level has to be a JSON object and `errors`, if present, a list of diagnostics with
    /// a `severity` and a `formattedMessage`, otherwise the whole document is rejected.
    pub fn parse(raw: &[u8]) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_slice(raw)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom(format!(
                "expected a JSON object at the top level, found {}",
                json_kind(&value)
            )));
        }
        let output: Self = serde_json::from_value(value)?;
        trace!(
            errors = output.errors.len(),
            has_contracts = output.contracts.is_some(),
            "decoded compiler output"
        );
        Ok(output)
    }

    /// Whether the output contains a diagnostic that is not a warning
    pub fn has_error(&self) -> bool {
        self.errors.iter().any(|err| err.severity.is_fatal())
    }

    /// Decodes the `contracts` section.
    ///
    /// Fails if the section is missing or any contract in it doesn't match [`Contract`].
    pub fn contracts(&self) -> Result<Contracts, serde_json::Error> {
        let contracts =
            self.contracts.as_ref().ok_or_else(|| serde_json::Error::missing_field("contracts"))?;
        Contracts::deserialize(contracts)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn input_serializes_to_standard_json() {
        let mut sources = Sources::new();
        sources.insert(PathBuf::from("b/B.sol"), Source::new("contract B {}"));
        sources.insert(PathBuf::from("A.sol"), Source::new("contract A { string s = \"\\n\"; }"));

        let input = CompilerInput::with_sources(&sources);
        let json = serde_json::to_value(&input).unwrap();

        assert_eq!(json["language"], "Solidity");
        assert_eq!(json["sources"]["A.sol"]["content"], "contract A { string s = \"\\n\"; }");
        assert_eq!(json["sources"]["b/B.sol"]["content"], "contract B {}");
        assert_eq!(
            json["settings"]["outputSelection"]["*"]["*"],
            serde_json::json!(["abi", "evm.bytecode.object", "evm.bytecode.linkReferences"])
        );

        // sorted by path
        let keys: Vec<_> = input.sources.keys().cloned().collect();
        assert_eq!(keys, vec!["A.sol".to_string(), "b/B.sol".to_string()]);
    }

    #[test]
    fn input_is_deterministic() {
        let mut sources = Sources::new();
        for name in ["Z.sol", "A.sol", "m/M.sol"] {
            sources.insert(PathBuf::from(name), Source::new(name));
        }
        let a = serde_json::to_string(&CompilerInput::with_sources(&sources)).unwrap();
        let b = serde_json::to_string(&CompilerInput::with_sources(&sources)).unwrap();
        similar_asserts::assert_eq!(a, b);
    }

    #[test]
    fn can_parse_output() {
        let raw = r#"{
            "errors": [
                {"severity": "warning", "formattedMessage": "Warning: unused variable", "message": "unused variable", "type": "Warning", "component": "general"}
            ],
            "sources": {"Greeter.sol": {"id": 0}},
            "contracts": {
                "Greeter.sol": {
                    "Greeter": {
                        "abi": [{"type": "function", "name": "greet", "inputs": [], "outputs": [], "stateMutability": "view"}],
                        "evm": {"bytecode": {"object": "6080", "linkReferences": {}, "opcodes": "PUSH1"}}
                    }
                }
            }
        }"#;
        let output = CompilerOutput::parse(raw.as_bytes()).unwrap();
        assert_eq!(output.errors.len(), 1);
        assert!(!output.has_error());
        let contracts = output.contracts().unwrap();
        let greeter = &contracts["Greeter.sol"]["Greeter"];
        assert_eq!(greeter.evm.bytecode.object, "6080");
        assert_eq!(greeter.abi.len(), 1);
        assert!(!contracts["Greeter.sol"].contains_key("Missing"));
    }

    #[test]
    fn empty_object_is_valid_output() {
        let output = CompilerOutput::parse(b"{}").unwrap();
        assert!(output.errors.is_empty());
        assert!(output.contracts.is_none());
        assert!(output.contracts().is_err());
    }

    #[test]
    fn rejects_non_object_output() {
        for raw in ["[]", "\"text\"", "42", "null", "not json at all"] {
            assert!(CompilerOutput::parse(raw.as_bytes()).is_err(), "{raw}");
        }
    }

    #[test]
    fn rejects_malformed_errors_section() {
        // not a sequence
        assert!(CompilerOutput::parse(br#"{"errors": {"severity": "error"}}"#).is_err());
        // not a sequence of objects
        assert!(CompilerOutput::parse(br#"{"errors": ["error"]}"#).is_err());
        // missing severity
        assert!(CompilerOutput::parse(br#"{"errors": [{"formattedMessage": "x"}]}"#).is_err());
        // missing message
        assert!(CompilerOutput::parse(br#"{"errors": [{"severity": "error"}]}"#).is_err());
        // wrong types
        assert!(CompilerOutput::parse(br#"{"errors": [{"severity": 1, "formattedMessage": "x"}]}"#)
            .is_err());
        assert!(CompilerOutput::parse(br#"{"errors": [{"severity": "error", "formattedMessage": []}]}"#)
            .is_err());
    }

    fn contracts_of(raw: &str) -> Result<Contracts, serde_json::Error> {
        CompilerOutput::parse(raw.as_bytes()).unwrap().contracts()
    }

    #[test]
    fn rejects_malformed_contracts_section() {
        // contracts not a mapping of mappings
        assert!(contracts_of(r#"{"contracts": []}"#).is_err());
        assert!(contracts_of(r#"{"contracts": {"A.sol": []}}"#).is_err());
        assert!(contracts_of(r#"{"contracts": {"A.sol": {"A": 1}}}"#).is_err());
        // abi of the wrong type
        assert!(contracts_of(
            r#"{"contracts": {"A.sol": {"A": {"abi": {}, "evm": {"bytecode": {"object": "00", "linkReferences": {}}}}}}}"#
        )
        .is_err());
        // bytecode object of the wrong type
        assert!(contracts_of(
            r#"{"contracts": {"A.sol": {"A": {"abi": [], "evm": {"bytecode": {"object": 0, "linkReferences": {}}}}}}}"#
        )
        .is_err());
        // missing evm section
        assert!(contracts_of(r#"{"contracts": {"A.sol": {"A": {"abi": []}}}}"#).is_err());
        // missing link references
        assert!(contracts_of(
            r#"{"contracts": {"A.sol": {"A": {"abi": [], "evm": {"bytecode": {"object": "00"}}}}}}"#
        )
        .is_err());
    }

    #[test]
    fn diagnostics_decode_despite_malformed_contracts() {
        let raw = br#"{
            "errors": [{"severity": "error", "formattedMessage": "ParserError: boom"}],
            "contracts": {"A.sol": {"A": {"abi": []}}}
        }"#;
        let output = CompilerOutput::parse(raw).unwrap();
        assert!(output.has_error());
        assert_eq!(output.errors[0].formatted_message, "ParserError: boom");
        assert!(output.contracts().is_err());
    }
}
