//! Bytecode related types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The `evm.bytecode` section of a compiled contract
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bytecode {
    /// The bytecode as a hex string, unlinked library placeholders included
    pub object: String,
    /// Empty unless this is an unlinked object.
    ///
    /// source file -> (library name -> placeholder offsets)
    pub link_references: BTreeMap<String, BTreeMap<String, Vec<Offsets>>>,
}

impl Bytecode {
    /// Whether the bytecode still contains placeholders for library addresses
    pub fn is_unlinked(&self) -> bool {
        !self.link_references.is_empty()
    }
}

/// Byte offsets into the bytecode where a library address needs to be placed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offsets {
    pub start: u32,
    pub length: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_link_references() {
        assert!(serde_json::from_str::<Bytecode>(r#"{"object": "6080"}"#).is_err());

        let bytecode: Bytecode =
            serde_json::from_str(r#"{"object": "6080", "linkReferences": {}}"#).unwrap();
        assert!(!bytecode.is_unlinked());
        assert_eq!(serde_json::to_string(&bytecode.link_references).unwrap(), "{}");
    }

    #[test]
    fn can_parse_link_references() {
        let raw = r#"{
            "object": "73__$ecf1$__63",
            "linkReferences": {"lib/Math.sol": {"Math": [{"start": 1, "length": 20}]}}
        }"#;
        let bytecode: Bytecode = serde_json::from_str(raw).unwrap();
        assert!(bytecode.is_unlinked());
        assert_eq!(
            serde_json::to_string(&bytecode.link_references).unwrap(),
            r#"{"lib/Math.sol":{"Math":[{"start":1,"length":20}]}}"#
        );
    }

    #[test]
    fn rejects_malformed_link_references() {
        assert!(serde_json::from_str::<Bytecode>(r#"{"object": "", "linkReferences": []}"#).is_err());
        assert!(serde_json::from_str::<Bytecode>(
            r#"{"object": "", "linkReferences": {"A.sol": {"L": [{"start": "1"}]}}}"#
        )
        .is_err());
    }
}
