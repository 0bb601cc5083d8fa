//! Bindings for standard json output selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contract level output requested by default: everything that ends up in the artifacts directory
pub const DEFAULT_CONTRACT_OUTPUT: [&str; 3] =
    ["abi", "evm.bytecode.object", "evm.bytecode.linkReferences"];

/// file -> (contract name -> requested outputs)
///
/// `"*"` matches every file or contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputSelection(pub BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl OutputSelection {
    /// Selects the given contract level outputs for all files and all contracts
    pub fn all_contracts<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let contracts = BTreeMap::from([(
            "*".to_string(),
            outputs.into_iter().map(Into::into).collect::<Vec<_>>(),
        )]);
        Self(BTreeMap::from([("*".to_string(), contracts)]))
    }

    /// The selection used when compiling a project: ABI, bytecode and link references
    pub fn default_output_selection() -> Self {
        Self::all_contracts(DEFAULT_CONTRACT_OUTPUT)
    }

    /// Returns an empty selection, the compiler then only type checks
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for OutputSelection {
    fn default() -> Self {
        Self::default_output_selection()
    }
}

impl AsRef<BTreeMap<String, BTreeMap<String, Vec<String>>>> for OutputSelection {
    fn as_ref(&self) -> &BTreeMap<String, BTreeMap<String, Vec<String>>> {
        &self.0
    }
}

impl From<BTreeMap<String, BTreeMap<String, Vec<String>>>> for OutputSelection {
    fn from(s: BTreeMap<String, BTreeMap<String, Vec<String>>>) -> Self {
        Self(s)
    }
}
