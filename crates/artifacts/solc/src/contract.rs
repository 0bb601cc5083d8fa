//! Contract related types.

use crate::bytecode::Bytecode;
use serde::{Deserialize, Serialize};

/// Represents a compiled solidity contract, only the outputs that are persisted as artifacts
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// The contract ABI, a list of function, event and error descriptions.
    ///
    /// Entries are kept untyped so the ABI is written out exactly as the compiler described it.
    pub abi: Vec<serde_json::Value>,
    /// EVM-related outputs
    pub evm: Evm,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Evm {
    pub bytecode: Bytecode,
}
