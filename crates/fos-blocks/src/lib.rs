//! fOS Blocks
//!
//! Block primitives that operate on already-trusted project data.
//!
//! Features:
//! - JSON object and array blocks
//! - Comment blocks (annotations that pass values through)
//! - Compiler compatibility opcode lists
//! - XML escaping for project serialization

use std::collections::HashMap;

use serde_json::{Map, Value};

pub mod cast;
pub mod json;
pub mod comments;
pub mod compat;
pub mod registry;
pub mod xml_escape;

pub use json::JsonBlocks;
pub use comments::CommentBlocks;
pub use registry::BlockRegistry;
pub use xml_escape::xml_escape;

/// Named block inputs
pub type BlockArgs = Map<String, Value>;

/// A block implementation
pub type Primitive = fn(&BlockArgs, &mut dyn BlockUtility) -> Value;

/// Runtime services available to a running block
pub trait BlockUtility {
    /// Enter substack `branch` of the current block
    fn start_branch(&mut self, branch: u32, is_loop: bool);
}

/// A set of block implementations keyed by opcode
pub trait BlockPackage {
    fn primitives(&self) -> HashMap<&'static str, Primitive>;
}

/// Input `name`, or null when missing
pub fn arg<'a>(args: &'a BlockArgs, name: &str) -> &'a Value {
    args.get(name).unwrap_or(&Value::Null)
}

/// Block error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    #[error("Unknown opcode: {0}")]
    UnknownOpcode(String),
}
