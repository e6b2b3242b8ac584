//! Block Registry
//!
//! Opcode lookup across installed block packages.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::{BlockArgs, BlockError, BlockPackage, BlockUtility, CommentBlocks, JsonBlocks, Primitive};

/// Opcode to primitive table
#[derive(Clone, Default)]
pub struct BlockRegistry {
    primitives: HashMap<&'static str, Primitive>,
}

impl BlockRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the JSON and comment packages installed
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(&JsonBlocks);
        registry.register(&CommentBlocks);
        registry
    }

    /// Install a package; later packages override earlier opcodes
    pub fn register(&mut self, package: &dyn BlockPackage) {
        let primitives = package.primitives();
        tracing::debug!("Registering {} block primitives", primitives.len());
        self.primitives.extend(primitives);
    }

    pub fn get(&self, opcode: &str) -> Option<Primitive> {
        self.primitives.get(opcode).copied()
    }

    pub fn contains(&self, opcode: &str) -> bool {
        self.primitives.contains_key(opcode)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Run the block for `opcode`
    pub fn execute(
        &self,
        opcode: &str,
        args: &BlockArgs,
        util: &mut dyn BlockUtility,
    ) -> Result<Value, BlockError> {
        let primitive = self
            .get(opcode)
            .ok_or_else(|| BlockError::UnknownOpcode(opcode.to_string()))?;
        Ok(primitive(args, util))
    }
}

impl fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut opcodes: Vec<_> = self.primitives.keys().collect();
        opcodes.sort_unstable();
        f.debug_struct("BlockRegistry").field("opcodes", &opcodes).finish()
    }
}
