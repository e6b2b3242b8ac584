//! Comment Blocks
//!
//! Annotation blocks. Hats and commands do nothing, the C-block runs its
//! body once, and reporters pass their input through (optionally cast).

use std::collections::HashMap;

use serde_json::Value;

use crate::cast;
use crate::{arg, BlockArgs, BlockPackage, BlockUtility, Primitive};

/// Comment block package
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentBlocks;

impl BlockPackage for CommentBlocks {
    fn primitives(&self) -> HashMap<&'static str, Primitive> {
        let mut map: HashMap<&'static str, Primitive> = HashMap::new();
        map.insert("comments_hat", noop);
        map.insert("comments_command", noop);
        map.insert("comments_loop", body);
        map.insert("comments_reporter", reporter);
        map.insert("comments_boolean", boolean);
        map.insert("comments_object", object);
        map.insert("comments_array", array);
        map
    }
}

fn noop(_args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    Value::Null
}

fn body(_args: &BlockArgs, util: &mut dyn BlockUtility) -> Value {
    util.start_branch(1, false);
    Value::Null
}

fn reporter(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    arg(args, "VALUE").clone()
}

fn boolean(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    Value::Bool(cast::to_boolean(arg(args, "VALUE")))
}

fn object(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    Value::Object(cast::to_object(arg(args, "VALUE")))
}

fn array(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    Value::Array(cast::to_array(arg(args, "VALUE")))
}
