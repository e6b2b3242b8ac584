//! JSON Blocks
//!
//! Object and array manipulation. Every block takes its inputs by value and
//! returns a fresh result; inputs are never mutated in place.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::cast;
use crate::{arg, BlockArgs, BlockPackage, BlockUtility, Primitive};

/// JSON block package
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBlocks;

impl BlockPackage for JsonBlocks {
    fn primitives(&self) -> HashMap<&'static str, Primitive> {
        let mut map: HashMap<&'static str, Primitive> = HashMap::new();
        map.insert("json_new_object", new_object);
        map.insert("json_to_object", to_object);
        map.insert("json_to_string", to_string);
        map.insert("json_keys", keys);
        map.insert("json_values", values);
        map.insert("json_value_of_key", value_of_key);
        map.insert("json_set_key", set_key);
        map.insert("json_delete_key", delete_key);
        map.insert("json_merge_object", merge_object);
        map.insert("json_has_key", has_key);
        map.insert("json_new_array", new_array);
        map.insert("json_to_array", to_array);
        map.insert("json_value_of_index", value_of_index);
        map.insert("json_index_of_value", index_of_value);
        map.insert("json_add_item", add_item);
        map.insert("json_replace_index", replace_index);
        map.insert("json_delete_index", delete_index);
        map.insert("json_delete_all_occurrences", delete_all_occurrences);
        map.insert("json_merge_array", merge_array);
        map.insert("json_has_item", has_item);
        // Names used by the compiler compatibility layer
        map.insert("json_join_object", merge_object);
        map.insert("json_join_array", merge_array);
        map
    }
}

fn empty() -> Value {
    Value::String(String::new())
}

fn new_object(_args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    Value::Object(Map::new())
}

fn to_object(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let text = Value::String(cast::to_string(arg(args, "STR")));
    Value::Object(cast::to_object(&text))
}

fn to_string(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let obj = Value::Object(cast::to_object(arg(args, "OBJ")));
    Value::String(cast::to_string(&obj))
}

fn keys(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let obj = cast::to_object(arg(args, "OBJ"));
    Value::Array(obj.keys().cloned().map(Value::String).collect())
}

fn values(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let obj = cast::to_object(arg(args, "OBJ"));
    Value::Array(obj.values().cloned().collect())
}

fn value_of_key(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let obj = cast::to_object(arg(args, "OBJ"));
    let key = cast::to_string(arg(args, "KEY"));
    match obj.get(&key) {
        Some(Value::Null) | None => empty(),
        Some(value) => value.clone(),
    }
}

fn set_key(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let mut obj = cast::to_object(arg(args, "OBJ"));
    let key = cast::to_string(arg(args, "KEY"));
    obj.insert(key, arg(args, "VALUE").clone());
    Value::Object(obj)
}

fn delete_key(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let mut obj = cast::to_object(arg(args, "OBJ"));
    obj.shift_remove(&cast::to_string(arg(args, "KEY")));
    Value::Object(obj)
}

fn merge_object(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let mut merged = cast::to_object(arg(args, "OBJ1"));
    merged.extend(cast::to_object(arg(args, "OBJ2")));
    Value::Object(merged)
}

fn has_key(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let obj = cast::to_object(arg(args, "OBJ"));
    Value::Bool(obj.contains_key(&cast::to_string(arg(args, "KEY"))))
}

fn new_array(_args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    Value::Array(Vec::new())
}

fn to_array(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let text = Value::String(cast::to_string(arg(args, "STR")));
    Value::Array(cast::to_array(&text))
}

fn value_of_index(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let arr = cast::to_array(arg(args, "ARR"));
    match cast::to_index(arg(args, "INDEX"), arr.len()).map(|i| &arr[i]) {
        Some(Value::Null) | None => empty(),
        Some(value) => value.clone(),
    }
}

fn index_of_value(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let arr = cast::to_array(arg(args, "ARR"));
    let needle = cast::to_string(arg(args, "VALUE"));
    arr.iter()
        .position(|item| item.as_str() == Some(needle.as_str()))
        .map(Value::from)
        .unwrap_or_else(empty)
}

fn add_item(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let mut arr = cast::to_array(arg(args, "ARR"));
    arr.push(Value::String(cast::to_string(arg(args, "ITEM"))));
    Value::Array(arr)
}

fn replace_index(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let mut arr = cast::to_array(arg(args, "ARR"));
    match cast::to_index(arg(args, "INDEX"), arr.len()) {
        Some(i) => {
            arr[i] = arg(args, "ITEM").clone();
            Value::Array(arr)
        }
        None => Value::Array(Vec::new()),
    }
}

fn delete_index(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let mut arr = cast::to_array(arg(args, "ARR"));
    match cast::to_index(arg(args, "INDEX"), arr.len()) {
        Some(i) => {
            arr.remove(i);
            Value::Array(arr)
        }
        None => Value::Array(Vec::new()),
    }
}

fn delete_all_occurrences(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let arr = cast::to_array(arg(args, "ARR"));
    let item = cast::to_string(arg(args, "ITEM"));
    Value::Array(arr.into_iter().filter(|v| v.as_str() != Some(item.as_str())).collect())
}

fn merge_array(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let mut merged = cast::to_array(arg(args, "ARR1"));
    merged.extend(cast::to_array(arg(args, "ARR2")));
    Value::Array(merged)
}

fn has_item(args: &BlockArgs, _util: &mut dyn BlockUtility) -> Value {
    let arr = cast::to_array(arg(args, "ARR"));
    let item = cast::to_string(arg(args, "ITEM"));
    Value::Bool(arr.iter().any(|v| v.as_str() == Some(item.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NoBranches;

    impl BlockUtility for NoBranches {
        fn start_branch(&mut self, _branch: u32, _is_loop: bool) {
            panic!("json blocks never branch");
        }
    }

    fn run(opcode: &str, args: Value) -> Value {
        let primitives = JsonBlocks.primitives();
        let block = primitives[opcode];
        let args = args.as_object().cloned().unwrap_or_default();
        block(&args, &mut NoBranches)
    }

    #[test]
    fn test_object_blocks() {
        assert_eq!(run("json_new_object", json!({})), json!({}));
        assert_eq!(run("json_to_object", json!({"STR": r#"{"a":1}"#})), json!({"a": 1}));
        assert_eq!(run("json_to_string", json!({"OBJ": {"a": 1}})), json!(r#"{"a":1}"#));
        assert_eq!(run("json_keys", json!({"OBJ": {"a": 1, "b": 2}})), json!(["a", "b"]));
        assert_eq!(run("json_values", json!({"OBJ": {"a": 1, "b": 2}})), json!([1, 2]));
        assert_eq!(run("json_value_of_key", json!({"OBJ": {"a": 1}, "KEY": "a"})), json!(1));
        assert_eq!(run("json_value_of_key", json!({"OBJ": {"a": 1}, "KEY": "z"})), json!(""));
        assert_eq!(run("json_set_key", json!({"OBJ": {}, "KEY": "k", "VALUE": [1]})), json!({"k": [1]}));
        assert_eq!(run("json_delete_key", json!({"OBJ": {"a": 1, "b": 2}, "KEY": "a"})), json!({"b": 2}));
        assert_eq!(run("json_has_key", json!({"OBJ": r#"{"a":1}"#, "KEY": "a"})), json!(true));
        assert_eq!(run("json_has_key", json!({"OBJ": {}, "KEY": "a"})), json!(false));
    }

    #[test]
    fn test_merge_object_right_wins() {
        let merged = run("json_merge_object", json!({"OBJ1": {"a": 1, "b": 1}, "OBJ2": {"b": 2}}));
        assert_eq!(merged, json!({"a": 1, "b": 2}));
        assert_eq!(run("json_join_object", json!({"OBJ1": {"a": 1}, "OBJ2": {"b": 2}})), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_array_blocks() {
        assert_eq!(run("json_new_array", json!({})), json!([]));
        assert_eq!(run("json_to_array", json!({"STR": "[1,2]"})), json!([1, 2]));
        assert_eq!(run("json_value_of_index", json!({"ARR": ["a", "b"], "INDEX": 1})), json!("b"));
        assert_eq!(run("json_value_of_index", json!({"ARR": ["a"], "INDEX": 5})), json!(""));
        assert_eq!(run("json_index_of_value", json!({"ARR": ["a", "b"], "VALUE": "b"})), json!(1));
        assert_eq!(run("json_index_of_value", json!({"ARR": [1, 2], "VALUE": "1"})), json!(""));
        assert_eq!(run("json_add_item", json!({"ARR": [], "ITEM": 3})), json!(["3"]));
        assert_eq!(run("json_replace_index", json!({"ARR": [1, 2], "INDEX": 0, "ITEM": {"x": 1}})), json!([{"x": 1}, 2]));
        assert_eq!(run("json_replace_index", json!({"ARR": [1, 2], "INDEX": 2, "ITEM": 0})), json!([]));
        assert_eq!(run("json_delete_index", json!({"ARR": [1, 2, 3], "INDEX": 1})), json!([1, 3]));
        assert_eq!(run("json_delete_index", json!({"ARR": [1], "INDEX": -1})), json!([]));
        assert_eq!(
            run("json_delete_all_occurrences", json!({"ARR": ["a", "b", "a", 1], "ITEM": "a"})),
            json!(["b", 1])
        );
        assert_eq!(run("json_merge_array", json!({"ARR1": [1], "ARR2": "[2]"})), json!([1, 2]));
        assert_eq!(run("json_join_array", json!({"ARR1": [], "ARR2": [3]})), json!([3]));
        assert_eq!(run("json_has_item", json!({"ARR": ["x"], "ITEM": "x"})), json!(true));
        assert_eq!(run("json_has_item", json!({"ARR": [1], "ITEM": 1})), json!(false));
    }

    #[test]
    fn test_object_key_order_is_insertion_order() {
        let obj = run("json_to_object", json!({"STR": r#"{"b":1,"a":2,"c":3}"#}));
        assert_eq!(run("json_keys", json!({"OBJ": obj.clone()})), json!(["b", "a", "c"]));
        assert_eq!(run("json_values", json!({"OBJ": obj.clone()})), json!([1, 2, 3]));
        assert_eq!(run("json_to_string", json!({"OBJ": obj.clone()})), json!(r#"{"b":1,"a":2,"c":3}"#));

        let obj = run("json_set_key", json!({"OBJ": obj, "KEY": "aa", "VALUE": 4}));
        let obj = run("json_delete_key", json!({"OBJ": obj, "KEY": "b"}));
        assert_eq!(run("json_keys", json!({"OBJ": obj.clone()})), json!(["a", "c", "aa"]));

        let merged = run("json_merge_object", json!({"OBJ1": obj, "OBJ2": {"z": 0, "a": 9}}));
        assert_eq!(run("json_to_string", json!({"OBJ": merged})), json!(r#"{"a":9,"c":3,"aa":4,"z":0}"#));
    }

    #[test]
    fn test_missing_inputs_are_tolerated() {
        assert_eq!(run("json_keys", json!({})), json!([]));
        assert_eq!(run("json_value_of_index", json!({})), json!(""));
        assert_eq!(run("json_to_object", json!({"STR": "not json"})), json!({}));
    }
}
