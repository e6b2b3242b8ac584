//! Value Casting
//!
//! Loose coercions between block values, in the spirit of JS conversions.

use serde_json::{Map, Value};

/// Convert to a display string. Objects and arrays become JSON text.
pub fn to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => format_number(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// JS `Number.prototype.toString` layout for finite values
fn format_number(n: f64) -> String {
    if n == 0.0 {
        // covers -0
        return "0".to_string();
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return n.to_string();
    }
    let exp = format!("{:e}", n);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

/// Convert to a number; anything unparsable is 0
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Bool(b) => if *b { 1.0 } else { 0.0 },
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return 0.0;
            }
            match s.parse::<f64>() {
                Ok(n) if !n.is_nan() => n,
                _ => 0.0,
            }
        }
        _ => 0.0,
    }
}

/// Convert to a boolean. `""`, `"0"` and `"false"` (any case) are false.
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Convert to an object. JSON text is parsed; anything else is `{}`.
pub fn to_object(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        Value::String(s) => match serde_json::from_str(s) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

/// Convert to an array. JSON text is parsed; anything else is `[]`.
pub fn to_array(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(s) => match serde_json::from_str(s) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Interpret a value as an in-bounds array index
pub fn to_index(value: &Value, len: usize) -> Option<usize> {
    let n = to_number(value);
    if n >= 0.0 && n.fract() == 0.0 && n < len as f64 {
        Some(n as usize)
    } else {
        None
    }
}
