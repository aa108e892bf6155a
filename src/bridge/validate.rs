//! Shape checks on provider answers. A value that fails is dropped, never returned.

use serde_json::Value;
use tracing::warn;

use crate::entities::{Utxo, MAX_ADDRESS_INDEX};
use crate::error::{BridgeError, BridgeResult};

fn invalid(op: &str, expected: &str, got: &Value) -> BridgeError {
    warn!(op, expected, got = %kind_of(got), "Provider returned an invalid value");
    BridgeError::provider(format!("{op}: the return value is invalid (expected {expected}, got {})", kind_of(got)))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(n) if n.is_i64() && !n.is_u64() => "negative integer",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Array whose every element is a string. `non_empty` additionally rejects `[]`.
pub(crate) fn string_array(op: &str, value: Value, non_empty: bool) -> BridgeResult<Vec<String>> {
    let expected = if non_empty { "a non-empty array of strings" } else { "an array of strings" };
    let items = match value {
        Value::Array(items) if !(non_empty && items.is_empty()) => items,
        other => return Err(invalid(op, expected, &other)),
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => out.push(s),
            other => return Err(invalid(op, expected, &other)),
        }
    }
    Ok(out)
}

pub(crate) fn utxo_array(op: &str, value: Value) -> BridgeResult<Vec<Utxo>> {
    let expected = "an array of UTXO objects";
    let items = match value {
        Value::Array(items) => items,
        other => return Err(invalid(op, expected, &other)),
    };
    items.into_iter()
        .map(|item| match item {
            Value::Object(_) => serde_json::from_value::<Utxo>(item).map_err(|e| {
                warn!(op, error = %e, "Provider returned a malformed UTXO");
                BridgeError::provider(format!("{op}: malformed UTXO: {e}"))
            }),
            other => Err(invalid(op, expected, &other)),
        })
        .collect()
}

pub(crate) fn string(op: &str, value: Value) -> BridgeResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(invalid(op, "a string", &other)),
    }
}

pub(crate) fn address_index(op: &str, value: Value) -> BridgeResult<u32> {
    match value.as_u64() {
        Some(i) if i <= u64::from(MAX_ADDRESS_INDEX) => Ok(i as u32),
        _ => Err(invalid(op, "an integer in [0, 2147483647]", &value)),
    }
}

pub(crate) fn protocol_version(op: &str, value: Value) -> BridgeResult<i32> {
    match value.as_i64().and_then(|v| i32::try_from(v).ok()) {
        Some(v) => Ok(v),
        None => Err(invalid(op, "a 32-bit integer", &value)),
    }
}

pub(crate) fn network_magic(op: &str, value: Value) -> BridgeResult<u32> {
    match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
        Some(v) => Ok(v),
        None => Err(invalid(op, "a 32-bit unsigned integer", &value)),
    }
}

pub(crate) fn fee_per_byte(op: &str, value: Value) -> BridgeResult<u64> {
    match value.as_u64() {
        Some(fee) if fee >= 1 => Ok(fee),
        _ => Err(invalid(op, "an integer >= 1", &value)),
    }
}

/// The provider must acknowledge with no value at all; `null` is still a value.
pub(crate) fn nothing(op: &str, value: Option<Value>) -> BridgeResult<()> {
    match value {
        None => Ok(()),
        Some(other) => Err(invalid(op, "no value", &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_arrays() {
        assert_eq!(string_array("t", json!(["a", "b"]), true).unwrap(), vec!["a", "b"]);
        assert!(string_array("t", json!([]), false).unwrap().is_empty());
        for bad in [json!(null), json!(true), json!(3), json!("string"), json!([]), json!([true]), json!([3]), json!(["a", 1])] {
            assert!(string_array("t", bad.clone(), true).unwrap_err().is_provider(), "{bad}");
        }
    }

    #[test]
    fn integers_must_be_integral_and_in_range() {
        assert_eq!(address_index("t", json!(3)).unwrap(), 3);
        assert!(address_index("t", json!(3.5)).is_err());
        assert!(address_index("t", json!(-1)).is_err());
        assert!(address_index("t", json!(2147483648u64)).is_err());
        assert!(fee_per_byte("t", json!(0)).is_err());
        assert!(network_magic("t", json!(4294967296u64)).is_err());
        assert_eq!(protocol_version("t", json!(70015)).unwrap(), 70015);
        assert!(protocol_version("t", json!("70015")).is_err());
    }

    #[test]
    fn acknowledgement_must_be_empty() {
        assert!(nothing("t", None).is_ok());
        assert!(nothing("t", Some(Value::Null)).is_err());
        assert!(nothing("t", Some(json!([]))).is_err());
    }

    #[test]
    fn utxo_arrays_reject_non_objects() {
        assert!(utxo_array("t", json!([])).unwrap().is_empty());
        for bad in [json!(null), json!("string"), json!([null]), json!([true]), json!([3]), json!(["string"]), json!([{"txid": "ab"}])] {
            assert!(utxo_array("t", bad.clone()).is_err(), "{bad}");
        }
    }
}
