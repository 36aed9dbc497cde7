use serde_json::Value;

use crate::models::AvailabilityResult;
use crate::{AppError, Result};

/// Places the store list has lived in the fulfillment payload, tried in order.
pub const STORE_LIST_POINTERS: &[&str] = &[
    "/body/PickupMessage/stores",
    "/body/content/pickupMessage/stores",
];

const PICKUP_AVAILABLE: &str = "available";

#[derive(Debug, Clone)]
pub struct AvailabilityInterpreter {
    pointers: Vec<String>,
}

impl Default for AvailabilityInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl AvailabilityInterpreter {
    pub fn new() -> Self {
        Self {
            pointers: STORE_LIST_POINTERS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// First non-empty store list among the candidate locations.
    fn find_stores<'a>(&self, payload: &'a Value) -> Result<Option<&'a Vec<Value>>> {
        for pointer in &self.pointers {
            match payload.pointer(pointer) {
                None | Some(Value::Null) => continue,
                Some(Value::Array(stores)) if stores.is_empty() => continue,
                Some(Value::Array(stores)) => return Ok(Some(stores)),
                Some(other) => {
                    return Err(AppError::parse(format!(
                        "expected an array at {}, found {}",
                        pointer,
                        json_kind(other)
                    )));
                }
            }
        }
        Ok(None)
    }

    /// Shape problems are reported as `AppError::Parse`; the caller decides
    /// how to treat them.
    pub fn interpret(&self, payload: &Value, part_number: &str) -> Result<AvailabilityResult> {
        let Some(stores) = self.find_stores(payload)? else {
            return Ok(AvailabilityResult::unavailable());
        };

        for (index, store) in stores.iter().enumerate() {
            let store = store
                .as_object()
                .ok_or_else(|| AppError::parse(format!("store #{} is not an object", index)))?;

            let parts = match store.get("partsAvailability") {
                None | Some(Value::Null) => continue,
                Some(Value::Object(parts)) => parts,
                Some(other) => {
                    return Err(AppError::parse(format!(
                        "partsAvailability of store #{} is {}, not an object",
                        index,
                        json_kind(other)
                    )));
                }
            };

            let available = parts
                .get(part_number)
                .and_then(|descriptor| descriptor.get("pickupDisplay"))
                .and_then(Value::as_str)
                == Some(PICKUP_AVAILABLE);

            if available {
                let store_name = store
                    .get("storeName")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AppError::parse(format!("store #{} has no storeName", index)))?;
                return Ok(AvailabilityResult::available_at(store_name));
            }
        }

        Ok(AvailabilityResult::unavailable())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
