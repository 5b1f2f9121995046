//! Typed access to a resource's JSON state.
//!
//! Blocks are JSON arrays of objects; a block with `max_items = 1` is read
//! with [`BlockView::head`]. Empty strings and empty lists count as unset,
//! matching how the API treats them.

use serde_json::{Map, Value};

use crate::schema::{AttributeType, Block, BlockNestingMode, Schema};

/// Read-only view over one JSON object of the state.
#[derive(Debug, Clone, Copy)]
pub struct BlockView<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> BlockView<'a> {
    /// View over `value` if it is an object; an empty view otherwise.
    pub fn new(value: &'a Value) -> Self {
        Self {
            fields: value.as_object(),
        }
    }

    /// Raw value of `key`, `None` when absent or null.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields?.get(key).filter(|v| !v.is_null())
    }

    /// Non-empty string value of `key`.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// String value of `key`, kept even when empty.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_string)
    }

    /// Boolean value of `key`. `false` is returned as `Some(false)`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Integer value of `key`.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Non-empty list of strings under `key`.
    pub fn get_str_list(&self, key: &str) -> Option<Vec<String>> {
        let list: Vec<String> = self
            .get(key)?
            .as_array()?
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        if list.is_empty() {
            None
        } else {
            Some(list)
        }
    }

    /// Items of the block list `key`.
    pub fn list(&self, key: &str) -> Vec<BlockView<'a>> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().map(BlockView::new).collect())
            .unwrap_or_default()
    }

    /// First item of the block list `key`.
    pub fn head(&self, key: &str) -> Option<BlockView<'a>> {
        let first = self.get(key)?.as_array()?.first()?;
        first.as_object().map(|_| BlockView::new(first))
    }
}

/// State of one resource instance, with the prior state during updates.
#[derive(Debug, Clone)]
pub struct ResourceData {
    state: Value,
    prior: Option<Value>,
    // (prior, state) normalized against the schema for change detection
    normalized: Option<(Value, Value)>,
}

impl ResourceData {
    /// Wrap a planned or current state.
    pub fn new(state: Value) -> Self {
        Self {
            state,
            prior: None,
            normalized: None,
        }
    }

    /// Wrap the planned state of an update together with the prior state.
    pub fn for_update(schema: &Schema, prior: Value, planned: Value) -> Self {
        let normalized = (
            normalize(&schema.block, &prior),
            normalize(&schema.block, &planned),
        );
        Self {
            state: planned,
            prior: Some(prior),
            normalized: Some(normalized),
        }
    }

    /// Resource ID, empty when the state has none.
    pub fn id(&self) -> &str {
        self.state.get("id").and_then(Value::as_str).unwrap_or_default()
    }

    /// Current or planned state.
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Prior state, only set during updates.
    pub fn prior(&self) -> Option<&Value> {
        self.prior.as_ref()
    }

    /// Copy of the state's top-level object, used as the base of a refreshed state.
    pub fn state_map(&self) -> Map<String, Value> {
        self.state.as_object().cloned().unwrap_or_default()
    }

    /// View over the top-level object.
    pub fn view(&self) -> BlockView<'_> {
        BlockView::new(&self.state)
    }

    /// See [`BlockView::get_str`].
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.view().get_str(key)
    }

    /// See [`BlockView::get_bool`].
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.view().get_bool(key)
    }

    /// See [`BlockView::head`].
    pub fn head(&self, key: &str) -> Option<BlockView<'_>> {
        self.view().head(key)
    }

    /// See [`BlockView::list`].
    pub fn list(&self, key: &str) -> Vec<BlockView<'_>> {
        self.view().list(key)
    }

    /// Whether `key` differs between prior and planned state.
    ///
    /// Always `false` outside an update. Set-typed attributes and blocks
    /// compare without regard to order.
    pub fn has_change(&self, key: &str) -> bool {
        match &self.normalized {
            Some((prior, planned)) => prior.get(key) != planned.get(key),
            None => false,
        }
    }

    /// First of `keys` that changed.
    pub fn first_change<'k>(&self, keys: &[&'k str]) -> Option<&'k str> {
        keys.iter().copied().find(|key| self.has_change(key))
    }
}

/// Canonical form of `value` under `block`, used for comparisons.
///
/// Null, empty strings and empty lists are dropped; set-typed values are
/// sorted; keys the schema does not know are kept as they are.
pub fn normalize(block: &Block, value: &Value) -> Value {
    let Some(fields) = value.as_object() else {
        return value.clone();
    };

    let mut out = Map::new();
    for (key, v) in fields {
        let normalized = if let Some(attr) = block.attributes.get(key) {
            normalize_attribute(&attr.attr_type, v)
        } else if let Some(nested) = block.blocks.get(key) {
            normalize_block_list(&nested.block, nested.nesting_mode, v)
        } else {
            Some(v.clone())
        };
        if let Some(n) = normalized {
            out.insert(key.clone(), n);
        }
    }
    Value::Object(out)
}

fn normalize_attribute(attr_type: &AttributeType, value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => {
            let mut items = items.clone();
            if matches!(attr_type, AttributeType::Set(_)) {
                sort_values(&mut items);
            }
            Some(Value::Array(items))
        },
        other => Some(other.clone()),
    }
}

fn normalize_block_list(block: &Block, mode: BlockNestingMode, value: &Value) -> Option<Value> {
    let items = match value {
        Value::Null => return None,
        Value::Array(items) => items,
        other => return Some(other.clone()),
    };

    let mut items: Vec<Value> = items
        .iter()
        .map(|item| normalize(block, item))
        .filter(|item| item.as_object().map(|m| !m.is_empty()).unwrap_or(true))
        .collect();
    if items.is_empty() {
        return None;
    }
    if mode == BlockNestingMode::Set {
        sort_values(&mut items);
        items.dedup();
    }
    Some(Value::Array(items))
}

fn sort_values(items: &mut [Value]) {
    items.sort_by_cached_key(|item| item.to_string());
}

/// `CycleType` -> `cycle_type`, `ExecutionTTL` -> `execution_ttl`,
/// `KRB5Conf` -> `krb5_conf`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() || (prev.is_ascii_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Rename every object key of an API value to snake_case, recursively.
pub fn snake_case_keys(value: &Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (snake_case(k), snake_case_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(snake_case_keys).collect()),
        other => other.clone(),
    }
}

/// Convert an API object (PascalCase keys) into state shaped by `block`.
///
/// Nested objects become one-item block lists, numbers land in string
/// attributes as strings, and fields the schema does not declare are dropped.
pub fn from_api(block: &Block, value: &Value) -> Value {
    let Some(fields) = value.as_object() else {
        return Value::Object(Map::new());
    };

    let mut out = Map::new();
    for (wire_name, v) in fields {
        if v.is_null() {
            continue;
        }
        let name = snake_case(wire_name);
        if let Some(attr) = block.attributes.get(&name) {
            out.insert(name, attribute_from_api(&attr.attr_type, v));
        } else if let Some(nested) = block.blocks.get(&name) {
            let items = match v {
                Value::Array(items) => items.iter().map(|item| from_api(&nested.block, item)).collect(),
                Value::Object(_) => vec![from_api(&nested.block, v)],
                _ => continue,
            };
            out.insert(name, Value::Array(items));
        }
    }
    Value::Object(out)
}

fn attribute_from_api(attr_type: &AttributeType, value: &Value) -> Value {
    match (attr_type, value) {
        (AttributeType::String, Value::Number(n)) => Value::String(n.to_string()),
        (AttributeType::String, Value::Bool(b)) => Value::String(b.to_string()),
        (AttributeType::List(inner) | AttributeType::Set(inner), Value::Array(items)) => {
            Value::Array(items.iter().map(|item| attribute_from_api(inner, item)).collect())
        },
        (AttributeType::Dynamic, v) => snake_case_keys(v),
        (_, v) => v.clone(),
    }
}
