use chemsearch_storage::{FilterDocument, Record, StoreError};
use serde_json::Value;

/// A single compiled condition on one field.
///
/// A filter document compiles to a list of conditions that must all hold.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCondition {
    /// `{"field": value}` or `{"field": {"$eq": value}}`
    Eq { field: String, value: Value },
    /// `{"field": {"$ne": value}}`
    Ne { field: String, value: Value },
    /// `{"field": [a, b]}` or `{"field": {"$in": [a, b]}}`
    In { field: String, values: Vec<Value> },
    /// `{"field": {"$like": "text"}}`, case-insensitive substring
    Like { field: String, needle: String },
    /// `{"field": {"$gt": n}}`
    Gt { field: String, bound: f64 },
    /// `{"field": {"$gte": n}}`
    Gte { field: String, bound: f64 },
    /// `{"field": {"$lt": n}}`
    Lt { field: String, bound: f64 },
    /// `{"field": {"$lte": n}}`
    Lte { field: String, bound: f64 },
}

/// Compiles a filter document into conditions.
///
/// # Errors
///
/// Returns `StoreError::InvalidFilter` for unknown operators, nested
/// documents, or operands of the wrong type.
pub fn compile_filter(document: &FilterDocument) -> Result<Vec<FieldCondition>, StoreError> {
    let mut conditions = Vec::with_capacity(document.len());
    for (field, predicate) in document {
        match predicate {
            Value::Object(ops) => {
                if ops.is_empty() {
                    return Err(StoreError::invalid_filter(format!(
                        "empty predicate for field '{field}'"
                    )));
                }
                for (op, operand) in ops {
                    conditions.push(compile_operator(field, op, operand)?);
                }
            }
            Value::Array(values) => conditions.push(FieldCondition::In {
                field: field.clone(),
                values: values.clone(),
            }),
            scalar => conditions.push(FieldCondition::Eq {
                field: field.clone(),
                value: scalar.clone(),
            }),
        }
    }
    Ok(conditions)
}

fn compile_operator(field: &str, op: &str, operand: &Value) -> Result<FieldCondition, StoreError> {
    let field = field.to_string();
    let condition = match op {
        "$eq" => FieldCondition::Eq {
            field,
            value: operand.clone(),
        },
        "$ne" => FieldCondition::Ne {
            field,
            value: operand.clone(),
        },
        "$in" => match operand {
            Value::Array(values) => FieldCondition::In {
                field,
                values: values.clone(),
            },
            _ => {
                return Err(StoreError::invalid_filter(format!(
                    "$in on '{field}' expects an array"
                )));
            }
        },
        "$like" => match operand {
            Value::String(s) => FieldCondition::Like {
                field,
                needle: s.to_lowercase(),
            },
            _ => {
                return Err(StoreError::invalid_filter(format!(
                    "$like on '{field}' expects a string"
                )));
            }
        },
        "$gt" | "$gte" | "$lt" | "$lte" => {
            let bound = number_operand(operand).ok_or_else(|| {
                StoreError::invalid_filter(format!("{op} on '{field}' expects a number"))
            })?;
            match op {
                "$gt" => FieldCondition::Gt { field, bound },
                "$gte" => FieldCondition::Gte { field, bound },
                "$lt" => FieldCondition::Lt { field, bound },
                _ => FieldCondition::Lte { field, bound },
            }
        }
        other if other.starts_with('$') => {
            return Err(StoreError::invalid_filter(format!(
                "unsupported operator {other}"
            )));
        }
        _ => {
            return Err(StoreError::invalid_filter(format!(
                "nested documents are not supported (field '{field}')"
            )));
        }
    };
    Ok(condition)
}

fn number_operand(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.to_string() == *s
        }
        _ => false,
    }
}

impl FieldCondition {
    /// Check if a record satisfies this condition.
    ///
    /// A missing field reads as `null`.
    pub fn matches(&self, record: &Record) -> bool {
        let get = |field: &str| record.get(field).unwrap_or(&Value::Null);
        match self {
            FieldCondition::Eq { field, value } => loosely_equal(get(field), value),
            FieldCondition::Ne { field, value } => !loosely_equal(get(field), value),
            FieldCondition::In { field, values } => {
                let actual = get(field);
                values.iter().any(|v| loosely_equal(actual, v))
            }
            FieldCondition::Like { field, needle } => match get(field) {
                Value::String(s) => s.to_lowercase().contains(needle),
                Value::Number(n) => n.to_string().contains(needle),
                _ => false,
            },
            FieldCondition::Gt { field, bound } => {
                number_operand(get(field)).is_some_and(|n| n > *bound)
            }
            FieldCondition::Gte { field, bound } => {
                number_operand(get(field)).is_some_and(|n| n >= *bound)
            }
            FieldCondition::Lt { field, bound } => {
                number_operand(get(field)).is_some_and(|n| n < *bound)
            }
            FieldCondition::Lte { field, bound } => {
                number_operand(get(field)).is_some_and(|n| n <= *bound)
            }
        }
    }
}

/// Case-insensitive substring match of `text` against the listed fields.
///
/// An empty field list searches every field of the record.
pub fn matches_text(record: &Record, text: &str, fields: &[String]) -> bool {
    let needle = text.to_lowercase();
    let contains = |value: &Value| match value {
        Value::String(s) => s.to_lowercase().contains(&needle),
        Value::Number(n) => n.to_string().contains(&needle),
        _ => false,
    };
    if fields.is_empty() {
        record.values().any(contains)
    } else {
        fields
            .iter()
            .filter_map(|f| record.get(f))
            .any(contains)
    }
}
