//! Type-tagged item to flat row conversion

use serde_json::{Map, Number, Value};

use crate::error::MalformedItemError;
use crate::model::{CellValue, RawItem, Row};

/// Convert one raw store item into a [`Row`].
///
/// Keys are trimmed. Scalars keep their type; maps, lists, and sets are
/// collapsed to compact JSON with sorted object keys.
pub fn normalize_item(item: &RawItem) -> Result<Row, MalformedItemError> {
    let mut row = Row::new();
    for (name, tagged) in item.iter() {
        let cell = normalize_attribute(name, tagged)?;
        row.insert(name.trim(), cell);
    }
    Ok(row)
}

fn normalize_attribute(attribute: &str, tagged: &Value) -> Result<CellValue, MalformedItemError> {
    let (tag, payload) = split_tag(attribute, tagged)?;
    let bad = || MalformedItemError::BadPayload {
        attribute: attribute.to_string(),
        tag: tag.to_string(),
    };

    match tag {
        "S" | "B" => payload.as_str().map(CellValue::from).ok_or_else(bad),
        "N" => payload.as_str().map(number_cell).ok_or_else(bad),
        "BOOL" => payload.as_bool().map(CellValue::Bool).ok_or_else(bad),
        "NULL" => Ok(CellValue::Null),
        "M" | "L" | "SS" | "NS" | "BS" => {
            let plain = unmarshall(attribute, tagged)?;
            Ok(CellValue::String(plain.to_string()))
        }
        other => Err(MalformedItemError::UnknownTag {
            attribute: attribute.to_string(),
            tag: other.to_string(),
        }),
    }
}

fn split_tag<'a>(attribute: &str, tagged: &'a Value) -> Result<(&'a str, &'a Value), MalformedItemError> {
    match tagged {
        Value::Object(obj) if obj.len() == 1 => {
            let (tag, payload) = obj.iter().next().ok_or_else(|| MalformedItemError::NotTagged {
                attribute: attribute.to_string(),
            })?;
            Ok((tag.as_str(), payload))
        }
        _ => Err(MalformedItemError::NotTagged {
            attribute: attribute.to_string(),
        }),
    }
}

fn number_cell(text: &str) -> CellValue {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => CellValue::Float(f),
        _ => CellValue::String(text.to_string()),
    }
}

fn number_value(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}

/// Strip type tags recursively, yielding plain JSON
fn unmarshall(attribute: &str, tagged: &Value) -> Result<Value, MalformedItemError> {
    let (tag, payload) = split_tag(attribute, tagged)?;
    let bad = || MalformedItemError::BadPayload {
        attribute: attribute.to_string(),
        tag: tag.to_string(),
    };

    let value = match tag {
        "S" | "B" => Value::String(payload.as_str().ok_or_else(bad)?.to_string()),
        "N" => number_value(payload.as_str().ok_or_else(bad)?),
        "BOOL" => Value::Bool(payload.as_bool().ok_or_else(bad)?),
        "NULL" => Value::Null,
        "M" => {
            // Insert in key order so the text is canonical whether or not
            // serde_json keeps insertion order
            let mut entries: Vec<_> = payload.as_object().ok_or_else(bad)?.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            let mut map = Map::new();
            for (key, nested) in entries {
                map.insert(key.clone(), unmarshall(attribute, nested)?);
            }
            Value::Object(map)
        }
        "L" => {
            let items = payload.as_array().ok_or_else(bad)?;
            Value::Array(
                items
                    .iter()
                    .map(|nested| unmarshall(attribute, nested))
                    .collect::<Result<_, _>>()?,
            )
        }
        "SS" | "BS" | "NS" => {
            let items = payload.as_array().ok_or_else(bad)?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let text = item.as_str().ok_or_else(bad)?;
                out.push(if tag == "NS" {
                    number_value(text)
                } else {
                    Value::String(text.to_string())
                });
            }
            Value::Array(out)
        }
        other => {
            return Err(MalformedItemError::UnknownTag {
                attribute: attribute.to_string(),
                tag: other.to_string(),
            })
        }
    };
    Ok(value)
}
