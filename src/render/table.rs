//! Tabular view of JSON bodies

use serde_json::Value;

/// Column name used when rows are scalars
pub const VALUE_COLUMN: &str = "value";
const KEY_COLUMN: &str = "key";

/// A JSON document flattened into rows and columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl JsonTable {
    /// Build a table from a JSON body. Returns None when the body is not JSON.
    pub fn from_text(text: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Some(Self::from_value(&value)),
            Err(e) => {
                tracing::debug!("Table view needs JSON: {}", e);
                None
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
                Self::from_records(items)
            }
            Value::Array(items) => Self {
                columns: vec![VALUE_COLUMN.to_string()],
                rows: items.iter().map(|item| vec![cell(item)]).collect(),
            },
            Value::Object(map) => Self {
                columns: vec![KEY_COLUMN.to_string(), VALUE_COLUMN.to_string()],
                rows: map.iter().map(|(k, v)| vec![k.clone(), cell(v)]).collect(),
            },
            scalar => Self {
                columns: vec![VALUE_COLUMN.to_string()],
                rows: vec![vec![cell(scalar)]],
            },
        }
    }

    /// One row per object, columns in first-seen key order
    fn from_records(items: &[Value]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for item in items {
            if let Value::Object(map) = item {
                for key in map.keys() {
                    if !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }
        }

        let rows = items
            .iter()
            .map(|item| {
                columns
                    .iter()
                    .map(|column| item.get(column).map(cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Widest cell per column, header included
    pub fn column_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(column.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}
