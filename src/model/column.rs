//! Column descriptors derived from record field metadata.

use crate::case::{to_label, to_snake_case};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Type tag of a column. Drives value parsing from form/query strings, zero values and SQL casts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Bool,
    Integer,
    Float,
    Text,
    Uuid,
    Date,
    DateTime,
    Json,
}

impl ColumnType {
    /// Value a non-nullable column holds when the record does not provide one.
    pub fn zero_value(&self) -> Value {
        match self {
            ColumnType::Bool => Value::Bool(false),
            ColumnType::Integer => Value::Number(0.into()),
            ColumnType::Float => serde_json::Number::from_f64(0.0)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ColumnType::Text | ColumnType::Uuid | ColumnType::Date | ColumnType::DateTime => {
                Value::String(String::new())
            }
            ColumnType::Json => Value::Null,
        }
    }

    /// Parse a submitted string into a JSON value of this type.
    pub fn parse_value(&self, s: &str) -> Result<Value, String> {
        let trimmed = s.trim();
        match self {
            ColumnType::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" | "y" => Ok(Value::Bool(true)),
                "" | "0" | "false" | "off" | "no" | "n" => Ok(Value::Bool(false)),
                _ => Err(format!("'{}' is not a boolean", s)),
            },
            ColumnType::Integer => trimmed
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .map_err(|_| format!("'{}' is not an integer", s)),
            ColumnType::Float => trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("'{}' is not a number", s)),
            ColumnType::Uuid => uuid::Uuid::parse_str(trimmed)
                .map(|u| Value::String(u.to_string()))
                .map_err(|_| format!("'{}' is not a valid UUID", s)),
            ColumnType::Date => chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .map_err(|_| format!("'{}' is not a date (YYYY-MM-DD)", s)),
            ColumnType::DateTime => parse_datetime(trimmed)
                .ok_or_else(|| format!("'{}' is not a date-time", s)),
            ColumnType::Json => serde_json::from_str(s).map_err(|e| format!("invalid JSON: {}", e)),
            ColumnType::Text => Ok(Value::String(s.to_string())),
        }
    }

    /// PostgreSQL type parameters of this column are cast to. Values are always bound as text.
    pub fn pg_cast(&self) -> &'static str {
        match self {
            ColumnType::Bool => "boolean",
            ColumnType::Integer => "bigint",
            ColumnType::Float => "double precision",
            ColumnType::Text => "text",
            ColumnType::Uuid => "uuid",
            ColumnType::Date => "date",
            ColumnType::DateTime => "timestamptz",
            ColumnType::Json => "jsonb",
        }
    }
}

fn parse_datetime(s: &str) -> Option<Value> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(Value::String(dt.with_timezone(&chrono::Utc).to_rfc3339()));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|d| Value::String(d.and_utc().to_rfc3339()))
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnType::Bool => "bool",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::Uuid => "uuid",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Json => "json",
        };
        f.write_str(s)
    }
}

/// One allowed value of a choice column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub value: Value,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Choice {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Field metadata as reported by a record's introspection (`Record::describe_columns`).
#[derive(Clone, Debug)]
pub struct FieldSchema {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    /// Association field (foreign-key list, nested record). Not sortable by default.
    pub relationship: bool,
    /// Storage column override; default is the snake_case field name.
    pub column_name: Option<String>,
    pub label: Option<String>,
    pub choices: Option<Vec<Choice>>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        FieldSchema {
            name: name.into(),
            column_type,
            nullable: false,
            primary_key: false,
            relationship: false,
            column_name: None,
            label: None,
            choices: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn relationship(mut self) -> Self {
        self.relationship = true;
        self
    }

    pub fn column(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = Some(choices);
        self
    }
}

/// Admin column: one persisted field of a model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    pub field_name: String,
    pub storage_name: String,
    pub label: String,
    pub type_tag: ColumnType,
    pub required: bool,
    pub is_primary_key: bool,
    pub is_relationship: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
}

impl From<FieldSchema> for Column {
    fn from(field: FieldSchema) -> Self {
        let storage_name = field
            .column_name
            .unwrap_or_else(|| to_snake_case(&field.name));
        let label = field.label.unwrap_or_else(|| to_label(&field.name));
        Column {
            storage_name,
            label,
            type_tag: field.column_type,
            required: !field.nullable,
            is_primary_key: field.primary_key,
            is_relationship: field.relationship,
            choices: field.choices,
            field_name: field.name,
        }
    }
}

impl Column {
    /// Value for this column when the record omits it: null if nullable, else the type's zero value.
    pub fn default_value(&self) -> Value {
        if self.required {
            self.type_tag.zero_value()
        } else {
            Value::Null
        }
    }

    /// Parse a submitted string for this column. Empty input on a nullable non-text column is null.
    pub fn parse_value(&self, s: &str) -> Result<Value, String> {
        if s.trim().is_empty() && !self.required && self.type_tag != ColumnType::Text {
            return Ok(Value::Null);
        }
        let value = self.type_tag.parse_value(s)?;
        if let Some(choices) = &self.choices {
            if !choices.iter().any(|c| choice_matches(&c.value, &value)) {
                return Err(format!("'{}' is not a valid choice for {}", s, self.label));
            }
        }
        Ok(value)
    }
}

fn choice_matches(choice: &Value, value: &Value) -> bool {
    match (choice, value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => choice == value,
    }
}
