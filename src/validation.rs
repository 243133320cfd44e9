//! Submitted-row validation from per-column rules.

use crate::config::ValidationRule;
use crate::error::AppError;
use crate::model::Row;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a full row. Required columns must hold a non-null value.
    pub fn validate(row: &Row, rules: &HashMap<String, ValidationRule>) -> Result<(), AppError> {
        first_error(Self::errors(row, rules))
    }

    /// Validate only the columns present in `row` (inline edits). Required is not enforced for absent columns.
    pub fn validate_partial(row: &Row, rules: &HashMap<String, ValidationRule>) -> Result<(), AppError> {
        first_error(Self::partial_errors(row, rules))
    }

    /// Every failing column with its message, in row order.
    pub fn errors(row: &Row, rules: &HashMap<String, ValidationRule>) -> Vec<(String, String)> {
        let mut out = Self::partial_errors(row, rules);
        let mut missing: Vec<&String> = rules
            .iter()
            .filter(|(col, rule)| rule.required == Some(true) && row.get(*col).map_or(true, Value::is_null))
            .map(|(col, _)| col)
            .collect();
        missing.sort();
        for col in missing {
            if !out.iter().any(|(c, _)| c == col) {
                out.push((col.clone(), format!("{} is required", col)));
            }
        }
        out
    }

    fn partial_errors(row: &Row, rules: &HashMap<String, ValidationRule>) -> Vec<(String, String)> {
        row.iter()
            .filter_map(|(col, v)| {
                let rule = rules.get(col)?;
                validate_field(col, v, rule).err().map(|msg| (col.clone(), msg))
            })
            .collect()
    }
}

fn first_error(errors: Vec<(String, String)>) -> Result<(), AppError> {
    match errors.into_iter().next() {
        Some((_, msg)) => Err(AppError::Validation(msg)),
        None => Ok(()),
    }
}

fn validate_field(col: &str, v: &Value, rule: &ValidationRule) -> Result<(), String> {
    if v.is_null() {
        return Ok(());
    }
    if let Some(format) = &rule.format {
        validate_format(col, v, format)?;
    }
    if let Some(s) = v.as_str() {
        let len = s.chars().count();
        if let Some(max) = rule.max_length {
            if len > max as usize {
                return Err(format!("{} must be at most {} characters", col, max));
            }
        }
        if let Some(min) = rule.min_length {
            if len < min as usize {
                return Err(format!("{} must be at least {} characters", col, min));
            }
        }
        if let Some(pattern) = &rule.pattern {
            let re = Regex::new(pattern).map_err(|_| format!("invalid pattern for {}", col))?;
            if !re.is_match(s) {
                return Err(format!("{} does not match required pattern", col));
            }
        }
    }
    if let Some(allowed) = &rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            return Err(format!(
                "{} must be one of: {}",
                col,
                allowed.iter().take(5).map(Value::to_string).collect::<Vec<_>>().join(", ")
            ));
        }
    }
    if let Some(n) = v.as_f64() {
        if let Some(min) = rule.minimum {
            if n < min {
                return Err(format!("{} must be at least {}", col, min));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                return Err(format!("{} must be at most {}", col, max));
            }
        }
    }
    Ok(())
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn validate_format(col: &str, v: &Value, format: &str) -> Result<(), String> {
    let Some(s) = v.as_str() else {
        return Ok(());
    };
    match format.to_lowercase().as_str() {
        "email" => {
            if !s.contains('@') || s.len() < 3 {
                return Err(format!("{} must be a valid email", col));
            }
        }
        "uuid" => {
            if uuid::Uuid::parse_str(s).is_err() {
                return Err(format!("{} must be a valid UUID", col));
            }
        }
        _ => {}
    }
    Ok(())
}
