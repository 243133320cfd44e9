//! View config validation: every referenced column exists on the model and editable columns make sense.

use crate::config::ModelViewConfig;
use crate::error::ConfigError;
use crate::model::Model;
use regex::Regex;
use std::collections::HashSet;

pub fn validate_view_config(model: &Model, config: &ModelViewConfig) -> Result<(), ConfigError> {
    let column_names: HashSet<&str> = model.columns().iter().map(|c| c.storage_name.as_str()).collect();
    let check = |list: &[String]| -> Result<(), ConfigError> {
        for name in list {
            if !column_names.contains(name.as_str()) {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", model.name(), name),
                });
            }
        }
        Ok(())
    };

    check(&config.column_list)?;
    if let Some(sortable) = &config.column_sortable_list {
        check(sortable)?;
    }
    check(&config.column_editable_list)?;
    check(&config.column_searchable_list)?;
    check(&config.column_export_list)?;
    check(&config.form_columns)?;
    check(&config.column_labels.keys().cloned().collect::<Vec<_>>())?;
    check(&config.validation.keys().cloned().collect::<Vec<_>>())?;

    let visible: HashSet<&str> = if config.column_list.is_empty() {
        model
            .columns_excluding_relationships()
            .into_iter()
            .map(|c| c.storage_name.as_str())
            .collect()
    } else {
        config.column_list.iter().map(String::as_str).collect()
    };
    let pk = model.primary_key().storage_name.as_str();
    for name in &config.column_editable_list {
        if name == pk {
            return Err(ConfigError::Validation(format!(
                "{}: primary key '{}' cannot be edited inline",
                model.name(),
                name
            )));
        }
        if !visible.contains(name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "{}: editable column '{}' is not in the list columns",
                model.name(),
                name
            )));
        }
    }

    for (col, rule) in &config.validation {
        if let Some(pattern) = &rule.pattern {
            Regex::new(pattern).map_err(|e| {
                ConfigError::Validation(format!("{}.{}: invalid pattern: {}", model.name(), col, e))
            })?;
        }
    }

    if config.page_size == 0 {
        return Err(ConfigError::Validation(format!("{}: page_size must be positive", model.name())));
    }
    if let Some(endpoint) = &config.endpoint {
        if endpoint.is_empty() || endpoint.contains('.') {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                reason: "endpoint name must be non-empty and must not contain '.'",
            });
        }
    }
    Ok(())
}
