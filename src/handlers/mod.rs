//! HTTP handlers for model views and the admin root.

pub mod action;
pub mod ajax;
pub mod dashboard;
pub mod export;
pub mod form;
pub mod list;
