//! List services: controller, query binding and row-action execution.

pub mod errors;
pub mod list_controller;
pub mod list_screen;
pub mod query_binding;
pub mod row_actions;
pub mod surfaces;

pub use errors::{ControllerError, ControllerResult};
