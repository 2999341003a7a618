//! DTO modules that bridge list services with templates.

pub mod actions;
pub mod list;
