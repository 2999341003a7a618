//! Domain types shared by every list screen of the console.

pub mod filter;
pub mod list_state;
pub mod page;
pub mod query_params;
pub mod row_action;
pub mod types;
