//! Row action menu entries.

use serde::Serialize;

use crate::domain::row_action::ActionId;

/// One entry of a row's action menu as the template sees it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderedAction {
    pub id: ActionId,
    pub label: String,
    pub icon: String,
    pub color: Option<String>,
    /// `false` for declared-disabled and busy actions.
    pub enabled: bool,
    /// A mutation for this row is awaiting confirmation or in flight.
    pub busy: bool,
    pub needs_confirmation: bool,
}
