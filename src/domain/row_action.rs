//! Declarative row actions.
//!
//! A list declares its actions once; the executor evaluates them per row.

use std::fmt::{Debug, Formatter};
use std::hash::Hash;

use serde::Serialize;

use crate::repository::{MutationCapability, MutationOutcome, MutationTicket};

/// Gives every row a stable identity so that in-flight actions can be
/// tracked per row.
pub trait ListRow {
    type Key: Clone + Eq + Hash + Debug;

    fn row_key(&self) -> Self::Key;
}

/// Position of an action inside its list configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ActionId(pub usize);

pub type RowPredicate<T> = Box<dyn Fn(&T) -> bool>;

/// Whether an action appears in a row's menu at all.
pub enum Visibility<T> {
    Always,
    When(RowPredicate<T>),
}

impl<T> Visibility<T> {
    pub fn evaluate(&self, row: &T) -> bool {
        match self {
            Visibility::Always => true,
            Visibility::When(predicate) => predicate(row),
        }
    }
}

/// Whether a visible action is inert.
pub enum Disabled<T> {
    Never,
    Always,
    When(RowPredicate<T>),
}

impl<T> Disabled<T> {
    pub fn evaluate(&self, row: &T) -> bool {
        match self {
            Disabled::Never => false,
            Disabled::Always => true,
            Disabled::When(predicate) => predicate(row),
        }
    }
}

/// Texts of the confirmation prompt guarding an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfirmPrompt {
    pub title: String,
    pub content: String,
    pub confirm_text: String,
    pub cancel_text: String,
}

impl ConfirmPrompt {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            confirm_text: "Confirm".to_string(),
            cancel_text: "Cancel".to_string(),
        }
    }

    #[must_use]
    pub fn labels(mut self, confirm_text: impl Into<String>, cancel_text: impl Into<String>) -> Self {
        self.confirm_text = confirm_text.into();
        self.cancel_text = cancel_text.into();
        self
    }
}

/// Mutation bound to a row-to-variables mapper, with the variables type
/// erased so actions of one list can share a vector.
pub struct MutationBinding<T> {
    dispatch: Box<dyn Fn(&T, MutationTicket) -> MutationOutcome>,
}

impl<T> MutationBinding<T> {
    pub fn new<M, F>(mutation: M, variables: F) -> Self
    where
        M: MutationCapability + 'static,
        F: Fn(&T) -> M::Variables + 'static,
    {
        Self {
            dispatch: Box::new(move |row, ticket| mutation.mutate(ticket, variables(row))),
        }
    }

    pub fn dispatch(&self, row: &T, ticket: MutationTicket) -> MutationOutcome {
        (self.dispatch)(row, ticket)
    }
}

/// What running an action does.
pub enum ActionKind<T> {
    /// Neither a callback nor a mutation was declared.
    Noop,
    Callback(Box<dyn Fn(&T)>),
    Mutation(MutationBinding<T>),
}

/// Declaration of one row action.
pub struct RowActionDescriptor<T> {
    pub label: String,
    pub icon: String,
    pub color: Option<String>,
    pub kind: ActionKind<T>,
    pub confirm: Option<ConfirmPrompt>,
    pub visible: Visibility<T>,
    pub disabled: Disabled<T>,
    /// Tera template rendered with the row under `row`.
    pub success_message: Option<String>,
    /// Tera template rendered with the row under `row`.
    pub error_message: Option<String>,
}

impl<T: 'static> RowActionDescriptor<T> {
    fn with_kind(label: impl Into<String>, icon: impl Into<String>, kind: ActionKind<T>) -> Self {
        Self {
            label: label.into(),
            icon: icon.into(),
            color: None,
            kind,
            confirm: None,
            visible: Visibility::Always,
            disabled: Disabled::Never,
            success_message: None,
            error_message: None,
        }
    }

    pub fn noop(label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self::with_kind(label, icon, ActionKind::Noop)
    }

    pub fn callback<F>(label: impl Into<String>, icon: impl Into<String>, on_click: F) -> Self
    where
        F: Fn(&T) + 'static,
    {
        Self::with_kind(label, icon, ActionKind::Callback(Box::new(on_click)))
    }

    pub fn mutation<M, F>(
        label: impl Into<String>,
        icon: impl Into<String>,
        mutation: M,
        variables: F,
    ) -> Self
    where
        M: MutationCapability + 'static,
        F: Fn(&T) -> M::Variables + 'static,
    {
        Self::with_kind(
            label,
            icon,
            ActionKind::Mutation(MutationBinding::new(mutation, variables)),
        )
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn confirm(mut self, prompt: ConfirmPrompt) -> Self {
        self.confirm = Some(prompt);
        self
    }

    #[must_use]
    pub fn visible_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.visible = Visibility::When(Box::new(predicate));
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = if disabled {
            Disabled::Always
        } else {
            Disabled::Never
        };
        self
    }

    #[must_use]
    pub fn disabled_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.disabled = Disabled::When(Box::new(predicate));
        self
    }

    #[must_use]
    pub fn success_message(mut self, template: impl Into<String>) -> Self {
        self.success_message = Some(template.into());
        self
    }

    #[must_use]
    pub fn error_message(mut self, template: impl Into<String>) -> Self {
        self.error_message = Some(template.into());
        self
    }
}

impl<T> Debug for RowActionDescriptor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ActionKind::Noop => "noop",
            ActionKind::Callback(_) => "callback",
            ActionKind::Mutation(_) => "mutation",
        };
        f.debug_struct("RowActionDescriptor")
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("kind", &kind)
            .field("confirm", &self.confirm)
            .finish_non_exhaustive()
    }
}
