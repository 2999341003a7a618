//! Executes declared row actions.
//!
//! Each (row, action) pair moves through
//! `Idle -> ConfirmPending -> Running -> Idle`, skipping `ConfirmPending` when
//! the action has no prompt. Success or failure is reported as the
//! [`ActionOutcome`] of the call that finished the mutation; the slot itself
//! is back to `Idle` at that point. Only one mutation per pair may be in
//! flight, and only one confirmation dialog may be open at a time.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::row_action::{ActionId, ActionKind, ListRow, RowActionDescriptor};
use crate::domain::types::EntityName;
use crate::dto::actions::RenderedAction;
use crate::repository::errors::{MutationError, MutationResult};
use crate::repository::registry::QueryRegistry;
use crate::repository::{MutationOutcome, MutationTicket};
use crate::services::surfaces::{ConfirmRequest, ConfirmationSurface, Feedback, FeedbackChannel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionPhase {
    Idle,
    ConfirmPending,
    Running,
}

/// Why an invocation had no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownAction,
    /// No row with the given key is on the current page.
    UnknownRow,
    Hidden,
    Disabled,
    /// A mutation for the same row and action is in flight or awaiting
    /// confirmation.
    Busy,
    /// Another confirmation dialog is open.
    DialogOpen,
    NoDialog,
    UnknownTicket,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Ignored(IgnoreReason),
    AwaitingConfirmation,
    Cancelled,
    /// The action declares neither a callback nor a mutation.
    Noop,
    CallbackRun,
    /// The mutation was dispatched and its result is pending.
    Running(MutationTicket),
    Succeeded,
    Failed(MutationError),
}

struct OpenDialog<K> {
    key: K,
    action: ActionId,
    error: Option<String>,
}

struct PendingMutation<T> {
    row: T,
    action: ActionId,
    confirmed: bool,
}

pub struct RowActionExecutor<T: ListRow> {
    entity: EntityName,
    actions: Vec<RowActionDescriptor<T>>,
    feedback: Rc<dyn FeedbackChannel>,
    confirmation: Rc<dyn ConfirmationSurface>,
    registry: QueryRegistry,
    phases: HashMap<(T::Key, ActionId), ActionPhase>,
    dialog: Option<(OpenDialog<T::Key>, T)>,
    pending: HashMap<MutationTicket, PendingMutation<T>>,
    next_ticket: u64,
}

impl<T> RowActionExecutor<T>
where
    T: ListRow + Clone + Serialize,
{
    pub fn new(
        entity: EntityName,
        actions: Vec<RowActionDescriptor<T>>,
        feedback: Rc<dyn FeedbackChannel>,
        confirmation: Rc<dyn ConfirmationSurface>,
        registry: QueryRegistry,
    ) -> Self {
        Self {
            entity,
            actions,
            feedback,
            confirmation,
            registry,
            phases: HashMap::new(),
            dialog: None,
            pending: HashMap::new(),
            next_ticket: 0,
        }
    }

    pub fn actions(&self) -> &[RowActionDescriptor<T>] {
        &self.actions
    }

    pub fn phase(&self, key: &T::Key, action: ActionId) -> ActionPhase {
        self.phases
            .get(&(key.clone(), action))
            .copied()
            .unwrap_or(ActionPhase::Idle)
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }

    /// Error left in the open dialog by the last failed attempt.
    pub fn dialog_error(&self) -> Option<&str> {
        self.dialog
            .as_ref()
            .and_then(|(dialog, _)| dialog.error.as_deref())
    }

    /// Menu entries of one row: hidden actions are omitted, busy ones are
    /// shown disabled.
    pub fn actions_for(&self, row: &T) -> Vec<RenderedAction> {
        let key = row.row_key();
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, action)| action.visible.evaluate(row))
            .map(|(index, action)| {
                let id = ActionId(index);
                let busy = self.phase(&key, id) != ActionPhase::Idle;
                RenderedAction {
                    id,
                    label: action.label.clone(),
                    icon: action.icon.clone(),
                    color: action.color.clone(),
                    enabled: !busy && !action.disabled.evaluate(row),
                    busy,
                    needs_confirmation: action.confirm.is_some(),
                }
            })
            .collect()
    }

    /// Triggers an action on a row.
    pub fn invoke(&mut self, row: &T, action: ActionId) -> ActionOutcome {
        let Some(descriptor) = self.actions.get(action.0) else {
            log::warn!("Unknown action {action:?} on {}", self.entity);
            return ActionOutcome::Ignored(IgnoreReason::UnknownAction);
        };
        if !descriptor.visible.evaluate(row) {
            return ActionOutcome::Ignored(IgnoreReason::Hidden);
        }
        if descriptor.disabled.evaluate(row) {
            return ActionOutcome::Ignored(IgnoreReason::Disabled);
        }
        let key = row.row_key();
        if self.phase(&key, action) != ActionPhase::Idle {
            return ActionOutcome::Ignored(IgnoreReason::Busy);
        }

        let Some(prompt) = descriptor.confirm.as_ref() else {
            return self.run(row, action, false);
        };
        if self.dialog.is_some() {
            return ActionOutcome::Ignored(IgnoreReason::DialogOpen);
        }
        let request = ConfirmRequest {
            title: prompt.title.clone(),
            content: prompt.content.clone(),
            confirm_label: prompt.confirm_text.clone(),
            cancel_label: prompt.cancel_text.clone(),
        };
        self.phases
            .insert((key.clone(), action), ActionPhase::ConfirmPending);
        self.dialog = Some((
            OpenDialog {
                key,
                action,
                error: None,
            },
            row.clone(),
        ));
        self.confirmation.open(request);
        ActionOutcome::AwaitingConfirmation
    }

    /// The user accepted the open dialog. After a failed attempt the dialog
    /// stays open and confirming again retries.
    pub fn confirm(&mut self) -> ActionOutcome {
        let Some((dialog, row)) = self.dialog.as_ref() else {
            return ActionOutcome::Ignored(IgnoreReason::NoDialog);
        };
        if self.phase(&dialog.key, dialog.action) == ActionPhase::Running {
            return ActionOutcome::Ignored(IgnoreReason::Busy);
        }
        let action = dialog.action;
        let row = row.clone();
        self.run(&row, action, true)
    }

    /// The user dismissed the open dialog. A running mutation keeps its
    /// dialog until it completes.
    pub fn cancel(&mut self) -> ActionOutcome {
        let Some((dialog, _)) = self.dialog.as_ref() else {
            return ActionOutcome::Ignored(IgnoreReason::NoDialog);
        };
        let slot = (dialog.key.clone(), dialog.action);
        if self.phases.get(&slot) == Some(&ActionPhase::Running) {
            return ActionOutcome::Ignored(IgnoreReason::Busy);
        }
        self.phases.remove(&slot);
        self.dialog = None;
        self.confirmation.close();
        ActionOutcome::Cancelled
    }

    /// Delivers the result of a pending mutation.
    pub fn resolve(&mut self, ticket: MutationTicket, result: MutationResult<()>) -> ActionOutcome {
        match self.pending.remove(&ticket) {
            Some(pending) => self.complete(pending, result),
            None => {
                log::warn!("Result for unknown mutation {ticket:?} on {}", self.entity);
                ActionOutcome::Ignored(IgnoreReason::UnknownTicket)
            }
        }
    }

    fn run(&mut self, row: &T, action: ActionId, confirmed: bool) -> ActionOutcome {
        let Some(descriptor) = self.actions.get(action.0) else {
            return ActionOutcome::Ignored(IgnoreReason::UnknownAction);
        };
        let key = row.row_key();
        let binding = match &descriptor.kind {
            ActionKind::Noop => {
                log::debug!("Action {:?} on {} does nothing", descriptor.label, self.entity);
                self.phases.remove(&(key, action));
                self.close_dialog(confirmed);
                return ActionOutcome::Noop;
            }
            ActionKind::Callback(on_click) => {
                self.phases.remove(&(key, action));
                on_click(row);
                self.close_dialog(confirmed);
                return ActionOutcome::CallbackRun;
            }
            ActionKind::Mutation(binding) => binding,
        };

        self.next_ticket += 1;
        let ticket = MutationTicket::new(self.next_ticket);
        self.phases.insert((key, action), ActionPhase::Running);
        log::debug!(
            "Dispatching {:?} on {} (mutation {})",
            descriptor.label,
            self.entity,
            ticket.id()
        );

        match binding.dispatch(row, ticket) {
            MutationOutcome::Ready(result) => {
                let pending = PendingMutation {
                    row: row.clone(),
                    action,
                    confirmed,
                };
                self.complete(pending, result)
            }
            MutationOutcome::Pending => {
                self.pending.insert(
                    ticket,
                    PendingMutation {
                        row: row.clone(),
                        action,
                        confirmed,
                    },
                );
                ActionOutcome::Running(ticket)
            }
        }
    }

    fn complete(&mut self, pending: PendingMutation<T>, result: MutationResult<()>) -> ActionOutcome {
        let PendingMutation {
            row,
            action,
            confirmed,
        } = pending;
        self.phases.remove(&(row.row_key(), action));
        let Some(descriptor) = self.actions.get(action.0) else {
            return ActionOutcome::Ignored(IgnoreReason::UnknownAction);
        };

        match result {
            Ok(()) => {
                if let Some(template) = descriptor.success_message.as_deref() {
                    self.feedback
                        .notify(Feedback::success(render_message(template, &row)));
                }
                self.registry.invalidate(&self.entity);
                self.close_dialog(confirmed);
                ActionOutcome::Succeeded
            }
            Err(err) => {
                log::error!("{:?} failed on {}: {err}", descriptor.label, self.entity);
                let message = descriptor
                    .error_message
                    .as_deref()
                    .map(|template| render_message(template, &row))
                    .unwrap_or_else(|| err.to_string());
                if confirmed && let Some((dialog, _)) = self.dialog.as_mut() {
                    dialog.error = Some(message.clone());
                    self.confirmation.show_error(&message);
                }
                self.feedback.notify(Feedback::error(message));
                ActionOutcome::Failed(err)
            }
        }
    }

    fn close_dialog(&mut self, confirmed: bool) {
        if confirmed && self.dialog.take().is_some() {
            self.confirmation.close();
        }
    }
}

/// Renders a feedback template with the row under `row`. A broken template
/// is shown as written.
fn render_message<T: Serialize>(template: &str, row: &T) -> String {
    let mut context = Context::new();
    context.insert("row", row);
    match Tera::one_off(template, &context, true) {
        Ok(message) => message,
        Err(err) => {
            log::warn!("Failed to render message template {template:?}: {err}");
            template.to_string()
        }
    }
}
