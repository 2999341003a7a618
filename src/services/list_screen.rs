//! One list screen: a controller, its row actions and the registry they
//! share.
//!
//! The executor is built on the controller's registry handle, so a
//! successful mutation invalidates the list's entity and the screen's next
//! `sync` refetches the current page exactly once.

use std::rc::Rc;

use serde::Serialize;

use crate::domain::page::PageResult;
use crate::domain::row_action::{ActionId, ListRow, RowActionDescriptor};
use crate::dto::list::{FilterView, ListView, RowView};
use crate::forms::FormError;
use crate::forms::list::encode_state;
use crate::pagination::PageStrip;
use crate::repository::errors::{MutationResult, QueryResult};
use crate::repository::{FetchTicket, MutationTicket, QueryCapability};
use crate::services::list_controller::ListController;
use crate::services::query_binding::Resolution;
use crate::services::row_actions::{ActionOutcome, IgnoreReason, RowActionExecutor};
use crate::services::surfaces::{ConfirmationSurface, FeedbackChannel};

pub struct ListScreen<Q>
where
    Q: QueryCapability,
    Q::Row: ListRow,
{
    controller: ListController<Q>,
    executor: RowActionExecutor<Q::Row>,
}

impl<Q> ListScreen<Q>
where
    Q: QueryCapability,
    Q::Row: ListRow + Clone + Serialize,
{
    pub fn new(
        controller: ListController<Q>,
        actions: Vec<RowActionDescriptor<Q::Row>>,
        feedback: Rc<dyn FeedbackChannel>,
        confirmation: Rc<dyn ConfirmationSurface>,
    ) -> Self {
        let executor = RowActionExecutor::new(
            controller.entity().clone(),
            actions,
            feedback,
            confirmation,
            controller.binding().registry().clone(),
        );
        Self {
            controller,
            executor,
        }
    }

    pub fn controller(&self) -> &ListController<Q> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ListController<Q> {
        &mut self.controller
    }

    pub fn executor(&self) -> &RowActionExecutor<Q::Row> {
        &self.executor
    }

    /// Triggers an action on a row of the current page.
    pub fn invoke(
        &mut self,
        key: &<Q::Row as ListRow>::Key,
        action: ActionId,
    ) -> ActionOutcome {
        let Some(row) = self
            .controller
            .rows()
            .iter()
            .find(|row| row.row_key() == *key)
            .cloned()
        else {
            log::warn!("No row {key:?} on the current page of {}", self.controller.entity());
            return ActionOutcome::Ignored(IgnoreReason::UnknownRow);
        };
        let outcome = self.executor.invoke(&row, action);
        self.controller.sync();
        outcome
    }

    pub fn confirm(&mut self) -> ActionOutcome {
        let outcome = self.executor.confirm();
        self.controller.sync();
        outcome
    }

    pub fn cancel(&mut self) -> ActionOutcome {
        self.executor.cancel()
    }

    /// Delivers the result of a pending mutation.
    pub fn resolve_mutation(
        &mut self,
        ticket: MutationTicket,
        result: MutationResult<()>,
    ) -> ActionOutcome {
        let outcome = self.executor.resolve(ticket, result);
        self.controller.sync();
        outcome
    }

    /// Delivers the result of a pending fetch.
    pub fn resolve_fetch(
        &mut self,
        ticket: FetchTicket,
        result: QueryResult<PageResult<Q::Row>>,
    ) -> Resolution {
        self.controller.resolve(ticket, result)
    }

    /// Committed state as a URL query string.
    pub fn query_string(&self) -> Result<String, FormError> {
        encode_state(self.controller.state(), &self.controller.settings().search_key)
    }

    pub fn view(&self) -> ListView<'_, Q::Row> {
        let controller = &self.controller;
        let settings = controller.settings();
        let state = controller.state();
        let (total_elements, total_pages) = controller
            .data()
            .map(|page| (page.total_elements, page.total_pages))
            .unwrap_or_default();

        ListView {
            rows: controller
                .rows()
                .iter()
                .map(|row| RowView {
                    row,
                    actions: self.executor.actions_for(row),
                })
                .collect(),
            total_elements,
            strip: PageStrip::new(state.page(), total_pages, &settings.page_strip),
            page_size: state.size().get(),
            page_sizes: &settings.page_sizes,
            search_input: controller.search_input(),
            filters: controller
                .filters()
                .iter()
                .map(|filter| FilterView::new(filter, state.filter(&filter.name)))
                .collect(),
            params: controller.params(),
            is_loading: controller.is_loading(),
            is_error: controller.is_error(),
            error: controller.error().map(ToString::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::domain::row_action::ConfirmPrompt;
    use crate::domain::types::EntityName;
    use crate::repository::errors::RemoteError;
    use crate::repository::memory::{DeferredMutation, InMemoryQuery};
    use crate::repository::mock::{MockConfirmation, MockNotifier};
    use crate::services::surfaces::{Feedback, LogFeedback};

    #[derive(Clone, Debug, PartialEq, Serialize)]
    struct Member {
        id: u32,
        name: String,
        status: String,
    }

    impl ListRow for Member {
        type Key = u32;

        fn row_key(&self) -> u32 {
            self.id
        }
    }

    fn members() -> Vec<Member> {
        (1..=12)
            .map(|id| Member {
                id,
                name: format!("Member {id}"),
                status: "ACTIVE".to_string(),
            })
            .collect()
    }

    fn query() -> Rc<InMemoryQuery<Member>> {
        Rc::new(InMemoryQuery::new(
            members(),
            |row: &Member, term: &str| row.name.to_lowercase().contains(term),
            |row: &Member, field: &str| match field {
                "status" => Some(row.status.clone()),
                _ => None,
            },
        ))
    }

    fn controller(query: Rc<InMemoryQuery<Member>>) -> ListController<Rc<InMemoryQuery<Member>>> {
        ListController::builder(EntityName::new("members").unwrap(), query)
            .build()
            .unwrap()
    }

    #[test]
    fn view_lists_rows_with_their_actions() {
        let screen = ListScreen::new(
            controller(query()),
            vec![
                RowActionDescriptor::noop("Open", "eye"),
                RowActionDescriptor::noop("Reactivate", "undo")
                    .visible_when(|row: &Member| row.status == "BLOCKED"),
            ],
            Rc::new(LogFeedback),
            Rc::new(MockConfirmation::new()),
        );

        let view = screen.view();

        assert_eq!(view.rows.len(), 10);
        assert_eq!(view.total_elements, 12);
        assert_eq!(view.strip.pages, vec![Some(1), Some(2)]);
        assert_eq!(view.rows[0].actions.len(), 1);
        assert!(!view.is_loading);
    }

    #[test]
    fn pending_mutation_refetches_once_it_succeeds() {
        let query = query();
        let mutation = Rc::new(DeferredMutation::new());
        let target = query.clone();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|feedback| *feedback == Feedback::success("Member 3 blocked"))
            .times(1)
            .return_const(());
        let mut screen = ListScreen::new(
            controller(query.clone()),
            vec![
                RowActionDescriptor::mutation("Block", "lock", mutation.clone(), |row: &Member| {
                    json!({"id": row.id})
                })
                .success_message("{{ row.name }} blocked"),
            ],
            Rc::new(notifier),
            Rc::new(MockConfirmation::new()),
        );

        let ticket = match screen.invoke(&3, ActionId(0)) {
            ActionOutcome::Running(ticket) => ticket,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(query.request_count(), 1);

        target.update_rows(|rows| rows[2].status = "BLOCKED".to_string());
        assert_eq!(screen.resolve_mutation(ticket, Ok(())), ActionOutcome::Succeeded);

        assert_eq!(query.request_count(), 2);
        assert_eq!(screen.controller().rows()[2].status, "BLOCKED");
        assert!(screen.controller_mut().sync().is_none());
    }

    #[test]
    fn failed_mutation_does_not_refetch() {
        let query = query();
        let mutation = Rc::new(DeferredMutation::<serde_json::Value>::new());
        let mut screen = ListScreen::new(
            controller(query.clone()),
            vec![RowActionDescriptor::mutation(
                "Block",
                "lock",
                mutation,
                |row: &Member| json!(row.id),
            )],
            Rc::new(LogFeedback),
            Rc::new(MockConfirmation::new()),
        );

        let ActionOutcome::Running(ticket) = screen.invoke(&1, ActionId(0)) else {
            panic!("mutation should be pending");
        };
        screen.resolve_mutation(ticket, Err(RemoteError::NotFound));

        assert_eq!(query.request_count(), 1);
    }

    #[test]
    fn unknown_row_is_ignored() {
        let mut screen = ListScreen::new(
            controller(query()),
            vec![RowActionDescriptor::noop("Open", "eye")],
            Rc::new(LogFeedback),
            Rc::new(MockConfirmation::new()),
        );

        assert_eq!(
            screen.invoke(&11, ActionId(0)),
            ActionOutcome::Ignored(IgnoreReason::UnknownRow)
        );
    }

    #[test]
    fn cancelled_prompt_never_reaches_the_callback() {
        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();
        let mut dialog = MockConfirmation::new();
        dialog.expect_open().times(1).return_const(());
        dialog.expect_close().times(1).return_const(());
        let mut screen = ListScreen::new(
            controller(query()),
            vec![
                RowActionDescriptor::callback("Archive", "box", move |_: &Member| {
                    *sink.borrow_mut() += 1
                })
                .confirm(ConfirmPrompt::new("Archive member", "Archived members are hidden.")),
            ],
            Rc::new(LogFeedback),
            Rc::new(dialog),
        );

        assert_eq!(
            screen.invoke(&2, ActionId(0)),
            ActionOutcome::AwaitingConfirmation
        );
        assert_eq!(screen.cancel(), ActionOutcome::Cancelled);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn query_string_reflects_committed_state() {
        let mut screen = ListScreen::new(
            controller(query()),
            Vec::new(),
            Rc::new(LogFeedback),
            Rc::new(MockConfirmation::new()),
        );
        screen.controller_mut().set_size(20).unwrap();

        assert_eq!(screen.query_string().unwrap(), "page=0&size=20");
    }
}
