//! Mock collaborators for isolating the list services in tests.

use mockall::mock;
use serde_json::Value;

use crate::repository::{
    FetchOutcome, FetchRequest, MutationCapability, MutationOutcome, MutationTicket,
    QueryCapability,
};
use crate::services::surfaces::{ConfirmRequest, ConfirmationSurface, Feedback, FeedbackChannel};

mock! {
    pub Query {}

    impl QueryCapability for Query {
        type Row = Value;

        fn fetch(&self, request: FetchRequest) -> FetchOutcome<Value>;
    }
}

mock! {
    pub Mutation {}

    impl MutationCapability for Mutation {
        type Variables = Value;

        fn mutate(&self, ticket: MutationTicket, variables: Value) -> MutationOutcome;
    }
}

mock! {
    pub Notifier {}

    impl FeedbackChannel for Notifier {
        fn notify(&self, feedback: Feedback);
    }
}

mock! {
    pub Confirmation {}

    impl ConfirmationSurface for Confirmation {
        fn open(&self, request: ConfirmRequest);
        fn show_error(&self, message: &str);
        fn close(&self);
    }
}
