use crate::events::{EventKind, EventOutcome, Registration, Role};
use crate::page::{NodeId, Page, Query};

pub const VALIDATED_CLASS: &str = "was-validated";

/// Hooks the framework's validation styling onto `.needs-validation` forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormValidation;

impl FormValidation {
    pub fn install<P: Page>(&self, page: &mut P) -> Vec<Registration> {
        page.query_all(Query::ValidatedForms)
            .into_iter()
            .map(|form| Registration::node(form, EventKind::Submit, Role::FormValidation))
            .collect()
    }

    pub fn on_submit<P: Page>(&self, page: &mut P, form: NodeId) -> EventOutcome {
        let outcome = if page.check_validity(form) {
            EventOutcome::NONE
        } else {
            EventOutcome::BLOCK
        };
        page.add_class(form, VALIDATED_CLASS);
        outcome
    }
}
