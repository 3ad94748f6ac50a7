//! Card interactions
//!
//! Service cards reveal their back side on hover; touch screens have no hover,
//! so a tap toggles `active` instead, with at most one card open at a time.

use crate::events::{EventKind, EventOutcome, Registration, Role};
use crate::page::{NodeId, Page, Query};

pub const CARD_ACTIVE_CLASS: &str = "active";
const HOVER_TRANSITION: &str = "all 0.3s ease";

#[derive(Debug, Clone, Default)]
pub struct ServiceCardToggle {
    cards: Vec<NodeId>,
}

impl ServiceCardToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install<P: Page>(&mut self, page: &mut P) -> Vec<Registration> {
        self.cards = page.query_all(Query::ServiceCards);
        self.cards
            .iter()
            .map(|card| Registration::node(*card, EventKind::Click, Role::ServiceCard))
            .collect()
    }

    pub fn on_click<P: Page>(&self, page: &mut P, card: NodeId) -> EventOutcome {
        if !page.is_touch_device() {
            return EventOutcome::NONE;
        }

        let was_active = page.has_class(card, CARD_ACTIVE_CLASS);
        for other in self.cards.iter().filter(|other| **other != card) {
            page.remove_class(*other, CARD_ACTIVE_CLASS);
        }
        if was_active {
            page.remove_class(card, CARD_ACTIVE_CLASS);
        } else {
            page.add_class(card, CARD_ACTIVE_CLASS);
        }
        EventOutcome::PREVENT_DEFAULT
    }
}

/// Gives hover cards their transition on first pointer entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverCardTransition;

impl HoverCardTransition {
    pub fn install<P: Page>(&self, page: &mut P) -> Vec<Registration> {
        page.query_all(Query::HoverCards)
            .into_iter()
            .map(|card| Registration::node(card, EventKind::MouseEnter, Role::HoverCard))
            .collect()
    }

    pub fn on_enter<P: Page>(&self, page: &mut P, card: NodeId) {
        page.set_style(card, "transition", HOVER_TRANSITION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::landing_page;

    #[test]
    fn test_tap_toggles_one_card_at_a_time() {
        let mut fixture = landing_page();
        fixture.page.set_touch_device(true);
        let mut toggle = ServiceCardToggle::new();
        assert_eq!(toggle.install(&mut fixture.page).len(), 3);
        let [first, second, third] = fixture.cards;

        assert_eq!(toggle.on_click(&mut fixture.page, first), EventOutcome::PREVENT_DEFAULT);
        assert!(fixture.page.has_class(first, CARD_ACTIVE_CLASS));

        toggle.on_click(&mut fixture.page, second);
        assert!(!fixture.page.has_class(first, CARD_ACTIVE_CLASS));
        assert!(fixture.page.has_class(second, CARD_ACTIVE_CLASS));
        assert!(!fixture.page.has_class(third, CARD_ACTIVE_CLASS));

        // Second tap on the open card closes it
        toggle.on_click(&mut fixture.page, second);
        assert!(fixture.cards.iter().all(|card| !fixture.page.has_class(*card, CARD_ACTIVE_CLASS)));
    }

    #[test]
    fn test_ignored_without_touch() {
        let mut fixture = landing_page();
        let mut toggle = ServiceCardToggle::new();
        toggle.install(&mut fixture.page);

        let outcome = toggle.on_click(&mut fixture.page, fixture.cards[0]);

        assert_eq!(outcome, EventOutcome::NONE);
        assert!(!fixture.page.has_class(fixture.cards[0], CARD_ACTIVE_CLASS));
    }

    #[test]
    fn test_hover_card_gets_transition() {
        let mut fixture = landing_page();
        let hover = HoverCardTransition;
        assert_eq!(hover.install(&mut fixture.page).len(), 1);

        hover.on_enter(&mut fixture.page, fixture.hover_card);

        assert_eq!(fixture.page.style(fixture.hover_card, "transition"), Some("all 0.3s ease"));
    }
}
