use crate::events::{EventKind, Registration, Role};
use crate::page::{NodeId, Page, Query, ScrollBehavior, Timer, navbar_height};
use shared::NavigationSection;

/// On narrow screens an opened accordion item can end up above the fold, so
/// after the collapse animation the page scrolls back to its header.
#[derive(Debug, Clone)]
pub struct AccordionScroll {
    breakpoint_px: f64,
    delay_ms: u32,
    margin_px: f64,
}

impl AccordionScroll {
    pub fn new(navigation: &NavigationSection) -> Self {
        Self {
            breakpoint_px: navigation.accordion_breakpoint_px,
            delay_ms: navigation.accordion_delay_ms,
            margin_px: navigation.accordion_margin_px,
        }
    }

    pub fn install<P: Page>(&self, page: &mut P) -> Vec<Registration> {
        page.query_all(Query::AccordionButtons)
            .into_iter()
            .map(|button| Registration::node(button, EventKind::Click, Role::AccordionButton))
            .collect()
    }

    pub fn on_click<P: Page>(&self, page: &mut P, button: NodeId) {
        if page.viewport_width() < self.breakpoint_px {
            page.set_timeout(Timer::AccordionScroll { button }, self.delay_ms);
        }
    }

    pub fn on_timer<P: Page>(&self, page: &mut P, button: NodeId) {
        let top = page.bounds(button).top - navbar_height(page) - self.margin_px;
        page.scroll_to(top, ScrollBehavior::Smooth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::landing_page;

    #[test]
    fn test_mobile_click_scrolls_after_animation() {
        let mut fixture = landing_page();
        fixture.page.set_viewport_width(390.0);
        let accordion = AccordionScroll::new(&NavigationSection::default());
        let button = fixture.accordion_button;

        accordion.on_click(&mut fixture.page, button);
        assert!(fixture.page.advance(349).is_empty());
        assert_eq!(fixture.page.advance(1), vec![Timer::AccordionScroll { button }]);

        accordion.on_timer(&mut fixture.page, button);
        let request = fixture.page.scroll_requests()[0];
        assert_eq!(request.top, 1400.0 - 72.0 - 20.0);
        assert_eq!(request.behavior, ScrollBehavior::Smooth);
    }

    #[test]
    fn test_desktop_click_does_nothing() {
        let mut fixture = landing_page();
        fixture.page.set_viewport_width(768.0);
        let accordion = AccordionScroll::new(&NavigationSection::default());

        accordion.on_click(&mut fixture.page, fixture.accordion_button);

        assert!(fixture.page.pending_timers().is_empty());
    }
}
