//! Smooth scrolling for in-page links

use crate::events::{EventKind, EventOutcome, Registration, Role};
use crate::page::{NodeId, Page, Query, ScrollBehavior, close_mobile_menu, navbar_height};
use shared::NavigationSection;

/// Fragment id targeted by an in-page `href`. `#` and `#!` are placeholders
/// and target nothing.
pub fn fragment_target(href: &str) -> Option<&str> {
    match href {
        "#" | "#!" => None,
        _ => href.strip_prefix('#'),
    }
}

#[derive(Debug, Clone)]
pub struct AnchorScroll {
    collapse_id: String,
}

impl AnchorScroll {
    pub fn new(navigation: &NavigationSection) -> Self {
        Self {
            collapse_id: navigation.collapse_id.clone(),
        }
    }

    pub fn install<P: Page>(&self, page: &mut P) -> Vec<Registration> {
        page.query_all(Query::InPageLinks)
            .into_iter()
            .map(|link| Registration::node(link, EventKind::Click, Role::AnchorLink))
            .collect()
    }

    pub fn on_click<P: Page>(&self, page: &mut P, link: NodeId) -> EventOutcome {
        let Some(href) = page.attribute(link, "href") else {
            return EventOutcome::NONE;
        };
        let Some(target_id) = fragment_target(&href) else {
            return EventOutcome::NONE;
        };

        let Some(target) = page.element_by_id(target_id) else {
            log::debug!("anchor target #{target_id} not found");
            return EventOutcome::PREVENT_DEFAULT;
        };

        close_mobile_menu(page, &self.collapse_id);

        let top = page.bounds(target).top - navbar_height(page);
        page.scroll_to(top, ScrollBehavior::Smooth);
        EventOutcome::PREVENT_DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::landing_page;

    #[test]
    fn test_fragment_target() {
        assert_eq!(fragment_target("#"), None);
        assert_eq!(fragment_target("#!"), None);
        assert_eq!(fragment_target("#about"), Some("about"));
        assert_eq!(fragment_target("https://example.fr/#about"), None);
    }

    #[test]
    fn test_scrolls_below_navbar() {
        let mut fixture = landing_page();
        let anchors = AnchorScroll::new(&NavigationSection::default());

        let outcome = anchors.on_click(&mut fixture.page, fixture.nav_about);

        assert_eq!(outcome, EventOutcome::PREVENT_DEFAULT);
        let request = fixture.page.scroll_requests()[0];
        assert_eq!(request.top, 800.0 - 72.0);
        assert_eq!(request.behavior, ScrollBehavior::Smooth);
        assert!(fixture.page.hidden_collapses().is_empty());
    }

    #[test]
    fn test_placeholder_anchors_keep_default() {
        let mut fixture = landing_page();
        let anchors = AnchorScroll::new(&NavigationSection::default());

        assert_eq!(anchors.on_click(&mut fixture.page, fixture.empty_anchor), EventOutcome::NONE);
        assert_eq!(anchors.on_click(&mut fixture.page, fixture.bang_anchor), EventOutcome::NONE);
        assert!(fixture.page.scroll_requests().is_empty());
    }

    #[test]
    fn test_missing_target_prevents_but_does_not_scroll() {
        let mut fixture = landing_page();
        fixture.page.set_scroll_y(420.0);
        fixture.page.add_class(fixture.collapse, "show");
        let anchors = AnchorScroll::new(&NavigationSection::default());

        let outcome = anchors.on_click(&mut fixture.page, fixture.missing_anchor);

        assert_eq!(outcome, EventOutcome::PREVENT_DEFAULT);
        assert!(fixture.page.scroll_requests().is_empty());
        assert_eq!(fixture.page.scroll_y(), 420.0);
        // The menu only closes when there is somewhere to go
        assert!(fixture.page.has_class(fixture.collapse, "show"));
    }

    #[test]
    fn test_open_mobile_menu_is_collapsed_first() {
        let mut fixture = landing_page();
        fixture.page.add_class(fixture.collapse, "show");
        let anchors = AnchorScroll::new(&NavigationSection::default());

        anchors.on_click(&mut fixture.page, fixture.nav_contact);

        assert_eq!(fixture.page.hidden_collapses(), [fixture.collapse]);
        assert_eq!(fixture.page.scroll_requests()[0].top, 1600.0 - 72.0);
    }

    #[test]
    fn test_install_registers_every_in_page_link() {
        let mut fixture = landing_page();
        let anchors = AnchorScroll::new(&NavigationSection::default());

        let registrations = anchors.install(&mut fixture.page);

        assert!(registrations.contains(&Registration::node(
            fixture.nav_home,
            EventKind::Click,
            Role::AnchorLink
        )));
        assert!(registrations.contains(&Registration::node(
            fixture.cta,
            EventKind::Click,
            Role::AnchorLink
        )));
        assert!(!registrations.iter().any(|r| r.target
            == crate::events::ListenerTarget::Node(fixture.external_bare)));
    }
}
