use crate::events::{EventKind, Registration, Role};
use crate::page::{NodeId, Page, Query, close_mobile_menu};
use shared::NavigationSection;

/// Closes the expanded mobile menu when the user clicks anywhere else.
#[derive(Debug, Clone)]
pub struct MenuDismiss {
    collapse_id: String,
}

impl MenuDismiss {
    pub fn new(navigation: &NavigationSection) -> Self {
        Self {
            collapse_id: navigation.collapse_id.clone(),
        }
    }

    pub fn install(&self) -> Registration {
        Registration::document(EventKind::Click, Role::MenuDismiss)
    }

    /// Returns whether the menu was collapsed.
    pub fn on_document_click<P: Page>(&self, page: &mut P, target: Option<NodeId>) -> bool {
        let Some(collapse) = page.element_by_id(&self.collapse_id) else {
            return false;
        };
        if !page.has_class(collapse, "show") {
            return false;
        }

        if let Some(target) = target {
            if page.contains(collapse, target) {
                return false;
            }
            let toggler = page.query(Query::NavbarToggler);
            if toggler.is_some_and(|toggler| page.contains(toggler, target)) {
                return false;
            }
        }

        close_mobile_menu(page, &self.collapse_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::landing_page;

    #[test]
    fn test_outside_click_closes_open_menu() {
        let mut fixture = landing_page();
        fixture.page.add_class(fixture.collapse, "show");
        let dismiss = MenuDismiss::new(&NavigationSection::default());

        assert!(dismiss.on_document_click(&mut fixture.page, Some(fixture.about_fade)));
        assert_eq!(fixture.page.hidden_collapses(), [fixture.collapse]);
    }

    #[test]
    fn test_clicks_inside_menu_or_toggler_are_kept() {
        let mut fixture = landing_page();
        fixture.page.add_class(fixture.collapse, "show");
        let dismiss = MenuDismiss::new(&NavigationSection::default());
        let toggler_icon = fixture.page.children(fixture.toggler)[0];

        assert!(!dismiss.on_document_click(&mut fixture.page, Some(fixture.menu_item)));
        assert!(!dismiss.on_document_click(&mut fixture.page, Some(fixture.toggler)));
        assert!(!dismiss.on_document_click(&mut fixture.page, Some(toggler_icon)));
        assert!(fixture.page.hidden_collapses().is_empty());
    }

    #[test]
    fn test_closed_menu_is_left_alone() {
        let mut fixture = landing_page();
        let dismiss = MenuDismiss::new(&NavigationSection::default());

        assert!(!dismiss.on_document_click(&mut fixture.page, Some(fixture.about)));
        assert!(fixture.page.hidden_collapses().is_empty());
    }

    #[test]
    fn test_click_without_known_target_closes() {
        let mut fixture = landing_page();
        fixture.page.add_class(fixture.collapse, "show");
        let dismiss = MenuDismiss::new(&NavigationSection::default());

        assert!(dismiss.on_document_click(&mut fixture.page, None));
    }
}
