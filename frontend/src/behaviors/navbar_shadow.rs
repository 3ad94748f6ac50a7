use crate::page::{NodeId, Page, Query};
use shared::ScrollSection;

pub const SHADOW_CLASS: &str = "shadow-lg";

/// Adds a shadow to the fixed navbar once the page is scrolled past the threshold.
#[derive(Debug, Clone)]
pub struct NavbarShadow {
    threshold_px: f64,
    navbar: Option<NodeId>,
}

impl NavbarShadow {
    pub fn new(scroll: &ScrollSection) -> Self {
        Self {
            threshold_px: scroll.shadow_threshold_px,
            navbar: None,
        }
    }

    pub fn install<P: Page>(&mut self, page: &mut P) {
        self.navbar = page.query(Query::Navbar);
    }

    pub fn update<P: Page>(&self, page: &mut P) {
        let Some(navbar) = self.navbar else {
            return;
        };
        if page.scroll_y() > self.threshold_px {
            page.add_class(navbar, SHADOW_CLASS);
        } else {
            page.remove_class(navbar, SHADOW_CLASS);
        }
    }
}
