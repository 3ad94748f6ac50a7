//! Active navigation link for the section in view

use crate::page::{Bounds, NodeId, Page, Query};
use shared::ScrollSection;

pub const ACTIVE_CLASS: &str = "active";

/// Index of the section containing `position`. Sections are checked in
/// document order and the last match wins.
pub fn current_section(sections: &[Bounds], position: f64) -> Option<usize> {
    sections
        .iter()
        .enumerate()
        .filter(|(_, bounds)| bounds.contains(position))
        .map(|(index, _)| index)
        .last()
}

#[derive(Debug, Clone)]
pub struct SectionTracker {
    offset_px: f64,
    sections: Vec<NodeId>,
    nav_links: Vec<NodeId>,
}

impl SectionTracker {
    pub fn new(scroll: &ScrollSection) -> Self {
        Self {
            offset_px: scroll.section_offset_px,
            sections: Vec::new(),
            nav_links: Vec::new(),
        }
    }

    pub fn install<P: Page>(&mut self, page: &mut P) {
        self.sections = page.query_all(Query::Sections);
        self.nav_links = page.query_all(Query::NavLinks);
    }

    /// Re-evaluate which nav link is active. Returns the current section id.
    pub fn update<P: Page>(&self, page: &mut P) -> Option<String> {
        let position = page.scroll_y() + self.offset_px;
        let bounds: Vec<Bounds> = self
            .sections
            .iter()
            .map(|section| page.bounds(*section))
            .collect();
        let current = current_section(&bounds, position)
            .and_then(|index| page.attribute(self.sections[index], "id"));

        let active_href = current.as_ref().map(|id| format!("#{id}"));
        for link in &self.nav_links {
            page.remove_class(*link, ACTIVE_CLASS);
            if active_href.is_some() && page.attribute(*link, "href") == active_href {
                page.add_class(*link, ACTIVE_CLASS);
            }
        }
        current
    }
}
