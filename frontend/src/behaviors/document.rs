//! One-shot document fix-ups applied at startup

use crate::page::{Page, Query};
use shared::DocumentSection;

#[derive(Debug, Clone)]
pub struct DocumentFixups {
    external_link_rel: String,
    preconnect_origin: Option<String>,
    responsive_tables: bool,
}

impl DocumentFixups {
    pub fn new(document: &DocumentSection) -> Self {
        Self {
            external_link_rel: document.external_link_rel.clone(),
            preconnect_origin: document.preconnect_origin.clone(),
            responsive_tables: document.responsive_tables,
        }
    }

    pub fn apply<P: Page>(&self, page: &mut P) {
        let hardened = self.harden_external_links(page);
        if hardened > 0 {
            log::debug!("set rel on {hardened} external links");
        }
        if let Some(origin) = &self.preconnect_origin {
            page.append_head_link("preconnect", origin);
        }
        if self.responsive_tables {
            wrap_tables(page);
        }
    }

    /// Links opening a new tab without an explicit `rel` get the safe default.
    pub fn harden_external_links<P: Page>(&self, page: &mut P) -> usize {
        let mut hardened = 0;
        for link in page.query_all(Query::ExternalLinks) {
            if page.attribute(link, "rel").is_none() {
                page.set_attribute(link, "rel", &self.external_link_rel);
                hardened += 1;
            }
        }
        hardened
    }
}

/// Wrap every bare table in a horizontally scrollable container.
pub fn wrap_tables<P: Page>(page: &mut P) -> usize {
    let tables = page.query_all(Query::BareTables);
    for table in &tables {
        page.wrap(*table, "div", "table-responsive");
    }
    tables.len()
}
