//! Headless page
//!
//! `MemoryPage` is a small element tree with explicit layout, scroll state and
//! a manual clock. It implements [`Page`] so every behaviour can run without a
//! browser, and it records what the behaviours asked the host to do (scroll
//! requests, collapsed menus, console output, timers).

use crate::clipboard::ClipboardError;
use crate::page::{Bounds, ConsoleLine, NodeId, Page, Query, ScrollBehavior, Timer};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct MemoryNode {
    tag: String,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    bounds: Bounds,
    text: String,
    valid: bool,
}

impl MemoryNode {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            classes: BTreeSet::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            parent,
            children: Vec::new(),
            bounds: Bounds::default(),
            text: String::new(),
            valid: true,
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn href_is_fragment(&self) -> bool {
        self.attributes
            .get("href")
            .is_some_and(|href| href.starts_with('#'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    timer: Timer,
    due_ms: u64,
    seq: u64,
}

#[derive(Debug)]
pub struct MemoryPage {
    nodes: Vec<MemoryNode>,
    head: NodeId,
    body: NodeId,
    scroll_y: f64,
    viewport_width: f64,
    touch_device: bool,
    user_agent: String,
    load_duration_ms: Option<f64>,
    scroll_requests: Vec<ScrollRequest>,
    hidden_collapses: Vec<NodeId>,
    observed: BTreeMap<NodeId, f64>,
    console: Vec<ConsoleLine>,
    clipboard: Result<(), ClipboardError>,
    clipboard_writes: RefCell<Vec<String>>,
    now_ms: u64,
    timer_seq: u64,
    timers: Vec<PendingTimer>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// An empty document with `<html>`, `<head>` and `<body>`.
    pub fn new() -> Self {
        let mut page = Self {
            nodes: vec![MemoryNode::new("html", None)],
            head: NodeId(0),
            body: NodeId(0),
            scroll_y: 0.0,
            viewport_width: 1280.0,
            touch_device: false,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64)".to_string(),
            load_duration_ms: None,
            scroll_requests: Vec::new(),
            hidden_collapses: Vec::new(),
            observed: BTreeMap::new(),
            console: Vec::new(),
            clipboard: Ok(()),
            clipboard_writes: RefCell::new(Vec::new()),
            now_ms: 0,
            timer_seq: 0,
            timers: Vec::new(),
        };
        let root = NodeId(0);
        page.head = page.create(root, "head", &[]);
        page.body = page.create(root, "body", &[]);
        page
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Append an element under `parent`. `class` is split into class names;
    /// every other pair becomes an attribute. An unknown `parent` leaves the
    /// element detached from the document.
    pub fn create(&mut self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = self.node(parent).map(|_| parent);
        let mut node = MemoryNode::new(tag, parent);
        for (name, value) in attributes {
            if *name == "class" {
                node.classes
                    .extend(value.split_whitespace().map(str::to_string));
            } else {
                node.attributes.insert(name.to_string(), value.to_string());
            }
        }
        self.nodes.push(node);
        if let Some(parent) = parent.and_then(|parent| self.node_mut(parent)) {
            parent.children.push(id);
        }
        id
    }

    pub fn set_bounds(&mut self, node: NodeId, top: f64, height: f64) {
        if let Some(node) = self.node_mut(node) {
            node.bounds = Bounds { top, height };
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(node) = self.node_mut(node) {
            node.text = text.to_string();
        }
    }

    pub fn set_valid(&mut self, form: NodeId, valid: bool) {
        if let Some(form) = self.node_mut(form) {
            form.valid = valid;
        }
    }

    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    pub fn set_touch_device(&mut self, touch: bool) {
        self.touch_device = touch;
    }

    pub fn set_user_agent(&mut self, user_agent: &str) {
        self.user_agent = user_agent.to_string();
    }

    pub fn set_load_duration(&mut self, duration_ms: Option<f64>) {
        self.load_duration_ms = duration_ms;
    }

    pub fn set_clipboard(&mut self, result: Result<(), ClipboardError>) {
        self.clipboard = result;
    }

    /// Tag name, empty for unknown nodes.
    pub fn tag(&self, node: NodeId) -> &str {
        self.node(node).map(|node| node.tag.as_str()).unwrap_or("")
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.node(node)?.style.get(property).map(String::as_str)
    }

    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.scroll_requests
    }

    pub fn hidden_collapses(&self) -> &[NodeId] {
        &self.hidden_collapses
    }

    /// Observed elements with their threshold.
    pub fn observed(&self) -> &BTreeMap<NodeId, f64> {
        &self.observed
    }

    pub fn console_lines(&self) -> &[ConsoleLine] {
        &self.console
    }

    pub fn clipboard_writes(&self) -> Vec<String> {
        self.clipboard_writes.borrow().clone()
    }

    pub fn pending_timers(&self) -> Vec<Timer> {
        self.timers.iter().map(|pending| pending.timer).collect()
    }

    /// Move the clock forward and hand back the timers that came due, in the
    /// order they were due.
    pub fn advance(&mut self, ms: u64) -> Vec<Timer> {
        self.now_ms += ms;
        let now = self.now_ms;
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|timer| timer.due_ms <= now);
        self.timers = pending;
        due.sort_by_key(|timer| (timer.due_ms, timer.seq));
        due.into_iter().map(|pending| pending.timer).collect()
    }

    fn node(&self, node: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(node.0 as usize)
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut MemoryNode> {
        self.nodes.get_mut(node.0 as usize)
    }

    fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId(0)];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    fn has_ancestor_with_class(&self, node: NodeId, class: &str) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if self.has_class(id, class) {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn matches(&self, id: NodeId, query: Query) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        match query {
            Query::InPageLinks => node.tag == "a" && node.href_is_fragment(),
            Query::FadeIn => node.has_class("fade-in"),
            Query::HeroFadeIn => {
                node.has_class("fade-in") && self.has_ancestor_with_class(id, "hero-section")
            }
            Query::Sections => node.tag == "section" && node.attributes.contains_key("id"),
            Query::NavLinks => node.has_class("nav-link") && node.href_is_fragment(),
            Query::Navbar => node.has_class("navbar"),
            Query::NavbarToggler => node.has_class("navbar-toggler"),
            Query::HoverCards => node.has_class("hover-card"),
            Query::ServiceCards => node.has_class("service-card-hover"),
            Query::AccordionButtons => node.has_class("accordion-button"),
            Query::ExternalLinks => {
                node.tag == "a" && node.attributes.get("target").is_some_and(|t| t == "_blank")
            }
            Query::ValidatedForms => node.has_class("needs-validation"),
            Query::CtaButtons => ["btn-accent", "btn-success", "btn-primary"]
                .iter()
                .any(|class| node.has_class(class)),
            Query::BareTables => node.tag == "table" && !node.has_class("table-responsive"),
        }
    }
}

/// Unknown node ids behave like elements that are no longer in the page:
/// reads return empty values and writes do nothing.
impl Page for MemoryPage {
    fn element_by_id(&mut self, id: &str) -> Option<NodeId> {
        self.document_order().into_iter().find(|node| {
            self.node(*node)
                .and_then(|node| node.attributes.get("id"))
                .is_some_and(|value| value == id)
        })
    }

    fn query_all(&mut self, query: Query) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|node| self.matches(*node, query))
            .collect()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let node = self.node(node)?;
        if name == "class" {
            return (!node.classes.is_empty())
                .then(|| node.classes.iter().cloned().collect::<Vec<_>>().join(" "));
        }
        node.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(node) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node).is_some_and(|node| node.has_class(class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(node) = self.node_mut(node) {
            node.classes.insert(class.to_string());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(node) = self.node_mut(node) {
            node.classes.remove(class);
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(node) = self.node_mut(node) {
            node.style.insert(property.to_string(), value.to_string());
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let Some(memory_node) = self.node(node) else {
            return String::new();
        };
        let mut text = memory_node.text.clone();
        for child in &memory_node.children {
            text.push_str(&self.text_content(*child));
        }
        text
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if self.node(ancestor).is_none() {
            return false;
        }
        let mut current = self.node(node).map(|_| node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn bounds(&self, node: NodeId) -> Bounds {
        self.node(node).map(|node| node.bounds).unwrap_or_default()
    }

    fn wrap(&mut self, node: NodeId, tag: &str, class: &str) {
        let Some((parent, bounds)) = self
            .node(node)
            .and_then(|memory_node| Some((memory_node.parent?, memory_node.bounds)))
        else {
            return;
        };
        let wrapper = NodeId(self.nodes.len() as u32);
        let mut wrapper_node = MemoryNode::new(tag, Some(parent));
        wrapper_node.classes.insert(class.to_string());
        wrapper_node.children.push(node);
        wrapper_node.bounds = bounds;
        self.nodes.push(wrapper_node);

        if let Some(parent) = self.node_mut(parent) {
            if let Some(slot) = parent.children.iter_mut().find(|child| **child == node) {
                *slot = wrapper;
            }
        }
        if let Some(node) = self.node_mut(node) {
            node.parent = Some(wrapper);
        }
    }

    fn append_head_link(&mut self, rel: &str, href: &str) {
        let head = self.head;
        self.create(head, "link", &[("rel", rel), ("href", href)]);
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.scroll_requests.push(ScrollRequest { top, behavior });
        self.scroll_y = top.max(0.0);
    }

    fn is_touch_device(&self) -> bool {
        self.touch_device
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn hide_collapse(&mut self, node: NodeId) {
        if self.node(node).is_none() {
            return;
        }
        self.hidden_collapses.push(node);
        self.remove_class(node, "show");
    }

    fn observe_intersection(&mut self, node: NodeId, threshold: f64) {
        if self.node(node).is_some() {
            self.observed.insert(node, threshold);
        }
    }

    fn unobserve_intersection(&mut self, node: NodeId) {
        self.observed.remove(&node);
    }

    /// Unknown forms count as valid, like a submit target that is not a form.
    fn check_validity(&self, form: NodeId) -> bool {
        self.node(form).is_none_or(|form| form.valid)
    }

    /// A timer that is still pending under the same key is replaced.
    fn set_timeout(&mut self, timer: Timer, delay_ms: u32) {
        self.clear_timeout(timer);
        self.timer_seq += 1;
        self.timers.push(PendingTimer {
            timer,
            due_ms: self.now_ms + u64::from(delay_ms),
            seq: self.timer_seq,
        });
    }

    fn clear_timeout(&mut self, timer: Timer) {
        self.timers.retain(|pending| pending.timer != timer);
    }

    fn load_duration_ms(&self) -> Option<f64> {
        self.load_duration_ms
    }

    fn console(&mut self, line: ConsoleLine) {
        self.console.push(line);
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard.clone()?;
        self.clipboard_writes.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// A landing page shaped like the production markup: fixed navbar with a
/// collapsible menu, three sections, a hero reveal, cards, an accordion, a
/// validated form and a few links.
#[cfg(test)]
pub(crate) struct LandingPage {
    pub page: MemoryPage,
    pub navbar: NodeId,
    pub toggler: NodeId,
    pub collapse: NodeId,
    pub nav_home: NodeId,
    pub nav_about: NodeId,
    pub nav_contact: NodeId,
    pub menu_item: NodeId,
    pub home: NodeId,
    pub about: NodeId,
    pub contact: NodeId,
    pub hero_fade: NodeId,
    pub about_fade: NodeId,
    pub cards: [NodeId; 3],
    pub hover_card: NodeId,
    pub accordion_button: NodeId,
    pub cta: NodeId,
    pub empty_anchor: NodeId,
    pub bang_anchor: NodeId,
    pub missing_anchor: NodeId,
    pub external_bare: NodeId,
    pub external_with_rel: NodeId,
    pub form: NodeId,
    pub table: NodeId,
}

#[cfg(test)]
pub(crate) fn landing_page() -> LandingPage {
    let mut page = MemoryPage::new();
    let body = page.body();

    let navbar = page.create(body, "nav", &[("class", "navbar fixed-top")]);
    page.set_bounds(navbar, 0.0, 72.0);
    let toggler = page.create(navbar, "button", &[("class", "navbar-toggler")]);
    page.create(toggler, "span", &[("class", "navbar-toggler-icon")]);
    let collapse = page.create(navbar, "div", &[("class", "collapse navbar-collapse"), ("id", "navbarNav")]);
    let nav_home = page.create(collapse, "a", &[("class", "nav-link"), ("href", "#home")]);
    let nav_about = page.create(collapse, "a", &[("class", "nav-link"), ("href", "#about")]);
    let nav_contact = page.create(collapse, "a", &[("class", "nav-link"), ("href", "#contact")]);
    let menu_item = page.create(collapse, "span", &[("class", "nav-text")]);

    let home = page.create(body, "section", &[("id", "home"), ("class", "hero-section")]);
    page.set_bounds(home, 0.0, 800.0);
    let hero_fade = page.create(home, "div", &[("class", "fade-in")]);
    page.set_bounds(hero_fade, 200.0, 300.0);
    let cta = page.create(home, "a", &[("class", "btn btn-accent"), ("href", "#contact")]);
    page.set_text(cta, "  Prendre rendez-vous \n");

    let about = page.create(body, "section", &[("id", "about")]);
    page.set_bounds(about, 800.0, 800.0);
    let about_fade = page.create(about, "div", &[("class", "fade-in")]);
    page.set_bounds(about_fade, 900.0, 400.0);
    let cards = [
        page.create(about, "div", &[("class", "card service-card-hover")]),
        page.create(about, "div", &[("class", "card service-card-hover")]),
        page.create(about, "div", &[("class", "card service-card-hover")]),
    ];
    let hover_card = page.create(about, "div", &[("class", "card hover-card")]);
    let accordion_button = page.create(about, "button", &[("class", "accordion-button collapsed")]);
    page.set_bounds(accordion_button, 1400.0, 56.0);
    let table = page.create(about, "table", &[("class", "table")]);

    let contact = page.create(body, "section", &[("id", "contact")]);
    page.set_bounds(contact, 1600.0, 800.0);
    let form = page.create(contact, "form", &[("class", "needs-validation")]);
    let empty_anchor = page.create(contact, "a", &[("href", "#")]);
    let bang_anchor = page.create(contact, "a", &[("href", "#!")]);
    let missing_anchor = page.create(contact, "a", &[("href", "#nowhere")]);
    let external_bare = page.create(
        contact,
        "a",
        &[("href", "https://www.linkedin.com"), ("target", "_blank")],
    );
    let external_with_rel = page.create(
        contact,
        "a",
        &[("href", "https://calendly.com"), ("target", "_blank"), ("rel", "noopener")],
    );

    LandingPage {
        page,
        navbar,
        toggler,
        collapse,
        nav_home,
        nav_about,
        nav_contact,
        menu_item,
        home,
        about,
        contact,
        hero_fade,
        about_fade,
        cards,
        hover_card,
        accordion_button,
        cta,
        empty_anchor,
        bang_anchor,
        missing_anchor,
        external_bare,
        external_with_rel,
        form,
        table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_follow_document_order() {
        let mut fixture = landing_page();
        let page = &mut fixture.page;

        assert_eq!(
            page.query_all(Query::Sections),
            vec![fixture.home, fixture.about, fixture.contact]
        );
        assert_eq!(
            page.query_all(Query::NavLinks),
            vec![fixture.nav_home, fixture.nav_about, fixture.nav_contact]
        );
        assert_eq!(page.query(Query::HeroFadeIn), Some(fixture.hero_fade));
        assert_eq!(
            page.query_all(Query::FadeIn),
            vec![fixture.hero_fade, fixture.about_fade]
        );
        assert_eq!(page.query_all(Query::CtaButtons), vec![fixture.cta]);
        assert_eq!(
            page.query_all(Query::ExternalLinks),
            vec![fixture.external_bare, fixture.external_with_rel]
        );
        // Nav links are anchors too, but only `<a>` elements count as in-page links
        assert!(page.query_all(Query::InPageLinks).contains(&fixture.empty_anchor));
        assert!(!page.query_all(Query::InPageLinks).contains(&fixture.toggler));
    }

    #[test]
    fn test_element_by_id_and_contains() {
        let mut fixture = landing_page();
        let page = &mut fixture.page;

        assert_eq!(page.element_by_id("navbarNav"), Some(fixture.collapse));
        assert_eq!(page.element_by_id("missing"), None);
        assert!(page.contains(fixture.collapse, fixture.menu_item));
        assert!(page.contains(fixture.collapse, fixture.collapse));
        assert!(!page.contains(fixture.collapse, fixture.toggler));
    }

    #[test]
    fn test_wrap_reparents_in_place() {
        let mut fixture = landing_page();
        let page = &mut fixture.page;
        let about = fixture.about;
        let position = page.children(about).iter().position(|c| *c == fixture.table);

        page.wrap(fixture.table, "div", "table-responsive");

        let wrapper = page.parent(fixture.table).unwrap();
        assert_eq!(page.tag(wrapper), "div");
        assert!(page.has_class(wrapper, "table-responsive"));
        assert_eq!(page.parent(wrapper), Some(about));
        assert_eq!(
            page.children(about).iter().position(|c| *c == wrapper),
            position
        );
    }

    #[test]
    fn test_timers_come_due_in_order() {
        let mut page = MemoryPage::new();
        let node = NodeId(1);
        page.set_timeout(Timer::HeroReveal { node }, 100);
        page.set_timeout(Timer::ScrollDebounce { token: 1 }, 10);
        page.set_timeout(Timer::ScrollDebounce { token: 2 }, 10);
        page.clear_timeout(Timer::ScrollDebounce { token: 1 });

        assert!(page.advance(5).is_empty());
        assert_eq!(page.advance(5), vec![Timer::ScrollDebounce { token: 2 }]);
        assert_eq!(page.pending_timers(), vec![Timer::HeroReveal { node }]);
        assert_eq!(page.advance(200), vec![Timer::HeroReveal { node }]);
    }

    #[test]
    fn test_class_attribute_reflects_class_set() {
        let mut page = MemoryPage::new();
        let body = page.body();
        let node = page.create(body, "div", &[("class", "b a")]);
        assert_eq!(page.attribute(node, "class").as_deref(), Some("a b"));
        page.remove_class(node, "a");
        page.remove_class(node, "b");
        assert_eq!(page.attribute(node, "class"), None);
    }

    #[test]
    fn test_unknown_node_is_inert() {
        let mut fixture = landing_page();
        let page = &mut fixture.page;
        let ghost = NodeId(999);

        page.set_attribute(ghost, "rel", "noopener");
        page.add_class(ghost, "show");
        page.set_style(ghost, "transition", "none");
        page.wrap(ghost, "div", "table-responsive");
        page.hide_collapse(ghost);
        page.observe_intersection(ghost, 0.15);
        page.set_bounds(ghost, 10.0, 10.0);

        assert_eq!(page.attribute(ghost, "rel"), None);
        assert!(!page.has_class(ghost, "show"));
        assert_eq!(page.text_content(ghost), "");
        assert_eq!(page.bounds(ghost), Bounds::default());
        assert_eq!(page.tag(ghost), "");
        assert_eq!(page.parent(ghost), None);
        assert!(page.children(ghost).is_empty());
        assert!(!page.contains(ghost, fixture.menu_item));
        assert!(!page.contains(fixture.collapse, ghost));
        assert!(page.check_validity(ghost));
        assert!(page.hidden_collapses().is_empty());
        assert!(page.observed().is_empty());
    }

    #[test]
    fn test_create_under_unknown_parent_is_detached() {
        let mut page = MemoryPage::new();
        let orphan = page.create(NodeId(42), "section", &[("id", "orphan")]);

        assert_eq!(page.parent(orphan), None);
        assert_eq!(page.element_by_id("orphan"), None);
        assert!(page.query_all(Query::Sections).is_empty());
    }

    #[test]
    fn test_rescheduling_a_pending_timer_replaces_it() {
        let mut page = MemoryPage::new();
        let button = NodeId(3);
        page.set_timeout(Timer::AccordionScroll { button }, 350);
        page.advance(100);
        page.set_timeout(Timer::AccordionScroll { button }, 350);

        assert_eq!(page.pending_timers(), vec![Timer::AccordionScroll { button }]);
        assert!(page.advance(300).is_empty());
        assert_eq!(page.advance(50), vec![Timer::AccordionScroll { button }]);
        assert!(page.advance(1000).is_empty());
    }
}
