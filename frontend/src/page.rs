//! Typed access to the host page
//!
//! Behaviours never touch the DOM directly. They go through [`Page`], which is
//! implemented by the browser backend (`web::WebPage`) and by the headless
//! [`MemoryPage`](crate::memory::MemoryPage) used in tests.

use crate::clipboard::ClipboardError;

/// Stable handle for an element of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Element groups the behaviours look up.
///
/// Each variant has a CSS selector for the browser backend; the in-memory page
/// matches the same shape structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// `a[href^="#"]`
    InPageLinks,
    /// `.fade-in`
    FadeIn,
    /// `.hero-section .fade-in`
    HeroFadeIn,
    /// `section[id]`
    Sections,
    /// `.nav-link[href^="#"]`
    NavLinks,
    /// `.navbar`
    Navbar,
    /// `.navbar-toggler`
    NavbarToggler,
    /// `.hover-card`
    HoverCards,
    /// `.service-card-hover`
    ServiceCards,
    /// `.accordion-button`
    AccordionButtons,
    /// `a[target="_blank"]`
    ExternalLinks,
    /// `.needs-validation`
    ValidatedForms,
    /// `.btn-accent, .btn-success, .btn-primary`
    CtaButtons,
    /// `table:not(.table-responsive)`
    BareTables,
}

impl Query {
    pub fn selector(self) -> &'static str {
        match self {
            Query::InPageLinks => "a[href^=\"#\"]",
            Query::FadeIn => ".fade-in",
            Query::HeroFadeIn => ".hero-section .fade-in",
            Query::Sections => "section[id]",
            Query::NavLinks => ".nav-link[href^=\"#\"]",
            Query::Navbar => ".navbar",
            Query::NavbarToggler => ".navbar-toggler",
            Query::HoverCards => ".hover-card",
            Query::ServiceCards => ".service-card-hover",
            Query::AccordionButtons => ".accordion-button",
            Query::ExternalLinks => "a[target=\"_blank\"]",
            Query::ValidatedForms => ".needs-validation",
            Query::CtaButtons => ".btn-accent, .btn-success, .btn-primary",
            Query::BareTables => "table:not(.table-responsive)",
        }
    }
}

/// Vertical placement of an element in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    /// Half-open `[top, top + height)` containment.
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Deferred work the host runs after a delay and reports back as
/// [`PageEvent::TimerElapsed`](crate::events::PageEvent::TimerElapsed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    ScrollDebounce { token: u64 },
    AccordionScroll { button: NodeId },
    HeroReveal { node: NodeId },
}

/// `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Unknown values count as `Interactive`: parsed, load not finished.
    pub fn from_dom(state: &str) -> Self {
        match state {
            "loading" => ReadyState::Loading,
            "complete" => ReadyState::Complete,
            _ => ReadyState::Interactive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Error,
}

/// A line for the developer console. `styles` feed `%c` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleLine {
    pub level: ConsoleLevel,
    pub text: String,
    pub styles: Vec<String>,
}

impl ConsoleLine {
    pub fn log(text: impl Into<String>) -> Self {
        Self {
            level: ConsoleLevel::Log,
            text: text.into(),
            styles: Vec::new(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: ConsoleLevel::Error,
            text: text.into(),
            styles: Vec::new(),
        }
    }

    pub fn styled(text: impl Into<String>, styles: Vec<String>) -> Self {
        Self {
            level: ConsoleLevel::Log,
            text: text.into(),
            styles,
        }
    }
}

/// Host page capabilities used by the behaviours.
///
/// Lookups take `&mut self` because a backend may need to register the
/// elements it hands out as [`NodeId`]s.
#[allow(async_fn_in_trait)]
pub trait Page {
    fn element_by_id(&mut self, id: &str) -> Option<NodeId>;
    fn query_all(&mut self, query: Query) -> Vec<NodeId>;

    fn query(&mut self, query: Query) -> Option<NodeId> {
        self.query_all(query).into_iter().next()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);
    fn text_content(&self, node: NodeId) -> String;
    /// True when `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;
    fn bounds(&self, node: NodeId) -> Bounds;
    /// Wrap `node` in a new element of `tag` carrying `class`.
    fn wrap(&mut self, node: NodeId, tag: &str, class: &str);
    fn append_head_link(&mut self, rel: &str, href: &str);

    fn scroll_y(&self) -> f64;
    fn viewport_width(&self) -> f64;
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);

    fn is_touch_device(&self) -> bool;
    fn user_agent(&self) -> String;

    /// Collapse a framework collapsible panel without toggling.
    fn hide_collapse(&mut self, node: NodeId);
    fn observe_intersection(&mut self, node: NodeId, threshold: f64);
    fn unobserve_intersection(&mut self, node: NodeId);
    fn check_validity(&self, form: NodeId) -> bool;

    fn set_timeout(&mut self, timer: Timer, delay_ms: u32);
    fn clear_timeout(&mut self, timer: Timer);

    /// Milliseconds from navigation start to the end of the load event, when known.
    fn load_duration_ms(&self) -> Option<f64>;
    fn console(&mut self, line: ConsoleLine);

    async fn write_clipboard(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Navbar height used to offset scroll targets; a missing navbar counts as 0.
pub fn navbar_height<P: Page>(page: &mut P) -> f64 {
    page.query(Query::Navbar)
        .map(|navbar| page.bounds(navbar).height)
        .unwrap_or(0.0)
}

/// Collapse the mobile menu when it is currently expanded.
pub fn close_mobile_menu<P: Page>(page: &mut P, collapse_id: &str) -> bool {
    match page.element_by_id(collapse_id) {
        Some(collapse) if page.has_class(collapse, "show") => {
            page.hide_collapse(collapse);
            true
        }
        _ => false,
    }
}
