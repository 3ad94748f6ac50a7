//! Browser backend
//!
//! [`WebPage`] implements [`Page`] over `web_sys`. The module start hook reads
//! the inline site config, installs a [`SiteEnhancer`] once the document is
//! parsed and attaches the listeners it asks for.

use crate::clipboard::{ClipboardError, copy_to_clipboard};
use crate::enhancer::SiteEnhancer;
use crate::events::{EventOutcome, ListenerTarget, PageEvent, Registration, Role};
use crate::logging;
use crate::page::{
    Bounds, ConsoleLevel, ConsoleLine, NodeId, Page, Query, ReadyState, ScrollBehavior, Timer,
};
use crate::relay::{Relay, forward_host_events, relay};
use gloo_timers::callback::Timeout;
use shared::SiteConfig;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlFormElement, HtmlLinkElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, ScrollToOptions,
    Window,
};

/// `<script id="site-config" type="application/toml">` holding a partial [`SiteConfig`].
const CONFIG_ELEMENT_ID: &str = "site-config";

#[wasm_bindgen(inline_js = r#"
export function hide_bootstrap_collapse(element) {
  if (typeof bootstrap === 'undefined' || !bootstrap.Collapse) return false;
  new bootstrap.Collapse(element, { toggle: false }).hide();
  return true;
}
"#)]
extern "C" {
    fn hide_bootstrap_collapse(element: &Element) -> bool;
}

#[derive(Debug, Error)]
pub enum StartError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("failed to attach `{kind}` listener: {message}")]
    Listener { kind: &'static str, message: String },
}

fn js_error_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|error| String::from(error.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

// ===== PAGE =====

pub struct WebPage {
    window: Window,
    document: Document,
    /// Index is the `NodeId`. Shared with the intersection callback.
    nodes: Rc<RefCell<Vec<Element>>>,
    observers: HashMap<u64, IntersectionObserver>,
    observer_callback: Closure<dyn FnMut(js_sys::Array)>,
    timeouts: HashMap<Timer, Timeout>,
    timer_elapsed_relay: Relay<PageEvent>,
}

impl WebPage {
    pub fn new(
        window: Window,
        document: Document,
        intersection_changed_relay: Relay<PageEvent>,
        timer_elapsed_relay: Relay<PageEvent>,
    ) -> Self {
        let nodes = Rc::new(RefCell::new(Vec::<Element>::new()));

        let observer_callback = Closure::wrap(Box::new({
            let nodes = Rc::clone(&nodes);
            move |entries: js_sys::Array| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    let target = entry.target();
                    let Some(index) = nodes.borrow().iter().position(|node| *node == target)
                    else {
                        continue;
                    };
                    intersection_changed_relay.send(PageEvent::IntersectionChanged {
                        node: NodeId(index as u32),
                        ratio: entry.intersection_ratio(),
                        is_intersecting: entry.is_intersecting(),
                    });
                }
            }
        }) as Box<dyn FnMut(js_sys::Array)>);

        Self {
            window,
            document,
            nodes,
            observers: HashMap::new(),
            observer_callback,
            timeouts: HashMap::new(),
            timer_elapsed_relay,
        }
    }

    /// A page for one-off calls outside the running enhancer. Observer and
    /// timer reports go nowhere.
    pub fn detached(window: Window, document: Document) -> Self {
        let (intersection_changed_relay, _) = relay();
        let (timer_elapsed_relay, _) = relay();
        Self::new(window, document, intersection_changed_relay, timer_elapsed_relay)
    }

    fn intern(&self, element: Element) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let index = match nodes.iter().position(|known| *known == element) {
            Some(index) => index,
            None => {
                nodes.push(element);
                nodes.len() - 1
            }
        };
        NodeId(index as u32)
    }

    fn element(&self, node: NodeId) -> Option<Element> {
        self.nodes.borrow().get(node.0 as usize).cloned()
    }

    fn html_element(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn observer(&mut self, threshold: f64) -> Option<IntersectionObserver> {
        let key = threshold.to_bits();
        if let Some(observer) = self.observers.get(&key) {
            return Some(observer.clone());
        }
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        match IntersectionObserver::new_with_options(
            self.observer_callback.as_ref().unchecked_ref(),
            &init,
        ) {
            Ok(observer) => {
                self.observers.insert(key, observer.clone());
                Some(observer)
            }
            Err(error) => {
                log::warn!("IntersectionObserver unavailable: {}", js_error_message(&error));
                None
            }
        }
    }

    /// Forget a timeout that has already fired.
    fn timer_fired(&mut self, timer: Timer) {
        self.timeouts.remove(&timer);
    }
}

impl Page for WebPage {
    fn element_by_id(&mut self, id: &str) -> Option<NodeId> {
        let element = self.document.get_element_by_id(id)?;
        Some(self.intern(element))
    }

    fn query_all(&mut self, query: Query) -> Vec<NodeId> {
        let list = match self.document.query_selector_all(query.selector()) {
            Ok(list) => list,
            Err(error) => {
                log::warn!(
                    "selector `{}` rejected: {}",
                    query.selector(),
                    js_error_message(&error)
                );
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.intern(element))
            .collect()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(element) = self.element(node) else {
            return;
        };
        if let Err(error) = element.set_attribute(name, value) {
            log::warn!("set_attribute({name}) failed: {}", js_error_message(&error));
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|element| element.class_list().contains(class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            if let Err(error) = element.class_list().add_1(class) {
                log::warn!("add class `{class}` failed: {}", js_error_message(&error));
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element(node) {
            if let Err(error) = element.class_list().remove_1(class) {
                log::warn!("remove class `{class}` failed: {}", js_error_message(&error));
            }
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let Some(element) = self.html_element(node) else {
            return;
        };
        if let Err(error) = element.style().set_property(property, value) {
            log::warn!("style {property} rejected: {}", js_error_message(&error));
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        self.element(node)
            .and_then(|element| element.text_content())
            .unwrap_or_default()
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Some(ancestor), Some(node)) => ancestor.contains(Some(node.as_ref())),
            _ => false,
        }
    }

    fn bounds(&self, node: NodeId) -> Bounds {
        let Some(element) = self.element(node) else {
            return Bounds::default();
        };
        let rect = element.get_bounding_client_rect();
        Bounds {
            top: rect.top() + self.scroll_y(),
            height: rect.height(),
        }
    }

    fn wrap(&mut self, node: NodeId, tag: &str, class: &str) {
        let Some(element) = self.element(node) else {
            return;
        };
        let Some(parent) = element.parent_node() else {
            return;
        };
        let wrapped = self.document.create_element(tag).and_then(|wrapper| {
            wrapper.set_class_name(class);
            parent.insert_before(&wrapper, Some(element.as_ref()))?;
            wrapper.append_child(&element)
        });
        if let Err(error) = wrapped {
            log::warn!("wrapping element in <{tag}> failed: {}", js_error_message(&error));
        }
    }

    fn append_head_link(&mut self, rel: &str, href: &str) {
        let Some(head) = self.document.head() else {
            return;
        };
        let appended = self
            .document
            .create_element("link")
            .and_then(|link| {
                let link: HtmlLinkElement = link.unchecked_into();
                link.set_rel(rel);
                link.set_href(href);
                head.append_child(&link)
            });
        if let Err(error) = appended {
            log::warn!("<link rel={rel}> not added: {}", js_error_message(&error));
        }
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn is_touch_device(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("ontouchstart")).unwrap_or(false)
    }

    fn user_agent(&self) -> String {
        self.window.navigator().user_agent().unwrap_or_default()
    }

    fn hide_collapse(&mut self, node: NodeId) {
        let Some(element) = self.element(node) else {
            return;
        };
        if !hide_bootstrap_collapse(&element) {
            log::warn!("bootstrap.Collapse missing, dropping `show` directly");
            self.remove_class(node, "show");
        }
    }

    fn observe_intersection(&mut self, node: NodeId, threshold: f64) {
        let Some(element) = self.element(node) else {
            return;
        };
        if let Some(observer) = self.observer(threshold) {
            observer.observe(&element);
        }
    }

    fn unobserve_intersection(&mut self, node: NodeId) {
        let Some(element) = self.element(node) else {
            return;
        };
        for observer in self.observers.values() {
            observer.unobserve(&element);
        }
    }

    fn check_validity(&self, form: NodeId) -> bool {
        self.element(form)
            .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
            .is_none_or(|form| form.check_validity())
    }

    fn set_timeout(&mut self, timer: Timer, delay_ms: u32) {
        let timer_elapsed_relay = self.timer_elapsed_relay.clone();
        let timeout = Timeout::new(delay_ms, move || {
            timer_elapsed_relay.send(PageEvent::TimerElapsed(timer));
        });
        // Replacing an entry drops the old `Timeout`, which cancels it
        self.timeouts.insert(timer, timeout);
    }

    fn clear_timeout(&mut self, timer: Timer) {
        self.timeouts.remove(&timer);
    }

    fn load_duration_ms(&self) -> Option<f64> {
        let performance = self.window.performance()?;
        let timing = performance.timing();
        let (start, end) = (timing.navigation_start(), timing.load_event_end());
        // loadEventEnd stays 0 while load listeners are still running
        if end > 0.0 && end >= start {
            Some(end - start)
        } else {
            Some(performance.now())
        }
    }

    fn console(&mut self, line: ConsoleLine) {
        let text = JsValue::from_str(&line.text);
        match line.level {
            ConsoleLevel::Error => web_sys::console::error_1(&text),
            ConsoleLevel::Log if line.styles.is_empty() => web_sys::console::log_1(&text),
            ConsoleLevel::Log => {
                let arguments = js_sys::Array::new();
                arguments.push(&text);
                for style in &line.styles {
                    arguments.push(&JsValue::from_str(style));
                }
                web_sys::console::log(&arguments);
            }
        }
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), ClipboardError> {
        let navigator = self.window.navigator();
        let available = js_sys::Reflect::get(&navigator, &JsValue::from_str("clipboard"))
            .is_ok_and(|clipboard| !clipboard.is_undefined() && !clipboard.is_null());
        if !available {
            return Err(ClipboardError::Unavailable);
        }
        JsFuture::from(navigator.clipboard().write_text(text))
            .await
            .map(|_| ())
            .map_err(|error| ClipboardError::Rejected(js_error_message(&error)))
    }
}

// ===== RUNTIME =====

struct Runtime {
    page: WebPage,
    enhancer: SiteEnhancer,
}

impl Runtime {
    fn handle(&mut self, event: PageEvent) -> EventOutcome {
        if let PageEvent::TimerElapsed(timer) = event {
            self.page.timer_fired(timer);
        }
        self.enhancer.handle(&mut self.page, event)
    }
}

fn apply_outcome(event: &Event, outcome: EventOutcome) {
    if outcome.prevent_default {
        event.prevent_default();
    }
    if outcome.stop_propagation {
        event.stop_propagation();
    }
}

fn attach(runtime: &Rc<RefCell<Runtime>>, registration: Registration) -> Result<(), StartError> {
    let target: EventTarget = {
        let state = runtime.borrow();
        match registration.target {
            ListenerTarget::Window => state.page.window.clone().into(),
            ListenerTarget::Document => state.page.document.clone().into(),
            ListenerTarget::Node(node) => match state.page.element(node) {
                Some(element) => element.into(),
                None => return Ok(()),
            },
        }
    };

    let listener = Closure::wrap(Box::new({
        let runtime = Rc::clone(runtime);
        move |event: Event| {
            let Ok(mut state) = runtime.try_borrow_mut() else {
                log::debug!("{:?} fired during dispatch, skipped", registration.role);
                return;
            };
            // Only outside-click dismissal needs to know where the click came from
            let origin = (registration.role == Role::MenuDismiss)
                .then(|| event.target())
                .flatten()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .map(|element| state.page.intern(element));
            if let Some(page_event) = registration.event(origin) {
                let outcome = state.handle(page_event);
                apply_outcome(&event, outcome);
            }
        }
    }) as Box<dyn FnMut(Event)>);

    let kind = registration.kind.dom_name();
    target
        .add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())
        .map_err(|error| StartError::Listener {
            kind,
            message: js_error_message(&error),
        })?;
    listener.forget();
    Ok(())
}

fn start(window: Window, document: Document, config: SiteConfig) -> Result<(), StartError> {
    let (intersection_changed_relay, intersection_changed_stream) = relay();
    let (timer_elapsed_relay, timer_elapsed_stream) = relay();
    let already_loaded = ReadyState::from_dom(&document.ready_state()) == ReadyState::Complete;

    let mut page = WebPage::new(window, document, intersection_changed_relay, timer_elapsed_relay);
    let mut enhancer = SiteEnhancer::new(&config);
    let registrations = enhancer.install(&mut page);
    let runtime = Rc::new(RefCell::new(Runtime { page, enhancer }));

    for registration in registrations {
        if registration.role == Role::LoadTiming && already_loaded {
            // `load` fired before the module finished loading
            runtime.borrow_mut().handle(PageEvent::Loaded);
            continue;
        }
        attach(&runtime, registration)?;
    }

    // From here on the runtime is owned by the leaked listeners and this task
    spawn_local({
        let runtime = Rc::clone(&runtime);
        async move {
            let forwarded = forward_host_events(
                intersection_changed_stream,
                timer_elapsed_stream,
                |event| match runtime.try_borrow_mut() {
                    Ok(mut state) => {
                        state.handle(event);
                    }
                    Err(_) => log::debug!("{event:?} arrived during dispatch, skipped"),
                },
            )
            .await;
            log::debug!("host event forwarding stopped after {forwarded} events");
        }
    });

    Ok(())
}

fn boot() -> Result<(), StartError> {
    let window = web_sys::window().ok_or(StartError::NoWindow)?;
    let document = window.document().ok_or(StartError::NoDocument)?;

    let source = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content());
    let parsed = source.as_deref().map(SiteConfig::from_toml_str).transpose();
    let (config, config_error) = match parsed {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(error) => (SiteConfig::default(), Some(error)),
    };

    if logging::init(&config.diagnostics.log_level).is_err() {
        log::debug!("logger already installed");
    }
    if let Some(error) = config_error {
        log::warn!("{error}; using the default site config");
    }

    if ReadyState::from_dom(&document.ready_state()) == ReadyState::Loading {
        let ready = Closure::once_into_js({
            let document = document.clone();
            move || {
                if let Err(error) = start(window, document, config) {
                    log::error!("site enhancer failed to start: {error}");
                }
            }
        });
        document
            .add_event_listener_with_callback("DOMContentLoaded", ready.unchecked_ref())
            .map_err(|error| StartError::Listener {
                kind: "DOMContentLoaded",
                message: js_error_message(&error),
            })
    } else {
        start(window, document, config)
    }
}

#[wasm_bindgen(start)]
pub fn run() {
    console_error_panic_hook::set_once();
    if let Err(error) = boot() {
        web_sys::console::error_1(&JsValue::from_str(&format!(
            "site enhancer failed to start: {error}"
        )));
    }
}

/// `copyToClipboard(text)` for inline handlers in the page markup.
#[wasm_bindgen(js_name = copyToClipboard)]
pub async fn copy_to_clipboard_export(text: String) -> Result<(), JsValue> {
    let window =
        web_sys::window().ok_or_else(|| JsValue::from_str(&StartError::NoWindow.to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str(&StartError::NoDocument.to_string()))?;
    let mut page = WebPage::detached(window, document);
    copy_to_clipboard(&mut page, &text).await;
    Ok(())
}
