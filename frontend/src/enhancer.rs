//! Startup wiring and event dispatch
//!
//! `SiteEnhancer` is built once when the page structure is ready. `install`
//! applies the one-shot fix-ups, runs the initial scroll evaluation and
//! returns the listener table; afterwards the host feeds every fired listener,
//! intersection report and timer back through `handle`.

use crate::behaviors::{
    AccordionScroll, AnchorScroll, Diagnostics, DocumentFixups, FadeInObserver, FormValidation,
    HeroReveal, HoverCardTransition, MenuDismiss, NavbarShadow, SectionTracker, ServiceCardToggle,
};
use crate::debounce::Debouncer;
use crate::events::{EventKind, EventOutcome, PageEvent, Registration, Role};
use crate::page::{Page, Timer};
use shared::SiteConfig;

pub struct SiteEnhancer {
    anchors: AnchorScroll,
    fade_in: FadeInObserver,
    hero: HeroReveal,
    sections: SectionTracker,
    shadow: NavbarShadow,
    scroll_debounce: Debouncer,
    settle_after_burst: bool,
    scroll_dirty: bool,
    cards: ServiceCardToggle,
    hover: HoverCardTransition,
    accordion: AccordionScroll,
    menu: MenuDismiss,
    forms: FormValidation,
    document: DocumentFixups,
    diagnostics: Diagnostics,
}

impl SiteEnhancer {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            anchors: AnchorScroll::new(&config.navigation),
            fade_in: FadeInObserver::new(&config.reveal),
            hero: HeroReveal::new(&config.reveal),
            sections: SectionTracker::new(&config.scroll),
            shadow: NavbarShadow::new(&config.scroll),
            scroll_debounce: Debouncer::new(
                config.scroll.debounce_wait_ms,
                config.scroll.debounce_immediate,
            ),
            settle_after_burst: config.scroll.settle_after_burst,
            scroll_dirty: false,
            cards: ServiceCardToggle::new(),
            hover: HoverCardTransition,
            accordion: AccordionScroll::new(&config.navigation),
            menu: MenuDismiss::new(&config.navigation),
            forms: FormValidation,
            document: DocumentFixups::new(&config.document),
            diagnostics: Diagnostics::new(&config.diagnostics),
        }
    }

    /// Set up every behaviour and return the listeners the host must attach.
    pub fn install<P: Page>(&mut self, page: &mut P) -> Vec<Registration> {
        let mut registrations = self.anchors.install(page);

        let watched = self.fade_in.install(page);

        self.sections.install(page);
        self.shadow.install(page);
        self.refresh_scroll_state(page);
        registrations.push(Registration::window(EventKind::Scroll, Role::ScrollTracking));

        registrations.extend(self.hover.install(page));
        registrations.extend(self.cards.install(page));
        registrations.extend(self.accordion.install(page));
        self.hero.install(page);
        registrations.extend(self.diagnostics.install(page));
        self.document.apply(page);
        registrations.push(self.menu.install());
        registrations.extend(self.forms.install(page));

        log::info!(
            "page enhanced: {} listeners, {} fade-in elements watched",
            registrations.len(),
            watched
        );
        registrations
    }

    pub fn handle<P: Page>(&mut self, page: &mut P, event: PageEvent) -> EventOutcome {
        match event {
            PageEvent::AnchorClicked { link } => self.anchors.on_click(page, link),
            PageEvent::ServiceCardClicked { card } => self.cards.on_click(page, card),
            PageEvent::HoverCardEntered { card } => {
                self.hover.on_enter(page, card);
                EventOutcome::NONE
            }
            PageEvent::AccordionClicked { button } => {
                self.accordion.on_click(page, button);
                EventOutcome::NONE
            }
            PageEvent::CtaClicked { button } => {
                self.diagnostics.on_cta_click(page, button);
                EventOutcome::NONE
            }
            PageEvent::FormSubmitted { form } => self.forms.on_submit(page, form),
            PageEvent::DocumentClicked { target } => {
                self.menu.on_document_click(page, target);
                EventOutcome::NONE
            }
            PageEvent::Scrolled => {
                self.on_scroll(page);
                EventOutcome::NONE
            }
            PageEvent::Loaded => {
                self.diagnostics.on_load(page);
                EventOutcome::NONE
            }
            PageEvent::IntersectionChanged {
                node,
                ratio,
                is_intersecting,
            } => {
                self.fade_in
                    .on_intersection(page, node, ratio, is_intersecting);
                EventOutcome::NONE
            }
            PageEvent::TimerElapsed(timer) => {
                self.on_timer(page, timer);
                EventOutcome::NONE
            }
        }
    }

    fn on_scroll<P: Page>(&mut self, page: &mut P) {
        let trigger = self.scroll_debounce.trigger();
        if let Some(token) = trigger.cancel {
            page.clear_timeout(Timer::ScrollDebounce { token });
        }
        page.set_timeout(
            Timer::ScrollDebounce {
                token: trigger.schedule,
            },
            self.scroll_debounce.wait_ms(),
        );

        if trigger.fire_now {
            self.refresh_scroll_state(page);
        } else {
            self.scroll_dirty = true;
        }
    }

    fn on_timer<P: Page>(&mut self, page: &mut P, timer: Timer) {
        match timer {
            Timer::ScrollDebounce { token } => {
                let fire = self.scroll_debounce.elapsed(token);
                if !self.scroll_debounce.is_idle() {
                    return;
                }
                // A burst ended with positions nobody looked at yet
                let settle = self.settle_after_burst && self.scroll_dirty;
                if fire || settle {
                    self.refresh_scroll_state(page);
                }
            }
            Timer::AccordionScroll { button } => self.accordion.on_timer(page, button),
            Timer::HeroReveal { node } => self.hero.on_timer(page, node),
        }
    }

    fn refresh_scroll_state<P: Page>(&mut self, page: &mut P) {
        self.scroll_dirty = false;
        self.sections.update(page);
        self.shadow.update(page);
    }
}
