//! Developer console output: branding banner, CTA click tracking, load time
//! and mobile detection.

use crate::events::{EventKind, Registration, Role};
use crate::page::{ConsoleLine, NodeId, Page, Query};
use shared::{DiagnosticsSection, is_mobile_user_agent};

pub fn banner_line(diagnostics: &DiagnosticsSection) -> ConsoleLine {
    ConsoleLine::styled(
        format!(
            "%c{} %c\n{}\n{}",
            diagnostics.brand_title, diagnostics.brand_tagline, diagnostics.brand_signature
        ),
        vec![diagnostics.title_style.clone(), diagnostics.body_style.clone()],
    )
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    config: DiagnosticsSection,
}

impl Diagnostics {
    pub fn new(diagnostics: &DiagnosticsSection) -> Self {
        Self {
            config: diagnostics.clone(),
        }
    }

    pub fn install<P: Page>(&self, page: &mut P) -> Vec<Registration> {
        if self.config.banner {
            page.console(banner_line(&self.config));
        }
        if is_mobile_user_agent(&page.user_agent(), &self.config.mobile_user_agents) {
            page.console(ConsoleLine::log("📱 Navigation mobile détectée"));
        }

        let mut registrations = Vec::new();
        if self.config.track_cta_clicks {
            registrations.extend(
                page.query_all(Query::CtaButtons)
                    .into_iter()
                    .map(|button| Registration::node(button, EventKind::Click, Role::CtaButton)),
            );
        }
        if self.config.report_load_time {
            registrations.push(Registration::window(EventKind::Load, Role::LoadTiming));
        }
        registrations
    }

    pub fn on_cta_click<P: Page>(&self, page: &mut P, button: NodeId) {
        let label = page.text_content(button);
        page.console(ConsoleLine::log(format!("CTA clicked: {}", label.trim())));
    }

    pub fn on_load<P: Page>(&self, page: &mut P) {
        match page.load_duration_ms() {
            Some(duration) => {
                page.console(ConsoleLine::log(format!("⚡ Page chargée en {duration:.0}ms")))
            }
            None => log::debug!("navigation timing unavailable"),
        }
    }
}
