//! Scroll-triggered fade-in
//!
//! Every `.fade-in` element is watched for viewport intersection. Crossing the
//! threshold adds `visible` once; the class is never taken away again. The
//! hero block is revealed on a short timer so it animates even before the
//! first intersection report.

use crate::page::{NodeId, Page, Query, Timer};
use shared::RevealSection;

pub const VISIBLE_CLASS: &str = "visible";

/// Browsers may report the crossing itself slightly below the threshold.
const RATIO_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone)]
pub struct FadeInObserver {
    threshold: f64,
    unobserve_revealed: bool,
}

impl FadeInObserver {
    pub fn new(reveal: &RevealSection) -> Self {
        Self {
            threshold: reveal.threshold,
            unobserve_revealed: reveal.unobserve_revealed,
        }
    }

    /// Start observing every fade-in element. Returns how many are watched.
    pub fn install<P: Page>(&self, page: &mut P) -> usize {
        let elements = page.query_all(Query::FadeIn);
        for element in &elements {
            page.observe_intersection(*element, self.threshold);
        }
        elements.len()
    }

    pub fn on_intersection<P: Page>(
        &self,
        page: &mut P,
        node: NodeId,
        ratio: f64,
        is_intersecting: bool,
    ) {
        if !is_intersecting || ratio + RATIO_TOLERANCE < self.threshold {
            return;
        }
        page.add_class(node, VISIBLE_CLASS);
        if self.unobserve_revealed {
            page.unobserve_intersection(node);
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeroReveal {
    delay_ms: u32,
}

impl HeroReveal {
    pub fn new(reveal: &RevealSection) -> Self {
        Self {
            delay_ms: reveal.hero_delay_ms,
        }
    }

    pub fn install<P: Page>(&self, page: &mut P) {
        if let Some(node) = page.query(Query::HeroFadeIn) {
            page.set_timeout(Timer::HeroReveal { node }, self.delay_ms);
        }
    }

    pub fn on_timer<P: Page>(&self, page: &mut P, node: NodeId) {
        page.add_class(node, VISIBLE_CLASS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::landing_page;

    #[test]
    fn test_every_fade_in_is_observed_at_threshold() {
        let mut fixture = landing_page();
        let observer = FadeInObserver::new(&RevealSection::default());

        assert_eq!(observer.install(&mut fixture.page), 2);
        assert_eq!(fixture.page.observed().get(&fixture.about_fade), Some(&0.15));
        assert_eq!(fixture.page.observed().get(&fixture.hero_fade), Some(&0.15));
    }

    #[test]
    fn test_visible_only_past_threshold_and_never_reset() {
        let mut fixture = landing_page();
        let observer = FadeInObserver::new(&RevealSection::default());
        observer.install(&mut fixture.page);
        let node = fixture.about_fade;

        observer.on_intersection(&mut fixture.page, node, 0.0, false);
        observer.on_intersection(&mut fixture.page, node, 0.1, true);
        assert!(!fixture.page.has_class(node, VISIBLE_CLASS));

        observer.on_intersection(&mut fixture.page, node, 0.15, true);
        assert!(fixture.page.has_class(node, VISIBLE_CLASS));

        // Leaving and re-entering changes nothing
        observer.on_intersection(&mut fixture.page, node, 0.0, false);
        observer.on_intersection(&mut fixture.page, node, 0.6, true);
        assert!(fixture.page.has_class(node, VISIBLE_CLASS));
        assert!(fixture.page.observed().contains_key(&node));
    }

    #[test]
    fn test_crossing_reported_just_below_threshold_reveals() {
        let mut fixture = landing_page();
        let observer = FadeInObserver::new(&RevealSection::default());
        let node = fixture.about_fade;

        observer.on_intersection(&mut fixture.page, node, 0.14, true);
        assert!(!fixture.page.has_class(node, VISIBLE_CLASS));

        observer.on_intersection(&mut fixture.page, node, 0.1499, true);
        assert!(fixture.page.has_class(node, VISIBLE_CLASS));
    }

    #[test]
    fn test_unobserve_after_reveal_when_configured() {
        let mut fixture = landing_page();
        let observer = FadeInObserver::new(&RevealSection {
            unobserve_revealed: true,
            ..RevealSection::default()
        });
        observer.install(&mut fixture.page);

        observer.on_intersection(&mut fixture.page, fixture.about_fade, 0.5, true);

        assert!(!fixture.page.observed().contains_key(&fixture.about_fade));
        assert!(fixture.page.observed().contains_key(&fixture.hero_fade));
    }

    #[test]
    fn test_hero_revealed_after_delay() {
        let mut fixture = landing_page();
        let hero = HeroReveal::new(&RevealSection::default());
        hero.install(&mut fixture.page);

        assert!(fixture.page.advance(99).is_empty());
        let due = fixture.page.advance(1);
        assert_eq!(due, vec![Timer::HeroReveal { node: fixture.hero_fade }]);

        hero.on_timer(&mut fixture.page, fixture.hero_fade);
        assert!(fixture.page.has_class(fixture.hero_fade, VISIBLE_CLASS));
    }
}
