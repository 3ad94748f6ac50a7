//! Page behaviours
//!
//! Each behaviour owns the element selections it needs, registers its
//! listeners once at startup and reacts to the events routed to it by
//! [`SiteEnhancer`](crate::enhancer::SiteEnhancer). Behaviours never call each
//! other.

pub mod accordion;
pub mod anchor_scroll;
pub mod cards;
pub mod diagnostics;
pub mod document;
pub mod forms;
pub mod menu;
pub mod navbar_shadow;
pub mod section_tracker;
pub mod visibility;

pub use accordion::AccordionScroll;
pub use anchor_scroll::AnchorScroll;
pub use cards::{HoverCardTransition, ServiceCardToggle};
pub use diagnostics::Diagnostics;
pub use document::DocumentFixups;
pub use forms::FormValidation;
pub use menu::MenuDismiss;
pub use navbar_shadow::NavbarShadow;
pub use section_tracker::SectionTracker;
pub use visibility::{FadeInObserver, HeroReveal};
