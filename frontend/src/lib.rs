//! Progressive enhancement for the L'Ingé Patrimoine landing page.
//!
//! The page is plain Bootstrap markup. This crate compiles to a wasm module
//! that adds smooth in-page navigation, reveal-on-scroll, active section
//! tracking and a handful of small usability fixes once the document is
//! parsed. Every behaviour talks to the page through the [`Page`] trait, so
//! the same code runs against the browser (`web`) and against
//! [`MemoryPage`] in tests.

pub mod behaviors;
pub mod clipboard;
pub mod debounce;
pub mod enhancer;
pub mod events;
pub mod logging;
pub mod memory;
pub mod page;
pub mod relay;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clipboard::{ClipboardError, copy_to_clipboard};
pub use enhancer::SiteEnhancer;
pub use events::{EventOutcome, PageEvent, Registration};
pub use memory::MemoryPage;
pub use page::{NodeId, Page, Query};
pub use shared::SiteConfig;
