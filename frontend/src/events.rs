//! Listener registrations and the events they produce
//!
//! Behaviours describe the listeners they need as [`Registration`]s; the host
//! attaches them and turns every DOM event into a [`PageEvent`] for
//! [`SiteEnhancer::handle`](crate::enhancer::SiteEnhancer::handle).

use crate::page::{NodeId, Timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Window,
    Document,
    Node(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    MouseEnter,
    Scroll,
    Submit,
    Load,
}

impl EventKind {
    pub fn dom_name(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::MouseEnter => "mouseenter",
            EventKind::Scroll => "scroll",
            EventKind::Submit => "submit",
            EventKind::Load => "load",
        }
    }
}

/// Which behaviour a listener feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    AnchorLink,
    ServiceCard,
    HoverCard,
    AccordionButton,
    CtaButton,
    MenuDismiss,
    FormValidation,
    ScrollTracking,
    LoadTiming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registration {
    pub target: ListenerTarget,
    pub kind: EventKind,
    pub role: Role,
}

impl Registration {
    pub fn node(node: NodeId, kind: EventKind, role: Role) -> Self {
        Self {
            target: ListenerTarget::Node(node),
            kind,
            role,
        }
    }

    pub fn window(kind: EventKind, role: Role) -> Self {
        Self {
            target: ListenerTarget::Window,
            kind,
            role,
        }
    }

    pub fn document(kind: EventKind, role: Role) -> Self {
        Self {
            target: ListenerTarget::Document,
            kind,
            role,
        }
    }

    /// Translate a fired listener into a page event. `event_target` is the
    /// element the DOM event originated from, when it is a known element.
    ///
    /// Element roles registered on the window or document produce `None`.
    pub fn event(&self, event_target: Option<NodeId>) -> Option<PageEvent> {
        let node = match self.target {
            ListenerTarget::Node(node) => Some(node),
            ListenerTarget::Window | ListenerTarget::Document => None,
        };
        let event = match self.role {
            Role::AnchorLink => PageEvent::AnchorClicked { link: node? },
            Role::ServiceCard => PageEvent::ServiceCardClicked { card: node? },
            Role::HoverCard => PageEvent::HoverCardEntered { card: node? },
            Role::AccordionButton => PageEvent::AccordionClicked { button: node? },
            Role::CtaButton => PageEvent::CtaClicked { button: node? },
            Role::FormValidation => PageEvent::FormSubmitted { form: node? },
            Role::MenuDismiss => PageEvent::DocumentClicked {
                target: event_target,
            },
            Role::ScrollTracking => PageEvent::Scrolled,
            Role::LoadTiming => PageEvent::Loaded,
        };
        Some(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageEvent {
    AnchorClicked { link: NodeId },
    ServiceCardClicked { card: NodeId },
    HoverCardEntered { card: NodeId },
    AccordionClicked { button: NodeId },
    CtaClicked { button: NodeId },
    FormSubmitted { form: NodeId },
    DocumentClicked { target: Option<NodeId> },
    Scrolled,
    Loaded,
    IntersectionChanged {
        node: NodeId,
        ratio: f64,
        is_intersecting: bool,
    },
    TimerElapsed(Timer),
}

/// What the host must do with the DOM event after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventOutcome {
    pub const NONE: Self = Self {
        prevent_default: false,
        stop_propagation: false,
    };

    pub const PREVENT_DEFAULT: Self = Self {
        prevent_default: true,
        stop_propagation: false,
    };

    pub const BLOCK: Self = Self {
        prevent_default: true,
        stop_propagation: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_roles_need_a_node() {
        let on_window = Registration::window(EventKind::Click, Role::AnchorLink);
        assert_eq!(on_window.event(None), None);

        let on_link = Registration::node(NodeId(7), EventKind::Click, Role::AnchorLink);
        assert_eq!(
            on_link.event(Some(NodeId(9))),
            Some(PageEvent::AnchorClicked { link: NodeId(7) })
        );
    }

    #[test]
    fn test_document_click_carries_origin() {
        let registration = Registration::document(EventKind::Click, Role::MenuDismiss);
        assert_eq!(
            registration.event(Some(NodeId(3))),
            Some(PageEvent::DocumentClicked {
                target: Some(NodeId(3))
            })
        );
        assert_eq!(
            registration.event(None),
            Some(PageEvent::DocumentClicked { target: None })
        );
        assert_eq!(EventKind::MouseEnter.dom_name(), "mouseenter");
    }
}
