//! Event relays for host callbacks that arrive outside a DOM listener
//!
//! Intersection reports and timer expiry are produced by browser callbacks
//! that cannot borrow the page runtime themselves. They send into a [`Relay`]
//! and a single local task forwards everything to the dispatcher.

use crate::events::PageEvent;
use futures::StreamExt;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
#[cfg(debug_assertions)]
use std::sync::{Arc, OnceLock};

/// Typed sending half of an unbounded channel.
///
/// Relays follow the `{source}_{event}_relay` naming pattern, e.g.
/// `intersection_changed_relay` or `timer_elapsed_relay`.
#[derive(Clone, Debug)]
pub struct Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    sender: UnboundedSender<T>,
    #[cfg(debug_assertions)]
    emit_location: Arc<OnceLock<&'static std::panic::Location<'static>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("relay receiver dropped")]
    ChannelClosed,
    /// Relay sent from more than one call site (debug builds only)
    #[cfg(debug_assertions)]
    #[error("relay emitted from {current}, already emitted from {previous}")]
    MultipleEmitters {
        previous: &'static std::panic::Location<'static>,
        current: &'static std::panic::Location<'static>,
    },
}

impl<T> Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> (Self, UnboundedReceiver<T>) {
        let (sender, receiver) = unbounded();
        (
            Relay {
                sender,
                #[cfg(debug_assertions)]
                emit_location: Arc::new(OnceLock::new()),
            },
            receiver,
        )
    }

    #[cfg(debug_assertions)]
    #[track_caller]
    fn check_single_source(&self) -> Result<(), RelayError> {
        let caller = std::panic::Location::caller();
        let previous = *self.emit_location.get_or_init(|| caller);
        if previous == caller {
            Ok(())
        } else {
            Err(RelayError::MultipleEmitters {
                previous,
                current: caller,
            })
        }
    }

    /// Send an event; silently dropped once the receiver is gone.
    #[track_caller]
    pub fn send(&self, value: T) {
        #[cfg(debug_assertions)]
        if let Err(error) = self.check_single_source() {
            panic!("{error}");
        }
        let _ = self.sender.unbounded_send(value);
    }

    #[track_caller]
    pub fn try_send(&self, value: T) -> Result<(), RelayError> {
        #[cfg(debug_assertions)]
        self.check_single_source()?;

        self.sender
            .unbounded_send(value)
            .map_err(|_| RelayError::ChannelClosed)
    }
}

pub fn relay<T>() -> (Relay<T>, UnboundedReceiver<T>)
where
    T: Clone + Send + Sync + 'static,
{
    Relay::new()
}

/// Forward events from both host streams to `dispatch` until both relays are
/// dropped. Returns how many events were forwarded.
pub async fn forward_host_events<F>(
    intersection_changed_stream: UnboundedReceiver<PageEvent>,
    timer_elapsed_stream: UnboundedReceiver<PageEvent>,
    mut dispatch: F,
) -> usize
where
    F: FnMut(PageEvent),
{
    let mut events = futures::stream::select(intersection_changed_stream, timer_elapsed_stream);
    let mut forwarded = 0;
    while let Some(event) = events.next().await {
        dispatch(event);
        forwarded += 1;
    }
    forwarded
}
