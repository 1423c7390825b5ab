// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::event::ShaftEvent;
use crate::output::DecoderFeed;

/// Diagnostic trace that is cleared whenever the emulated speed changes in test mode.
pub trait TraceCollector: Send + Sync {
    fn reset(&self);
}

/// Record of the edges fed to the decoder.
///
/// Shared between the boundary callback, which appends, and the command context, which
/// resets it.
#[derive(Debug, Default)]
pub struct EventTrace {
    events: Mutex<Vec<ShaftEvent>>,
}

impl EventTrace {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ShaftEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, event: ShaftEvent) {
        self.lock().push(event);
    }

    pub fn events(&self) -> Vec<ShaftEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl TraceCollector for EventTrace {
    fn reset(&self) {
        self.lock().clear();
    }
}

impl DecoderFeed for Arc<EventTrace> {
    fn handle_shaft_signal(&mut self, event: ShaftEvent) {
        self.record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_as_feed_and_collector() {
        let trace = Arc::new(EventTrace::new());
        let mut feed = Arc::clone(&trace);
        feed.handle_shaft_signal(ShaftEvent::PrimaryRising);
        feed.handle_shaft_signal(ShaftEvent::PrimaryFalling);
        assert_eq!(
            trace.events(),
            vec![ShaftEvent::PrimaryRising, ShaftEvent::PrimaryFalling]
        );
        trace.reset();
        assert!(trace.is_empty());
    }
}
