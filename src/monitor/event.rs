//! The event race that drives the sampling loop.
//!
//! Three sources compete: the repeating tick timer, the run deadline and an
//! external interrupt. [`EventSource::next`] blocks until one of them fires
//! and reports which.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant, Sleep};

/// Boxed interrupt future, resolved on SIGINT/SIGTERM in the binary.
pub type Interrupt = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Tick,
    Deadline,
    Interrupt,
}

pub struct EventSource {
    interval: Duration,
    next_tick: Instant,
    deadline: Pin<Box<Sleep>>,
    interrupt: Option<Interrupt>,
}

impl EventSource {
    /// Arms the deadline `length` from now and schedules the first tick
    /// immediately.
    pub fn new(
        interval: Duration,
        length: Duration,
        interrupt: impl Future<Output = ()> + Send + 'static,
    ) -> Self {
        Self {
            interval,
            next_tick: Instant::now(),
            deadline: Box::pin(sleep(length)),
            interrupt: Some(Box::pin(interrupt)),
        }
    }

    /// Schedules the next tick one interval from now.
    pub fn rearm(&mut self) {
        self.next_tick = Instant::now() + self.interval;
    }

    /// Waits for the next event.
    ///
    /// Termination events win over a tick that is ready at the same moment.
    /// The interrupt fires at most once.
    pub async fn next(&mut self) -> Event {
        let Self {
            next_tick,
            deadline,
            interrupt,
            ..
        } = self;

        let interrupted = async {
            match interrupt.as_mut() {
                Some(pending) => pending.await,
                None => std::future::pending().await,
            }
        };

        let event = tokio::select! {
            biased;
            _ = interrupted => Event::Interrupt,
            _ = deadline.as_mut() => Event::Deadline,
            _ = sleep_until(*next_tick) => Event::Tick,
        };

        if event == Event::Interrupt {
            *interrupt = None;
        }
        event
    }
}
