//! Simulation-clock timers
//!
//! Tracks a monotonic simulation clock and fires one-shot or repeating
//! callbacks against a context. Repeating events fire at most once per
//! `update`, so a large dt never produces a catch-up burst. Cancellation is
//! cooperative: `cancel` flags the event and the next update purges it.
//!
//! The callback type is `FnMut(&mut Ctx)`. When `Ctx` owns the scheduler
//! (the scene does), dispatch runs through the three-phase
//! `advance`/`checkout`/`purge` API so a callback can mutate the scheduler
//! it lives in; standalone users just call [`Scheduler::update`].

pub type TimerFn<Ctx> = Box<dyn FnMut(&mut Ctx)>;

/// Opaque id for cancelling a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy)]
enum Cadence {
    Once { at: f32, fired: bool },
    Every { interval: f32, next: f32 },
}

struct TimerEvent<Ctx> {
    id: TimerId,
    cadence: Cadence,
    cancelled: bool,
    /// Taken out during dispatch so the callback can reach the scheduler
    callback: Option<TimerFn<Ctx>>,
}

pub struct Scheduler<Ctx> {
    time: f32,
    next_id: u64,
    events: Vec<TimerEvent<Ctx>>,
}

impl<Ctx> Default for Scheduler<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> Scheduler<Ctx> {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            next_id: 0,
            events: Vec::new(),
        }
    }

    /// Current simulation clock in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    fn push(&mut self, cadence: Cadence, f: impl FnMut(&mut Ctx) + 'static) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.events.push(TimerEvent {
            id,
            cadence,
            cancelled: false,
            callback: Some(Box::new(f)),
        });
        id
    }

    /// Fire once when the clock reaches the absolute time `t`
    pub fn at(&mut self, t: f32, f: impl FnMut(&mut Ctx) + 'static) -> TimerId {
        self.push(Cadence::Once { at: t, fired: false }, f)
    }

    /// Fire once `dt` seconds from now
    pub fn after(&mut self, dt: f32, f: impl FnMut(&mut Ctx) + 'static) -> TimerId {
        self.at(self.time + dt, f)
    }

    /// Fire every `interval` seconds, first after `start_delay`
    pub fn every(
        &mut self,
        interval: f32,
        start_delay: f32,
        f: impl FnMut(&mut Ctx) + 'static,
    ) -> TimerId {
        let next = self.time + start_delay;
        self.push(Cadence::Every { interval, next }, f)
    }

    /// Flag an event for removal; checked on the next update
    pub fn cancel(&mut self, id: TimerId) {
        if let Some(ev) = self.events.iter_mut().find(|e| e.id == id) {
            ev.cancelled = true;
        }
    }

    /// Drop every event
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Advance the clock and collect the events due this tick. Repeating
    /// events advance their next-fire time by one interval only.
    /// Events scheduled from a dispatched callback become eligible next
    /// tick.
    pub fn advance(&mut self, dt: f32) -> Vec<TimerId> {
        self.time += dt;
        let mut due = Vec::new();
        for ev in &mut self.events {
            if ev.cancelled {
                continue;
            }
            match &mut ev.cadence {
                Cadence::Once { at, fired } => {
                    if self.time >= *at && !*fired {
                        *fired = true;
                        due.push(ev.id);
                    }
                }
                Cadence::Every { interval, next } => {
                    if self.time >= *next {
                        *next += *interval;
                        due.push(ev.id);
                    }
                }
            }
        }
        due
    }

    /// Take a due event's callback out for invocation. `None` when the
    /// event was cancelled or cleared in the meantime.
    pub fn checkout(&mut self, id: TimerId) -> Option<TimerFn<Ctx>> {
        self.events
            .iter_mut()
            .find(|e| e.id == id && !e.cancelled)
            .and_then(|e| e.callback.take())
    }

    /// Put a checked-out callback back. A no-op when the event vanished
    /// (e.g. `clear` from inside the callback).
    pub fn restore(&mut self, id: TimerId, callback: TimerFn<Ctx>) {
        if let Some(ev) = self.events.iter_mut().find(|e| e.id == id) {
            ev.callback = Some(callback);
        }
    }

    /// Remove cancelled events and fired one-shots
    pub fn purge(&mut self) {
        self.events.retain(|e| {
            !e.cancelled && e.callback.is_some() && !matches!(e.cadence, Cadence::Once { fired: true, .. })
        });
    }

    /// Advance, dispatch and purge in one call, for contexts that do not
    /// own the scheduler
    pub fn update(&mut self, dt: f32, ctx: &mut Ctx) {
        for id in self.advance(dt) {
            if let Some(mut cb) = self.checkout(id) {
                cb(ctx);
                self.restore(id, cb);
            }
        }
        self.purge();
    }
}

impl<Ctx> std::fmt::Debug for Scheduler<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("time", &self.time)
            .field("events", &self.events.len())
            .finish()
    }
}
