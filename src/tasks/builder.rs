use std::sync::Arc;

use crate::{
    clock::{Clock, ClockRef, MonotonicClock},
    core::{Callback, Config, Inner},
    events::Bus,
    policies::BatchPolicy,
    scheduler::{Schedule, SchedulerRef, TokioScheduler},
    subscribers::{Subscribe, SubscriberSet},
};

use super::{done::Settle, BatchTask, Flow};

/// Builder for constructing a [`BatchTask`] with optional collaborators.
///
/// Anything left unset falls back to:
/// - policy: [`Config::policy`]
/// - scheduler: a fresh [`TokioScheduler`] (requires a Tokio runtime)
/// - clock: [`MonotonicClock`]
/// - name: `"batch"`
pub struct BatchTaskBuilder<T> {
    values: Vec<T>,
    callback: Callback<T>,
    name: Arc<str>,
    cfg: Config,
    policy: Option<BatchPolicy>,
    scheduler: Option<SchedulerRef>,
    clock: Option<ClockRef>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<T: Send + Sync + 'static> BatchTaskBuilder<T> {
    /// Creates a builder over `values` and `callback`.
    pub fn new<I, F, R>(values: I, mut callback: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T) -> R + Send + 'static,
        R: Into<Flow>,
    {
        Self {
            values: values.into_iter().collect(),
            callback: Box::new(move |v: &T| callback(v).into()),
            name: Arc::from("batch"),
            cfg: Config::default(),
            policy: None,
            scheduler: None,
            clock: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the task name used in events.
    pub fn name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the defaults this task starts from.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the batching policy, overriding [`Config::policy`].
    pub fn policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the scheduler continuations are deferred to.
    pub fn scheduler(mut self, scheduler: impl Schedule) -> Self {
        self.scheduler = Some(Arc::new(scheduler));
        self
    }

    /// Sets a shared scheduler handle.
    pub fn scheduler_ref(mut self, scheduler: SchedulerRef) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Sets the clock the milliseconds policy measures batches with.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive task events through dedicated workers with bounded
    /// queues. Attaching any subscriber requires a Tokio runtime.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the task and schedules its first continuation.
    ///
    /// The callback is never invoked from here; it first runs when the scheduler
    /// runs the first continuation.
    ///
    /// # Panics
    /// Panics outside a Tokio runtime when no scheduler was set or subscribers were
    /// attached.
    pub fn spawn(self) -> BatchTask<T> {
        let policy = self.policy.unwrap_or(self.cfg.policy).clamped();
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler::new()));
        let clock = self.clock.unwrap_or_else(MonotonicClock::arc);
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        if !self.subscribers.is_empty() {
            // Detached: the listener exits on its own once the bus closes.
            drop(SubscriberSet::new(self.subscribers, &bus).forward(bus.subscribe()));
        }

        let (settle, done) = Settle::new();
        let inner = Arc::new(Inner::new(
            self.name,
            self.values,
            self.callback,
            policy,
            scheduler,
            clock,
            settle,
            bus,
        ));
        inner.start();

        BatchTask::from_parts(inner, done)
    }
}
