/// Snapshot of one optimizer iteration, emitted for diagnostics only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationEvent {
    pub iteration: usize,
    /// Registration cost (negative normalized cross-correlation).
    pub metric_value: f64,
    /// Windowed convergence value; infinite until the window has filled.
    pub convergence_value: f64,
    pub learning_rate: f64,
}

/// Receives per-iteration events from a registration.
///
/// Observers never influence the numerical result. Any
/// `Fn(&IterationEvent) + Send + Sync` closure is an observer.
pub trait RegistrationObserver: Send + Sync {
    fn on_iteration(&self, _event: &IterationEvent) {}
}

/// Observer that ignores every event.
pub struct NoOpObserver;

impl RegistrationObserver for NoOpObserver {}

impl<F> RegistrationObserver for F
where
    F: Fn(&IterationEvent) + Send + Sync,
{
    fn on_iteration(&self, event: &IterationEvent) {
        self(event)
    }
}
