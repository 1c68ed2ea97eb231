use std::marker::PhantomData;
use std::sync::Arc;

use super::TokioEngine;
use crate::{
    config::Config,
    events::Bus,
    observers::{Observe, ObserverSet},
    tasks::Payload,
};

/// Builder for constructing a [`TokioEngine`] with optional observers.
pub struct EngineBuilder<V> {
    cfg: Config,
    observers: Vec<Arc<dyn Observe>>,
    _payload: PhantomData<fn() -> V>,
}

impl<V: Payload> EngineBuilder<V> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            observers: Vec::new(),
            _payload: PhantomData,
        }
    }

    /// Sets event observers.
    ///
    /// Observers receive runtime events (forks, completions, race decisions, etc.)
    /// through dedicated workers with bounded queues.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Builds and returns the engine.
    ///
    /// With observers attached this spawns their workers and the bus listener,
    /// so it must run inside a tokio runtime.
    pub fn build(self) -> Arc<TokioEngine<V>> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let observers = (!self.observers.is_empty())
            .then(|| Arc::new(ObserverSet::new(self.observers, bus.clone())));

        Arc::new(TokioEngine::new_internal(self.cfg, bus, observers))
    }
}
