// Observer pipeline: ring-ordered hooks around each repository write

use std::collections::BTreeMap;
use std::time::Instant;
use tokio::time::timeout;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{ObserverBox, ObserverRing};

/// Executes observers in ring order. Rings before the database write abort
/// the write on the first failing ring; post-database failures are logged.
pub struct ObserverPipeline {
    // Observer registry by ring
    observers: BTreeMap<ObserverRing, Vec<ObserverBox>>,
}

impl ObserverPipeline {
    /// Create new observer pipeline with empty observer registry
    pub fn new() -> Self {
        Self {
            observers: BTreeMap::new(),
        }
    }

    /// Register an observer (type-safe registration)
    pub fn register_observer(&mut self, observer: ObserverBox) {
        let ring = observer.ring();
        let name = observer.name();
        self.observers.entry(ring).or_default().push(observer);

        tracing::debug!("Registered observer '{}' for ring {:?}", name, ring);
    }

    /// Pipeline with every built-in observer registered
    pub fn with_defaults() -> Self {
        let mut pipeline = Self::new();
        crate::observer::implementations::register_default_observers(&mut pipeline);
        pipeline
    }

    pub fn observer_count(&self) -> usize {
        self.observers.values().map(Vec::len).sum()
    }

    /// Run rings 1 to 4. The first ring that collects errors stops the
    /// pipeline and its errors are returned merged.
    pub async fn run_before_write(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        tracing::debug!(
            "Observer pipeline starting: operation={:?}, collection={}",
            ctx.operation,
            ctx.collection
        );

        for ring in ObserverRing::pre_database() {
            if ring == ObserverRing::InputValidation && ctx.skip_validation {
                continue;
            }
            ctx.current_ring = Some(ring);
            self.execute_ring(ring, ctx).await;

            if let Some(error) = ObserverError::merge(std::mem::take(&mut ctx.errors)) {
                tracing::debug!("Observer pipeline stopped at ring {:?}: {}", ring, error);
                return Err(error);
            }
        }
        Ok(())
    }

    /// Run ring 6 once the write is persisted
    pub async fn run_after_write(&self, ctx: &mut ObserverContext) {
        ctx.current_ring = Some(ObserverRing::PostDatabase);
        self.execute_ring(ObserverRing::PostDatabase, ctx).await;

        for error in ctx.errors.drain(..) {
            tracing::error!(
                "Post-database observer failed for {} {:?}: {}",
                ctx.collection,
                ctx.operation,
                error
            );
        }
        tracing::debug!("Observer pipeline finished in {:?}", ctx.execution_time());
    }

    /// Execute observers in a specific ring, collecting errors on the context
    async fn execute_ring(&self, ring: ObserverRing, ctx: &mut ObserverContext) {
        let Some(observers) = self.observers.get(&ring) else {
            return;
        };

        for observer in observers {
            if !observer.applies(ctx.operation, ctx.collection) {
                tracing::trace!(
                    "Observer {} skipped for {:?} on {}",
                    observer.name(),
                    ctx.operation,
                    ctx.collection
                );
                continue;
            }

            let observer_start = Instant::now();
            let result = timeout(observer.timeout(), observer.execute(ctx)).await;
            let execution_time = observer_start.elapsed();

            match result {
                Ok(Ok(())) => {
                    tracing::trace!("Observer: {} completed in {:?}", observer.name(), execution_time);
                }
                Ok(Err(error)) => {
                    tracing::debug!("Observer: {} failed in {:?}: {}", observer.name(), execution_time, error);
                    ctx.errors.push(error);
                }
                Err(_elapsed) => {
                    tracing::error!("Observer: {} timed out after {:?}", observer.name(), observer.timeout());
                    ctx.errors.push(ObserverError::TimeoutError(format!(
                        "Observer {} timed out after {:?}",
                        observer.name(),
                        observer.timeout()
                    )));
                }
            }
        }
    }
}

impl Default for ObserverPipeline {
    fn default() -> Self {
        Self::new()
    }
}
