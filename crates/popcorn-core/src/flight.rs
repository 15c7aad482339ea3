//! Single-flight request slot shared by the fetchers.
//!
//! Each fetcher owns one [`SingleFlight`]: starting a request cancels the
//! previous one through its [`CancellationToken`] (dropping the HTTP future
//! aborts the transport) and bumps a generation counter. Completions are
//! applied under the state lock only if their generation is still current,
//! so a late response can never overwrite newer state.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub(crate) struct SingleFlight<S> {
    label: &'static str,
    state: Arc<watch::Sender<S>>,
    generation: Arc<AtomicU64>,
    /// Token of the most recently started request
    in_flight: Mutex<Option<CancellationToken>>,
}

impl<S> SingleFlight<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(label: &'static str, initial: S) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            label,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub(crate) fn snapshot(&self) -> S {
        self.state.borrow().clone()
    }

    /// Wait until `done` holds for the current state
    pub(crate) async fn wait_until(&self, done: impl FnMut(&S) -> bool) -> S {
        let mut rx = self.state.subscribe();
        // The `Ref` must be released before `rx` goes out of scope
        let settled = match rx.wait_for(done).await {
            Ok(state) => (*state).clone(),
            // The sender lives in `self`, so the channel cannot close while we wait
            Err(_) => self.snapshot(),
        };
        settled
    }

    fn slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn supersede_locked(
        &self,
        slot: &mut Option<CancellationToken>,
        update: impl FnOnce(&mut S),
    ) -> u64 {
        if let Some(previous) = slot.take() {
            previous.cancel();
        }

        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            update(state);
        });
        generation
    }

    /// Cancel whatever is in flight and apply `update` without starting a request
    pub(crate) fn supersede(&self, update: impl FnOnce(&mut S)) {
        let mut slot = self.slot();
        let generation = self.supersede_locked(&mut slot, update);
        debug!(fetcher = self.label, generation, "Superseded without a request");
    }

    /// Cancel whatever is in flight, apply `update`, then run `request` on a
    /// spawned task. `finish` is applied to the state with the outcome only if
    /// no newer request or supersession happened in the meantime.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn launch<T, Fut, Fin>(&self, update: impl FnOnce(&mut S), request: Fut, finish: Fin)
    where
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        Fin: FnOnce(&mut S, T) + Send + 'static,
    {
        let mut slot = self.slot();
        let generation = self.supersede_locked(&mut slot, update);

        let cancel = CancellationToken::new();
        *slot = Some(cancel.clone());
        drop(slot);

        let label = self.label;
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(fetcher = label, generation, "Request cancelled");
                }
                outcome = request => {
                    state.send_if_modified(|state| {
                        if current.load(Ordering::SeqCst) != generation {
                            debug!(fetcher = label, generation, "Discarding stale response");
                            return false;
                        }
                        finish(state, outcome);
                        true
                    });
                }
            }
        });
    }
}

impl<S> Drop for SingleFlight<S> {
    fn drop(&mut self) {
        let slot = self.in_flight.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = slot.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[derive(Clone, Default, Debug, PartialEq)]
    struct Counter {
        value: u32,
        busy: bool,
    }

    #[tokio::test]
    async fn test_launch_applies_outcome() {
        let flight = SingleFlight::new("test", Counter::default());
        flight.launch(|s| s.busy = true, async { 5u32 }, |s, v| {
            s.value = v;
            s.busy = false;
        });

        let state = flight.wait_until(|s| !s.busy).await;
        assert_eq!(state.value, 5);
    }

    #[tokio::test]
    async fn test_superseded_request_never_lands() {
        let flight = SingleFlight::new("test", Counter::default());
        let (tx, rx) = oneshot::channel::<u32>();

        flight.launch(|s| s.busy = true, async move { rx.await.unwrap_or(0) }, |s, v| {
            s.value = v;
            s.busy = false;
        });
        flight.supersede(|s| s.busy = false);

        // The first task is cancelled, so the sender sees a closed channel
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(tx.send(99).is_err());
        assert_eq!(flight.snapshot(), Counter { value: 0, busy: false });
    }

    #[tokio::test]
    async fn test_drop_cancels_in_flight() {
        let (tx, rx) = oneshot::channel::<u32>();
        {
            let flight = SingleFlight::new("test", Counter::default());
            flight.launch(|_| {}, async move { rx.await.unwrap_or(0) }, |s, v| s.value = v);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_wait_until_returns_settled_state() {
        let flight = SingleFlight::new("test", Counter { value: 3, busy: false });
        let state = flight.wait_until(|s| !s.busy).await;
        assert_eq!(state, Counter { value: 3, busy: false });

        let (tx, rx) = oneshot::channel::<u32>();
        flight.launch(|s| s.busy = true, async move { rx.await.unwrap_or(0) }, |s, v| {
            s.value = v;
            s.busy = false;
        });
        tx.send(8).unwrap();
        let state = flight.wait_until(|s| !s.busy).await;
        assert_eq!(state, Counter { value: 8, busy: false });
    }
}
