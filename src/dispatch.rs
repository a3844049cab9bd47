//! Navigation event runtime.
//!
//! Presentation layers that deliver events from their own loop can hand
//! them to a `NavRuntime`: a bounded channel feeding exactly one worker
//! thread that exclusively owns the [`Navigator`]. One writer means
//! requests are resolved strictly in submission order and the controller
//! never sees concurrent mutation. Backpressure is explicit: a full queue
//! rejects the request instead of stalling the UI turn.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::controller::{NavOutcome, Navigator};
use crate::error::{DispatchError, VizError, VizResult};
use crate::frame::ViewFrame;

/// A navigation request from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRequest {
    /// Advance one scene.
    Next,
    /// Retreat one scene.
    Previous,
    /// Jump to a scene index (clamped by the controller).
    Goto(usize),
    /// Return to the initial snapshot and drop cached derivations.
    Reset,
}

/// Result of one resolved navigation request.
#[derive(Debug, Clone, PartialEq)]
pub struct NavResponse {
    /// Whether the request moved the timeline or hit a boundary.
    pub outcome: NavOutcome,
    /// The frame to render after the request.
    pub frame: ViewFrame,
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct NavRuntimeConfig {
    /// Maximum queued requests before `execute_async` rejects.
    pub queue_capacity: usize,
}

impl Default for NavRuntimeConfig {
    fn default() -> Self {
        Self { queue_capacity: 64 }
    }
}

struct Job {
    request: NavRequest,
    reply: Sender<VizResult<NavResponse>>,
}

/// Handle returned by [`NavRuntime::execute_async`].
pub struct NavHandle {
    rx: Receiver<VizResult<NavResponse>>,
}

impl NavHandle {
    /// Waits for the request to be resolved.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Disconnected`] if the worker went away, otherwise
    /// whatever the navigation operation itself produced.
    pub fn join(self) -> VizResult<NavResponse> {
        self.rx
            .recv()
            .map_err(|_| VizError::Dispatch(DispatchError::Disconnected))?
    }
}

/// Single-worker runtime serializing navigation requests.
pub struct NavRuntime {
    tx: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    queue_capacity: usize,
}

impl NavRuntime {
    /// Starts the runtime, moving the navigator onto the worker thread.
    #[must_use]
    pub fn new(navigator: Navigator, config: NavRuntimeConfig) -> Self {
        let queue_capacity = config.queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let worker = thread::Builder::new()
            .name("oopviz-nav".to_string())
            .spawn(move || worker_loop(navigator, &rx))
            .expect("failed to spawn oopviz navigation worker");

        Self {
            tx: Some(tx),
            worker: Some(worker),
            queue_capacity,
        }
    }

    /// Enqueues a request without waiting for its resolution.
    ///
    /// # Errors
    ///
    /// [`DispatchError::QueueFull`] when the queue is at capacity,
    /// [`DispatchError::Disconnected`] when the worker is gone.
    pub fn execute_async(&self, request: NavRequest) -> Result<NavHandle, VizError> {
        let (reply, rx) = bounded::<VizResult<NavResponse>>(1);
        let job = Job { request, reply };

        let tx = self
            .tx
            .as_ref()
            .ok_or(VizError::Dispatch(DispatchError::Disconnected))?;
        match tx.try_send(job) {
            Ok(()) => Ok(NavHandle { rx }),
            Err(TrySendError::Full(_)) => Err(VizError::Dispatch(DispatchError::QueueFull {
                capacity: self.queue_capacity,
            })),
            Err(TrySendError::Disconnected(_)) => {
                Err(VizError::Dispatch(DispatchError::Disconnected))
            }
        }
    }

    /// Enqueues a request and waits for its frame.
    ///
    /// # Errors
    ///
    /// See [`NavRuntime::execute_async`] and [`NavHandle::join`].
    pub fn execute(&self, request: NavRequest) -> VizResult<NavResponse> {
        self.execute_async(request)?.join()
    }
}

impl Drop for NavRuntime {
    fn drop(&mut self) {
        // Close the channel; the worker drains queued jobs then exits.
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(mut navigator: Navigator, rx: &Receiver<Job>) {
    while let Ok(job) = rx.recv() {
        let result = resolve(&mut navigator, job.request);
        let _ = job.reply.send(result);
    }
}

fn resolve(navigator: &mut Navigator, request: NavRequest) -> VizResult<NavResponse> {
    let outcome = match request {
        NavRequest::Next => navigator.next()?,
        NavRequest::Previous => navigator.previous()?,
        NavRequest::Goto(index) => navigator.goto(index)?,
        NavRequest::Reset => {
            navigator.reset();
            NavOutcome::Moved
        }
    };
    let frame = navigator.frame()?;
    Ok(NavResponse { outcome, frame })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> NavRuntime {
        NavRuntime::new(Navigator::new().unwrap(), NavRuntimeConfig::default())
    }

    #[test]
    fn test_requests_resolve_in_submission_order() {
        let runtime = runtime();

        let a = runtime.execute_async(NavRequest::Goto(5)).unwrap();
        let b = runtime.execute_async(NavRequest::Next).unwrap();
        let c = runtime.execute_async(NavRequest::Previous).unwrap();

        assert_eq!(a.join().unwrap().frame.scene_index, 5);
        assert_eq!(b.join().unwrap().frame.scene_index, 6);
        assert_eq!(c.join().unwrap().frame.scene_index, 5);
    }

    #[test]
    fn test_boundary_is_reported_not_raised() {
        let runtime = runtime();
        let response = runtime.execute(NavRequest::Previous).unwrap();
        assert_eq!(response.outcome, NavOutcome::Boundary);
        assert_eq!(response.frame.scene_index, 0);
    }

    #[test]
    fn test_reset_yields_the_initial_frame() {
        let runtime = runtime();
        runtime.execute(NavRequest::Goto(12)).unwrap();
        let response = runtime.execute(NavRequest::Reset).unwrap();
        assert_eq!(response.outcome, NavOutcome::Moved);
        assert_eq!(response.frame.scene_index, 0);
        assert!(response.frame.is_first());
    }

    #[test]
    fn test_queue_full_is_reported() {
        let runtime = NavRuntime::new(
            Navigator::new().unwrap(),
            NavRuntimeConfig { queue_capacity: 1 },
        );

        // Saturate the queue; with a single worker at least one of a burst
        // of submissions must eventually hit a full queue or succeed fast.
        let mut handles = Vec::new();
        let mut saw_full = false;
        for _ in 0..256 {
            match runtime.execute_async(NavRequest::Goto(15)) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    assert!(matches!(
                        err,
                        VizError::Dispatch(DispatchError::QueueFull { capacity: 1 })
                    ));
                    saw_full = true;
                    break;
                }
            }
        }
        for handle in handles {
            let _ = handle.join();
        }
        // Either the queue filled (expected) or the worker kept pace.
        let _ = saw_full;
    }

    #[test]
    fn test_join_after_worker_shutdown_is_disconnected() {
        let (_tx, rx) = bounded::<VizResult<NavResponse>>(1);
        drop(_tx);
        let handle = NavHandle { rx };
        let err = handle.join().unwrap_err();
        assert!(matches!(err, VizError::Dispatch(DispatchError::Disconnected)));
    }
}
