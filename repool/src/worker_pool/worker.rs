// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use super::pool::Registry;
use crate::error::Error;
use log::{debug, warn};
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::thread;

/// Worker id type. This id is unique to each worker thread.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct WorkerId(usize);

impl From<usize> for WorkerId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl From<&WorkerId> for usize {
    fn from(value: &WorkerId) -> Self {
        value.0
    }
}

impl From<WorkerId> for usize {
    fn from(value: WorkerId) -> Self {
        value.0
    }
}

impl Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// A unit of work: executed exactly once per arming, on the worker's own
/// thread, with no result channel back through the pool.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A worker's own synchronization domain: the task slot and the armed flag,
/// guarded by the worker's lock. The pool never touches these directly.
struct Slot {
    state: Mutex<SlotState>,
    armed_cond: Condvar,
}

struct SlotState {
    task: Option<Task>,
    armed: bool,
    stopping: bool,
}

impl Slot {
    fn is_armed(&self) -> bool {
        self.state.lock().expect("worker lock poisoned").armed
    }

    /// Park until armed, then consume the task.
    ///
    /// Spurious wake-ups re-check the armed condition. Returns None once the
    /// pool is stopping and no task is armed.
    fn next_task(&self) -> Option<Task> {
        let mut state = self.state.lock().expect("worker lock poisoned");
        loop {
            if state.armed {
                state.armed = false;
                let task = state.task.take().expect("armed worker without a task");
                return Some(task);
            }
            if state.stopping {
                return None;
            }
            state = self.armed_cond.wait(state).expect("worker lock poisoned");
        }
    }
}

/// Handle to a worker thread.
///
/// Obtained from [WorkerPool::acquire](super::WorkerPool::acquire); holding it entitles the caller to
/// arm the worker with one task. After [trigger](Worker::trigger) the worker
/// returns itself to the pool once the task is done; an unarmed handle goes
/// back via [WorkerPool::release](super::WorkerPool::release).
pub struct Worker {
    id: WorkerId,
    slot: Arc<Slot>,
}

impl Worker {
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Store a task on this worker without starting it.
    ///
    /// Fails with [Error::InvalidState] if a task is already queued; the
    /// pending task is left intact in that case.
    pub fn assign(&self, task: impl FnOnce() + Send + 'static) -> Result<(), Error> {
        let mut state = self.slot.state.lock().expect("worker lock poisoned");
        if state.task.is_some() {
            return Err(Error::InvalidState("worker already holds a pending task"));
        }
        state.task = Some(Box::new(task));
        Ok(())
    }

    /// Start the previously assigned task, waking the worker thread if it is
    /// parked. Fails with [Error::InvalidState] if no task was assigned.
    pub fn trigger(&self) -> Result<(), Error> {
        let mut state = self.slot.state.lock().expect("worker lock poisoned");
        if state.task.is_none() {
            return Err(Error::InvalidState("trigger on a worker without a task"));
        }
        state.armed = true;
        drop(state);
        self.slot.armed_cond.notify_one();
        Ok(())
    }

    /// Tell the worker thread to exit the next time it would park.
    pub(crate) fn halt(&self) {
        let mut state = self.slot.state.lock().expect("worker lock poisoned");
        state.stopping = true;
        drop(state);
        self.slot.armed_cond.notify_one();
    }

    /// Create a new worker thread.
    ///
    /// The thread checks itself into the registry's idle set and sends its id
    /// on `ready` after its first check-in. A worker created with an initial
    /// task executes that task before ever idling.
    pub(crate) fn spawn(
        id: WorkerId,
        stack_size: Option<usize>,
        initial_task: Option<Task>,
        registry: Weak<Registry>,
        ready: Sender<WorkerId>,
    ) -> Result<(), Error> {
        let armed = initial_task.is_some();
        let slot = Arc::new(Slot {
            state: Mutex::new(SlotState {
                task: initial_task,
                armed,
                stopping: false,
            }),
            armed_cond: Condvar::new(),
        });

        let thread_name = format!("repool-{id}").to_lowercase();
        let mut builder = thread::Builder::new().name(thread_name);
        if let Some(stack_size) = stack_size {
            builder = builder.stack_size(stack_size);
        }
        builder
            .spawn(move || run(id, slot, registry, ready))
            .map_err(|e| Error::Io((e, "could not spawn worker thread")))?;

        Ok(())
    }
}

/// Worker thread main function
fn run(id: WorkerId, slot: Arc<Slot>, registry: Weak<Registry>, ready: Sender<WorkerId>) {
    debug!("Worker {id} starting");
    let mut first_checkin = Some(ready);
    loop {
        // Return to the idle set before parking. A worker spawned pre-armed
        // skips this and executes its initial task first.
        if !slot.is_armed() {
            let checked_in = match registry.upgrade() {
                Some(registry) => registry.checkin(Worker {
                    id,
                    slot: slot.clone(),
                }),
                None => break,
            };
            if !checked_in {
                break;
            }
            if let Some(ready) = first_checkin.take() {
                // Nobody listens for pre-armed workers
                let _ = ready.send(id);
            }
        }

        let Some(task) = slot.next_task() else { break };
        debug!("Worker {id} executing task");
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            warn!("Task on worker {id} panicked; worker stays in service");
        }
    }
    debug!("Worker {id} stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker_pool::WorkerPool;
    use std::sync::mpsc;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn worker_id_conversions() {
        let id = WorkerId::from(3);
        assert_eq!(id.to_string(), "W3");
        assert_eq!(usize::from(id), 3);
        assert_eq!(usize::from(&id), 3);
    }

    #[test]
    fn assigned_task_waits_for_trigger() {
        let pool = WorkerPool::new(1).unwrap();
        let worker = pool.acquire();
        let (sender, receiver) = mpsc::channel();
        worker.assign(move || sender.send(()).unwrap()).unwrap();
        // Assign alone must not start the task
        assert!(receiver.recv_timeout(Duration::from_millis(100)).is_err());
        worker.trigger().unwrap();
        receiver.recv_timeout(TIMEOUT).unwrap();
    }

    #[test]
    fn assign_twice_is_rejected_and_first_task_survives() {
        let pool = WorkerPool::new(1).unwrap();
        let worker = pool.acquire();
        let (sender, receiver) = mpsc::channel();
        let first = sender.clone();
        worker.assign(move || first.send("first").unwrap()).unwrap();
        let second = sender;
        let result = worker.assign(move || second.send("second").unwrap());
        assert!(matches!(result, Err(Error::InvalidState(_))));
        worker.trigger().unwrap();
        assert_eq!(receiver.recv_timeout(TIMEOUT).unwrap(), "first");
        assert!(receiver.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn trigger_without_task_is_rejected() {
        let pool = WorkerPool::new(1).unwrap();
        let worker = pool.acquire();
        assert!(matches!(worker.trigger(), Err(Error::InvalidState(_))));
        pool.release(worker);
        assert_eq!(pool.running_thread_count(), 0);
    }
}
