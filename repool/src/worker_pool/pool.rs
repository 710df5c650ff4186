// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use super::worker::{Task, Worker, WorkerId};
use crate::error::Error;
use log::debug;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Condvar, Mutex};

/// Registry state guarded by the pool's lock: the idle set and the counters.
struct RegistryState {
    idle: VecDeque<Worker>,
    current: usize,
    requests: usize,
    next_id: usize,
    stopping: bool,
}

/// The pool's synchronization domain, shared with the worker threads through
/// a weak back-reference.
pub(crate) struct Registry {
    state: Mutex<RegistryState>,
    available: Condvar,
}

impl Registry {
    /// Append a worker to the idle set, insertion order preserved.
    ///
    /// All blocked acquirers are woken when the idle set transitions from
    /// empty; which of them wins the head is unspecified. Returns false if
    /// the pool is stopping, in which case the worker thread must exit
    /// instead of idling.
    pub(crate) fn checkin(&self, worker: Worker) -> bool {
        let mut state = self.state.lock().expect("pool lock poisoned");
        if state.stopping {
            return false;
        }
        let was_empty = state.idle.is_empty();
        state.idle.push_back(worker);
        if was_empty {
            self.available.notify_all();
        }
        true
    }
}

/// A pool of reusable worker threads.
///
/// Workers are created up front or on demand via the add operations, never
/// retired while the pool lives, and handed out one at a time by
/// [acquire](WorkerPool::acquire). Dropping the pool lets every worker thread
/// wind down once its current task is finished.
pub struct WorkerPool {
    registry: Arc<Registry>,
    initial: usize,
    stack_size: Option<usize>,
}

impl WorkerPool {
    /// Create a pool with the given number of pre-warmed workers.
    ///
    /// Returns once every worker has entered the idle set, so the pool
    /// reports all of them as idle immediately after construction.
    pub fn new(initial_workers: usize) -> Result<WorkerPool, Error> {
        Self::with_settings(initial_workers, None)
    }

    pub(crate) fn with_settings(
        initial_workers: usize,
        stack_size: Option<usize>,
    ) -> Result<WorkerPool, Error> {
        let pool = WorkerPool {
            registry: Arc::new(Registry {
                state: Mutex::new(RegistryState {
                    idle: VecDeque::new(),
                    current: 0,
                    requests: 0,
                    next_id: 0,
                    stopping: false,
                }),
                available: Condvar::new(),
            }),
            initial: initial_workers,
            stack_size,
        };

        let mut readies = Vec::with_capacity(initial_workers);
        for _ in 0..initial_workers {
            let (_, ready) = pool.spawn_worker(None)?;
            readies.push(ready);
        }
        for ready in readies {
            ready
                .recv()
                .map_err(|_| Error::Channel("worker failed to report its first check-in"))?;
        }

        Ok(pool)
    }

    /// Add one bare worker to the pool.
    ///
    /// Returns the new worker's id once it has entered the idle set.
    pub fn add_worker(&self) -> Result<WorkerId, Error> {
        let (id, ready) = self.spawn_worker(None)?;
        ready
            .recv()
            .map_err(|_| Error::Channel("worker failed to report its first check-in"))?;
        debug!("Added worker {id} to the pool");
        Ok(id)
    }

    /// Add one worker that executes `task` as its very first action, before
    /// it has ever entered the idle set. The worker checks itself in once the
    /// task is done.
    pub fn add_worker_with_task(
        &self,
        task: impl FnOnce() + Send + 'static,
    ) -> Result<WorkerId, Error> {
        let (id, _) = self.spawn_worker(Some(Box::new(task)))?;
        debug!("Added worker {id} to the pool with an initial task");
        Ok(id)
    }

    /// Spawn a worker thread and account for it.
    ///
    /// The registry lock is held across the spawn so that a failure leaves
    /// the counters untouched and the new worker's check-in cannot be
    /// observed before `current` reflects it.
    fn spawn_worker(&self, initial_task: Option<Task>) -> Result<(WorkerId, Receiver<WorkerId>), Error> {
        let (ready_sender, ready_receiver) = mpsc::channel();
        let mut state = self.registry.state.lock().expect("pool lock poisoned");
        let id = WorkerId::from(state.next_id);
        Worker::spawn(
            id,
            self.stack_size,
            initial_task,
            Arc::downgrade(&self.registry),
            ready_sender,
        )?;
        state.next_id += 1;
        state.current += 1;
        Ok((id, ready_receiver))
    }

    /// Take one worker from the head of the idle set.
    ///
    /// Blocks, without polling or timeout, while the idle set is empty. Any
    /// number of callers may block here; every release of a worker wakes them
    /// all and one wins. Each successful call increments the request counter.
    pub fn acquire(&self) -> Worker {
        let mut state = self.registry.state.lock().expect("pool lock poisoned");
        loop {
            if let Some(worker) = state.idle.pop_front() {
                state.requests += 1;
                return worker;
            }
            state = self
                .registry
                .available
                .wait(state)
                .expect("pool lock poisoned");
        }
    }

    /// Return a worker to the idle set.
    ///
    /// Only needed for workers that were acquired but never triggered; a
    /// triggered worker checks itself back in after its task completes.
    pub fn release(&self, worker: Worker) {
        self.registry.checkin(worker);
    }

    /// Number of workers the pool was constructed with.
    pub fn initial_thread_count(&self) -> usize {
        self.initial
    }

    /// Number of workers currently in the pool. Never decreases.
    pub fn current_thread_count(&self) -> usize {
        self.registry
            .state
            .lock()
            .expect("pool lock poisoned")
            .current
    }

    /// Number of workers currently checked out or executing.
    pub fn running_thread_count(&self) -> usize {
        let state = self.registry.state.lock().expect("pool lock poisoned");
        state.current - state.idle.len()
    }

    /// Number of successful [acquire](WorkerPool::acquire) calls since
    /// construction or the last reset.
    pub fn thread_requests(&self) -> usize {
        self.registry
            .state
            .lock()
            .expect("pool lock poisoned")
            .requests
    }

    /// Reset the request counter to zero. Leaves all other counters alone.
    pub fn reset_thread_requests(&self) {
        self.registry
            .state
            .lock()
            .expect("pool lock poisoned")
            .requests = 0;
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        debug!("Worker pool stopping");
        let mut state = self.registry.state.lock().expect("pool lock poisoned");
        state.stopping = true;
        // Wake every parked idle worker so it can exit; busy workers exit on
        // their own once their task is done and their check-in is refused.
        for worker in state.idle.drain(..) {
            worker.halt();
        }
    }
}
