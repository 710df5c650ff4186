// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! repool is a pool of reusable worker threads for one-shot units of work.
//!
//! # Workers
//!
//! A [Worker](crate::worker_pool::Worker) wraps one long-lived OS thread. The thread parks until a
//! task is assigned and triggered, runs it to completion on its own thread,
//! and then returns itself to the pool's idle set. Workers are never retired;
//! the pool only grows.
//!
//! # Acquiring and releasing
//!
//! Callers obtain a worker with [WorkerPool::acquire](crate::worker_pool::WorkerPool::acquire), which blocks while the
//! idle set is empty, hand it a task via [Worker::assign](crate::worker_pool::Worker::assign) and
//! [Worker::trigger](crate::worker_pool::Worker::trigger), and let the worker check itself back in once the
//! task is done. A worker that was acquired but never triggered goes back via
//! [WorkerPool::release](crate::worker_pool::WorkerPool::release).
//!
//! # Construction
//!
//! A pool is built either directly with [WorkerPool::new](crate::worker_pool::WorkerPool::new) or through
//! [config::Builder](crate::config::Builder), which additionally controls the worker threads'
//! stack size. The pool is meant to be created by the application's startup
//! path and passed by reference to every component that submits work; there
//! is no ambient global pool.

pub mod config;
pub mod error;
pub mod worker_pool;

/// Re-export the public API
pub mod prelude {
    pub use crate::config;
    pub use crate::error::Error;
    pub use crate::worker_pool::{Task, Worker, WorkerId, WorkerPool};
}
