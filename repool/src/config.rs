// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Worker pool builder

use crate::error::Error;
use crate::worker_pool::WorkerPool;

/// Configuration of a worker pool
#[derive(Default)]
pub struct Builder {
    /// Number of workers spawned up front
    initial_workers: usize,
    /// Workers' stack size
    stack_size: Option<usize>,
}

/// Worker pool builder
impl Builder {
    /// Create a builder with no pre-warmed workers and default stack size
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of workers spawned up front
    pub fn initial_workers(&mut self, initial_workers: usize) -> &mut Self {
        self.initial_workers = initial_workers;
        self
    }

    /// Set worker threads' stack size
    pub fn stack_size(&mut self, stack_size: usize) -> &mut Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Build a worker pool using the given parameters.
    ///
    /// Returns once every pre-warmed worker has entered the idle set.
    pub fn build(self) -> Result<WorkerPool, Error> {
        WorkerPool::with_settings(self.initial_workers, self.stack_size)
    }
}
