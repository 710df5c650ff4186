// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

mod pool;
mod worker;

pub use pool::WorkerPool;
pub use worker::{Task, Worker, WorkerId};
