// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Counts words of a set of texts on a worker pool.
//!
//! The pool offers no result channel of its own; each task reports through an
//! mpsc sender it closed over at submission time.

use log::info;
use repool::prelude::*;
use std::sync::mpsc;

const WORKERS: usize = 4;
const STACK_SIZE: usize = 512 * 1024;

const TEXTS: [&str; 5] = [
    "the quick brown fox jumps over the lazy dog",
    "pack my box with five dozen liquor jugs",
    "sphinx of black quartz judge my vow",
    "how vexingly quick daft zebras jump",
    "the five boxing wizards jump quickly",
];

fn main() {
    env_logger::init();

    // Create the worker pool
    let mut builder = config::Builder::new();
    builder.initial_workers(WORKERS).stack_size(STACK_SIZE);
    let pool = builder.build().expect("failed to build worker pool");

    info!("Started worker pool with {WORKERS} workers");

    let (result_sender, result_receiver) = mpsc::channel();
    for (index, text) in TEXTS.into_iter().enumerate() {
        let worker = pool.acquire();
        info!("Counting words of text {index} on worker {}", worker.id());
        let sender = result_sender.clone();
        worker
            .assign(move || {
                let words = text.split_whitespace().count();
                sender.send((index, words)).expect("result channel closed");
            })
            .expect("worker already armed");
        worker.trigger().expect("worker not armed");
    }
    // Close our own sender so the result iterator terminates
    drop(result_sender);

    let mut results: Vec<(usize, usize)> = result_receiver.iter().collect();
    results.sort();
    for (index, words) in results {
        println!("text {index}: {words} words");
    }

    info!(
        "Pool served {} requests on {} workers",
        pool.thread_requests(),
        pool.current_thread_count()
    );
}
