// MediaGit - Git for Media Files
// Copyright (C) 2025 MediaGit Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Progress counters and the observer callback that doubles as the
//! indexer's cancellation channel.

use std::sync::Mutex;

/// A point-in-time copy of the counters, handed to the observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub received_bytes: u64,
    pub received_objects: u64,
    pub indexed_objects: u64,
    pub indexed_deltas: u64,
    pub total_objects: u64,
    pub total_deltas: u64,
}

/// Mutable counters, held behind a mutex so a caller may poll progress
/// from another thread even though the indexer itself runs single
/// threaded cooperative.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    state: Mutex<ProgressSnapshot>,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        *self.state.lock().expect("progress mutex poisoned")
    }

    pub fn add_received_bytes(&self, delta: u64) {
        self.state.lock().expect("progress mutex poisoned").received_bytes += delta;
    }

    pub fn inc_received_objects(&self) {
        self.state.lock().expect("progress mutex poisoned").received_objects += 1;
    }

    pub fn inc_indexed_objects(&self) {
        self.state.lock().expect("progress mutex poisoned").indexed_objects += 1;
    }

    pub fn inc_indexed_deltas(&self) {
        self.state.lock().expect("progress mutex poisoned").indexed_deltas += 1;
    }

    pub fn set_totals(&self, total_objects: u64, total_deltas: u64) {
        let mut guard = self.state.lock().expect("progress mutex poisoned");
        guard.total_objects = total_objects;
        guard.total_deltas = total_deltas;
    }
}

/// An external observer of progress. A non-zero return requests
/// cancellation at the next operation boundary.
pub trait ProgressObserver: Send {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) -> i32;
}

impl<F> ProgressObserver for F
where
    F: FnMut(&ProgressSnapshot) -> i32 + Send,
{
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) -> i32 {
        self(snapshot)
    }
}
