// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cancellable timers.
//!
//! A [`ScheduledTask`] owns a spawned tokio task. Cancelling or dropping the
//! handle aborts the task, so a timer never outlives the session that
//! armed it.
//!
//! # Examples
//!
//! ```
//! use iotdash::schedule::ScheduledTask;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ticks = Arc::new(AtomicU32::new(0));
//! let counter = Arc::clone(&ticks);
//!
//! let task = ScheduledTask::every(Duration::from_millis(10), move || {
//!     let counter = Arc::clone(&counter);
//!     async move {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     }
//! });
//!
//! tokio::time::sleep(Duration::from_millis(35)).await;
//! task.cancel();
//! assert!(ticks.load(Ordering::SeqCst) >= 1);
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Handle to a one-shot or periodic task.
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Runs `task` once after `delay`.
    pub fn after<F, Fut>(delay: Duration, task: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task().await;
        });
        Self { handle }
    }

    /// Runs `task` every `period`, starting one period from now.
    ///
    /// Runs never overlap. A run that takes longer than the period pushes
    /// the next one back instead of bursting to catch up.
    pub fn every<F, Fut>(period: Duration, mut task: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                task().await;
            }
        });
        Self { handle }
    }

    /// Stops the task. Runs already finished are not undone.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Returns `true` while the task may still run.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        (Arc::clone(&count), count)
    }

    #[tokio::test(start_paused = true)]
    async fn after_runs_once() {
        let (count, handle) = counter();
        let task = ScheduledTask::after(Duration::from_secs(1), move || async move {
            handle.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::task::yield_now().await;
        assert!(!task.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_runs() {
        let (count, handle) = counter();
        let task = ScheduledTask::after(Duration::from_secs(1), move || async move {
            handle.fetch_add(1, Ordering::SeqCst);
        });

        task.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts() {
        let (count, handle) = counter();
        let task = ScheduledTask::every(Duration::from_secs(1), move || {
            let handle = Arc::clone(&handle);
            async move {
                handle.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        drop(task);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
