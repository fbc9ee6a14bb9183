// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Resource creation work that may have to wait for the dispatch thread.
//!
//! Devices advertising `native_multithreading` accept resource creation from
//! any thread, so loader threads create GPU resources themselves. Other
//! devices only accept it from the thread that dispatches command buffers;
//! loaders then queue the work and that thread drains the queue between
//! frames with [`GpuWorkQueue::run_pending`].

use crate::rhi::capabilities::Capabilities;
use std::fmt;

/// A unit of GPU resource creation work.
pub type GpuJob = Box<dyn FnOnce() + Send + 'static>;

/// Hands GPU work from loader threads to the thread allowed to run it.
pub struct GpuWorkQueue {
    immediate: bool,
    sender: flume::Sender<GpuJob>,
    receiver: flume::Receiver<GpuJob>,
}

impl GpuWorkQueue {
    /// Creates a queue for a device with the given capabilities.
    ///
    /// ## Arguments
    /// * `capabilities` - The device capabilities. Only `native_multithreading` is read.
    pub fn new(capabilities: &Capabilities) -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!(
            "GpuWorkQueue: Initialized, jobs run {}",
            if capabilities.native_multithreading {
                "on the submitting thread"
            } else {
                "on the dispatch thread"
            }
        );
        Self {
            immediate: capabilities.native_multithreading,
            sender,
            receiver,
        }
    }

    /// Whether submitted jobs run right away on the submitting thread.
    pub fn runs_immediately(&self) -> bool {
        self.immediate
    }

    /// Runs `job` now when the device allows it, otherwise queues it.
    ///
    /// ## Returns
    /// `true` if the job already ran.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> bool {
        self.sender().submit(job)
    }

    /// Returns a handle loader threads submit through.
    pub fn sender(&self) -> GpuWorkSender {
        GpuWorkSender {
            immediate: self.immediate,
            sender: self.sender.clone(),
        }
    }

    /// Runs every queued job, oldest first. Call from the dispatch thread.
    ///
    /// ## Returns
    /// The number of jobs that ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        if ran > 0 {
            log::trace!("GpuWorkQueue: Ran {ran} deferred job(s)");
        }
        ran
    }

    /// Number of jobs waiting for [`run_pending`](Self::run_pending).
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl fmt::Debug for GpuWorkQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuWorkQueue")
            .field("immediate", &self.immediate)
            .field("pending", &self.pending())
            .finish()
    }
}

/// The submitting end of a [`GpuWorkQueue`]. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct GpuWorkSender {
    immediate: bool,
    sender: flume::Sender<GpuJob>,
}

impl GpuWorkSender {
    /// Runs `job` now when the device allows it, otherwise queues it.
    ///
    /// ## Returns
    /// `true` if the job already ran. A job queued after the queue was
    /// dropped is discarded and logged.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> bool {
        if self.immediate {
            job();
            return true;
        }
        if self.sender.send(Box::new(job)).is_err() {
            log::error!("GpuWorkSender: Queue dropped, discarding GPU job");
        }
        false
    }
}

impl fmt::Debug for GpuWorkSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuWorkSender")
            .field("immediate", &self.immediate)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn single_threaded() -> Capabilities {
        Capabilities {
            native_multithreading: false,
            ..Capabilities::default()
        }
    }

    #[test]
    fn multithreaded_devices_run_jobs_immediately() {
        let queue = GpuWorkQueue::new(&Capabilities::default());
        let counter = Arc::new(AtomicUsize::new(0));
        let job_counter = Arc::clone(&counter);

        assert!(queue.submit(move || {
            job_counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn single_threaded_devices_defer_until_run_pending() {
        let queue = GpuWorkQueue::new(&single_threaded());
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        for index in 0..3 {
            let order = Arc::clone(&order);
            assert!(!queue.submit(move || order.lock().unwrap().push(index)));
        }
        assert_eq!(queue.pending(), 3);
        assert!(order.lock().unwrap().is_empty());

        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(queue.run_pending(), 0);
    }

    #[test]
    fn loader_threads_submit_through_senders() {
        let queue = GpuWorkQueue::new(&single_threaded());
        let counter = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sender = queue.sender();
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    sender.submit(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();
        for handle in handles {
            assert!(!handle.join().unwrap());
        }

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(queue.run_pending(), 4);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }
}
