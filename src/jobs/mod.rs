//! Fixed worker pool with counter-based joins.
//!
//! Work is handed to the pool as boxed closures through a crossbeam channel.
//! Callers that need to wait for a group of jobs pass the same
//! `Option<Counter>` slot to every enqueue call and later hand it to
//! [`JobSystem::wait_and_free_counter`].

mod counter;

pub use counter::Counter;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("failed to spawn job worker {index}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}

struct Task {
    job: Job,
    counter: Option<Counter>,
}

impl Task {
    fn run(self) {
        if panic::catch_unwind(AssertUnwindSafe(self.job)).is_err() {
            error!("job panicked on a worker thread, aborting");
            std::process::abort();
        }
        if let Some(counter) = self.counter {
            counter.complete_one();
        }
    }
}

pub struct JobSystem {
    sender: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    synchronous: bool,
}

impl JobSystem {
    /// Spawns `worker_count` workers. Zero picks the default, which leaves two
    /// hardware threads for the main and submission threads.
    pub fn new(worker_count: usize, synchronous: bool) -> Result<Self, JobError> {
        let worker_count = if worker_count == 0 {
            Self::default_worker_count()
        } else {
            worker_count
        };

        let (sender, receiver) = crossbeam_channel::unbounded::<Task>();
        let mut workers = Vec::with_capacity(worker_count);

        for index in 0..worker_count {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("job-worker-{index}"))
                .spawn(move || worker_loop(index, receiver))
                .map_err(|source| JobError::Spawn { index, source })?;
            workers.push(handle);
        }

        info!(
            "Job system started with {} workers (synchronous: {})",
            worker_count, synchronous
        );

        Ok(Self {
            sender: Some(sender),
            workers,
            synchronous,
        })
    }

    pub fn default_worker_count() -> usize {
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .saturating_sub(2)
            .max(1)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn is_synchronous(&self) -> bool {
        self.synchronous
    }

    /// In synchronous mode every enqueue runs the job inline on the calling
    /// thread and leaves counters untouched.
    pub fn set_synchronous(&mut self, synchronous: bool) {
        if self.synchronous != synchronous {
            debug!("Job system synchronous mode: {}", synchronous);
        }
        self.synchronous = synchronous;
    }

    pub fn add_job<F>(&self, job: F, counter: &mut Option<Counter>)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.synchronous {
            job();
            return;
        }

        let counter = counter.get_or_insert_with(Counter::new);
        counter.add(1);
        self.dispatch(Task {
            job: Box::new(job),
            counter: Some(counter.clone()),
        });
    }

    pub fn add_jobs(&self, jobs: Vec<Job>, counter: &mut Option<Counter>) {
        if jobs.is_empty() {
            return;
        }

        if self.synchronous {
            for job in jobs {
                job();
            }
            return;
        }

        let counter = counter.get_or_insert_with(Counter::new);
        counter.add(jobs.len());
        for job in jobs {
            self.dispatch(Task {
                job,
                counter: Some(counter.clone()),
            });
        }
    }

    pub fn add_job_no_counter<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.synchronous {
            job();
            return;
        }

        self.dispatch(Task {
            job: Box::new(job),
            counter: None,
        });
    }

    /// Blocks until every job enqueued against `counter` has finished, then
    /// releases it. Always leaves `None` behind.
    pub fn wait_and_free_counter(&self, counter: &mut Option<Counter>) {
        if let Some(counter) = counter.take() {
            counter.wait();
        }
    }

    fn dispatch(&self, task: Task) {
        let task = match &self.sender {
            Some(sender) => match sender.send(task) {
                Ok(()) => return,
                Err(err) => err.into_inner(),
            },
            None => task,
        };

        warn!("Job queue is closed, running job on the calling thread");
        task.run();
    }
}

impl Drop for JobSystem {
    fn drop(&mut self) {
        // Closing the channel ends every worker's receive loop.
        self.sender.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("Job worker terminated abnormally");
            }
        }
        info!("Job system stopped");
    }
}

fn worker_loop(index: usize, receiver: Receiver<Task>) {
    while let Ok(task) = receiver.recv() {
        task.run();
    }
    debug!("Job worker {} exiting", index);
}
