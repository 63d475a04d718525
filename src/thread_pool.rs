use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;
type JobSender = crossbeam_channel::Sender<Job>;

struct Worker {
    handle: Option<thread::JoinHandle<()>>,
    sender: Option<JobSender>,
}

/// A pool of dedicated threads, one per rank in an in-process fleet. Jobs
/// are placed on a chosen thread, so a rank keeps the same thread (and, with
/// the `core_affinity` feature, the same core) for its whole life. Jobs must
/// be `'static`.
pub struct ThreadPool {
    workers: Vec<Worker>,
}

impl ThreadPool {
    /// Creates a new thread pool with the given number of threads. With the
    /// `core_affinity` feature, thread `n` is pinned to core `n` modulo the
    /// number of cores.
    pub fn new(num_threads: usize) -> std::io::Result<Self> {
        Ok(ThreadPool {
            workers: Self::make_workers(num_threads)?,
        })
    }

    /// Returns the number of worker threads in the pool.
    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    /// Spawns a job onto the worker thread with the given index. Panics if
    /// there is no such worker.
    pub fn spawn_on<F>(&self, worker_id: usize, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.workers[worker_id].sender.as_ref();

        if let Some(Err(_)) = sender.map(|s| s.send(Box::new(job))) {
            log::error!("worker thread {} is gone, job dropped", worker_id);
        }
    }
}

impl ThreadPool {
    fn spawn_worker(name: String, pin: impl FnOnce() + Send + 'static) -> std::io::Result<Worker> {
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let handle = thread::Builder::new().name(name).spawn(move || {
            pin();
            for job in receiver {
                job()
            }
        })?;
        Ok(Worker {
            handle: Some(handle),
            sender: Some(sender),
        })
    }

    #[cfg(feature = "core_affinity")]
    fn make_workers(num_threads: usize) -> std::io::Result<Vec<Worker>> {
        use core_affinity::{get_core_ids, set_for_current};
        let core_ids = get_core_ids().unwrap_or_default();

        (0..num_threads)
            .map(|n| {
                let core_id = core_ids.get(n % core_ids.len().max(1)).copied();
                Self::spawn_worker(format!("rank-{}", n), move || {
                    if let Some(core_id) = core_id {
                        set_for_current(core_id);
                    }
                })
            })
            .collect()
    }

    #[cfg(not(feature = "core_affinity"))]
    fn make_workers(num_threads: usize) -> std::io::Result<Vec<Worker>> {
        (0..num_threads)
            .map(|n| Self::spawn_worker(format!("rank-{}", n), || {}))
            .collect()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_run_on_the_chosen_thread() {
        let pool = ThreadPool::new(3).unwrap();
        let (s, r) = crossbeam_channel::unbounded();
        for n in 0..pool.num_threads() {
            let s = s.clone();
            pool.spawn_on(n, move || {
                let name = thread::current().name().map(String::from);
                s.send((n, name)).unwrap();
            });
        }
        drop(s);
        let mut seen: Vec<_> = r.iter().collect();
        seen.sort();
        assert_eq!(
            seen,
            (0..3)
                .map(|n| (n, Some(format!("rank-{}", n))))
                .collect::<Vec<_>>()
        );
    }
}
