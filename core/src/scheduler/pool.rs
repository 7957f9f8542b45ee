use std::future::Future;
use std::ops::AddAssign;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, oneshot};
use tokio::task::{JoinError, JoinSet};

use super::Shutdown;

/// How the tasks that left the pool ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolTally {
    pub completed: usize,
    pub abandoned: usize,
    pub crashed: usize,
}

impl PoolTally {
    fn absorb(&mut self, joined: Result<(), JoinError>) {
        match joined {
            Ok(()) => self.completed += 1,
            Err(e) if e.is_cancelled() => self.abandoned += 1,
            Err(e) => {
                reachr_common::error!("Probe task crashed: {e}");
                self.crashed += 1;
            }
        }
    }
}

impl AddAssign for PoolTally {
    fn add_assign(&mut self, rhs: Self) {
        self.completed += rhs.completed;
        self.abandoned += rhs.abandoned;
        self.crashed += rhs.crashed;
    }
}

/// Runs the jobs of one target one after another, in submission order.
///
/// Every job holds a sender that is dropped when it ends, however it ends.
/// The next job on the lane waits for that before asking for a slot.
#[derive(Debug, Default)]
pub struct Lane {
    tail: Option<oneshot::Receiver<()>>,
}

impl Lane {
    fn enqueue(&mut self) -> (Option<oneshot::Receiver<()>>, oneshot::Sender<()>) {
        let (done, finished) = oneshot::channel();
        (self.tail.replace(finished), done)
    }
}

/// Long-lived, bounded set of probe slots shared by every target.
///
/// Submitted jobs are spawned immediately but only run once their lane is
/// free and they hold a slot, so at most `bound` jobs execute at the same
/// time. Waiting on a lane does not occupy a slot.
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    tasks: JoinSet<()>,
}

impl WorkerPool {
    pub fn new(bound: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(bound.max(1))),
            tasks: JoinSet::new(),
        }
    }

    /// Jobs submitted but not yet collected.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Queues `job` behind the jobs already submitted on `lane`. Never waits.
    pub fn submit<F>(&mut self, lane: &mut Lane, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (previous, done) = lane.enqueue();
        let slots: Arc<Semaphore> = Arc::clone(&self.slots);
        self.tasks.spawn(async move {
            let _done: oneshot::Sender<()> = done;
            if let Some(previous) = previous {
                // Err only means the previous job was dropped.
                let _ = previous.await;
            }
            let Ok(_slot): Result<OwnedSemaphorePermit, _> = slots.acquire_owned().await else {
                return;
            };
            job.await;
        });
    }

    /// Collects jobs that have already finished, without waiting.
    pub fn reap(&mut self) -> PoolTally {
        let mut tally: PoolTally = PoolTally::default();
        while let Some(joined) = self.tasks.try_join_next() {
            tally.absorb(joined);
        }
        tally
    }

    /// Waits for every job to finish, unless a forced stop arrives first.
    pub async fn drain(&mut self, shutdown: &Shutdown) -> PoolTally {
        let mut tally: PoolTally = PoolTally::default();
        loop {
            tokio::select! {
                joined = self.tasks.join_next() => match joined {
                    Some(joined) => tally.absorb(joined),
                    None => return tally,
                },
                _ = shutdown.aborted() => break,
            }
        }

        reachr_common::warn!("Forced stop, abandoning {} probes", self.tasks.len());
        tally += self.abandon().await;
        tally
    }

    /// Aborts every outstanding job. Dropping a job kills its process.
    pub async fn abandon(&mut self) -> PoolTally {
        let mut tally: PoolTally = PoolTally::default();
        self.tasks.abort_all();
        while let Some(joined) = self.tasks.join_next().await {
            tally.absorb(joined);
        }
        tally
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn running_jobs_never_exceed_bound() {
        let mut pool: WorkerPool = WorkerPool::new(3);
        let running: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
        let peak: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            pool.submit(&mut Lane::default(), async move {
                let now: usize = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }

        let tally: PoolTally = pool.drain(&Shutdown::new()).await;
        assert_eq!(tally.completed, 10);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn lane_runs_jobs_in_submission_order() {
        let mut pool: WorkerPool = WorkerPool::new(4);
        let mut lane: Lane = Lane::default();
        let finished: Arc<StdMutex<Vec<u64>>> = Arc::new(StdMutex::new(Vec::new()));

        // Earlier jobs are slower, so without the lane they would finish last.
        for (i, secs) in [(0, 3), (1, 2), (2, 1)] {
            let finished = Arc::clone(&finished);
            pool.submit(&mut lane, async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                finished.lock().unwrap().push(i);
            });
        }

        let started: Instant = Instant::now();
        pool.drain(&Shutdown::new()).await;
        assert_eq!(*finished.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_lane_does_not_hold_a_slot() {
        let mut pool: WorkerPool = WorkerPool::new(2);
        let mut slow: Lane = Lane::default();
        let fast_done: Arc<StdMutex<Option<Instant>>> = Arc::new(StdMutex::new(None));

        pool.submit(&mut slow, tokio::time::sleep(Duration::from_secs(10)));
        pool.submit(&mut slow, tokio::time::sleep(Duration::from_secs(10)));
        let done = Arc::clone(&fast_done);
        pool.submit(&mut Lane::default(), async move {
            *done.lock().unwrap() = Some(Instant::now());
        });

        let started: Instant = Instant::now();
        pool.drain(&Shutdown::new()).await;
        let fast: Option<Instant> = *fast_done.lock().unwrap();
        assert_eq!(fast.map(|at| at - started), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_job_releases_its_lane() {
        let mut pool: WorkerPool = WorkerPool::new(2);
        let mut lane: Lane = Lane::default();
        pool.submit(&mut lane, tokio::time::sleep(Duration::from_secs(60)));
        pool.abandon().await;

        pool.submit(&mut lane, async {});
        let tally: PoolTally = pool.drain(&Shutdown::new()).await;
        assert_eq!(tally.completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abandon_cancels_outstanding_jobs() {
        let mut pool: WorkerPool = WorkerPool::new(2);
        for _ in 0..4 {
            pool.submit(&mut Lane::default(), tokio::time::sleep(Duration::from_secs(60)));
        }
        assert_eq!(pool.in_flight(), 4);

        let tally: PoolTally = pool.abandon().await;
        assert_eq!(tally, PoolTally { completed: 0, abandoned: 4, crashed: 0 });
        assert_eq!(pool.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn forced_stop_interrupts_drain() {
        let mut pool: WorkerPool = WorkerPool::new(1);
        pool.submit(&mut Lane::default(), async {});
        pool.submit(&mut Lane::default(), tokio::time::sleep(Duration::from_secs(60)));

        let shutdown: Shutdown = Shutdown::new();
        let trigger: Shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.request_abort();
        });

        let tally: PoolTally = pool.drain(&shutdown).await;
        assert_eq!(tally, PoolTally { completed: 1, abandoned: 1, crashed: 0 });
    }

    #[tokio::test]
    async fn panicking_job_is_counted_as_crashed() {
        let mut pool: WorkerPool = WorkerPool::new(1);
        let fail: bool = true;
        pool.submit(&mut Lane::default(), async move {
            if fail {
                panic!("boom");
            }
        });
        pool.submit(&mut Lane::default(), async {});

        let tally: PoolTally = pool.drain(&Shutdown::new()).await;
        assert_eq!(tally, PoolTally { completed: 1, abandoned: 0, crashed: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn zero_bound_is_raised_to_one() {
        let mut pool: WorkerPool = WorkerPool::new(0);
        pool.submit(&mut Lane::default(), async {});
        assert_eq!(pool.drain(&Shutdown::new()).await.completed, 1);
    }
}
