// src/queue.rs

//! The render-job queue: a thread-safe FIFO of framebuffer regions plus an
//! outstanding-work counter.
//!
//! The FIFO and the counter live behind separate locks, each with its own
//! condition variable: `nonempty` wakes a single worker when a job arrives,
//! `complete` broadcasts to everyone waiting on the frame barrier when the
//! outstanding count reaches zero. The counter is deliberately independent
//! of queue occupancy - a job handed to a worker is no longer queued but is
//! still outstanding until the worker reports it done.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// A half-open rectangular region `[x_start, x_end) x [y_start, y_end)` of
/// the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub x_start: u32,
    pub x_end: u32,
    pub y_start: u32,
    pub y_end: u32,
}

/// A unit of work for the pool: either a region to render, or a signal for
/// one worker to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Render(Span),
    Quit,
}

/// An unbounded FIFO of [`Job`]s with completion tracking.
#[derive(Debug, Default)]
pub struct JobQueue {
    fifo: Mutex<VecDeque<Job>>,
    nonempty: Condvar,
    outstanding: Mutex<usize>,
    complete: Condvar,
}

impl JobQueue {
    /// Creates an empty queue with no outstanding work.
    pub fn new() -> Self {
        JobQueue::default()
    }

    /// Appends a job to the tail and wakes one waiting worker.
    ///
    /// Never blocks on a capacity limit. Render jobs increment the
    /// outstanding count; quit jobs do not - nothing ever waits on their
    /// completion, and counting them would leave
    /// [`wait_complete`](Self::wait_complete) wedged after shutdown.
    pub fn enqueue(&self, job: Job) {
        let mut fifo = self.fifo.lock().unwrap();
        if matches!(job, Job::Render(_)) {
            *self.outstanding.lock().unwrap() += 1;
        }
        fifo.push_back(job);
        self.nonempty.notify_one();
    }

    /// Removes and returns the head job, blocking while the queue is empty.
    ///
    /// Does not decrement the outstanding count; that happens only when the
    /// work is verified done via [`report_complete`](Self::report_complete).
    pub fn dequeue(&self) -> Job {
        let mut fifo = self.fifo.lock().unwrap();
        loop {
            match fifo.pop_front() {
                Some(job) => return job,
                None => fifo = self.nonempty.wait(fifo).unwrap(),
            }
        }
    }

    /// Marks one dequeued render job as done.
    ///
    /// The count is floored at zero. Reaching zero broadcasts to every
    /// thread blocked in [`wait_complete`](Self::wait_complete).
    pub fn report_complete(&self) {
        let mut outstanding = self.outstanding.lock().unwrap();
        if *outstanding > 0 {
            *outstanding -= 1;
        }
        if *outstanding == 0 {
            self.complete.notify_all();
        }
    }

    /// Blocks until every enqueued render job has been reported complete.
    /// Returns immediately if nothing is outstanding.
    pub fn wait_complete(&self) {
        let mut outstanding = self.outstanding.lock().unwrap();
        while *outstanding != 0 {
            outstanding = self.complete.wait(outstanding).unwrap();
        }
    }

    /// The number of render jobs enqueued but not yet reported complete.
    pub fn outstanding(&self) -> usize {
        *self.outstanding.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;
    use test_log::test;

    fn span(y_start: u32, y_end: u32) -> Span {
        Span { x_start: 0, x_end: 8, y_start, y_end }
    }

    #[test]
    fn fifo_order_is_preserved() {
        let jq = JobQueue::new();
        jq.enqueue(Job::Render(span(0, 1)));
        jq.enqueue(Job::Render(span(1, 2)));
        jq.enqueue(Job::Render(span(2, 3)));
        assert_eq!(jq.dequeue(), Job::Render(span(0, 1)));
        assert_eq!(jq.dequeue(), Job::Render(span(1, 2)));
        assert_eq!(jq.dequeue(), Job::Render(span(2, 3)));
    }

    #[test]
    fn outstanding_tracks_render_jobs_only() {
        let jq = JobQueue::new();
        jq.enqueue(Job::Render(span(0, 1)));
        jq.enqueue(Job::Quit);
        assert_eq!(jq.outstanding(), 1);
        jq.dequeue();
        // Dequeue alone must not decrement.
        assert_eq!(jq.outstanding(), 1);
        jq.report_complete();
        assert_eq!(jq.outstanding(), 0);
    }

    #[test]
    fn report_complete_floors_at_zero() {
        let jq = JobQueue::new();
        jq.report_complete();
        assert_eq!(jq.outstanding(), 0);
    }

    #[test]
    fn wait_complete_with_nothing_outstanding_returns_immediately() {
        let jq = JobQueue::new();
        jq.wait_complete();
    }

    #[test]
    fn dequeue_blocks_until_a_job_arrives() {
        let jq = Arc::new(JobQueue::new());
        let handle = {
            let jq = Arc::clone(&jq);
            thread::spawn(move || jq.dequeue())
        };
        thread::sleep(Duration::from_millis(50));
        jq.enqueue(Job::Quit);
        assert_eq!(handle.join().unwrap(), Job::Quit);
    }

    #[test]
    fn wait_complete_unblocks_only_after_all_reports() {
        const JOBS: usize = 100;
        const WORKERS: usize = 4;

        let jq = Arc::new(JobQueue::new());
        let processed = Arc::new(AtomicUsize::new(0));

        for y in 0..JOBS as u32 {
            jq.enqueue(Job::Render(span(y, y + 1)));
        }

        let waiter_done = Arc::new(AtomicBool::new(false));
        let waiter = {
            let jq = Arc::clone(&jq);
            let waiter_done = Arc::clone(&waiter_done);
            let processed = Arc::clone(&processed);
            thread::spawn(move || {
                jq.wait_complete();
                waiter_done.store(true, Ordering::SeqCst);
                // Every report must have landed before the barrier opened.
                assert_eq!(processed.load(Ordering::SeqCst), JOBS);
            })
        };

        let workers: Vec<_> = (0..WORKERS)
            .map(|_| {
                let jq = Arc::clone(&jq);
                let processed = Arc::clone(&processed);
                thread::spawn(move || loop {
                    match jq.dequeue() {
                        Job::Render(_) => {
                            processed.fetch_add(1, Ordering::SeqCst);
                            jq.report_complete();
                        }
                        Job::Quit => break,
                    }
                })
            })
            .collect();

        waiter.join().unwrap();
        assert!(waiter_done.load(Ordering::SeqCst));
        assert_eq!(jq.outstanding(), 0);

        for _ in 0..WORKERS {
            jq.enqueue(Job::Quit);
        }
        for w in workers {
            w.join().unwrap();
        }
        // Quit jobs left the accounting untouched.
        assert_eq!(jq.outstanding(), 0);
    }
}
