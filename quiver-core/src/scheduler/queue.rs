//! Job Queue
//!
//! The job queue holds subscribers waiting to re-run. It is ordered (jobs run
//! first-in first-out) and keyed by subscriber ID, so a subscriber that is
//! already waiting is not queued a second time.
//!
//! # States
//!
//! ```text
//! Idle --queue_job--> Pending --tick--> Flushing --queue empty--> Idle
//! ```
//!
//! Only the `Idle -> Pending` transition schedules a flush. Jobs queued while
//! `Pending` join the flush that is already scheduled, and jobs queued while
//! `Flushing` are picked up by the running flush loop.

use indexmap::IndexMap;

use crate::reactive::{Subscriber, SubscriberId};

/// Lifecycle state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Nothing scheduled.
    #[default]
    Idle,

    /// A flush has been scheduled for the next tick.
    Pending,

    /// A flush is draining the queue.
    Flushing,
}

/// Ordered, deduplicating queue of pending jobs.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: IndexMap<SubscriberId, Subscriber>,
    state: SchedulerState,
}

impl JobQueue {
    /// Create a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job unless it is already queued.
    ///
    /// Returns whether the job was added.
    pub fn push(&mut self, job: Subscriber) -> bool {
        if self.jobs.contains_key(&job.id()) {
            return false;
        }
        self.jobs.insert(job.id(), job);
        true
    }

    /// Remove and return the oldest job.
    pub fn pop_front(&mut self) -> Option<Subscriber> {
        self.jobs.shift_remove_index(0).map(|(_, job)| job)
    }

    /// Whether the given subscriber is waiting in the queue.
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.jobs.contains_key(&id)
    }

    /// Drop every queued job.
    pub fn clear(&mut self) -> usize {
        let dropped = self.jobs.len();
        self.jobs.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: SchedulerState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_deduplicates() {
        let mut queue = JobQueue::new();
        let job = Subscriber::new(|| {});

        assert!(queue.push(job.clone()));
        assert!(!queue.push(job.clone()));
        assert_eq!(queue.len(), 1);
        assert!(queue.contains(job.id()));
    }

    #[test]
    fn pop_is_fifo() {
        let mut queue = JobQueue::new();
        let a = Subscriber::new(|| {});
        let b = Subscriber::new(|| {});
        let c = Subscriber::new(|| {});

        queue.push(a.clone());
        queue.push(b.clone());
        queue.push(c.clone());
        // Re-pushing `a` does not move it to the back
        queue.push(a.clone());

        assert_eq!(queue.pop_front(), Some(a));
        assert_eq!(queue.pop_front(), Some(b));
        assert_eq!(queue.pop_front(), Some(c));
        assert_eq!(queue.pop_front(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn popped_job_can_be_queued_again() {
        let mut queue = JobQueue::new();
        let job = Subscriber::new(|| {});

        queue.push(job.clone());
        queue.pop_front();
        assert!(queue.push(job));
    }

    #[test]
    fn clear_reports_dropped_jobs() {
        let mut queue = JobQueue::new();
        queue.push(Subscriber::new(|| {}));
        queue.push(Subscriber::new(|| {}));

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn starts_idle() {
        assert_eq!(JobQueue::new().state(), SchedulerState::Idle);
    }
}
