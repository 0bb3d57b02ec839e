/// Identifies a scheduled task so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
struct DeferredTask {
    handle: TaskHandle,
    due_at_ms: f64,
}

/// Single-slot deferred task on the host clock.
///
/// Scheduling replaces any pending task, so at most one is ever pending.
/// The task fires from [`Scheduler::poll`] once the host clock passes its
/// due time.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    pending: Option<DeferredTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        self.pending = Some(DeferredTask {
            handle,
            due_at_ms: now_ms + delay_ms.max(0.0),
        });
        handle
    }

    /// Cancel whatever is pending. Returns the cancelled handle, if any.
    pub fn cancel(&mut self) -> Option<TaskHandle> {
        self.pending.take().map(|t| t.handle)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<f64> {
        self.pending.map(|t| t.due_at_ms)
    }

    /// Take the pending task if it is due at `now_ms`.
    pub fn poll(&mut self, now_ms: f64) -> Option<TaskHandle> {
        match self.pending {
            Some(task) if now_ms >= task.due_at_ms => {
                self.pending = None;
                Some(task.handle)
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_when_due() {
        let mut s = Scheduler::new();
        let h = s.schedule(1000.0, 500.0);
        assert_eq!(s.poll(1499.0), None);
        assert_eq!(s.poll(1500.0), Some(h));
        assert_eq!(s.poll(2000.0), None);
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut s = Scheduler::new();
        let h = s.schedule(0.0, 10.0);
        assert_eq!(s.cancel(), Some(h));
        assert_eq!(s.poll(100.0), None);
        assert_eq!(s.cancel(), None);
    }

    #[test]
    fn rescheduling_replaces_pending_task() {
        let mut s = Scheduler::new();
        let first = s.schedule(0.0, 10.0);
        let second = s.schedule(5.0, 10.0);
        assert_ne!(first, second);
        assert_eq!(s.due_at(), Some(15.0));
        assert_eq!(s.poll(12.0), None);
        assert_eq!(s.poll(15.0), Some(second));
    }
}
