//! Cooldown-Ordered Event Scheduling
//!
//! A small timer queue driving which scripted ability fires next. The
//! encounter controller advances it once per tick and drains due events in
//! order; rescheduling an event kind replaces its pending entry, so a kind
//! never has two pending fires at once.

/// A pending fire for one event kind.
struct ScheduledEvent<K> {
    kind: K,
    /// Remaining time until the event is due (seconds); <= 0.0 means due
    remaining: f32,
    /// Insertion order, used to break ties between equally due events
    seq: u64,
}

/// Cooldown-ordered timer queue for scripted encounter events.
pub struct EventScheduler<K> {
    entries: Vec<ScheduledEvent<K>>,
    next_seq: u64,
}

impl<K: Copy + PartialEq> EventScheduler<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Insert or replace the pending fire for `kind` at `now + delay`.
    pub fn schedule(&mut self, kind: K, delay: f32) {
        self.entries.retain(|e| e.kind != kind);
        self.entries.push(ScheduledEvent {
            kind,
            remaining: delay,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Reduce all pending delays by `elapsed` seconds.
    pub fn advance(&mut self, elapsed: f32) {
        for entry in self.entries.iter_mut() {
            entry.remaining -= elapsed;
        }
    }

    /// Remove and return the due event with the least remaining delay
    /// (ties broken by insertion order), or None when nothing is due.
    pub fn next_due(&mut self) -> Option<K> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.remaining <= 0.0)
            .min_by(|(_, a), (_, b)| {
                a.remaining
                    .partial_cmp(&b.remaining)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.seq.cmp(&b.seq))
            })
            .map(|(index, _)| index)?;
        Some(self.entries.remove(index).kind)
    }

    /// Discard every pending event.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remaining delay for a pending event kind, if one is scheduled.
    pub fn remaining(&self, kind: K) -> Option<f32> {
        self.entries
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.remaining)
    }
}

impl<K: Copy + PartialEq> Default for EventScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    enum TestEvent {
        A,
        B,
        C,
    }

    #[test]
    fn test_nothing_due_before_delay_elapses() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule(TestEvent::A, 10.0);

        scheduler.advance(9.9);
        assert_eq!(scheduler.next_due(), None);

        scheduler.advance(0.1);
        assert_eq!(scheduler.next_due(), Some(TestEvent::A));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_due_events_pop_in_ascending_remaining_order() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule(TestEvent::A, 20.0);
        scheduler.schedule(TestEvent::B, 5.0);
        scheduler.schedule(TestEvent::C, 15.0);

        scheduler.advance(25.0);
        // B is most overdue, then C, then A
        assert_eq!(scheduler.next_due(), Some(TestEvent::B));
        assert_eq!(scheduler.next_due(), Some(TestEvent::C));
        assert_eq!(scheduler.next_due(), Some(TestEvent::A));
        assert_eq!(scheduler.next_due(), None);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule(TestEvent::B, 10.0);
        scheduler.schedule(TestEvent::A, 10.0);

        scheduler.advance(10.0);
        assert_eq!(scheduler.next_due(), Some(TestEvent::B));
        assert_eq!(scheduler.next_due(), Some(TestEvent::A));
    }

    #[test]
    fn test_reschedule_replaces_pending_entry() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule(TestEvent::A, 10.0);
        scheduler.schedule(TestEvent::A, 30.0);

        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.remaining(TestEvent::A), Some(30.0));

        scheduler.advance(10.0);
        // The original 10s fire was replaced, nothing is due yet
        assert_eq!(scheduler.next_due(), None);
    }

    #[test]
    fn test_clear_discards_all_entries() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule(TestEvent::A, 1.0);
        scheduler.schedule(TestEvent::B, 2.0);
        scheduler.advance(5.0);

        scheduler.clear();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.next_due(), None);
    }

    #[test]
    fn test_remaining_reports_pending_delay() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule(TestEvent::A, 20.0);
        scheduler.advance(5.0);

        assert_eq!(scheduler.remaining(TestEvent::A), Some(15.0));
        assert_eq!(scheduler.remaining(TestEvent::B), None);
    }
}
