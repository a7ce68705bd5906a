//! Fixation state machine
//!
//! At most one [`FixationRecord`] is open at any time. A record opens on the
//! first update and on every change of the resolved object (looking at
//! nothing counts as an object of its own), and closes exactly when the next
//! change happens or the pipeline shuts down.

use tracing::debug;

use crate::types::{FixationRecord, ResolvedHit, ScreenPoint, Timestamp};

/// Observable state of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixationState<'a> {
    /// Nothing observed yet, or the tracker was finished
    NoFixation,
    /// Open record on an object; `None` while looking at nothing
    FixatedOn(Option<&'a str>),
}

#[derive(Debug, Default)]
pub struct FixationTracker {
    open: Option<FixationRecord>,
    closed_count: usize,
}

impl FixationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FixationState<'_> {
        match &self.open {
            Some(record) => FixationState::FixatedOn(record.object_id.as_deref()),
            None => FixationState::NoFixation,
        }
    }

    /// The currently open record
    pub fn current(&self) -> Option<&FixationRecord> {
        self.open.as_ref()
    }

    /// Number of records closed so far
    pub fn closed_count(&self) -> usize {
        self.closed_count
    }

    /// Feed one update's resolved object.
    ///
    /// Returns the record closed by this update, if the object changed.
    pub fn observe(
        &mut self,
        hit: Option<&ResolvedHit>,
        screen_point: Option<ScreenPoint>,
        time: Timestamp,
        sample_times: impl IntoIterator<Item = Timestamp>,
    ) -> Option<FixationRecord> {
        let object = hit.map(|h| h.object_id.as_str());
        let continuing = matches!(&self.open, Some(open) if open.object_id.as_deref() == object);

        if continuing {
            if let Some(open) = self.open.as_mut() {
                open.sample_times.extend(sample_times);
            }
            return None;
        }

        let closed = self.close_open(time);
        debug!(
            "Fixation {} -> {}",
            closed
                .as_ref()
                .and_then(|r| r.object_id.as_deref())
                .unwrap_or("<nothing>"),
            object.unwrap_or("<nothing>")
        );

        self.open = Some(FixationRecord {
            object_id: object.map(str::to_string),
            start_time: time,
            end_time: None,
            contact_point: hit.map(|h| h.contact_point),
            screen_point,
            sample_times: sample_times.into_iter().collect(),
        });

        closed
    }

    /// Force-close the open record, stamping `time` as its end.
    pub fn finish(&mut self, time: Timestamp) -> Option<FixationRecord> {
        self.close_open(time)
    }

    fn close_open(&mut self, time: Timestamp) -> Option<FixationRecord> {
        let mut record = self.open.take()?;
        record.end_time = Some(time.max(record.start_time));
        self.closed_count += 1;
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Point3D;

    fn hit(id: &str) -> ResolvedHit {
        ResolvedHit {
            object_id: id.to_string(),
            contact_point: Point3D::ORIGIN,
        }
    }

    fn run(sequence: &[Option<&str>]) -> (FixationTracker, Vec<FixationRecord>) {
        let mut tracker = FixationTracker::new();
        let mut emitted = Vec::new();
        for (i, object) in sequence.iter().enumerate() {
            let h = object.map(hit);
            let t = i as f64;
            if let Some(record) = tracker.observe(h.as_ref(), None, t, [t]) {
                emitted.push(record);
            }
        }
        (tracker, emitted)
    }

    #[test]
    fn test_initial_state() {
        let tracker = FixationTracker::new();
        assert_eq!(tracker.state(), FixationState::NoFixation);
        assert!(tracker.current().is_none());
    }

    #[test]
    fn test_runs_are_merged() {
        let sequence = [
            Some("A"),
            Some("A"),
            Some("B"),
            Some("B"),
            Some("B"),
            None,
            Some("A"),
        ];
        let (mut tracker, mut emitted) = run(&sequence);
        emitted.extend(tracker.finish(7.0));

        let ids: Vec<Option<&str>> = emitted.iter().map(|r| r.object_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("A"), Some("B"), None, Some("A")]);
        assert_eq!(tracker.closed_count(), 4);
        assert_eq!(tracker.state(), FixationState::NoFixation);
    }

    #[test]
    fn test_times_and_samples() {
        let (tracker, emitted) = run(&[Some("A"), Some("A"), Some("B")]);

        assert_eq!(emitted.len(), 1);
        let a = &emitted[0];
        assert_eq!(a.start_time, 0.0);
        assert_eq!(a.end_time, Some(2.0));
        assert_eq!(a.sample_times, vec![0.0, 1.0]);
        assert_eq!(a.duration(), Some(2.0));

        let open = tracker.current().unwrap();
        assert!(open.is_open());
        assert_eq!(open.start_time, 2.0);
        assert_eq!(tracker.state(), FixationState::FixatedOn(Some("B")));
    }

    #[test]
    fn test_starting_on_nothing_opens_empty_record() {
        let (tracker, emitted) = run(&[None, None]);
        assert!(emitted.is_empty());
        assert_eq!(tracker.state(), FixationState::FixatedOn(None));
    }

    #[test]
    fn test_finish_without_open_record() {
        let mut tracker = FixationTracker::new();
        assert!(tracker.finish(1.0).is_none());
        assert_eq!(tracker.closed_count(), 0);
    }

    #[test]
    fn test_end_never_precedes_start() {
        let mut tracker = FixationTracker::new();
        tracker.observe(Some(&hit("A")), None, 5.0, [5.0]);
        let closed = tracker.finish(4.0).unwrap();
        assert_eq!(closed.end_time, Some(5.0));
    }
}
