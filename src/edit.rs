// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::sync::Arc;

use tracing::debug;

use crate::{
    observer::{Notice, Observer},
    schedule::{Keyframe, Schedule, ScheduleError, TimeOfDay},
};

mod timeline;

pub use timeline::{Button, Point, Timeline};

/// A keyframe being dragged, with the neighbour times captured when the drag began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub index: usize,
    prev: Option<TimeOfDay>,
    next: Option<TimeOfDay>,
}

impl DragState {
    /// The earliest and latest times the keyframe may be dragged to.
    fn bounds(&self) -> (TimeOfDay, TimeOfDay) {
        let lower = self
            .prev
            .map_or(TimeOfDay::MIDNIGHT, |prev| prev.add_minutes(1));
        let upper = self.next.map_or(TimeOfDay::LAST_MINUTE, |next| {
            TimeOfDay::from_minutes(u32::from(next.minutes().saturating_sub(1)))
        });
        (lower, upper)
    }

    /// Only interior keyframes have an adjustable intensity.
    fn is_edge(&self) -> bool {
        self.prev.is_none() || self.next.is_none()
    }
}

/// Turns pointer gestures on the timeline into schedule edits.
///
/// Every edit goes through the schedule's own checks. A refused edit leaves the schedule
/// untouched and is reported as [Notice::Rejected]. Methods that change the schedule say so
/// through their return value.
pub struct EditController {
    timeline: Timeline,
    drag: Option<DragState>,
    observer: Arc<dyn Observer>,
}

impl EditController {
    pub fn new(timeline: Timeline, observer: Arc<dyn Observer>) -> EditController {
        EditController {
            timeline,
            drag: None,
            observer,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    /// Handles a button press. The primary button starts dragging the keyframe under the
    /// pointer and the secondary button deletes it. Returns the keyframe that was dragged or
    /// deleted, or `None` when nothing was hit or the delete was refused.
    pub fn pointer_down(
        &mut self,
        schedule: &mut Schedule,
        pos: Point,
        button: Button,
    ) -> Option<usize> {
        let index = self.timeline.hit_test(schedule, pos)?;
        match button {
            Button::Primary => {
                self.begin_drag(schedule, index);
                Some(index)
            }
            Button::Secondary => self.delete_at(schedule, index).map(|_| index),
        }
    }

    /// Moves the dragged keyframe, if any, to follow the pointer. The keyframe can't pass
    /// its neighbours, and the first and last keyframes stay dark.
    pub fn pointer_move(&mut self, schedule: &mut Schedule, pos: Point) -> bool {
        let Some(drag) = &self.drag else {
            return false;
        };
        let (lower, upper) = drag.bounds();
        let time = self.timeline.time_at(pos.x).clamp(lower, upper);
        let intensity = if drag.is_edge() {
            0
        } else {
            self.timeline.intensity_at(pos.y)
        };
        let index = drag.index;
        self.neutralize(schedule.update(index, time, intensity))
            .is_some()
    }

    /// Finishes a drag and reports the final position.
    pub fn pointer_up(&mut self, schedule: &mut Schedule) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let result = schedule
            .get(drag.index)
            .map(|keyframe| (keyframe.start_time, keyframe.intensity))
            .ok_or(ScheduleError::InvalidIndex {
                index: drag.index,
                len: schedule.len(),
            })
            .and_then(|(time, intensity)| schedule.update(drag.index, time, intensity));
        if self.neutralize(result).is_none() {
            return false;
        }
        if let Some(keyframe) = schedule.get(drag.index) {
            self.observer.notify(Notice::Updated {
                index: drag.index,
                keyframe: keyframe.clone(),
            });
        }
        true
    }

    /// Inserts a keyframe under the pointer. A click while dragging only ends the drag.
    pub fn click(&mut self, schedule: &mut Schedule, pos: Point) -> Option<usize> {
        if self.drag.is_some() {
            self.pointer_up(schedule);
            return None;
        }
        self.insert_at(
            schedule,
            self.timeline.time_at(pos.x),
            self.timeline.intensity_at(pos.y),
        )
    }

    /// Inserts a keyframe at `time`, copying the channel levels of the keyframe before it.
    /// Returns where it went.
    pub fn insert_at(
        &mut self,
        schedule: &mut Schedule,
        time: TimeOfDay,
        intensity: u8,
    ) -> Option<usize> {
        let index = schedule.insertion_index(time);
        let template = index
            .checked_sub(1)
            .and_then(|prev| schedule.get(prev))
            .or_else(|| schedule.get(0));
        let mut keyframe = template.cloned().unwrap_or_else(|| Keyframe::dark(time));
        keyframe.start_time = time;
        keyframe.intensity = intensity;

        self.neutralize(schedule.insert(index, keyframe))?;
        if let Some(keyframe) = schedule.get(index) {
            self.observer.notify(Notice::Inserted {
                index,
                keyframe: keyframe.clone(),
            });
        }
        Some(index)
    }

    /// Deletes a keyframe. The last one left can't be deleted.
    pub fn delete_at(&mut self, schedule: &mut Schedule, index: usize) -> Option<Keyframe> {
        let result = if schedule.len() <= 1 {
            Err(ScheduleError::EmptyScheduleViolation)
        } else {
            schedule.remove(index)
        };
        let keyframe = self.neutralize(result)?;
        // Indices have shifted under any drag.
        self.drag = None;
        self.observer.notify(Notice::Deleted {
            index,
            keyframe: keyframe.clone(),
        });
        Some(keyframe)
    }

    /// Abandons any drag in progress, leaving the keyframe where it is.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    fn begin_drag(&mut self, schedule: &Schedule, index: usize) {
        let (prev, next) = schedule.neighbors(index);
        self.drag = Some(DragState {
            index,
            prev: prev.map(|k| k.start_time),
            next: next.map(|k| k.start_time),
        });
        if let Some(keyframe) = schedule.get(index) {
            debug!(index, time = %keyframe.start_time, "Dragging keyframe.");
        }
    }

    fn neutralize<T>(&self, result: Result<T, ScheduleError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(err = %e, "Refusing edit.");
                self.observer.notify(Notice::Rejected(e));
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use tokio::sync::mpsc;

    use crate::testutil::{keyframe, schedule};

    use super::*;

    fn controller() -> (EditController, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        // One pixel per minute and per intensity step.
        (
            EditController::new(Timeline::new(1439.0, 255.0, 5.0), Arc::new(tx)),
            rx,
        )
    }

    fn notices(rx: &mut mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            notices.push(notice);
        }
        notices
    }

    fn at(time: &str, intensity: u8) -> Point {
        let time: TimeOfDay = time.parse().expect("time");
        Point::new(f64::from(time.minutes()), 255.0 - f64::from(intensity))
    }

    #[test]
    fn test_drag_interior_keyframe() {
        let (mut edit, mut rx) = controller();
        let mut schedule = schedule(&[("08:00", 0), ("12:00", 200), ("20:00", 0)]);

        assert_eq!(
            Some(1),
            edit.pointer_down(&mut schedule, at("12:00", 200), Button::Primary)
        );
        assert!(edit.pointer_move(&mut schedule, at("13:30", 100)));
        assert_eq!(&keyframe("13:30", 100), schedule.get(1).expect("keyframe"));

        // Neighbours bound the drag.
        assert!(edit.pointer_move(&mut schedule, at("06:00", 100)));
        assert_eq!("08:01", schedule.get(1).expect("keyframe").start_time.to_string());
        assert!(edit.pointer_move(&mut schedule, at("23:00", 255)));
        assert_eq!(&keyframe("19:59", 255), schedule.get(1).expect("keyframe"));

        assert!(edit.pointer_up(&mut schedule));
        assert!(!edit.pointer_move(&mut schedule, at("15:00", 50)));
        assert_eq!(
            vec![Notice::Updated {
                index: 1,
                keyframe: keyframe("19:59", 255)
            }],
            notices(&mut rx)
        );
    }

    #[test]
    fn test_drag_never_reaches_next_neighbour() {
        let (mut edit, _rx) = controller();
        let mut schedule = schedule(&[("00:00", 0), ("12:00", 128), ("23:59", 0)]);

        edit.pointer_down(&mut schedule, at("12:00", 128), Button::Primary);
        edit.pointer_move(&mut schedule, at("23:59", 128));
        let dragged = schedule.get(1).expect("keyframe").start_time;
        assert_eq!("23:58", dragged.to_string());
        assert!(dragged < schedule.get(2).expect("keyframe").start_time);
        assert!(edit.pointer_up(&mut schedule));
    }

    #[test]
    fn test_drag_edges_stay_dark() {
        let (mut edit, _rx) = controller();
        let mut schedule = schedule(&[("08:00", 0), ("12:00", 200), ("20:00", 0)]);

        edit.pointer_down(&mut schedule, at("08:00", 0), Button::Primary);
        edit.pointer_move(&mut schedule, at("02:00", 255));
        assert_eq!(&keyframe("02:00", 0), schedule.get(0).expect("keyframe"));
        edit.pointer_up(&mut schedule);

        edit.pointer_down(&mut schedule, at("20:00", 0), Button::Primary);
        edit.pointer_move(&mut schedule, at("10:00", 255));
        assert_eq!(&keyframe("12:01", 0), schedule.get(2).expect("keyframe"));
        edit.pointer_move(&mut schedule, Point::new(9000.0, -10.0));
        assert_eq!(&keyframe("23:59", 0), schedule.get(2).expect("keyframe"));
        edit.pointer_up(&mut schedule);
    }

    #[test]
    fn test_missed_pointer_down() {
        let (mut edit, _rx) = controller();
        let mut schedule = schedule(&[("08:00", 0), ("20:00", 0)]);
        assert_eq!(
            None,
            edit.pointer_down(&mut schedule, at("12:00", 100), Button::Primary)
        );
        assert!(edit.drag().is_none());
        assert!(!edit.pointer_up(&mut schedule));
    }

    #[test]
    fn test_click_inserts() {
        let (mut edit, mut rx) = controller();
        let mut schedule = schedule(&[("08:00", 0), ("20:00", 0)]);
        schedule
            .set_levels(0, 0, [10, 20, 30, 40, 50, 60, 70])
            .expect("levels");

        assert_eq!(Some(1), edit.click(&mut schedule, at("12:00", 150)));
        let inserted = schedule.get(1).expect("keyframe");
        assert_eq!("12:00", inserted.start_time.to_string());
        assert_eq!(150, inserted.intensity);
        assert_eq!([10, 20, 30, 40, 50, 60, 70], inserted.intensities);
        assert!(matches!(
            notices(&mut rx).as_slice(),
            [Notice::Inserted { index: 1, .. }]
        ));
    }

    #[test]
    fn test_insert_at_ends_is_dark() {
        let (mut edit, _rx) = controller();
        let mut schedule = schedule(&[("08:00", 0), ("12:00", 200), ("20:00", 0)]);

        assert_eq!(Some(0), edit.insert_at(&mut schedule, "06:00".parse().expect("time"), 99));
        assert_eq!(0, schedule.get(0).expect("keyframe").intensity);
        assert_eq!(Some(4), edit.insert_at(&mut schedule, "22:00".parse().expect("time"), 99));
        assert_eq!(0, schedule.get(4).expect("keyframe").intensity);
        assert_eq!(5, schedule.len());
    }

    #[test]
    fn test_insert_at_occupied_time_is_rejected() {
        let (mut edit, mut rx) = controller();
        let mut schedule = schedule(&[("08:00", 0), ("12:00", 200), ("20:00", 0)]);
        let before = schedule.clone();

        assert_eq!(None, edit.insert_at(&mut schedule, "12:00".parse().expect("time"), 10));
        assert_eq!(before, schedule);
        assert!(matches!(
            notices(&mut rx).as_slice(),
            [Notice::Rejected(ScheduleError::OutOfOrder { .. })]
        ));
    }

    #[test]
    fn test_secondary_button_deletes() {
        let (mut edit, mut rx) = controller();
        let mut schedule = schedule(&[("08:00", 0), ("12:00", 200), ("20:00", 0)]);

        assert_eq!(
            Some(1),
            edit.pointer_down(&mut schedule, at("12:00", 200), Button::Secondary)
        );
        assert_eq!(2, schedule.len());
        assert!(edit.drag().is_none());
        assert_eq!(
            vec![Notice::Deleted {
                index: 1,
                keyframe: keyframe("12:00", 200)
            }],
            notices(&mut rx)
        );
    }

    #[test]
    fn test_refused_secondary_delete_returns_none() {
        let (mut edit, mut rx) = controller();
        let mut schedule = schedule(&[("08:00", 0)]);

        assert_eq!(None, edit.pointer_down(&mut schedule, at("08:00", 0), Button::Secondary));
        assert_eq!(1, schedule.len());
        assert_eq!(
            vec![Notice::Rejected(ScheduleError::EmptyScheduleViolation)],
            notices(&mut rx)
        );
    }

    #[test]
    fn test_cannot_delete_last_keyframe() {
        let (mut edit, mut rx) = controller();
        let mut schedule = schedule(&[("08:00", 0)]);

        assert_eq!(None, edit.delete_at(&mut schedule, 0));
        assert_eq!(1, schedule.len());
        assert_eq!(
            vec![Notice::Rejected(ScheduleError::EmptyScheduleViolation)],
            notices(&mut rx)
        );

        let mut schedule = crate::testutil::schedule(&[("08:00", 0), ("20:00", 0)]);
        assert_eq!(None, edit.delete_at(&mut schedule, 5));
        assert_eq!(
            vec![Notice::Rejected(ScheduleError::InvalidIndex { index: 5, len: 2 })],
            notices(&mut rx)
        );
    }
}
