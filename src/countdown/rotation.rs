/*
 *  countdown/rotation.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Timed rotation through the eligible countdowns
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use chrono::{NaiveDateTime, TimeDelta};
use log::{debug, info};

/// What a rotation step did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationOutcome {
    /// Selection moved on because the display duration elapsed
    pub rotated: bool,

    /// The rotation wrapped back to the first eligible entry
    pub cycle_complete: bool,

    /// Selection jumped to the first entry because the previous one vanished
    pub resnapped: bool,
}

/// Rotation state, tracked by entry id so reordering follows the entry
#[derive(Debug, Clone, Default)]
pub struct RotationState {
    index: usize,
    current_id: Option<String>,
    last_rotation: Option<NaiveDateTime>,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index into the eligible list, None when nothing is selected
    pub fn index(&self) -> Option<usize> {
        self.current_id.as_ref().map(|_| self.index)
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// Restart the duration timer without moving the selection
    pub fn reset_timer(&mut self, now: NaiveDateTime) {
        self.last_rotation = Some(now);
    }

    /// Forget the selection and the timer
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Keep the selection valid for `eligible` without consulting the timer.
    ///
    /// Returns true when the selection had to jump to the first entry.
    pub fn resnap(&mut self, eligible: &[&str], now: NaiveDateTime) -> bool {
        if eligible.is_empty() {
            if let Some(id) = self.current_id.take() {
                info!("No eligible countdowns left (was showing '{}')", id);
            }
            self.index = 0;
            return false;
        }

        let found = self
            .current_id
            .as_deref()
            .and_then(|id| eligible.iter().position(|e| *e == id));

        match found {
            Some(pos) => {
                self.index = pos;
                false
            }
            None => {
                if let Some(old) = self.current_id.as_deref() {
                    debug!("Countdown '{}' no longer eligible, showing '{}'", old, eligible[0]);
                }
                self.index = 0;
                self.current_id = Some(eligible[0].to_string());
                self.last_rotation = Some(now);
                true
            }
        }
    }

    /// One tick: re-snap if needed, then rotate once `duration` has elapsed
    pub fn advance(
        &mut self,
        eligible: &[&str],
        now: NaiveDateTime,
        duration: TimeDelta,
    ) -> RotationOutcome {
        let mut outcome = RotationOutcome {
            resnapped: self.resnap(eligible, now),
            ..Default::default()
        };

        let Some(last) = self.last_rotation else {
            self.last_rotation = Some(now);
            return outcome;
        };

        if eligible.is_empty() || outcome.resnapped {
            return outcome;
        }

        let elapsed = now - last;
        if elapsed < TimeDelta::zero() {
            debug!("Clock moved backwards by {}s, restarting rotation timer", -elapsed.num_seconds());
            self.last_rotation = Some(now);
            return outcome;
        }

        if elapsed >= duration {
            self.index = (self.index + 1) % eligible.len();
            self.current_id = Some(eligible[self.index].to_string());
            self.last_rotation = Some(now);
            outcome.rotated = true;
            outcome.cycle_complete = self.index == 0;
            debug!("Rotated to countdown index {} ('{}')", self.index, eligible[self.index]);
        }

        outcome
    }
}
