/*
 *  countdown/set.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Countdown set manager - validation, per-tick recompute, eligibility
 *  and rotation
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

use std::collections::HashSet;
use chrono::{NaiveDateTime, TimeDelta};
use log::{debug, warn};
use serde_json::Value;

use super::entry::{CountdownEntry, EntryError};
use super::rotation::{RotationOutcome, RotationState};
use super::time_remaining::TimeRemaining;

/// Rotation policy taken from the plugin settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub display_duration: TimeDelta,
    pub show_expired: bool,
}

/// A configured entry that was rejected
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidEntry {
    /// Index in the host's list
    pub position: usize,
    pub id: Option<String>,
    pub error: EntryError,
}

/// The entry currently on screen with its freshly computed countdown
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    pub entry: &'a CountdownEntry,
    pub remaining: TimeRemaining,
}

/// Owns the validated entries and decides which one is shown.
///
/// Entries are held sorted by `display_order` (stable, so ties keep list
/// order). `remaining` and `eligible` are rebuilt on every tick.
#[derive(Debug, Clone)]
pub struct CountdownSet {
    entries: Vec<CountdownEntry>,
    invalid: Vec<InvalidEntry>,
    remaining: Vec<TimeRemaining>,
    eligible: Vec<usize>,
    rotation: RotationState,
    policy: RotationPolicy,
    last_tick: Option<NaiveDateTime>,
}

impl CountdownSet {
    pub fn new(raw_entries: &[Value], policy: RotationPolicy) -> Self {
        let (entries, invalid) = validate_entries(raw_entries);
        Self {
            entries,
            invalid,
            remaining: Vec::new(),
            eligible: Vec::new(),
            rotation: RotationState::new(),
            policy,
            last_tick: None,
        }
    }

    /// Swap in a new configuration, keeping the current selection if it
    /// survives and re-snapping immediately if it does not
    pub fn replace(&mut self, raw_entries: &[Value], policy: RotationPolicy) {
        let (entries, invalid) = validate_entries(raw_entries);
        self.entries = entries;
        self.invalid = invalid;
        self.policy = policy;
        self.remaining.clear();
        self.eligible.clear();

        if let Some(now) = self.last_tick {
            self.recompute(now);
            let ids = eligible_ids(&self.entries, &self.eligible);
            self.rotation.resnap(&ids, now);
        }
    }

    /// Recompute every countdown for `now` and rotate if due
    pub fn tick(&mut self, now: NaiveDateTime) -> RotationOutcome {
        self.last_tick = Some(now);
        self.recompute(now);
        let ids = eligible_ids(&self.entries, &self.eligible);
        self.rotation.advance(&ids, now, self.policy.display_duration)
    }

    /// Time remaining for every entry plus the eligible list
    pub fn recompute(&mut self, now: NaiveDateTime) {
        self.remaining = self
            .entries
            .iter()
            .map(|e| TimeRemaining::compute(e.target_date, now))
            .collect();

        let show_expired = self.policy.show_expired;
        self.eligible = self
            .entries
            .iter()
            .zip(&self.remaining)
            .enumerate()
            .filter(|(_, (e, r))| e.enabled && (show_expired || !r.is_expired()))
            .map(|(i, _)| i)
            .collect();

        debug!(
            "Recomputed {} countdown(s), {} eligible",
            self.entries.len(),
            self.eligible.len()
        );
    }

    /// The entry to render, None in the "no active countdowns" state
    pub fn current(&self) -> Option<Selection<'_>> {
        let id = self.rotation.current_id()?;
        self.eligible
            .iter()
            .map(|&i| (i, &self.entries[i]))
            .find(|(_, e)| e.id == id)
            .map(|(i, entry)| Selection { entry, remaining: self.remaining[i] })
    }

    /// Eligible entries in rotation order
    pub fn eligible(&self) -> impl Iterator<Item = &CountdownEntry> + '_ {
        self.eligible.iter().map(move |&i| &self.entries[i])
    }

    /// Valid entries sorted by display order
    pub fn entries(&self) -> &[CountdownEntry] {
        &self.entries
    }

    pub fn invalid(&self) -> &[InvalidEntry] {
        &self.invalid
    }

    pub fn find(&self, id: &str) -> Option<&CountdownEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Last computed countdown for an entry
    pub fn remaining_for(&self, id: &str) -> Option<TimeRemaining> {
        let i = self.entries.iter().position(|e| e.id == id)?;
        self.remaining.get(i).copied()
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Valid plus invalid entries, i.e. everything the host configured
    pub fn total_count(&self) -> usize {
        self.entries.len() + self.invalid.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.entries.iter().filter(|e| e.enabled).count()
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.rotation.index()
    }

    pub fn reset_timer(&mut self, now: NaiveDateTime) {
        self.rotation.reset_timer(now);
    }

    /// Drop computed state; the next tick starts a fresh rotation
    pub fn clear_computed(&mut self) {
        self.remaining.clear();
        self.eligible.clear();
        self.rotation.reset();
        self.last_tick = None;
    }
}

fn eligible_ids<'a>(entries: &'a [CountdownEntry], eligible: &[usize]) -> Vec<&'a str> {
    eligible.iter().map(|&i| entries[i].id.as_str()).collect()
}

/// Validate each raw entry on its own; one bad entry never affects another
fn validate_entries(raw_entries: &[Value]) -> (Vec<CountdownEntry>, Vec<InvalidEntry>) {
    let mut entries: Vec<CountdownEntry> = Vec::with_capacity(raw_entries.len());
    let mut invalid = Vec::new();
    let mut seen = HashSet::new();

    for (position, value) in raw_entries.iter().enumerate() {
        let raw_id = value.get("id").and_then(Value::as_str).map(str::to_string);
        let result = CountdownEntry::from_value(value, position).and_then(|e| {
            if seen.insert(e.id.clone()) {
                Ok(e)
            } else {
                Err(EntryError::DuplicateId(e.id))
            }
        });

        match result {
            Ok(e) => entries.push(e),
            Err(error) => {
                warn!(
                    "Skipping countdown #{} ({}): {}",
                    position,
                    raw_id.as_deref().unwrap_or("no id"),
                    error
                );
                invalid.push(InvalidEntry { position, id: raw_id, error });
            }
        }
    }

    // stable: equal display_order keeps list order
    entries.sort_by_key(|e| e.display_order);
    (entries, invalid)
}
