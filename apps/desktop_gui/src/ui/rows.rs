//! Per-row presentation state, computed without touching egui.

use std::time::{Duration, Instant};

use client_core::{ListSnapshot, TodoEntry};
use shared::domain::TodoId;

/// Opacity used for rows the store has not confirmed yet.
pub const OPTIMISTIC_OPACITY: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: TodoId,
    pub content: String,
    pub completed: bool,
    /// Strikethrough and green text.
    pub strikethrough: bool,
    pub opacity: f32,
    /// Fraction of the full row height still occupied, 1.0 when at rest.
    pub height_factor: f32,
    /// Whether the handle, checkbox and delete button accept input.
    pub interactive: bool,
}

/// Styles one entry. A pending removal fades and collapses linearly from the
/// moment it started until `removal_delay` has passed.
pub fn row_view(
    entry: &TodoEntry,
    removal_started: Option<Instant>,
    now: Instant,
    removal_delay: Duration,
) -> RowView {
    let record = entry.record();
    let progress = match removal_started {
        Some(_) if removal_delay.is_zero() => 1.0,
        Some(started) => {
            let elapsed = now.saturating_duration_since(started);
            (elapsed.as_secs_f32() / removal_delay.as_secs_f32()).clamp(0.0, 1.0)
        }
        None => 0.0,
    };
    let base_opacity = if entry.is_confirmed() {
        1.0
    } else {
        OPTIMISTIC_OPACITY
    };

    RowView {
        id: record.id,
        content: record.content.clone(),
        completed: record.completed,
        strikethrough: record.completed,
        opacity: base_opacity * (1.0 - progress),
        height_factor: 1.0 - progress,
        interactive: entry.is_confirmed() && removal_started.is_none(),
    }
}

pub fn row_views(snapshot: &ListSnapshot, now: Instant, removal_delay: Duration) -> Vec<RowView> {
    snapshot
        .entries
        .iter()
        .map(|entry| {
            let started = snapshot.pending_removal.get(&entry.id()).copied();
            row_view(entry, started, now, removal_delay)
        })
        .collect()
}

pub fn remaining_label(remaining: usize) -> String {
    format!("{remaining} items remaining")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::TodoRecord;

    fn record(id: i64, completed: bool) -> TodoRecord {
        TodoRecord {
            id: TodoId(id),
            content: format!("todo {id}"),
            completed,
            created_at: 0,
        }
    }

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn resting_row_is_fully_visible_and_interactive() {
        let now = Instant::now();
        let view = row_view(&TodoEntry::Confirmed(record(1, false)), None, now, DELAY);
        assert_eq!(view.opacity, 1.0);
        assert_eq!(view.height_factor, 1.0);
        assert!(view.interactive);
        assert!(!view.strikethrough);
    }

    #[test]
    fn completed_row_is_struck_through() {
        let now = Instant::now();
        let view = row_view(&TodoEntry::Confirmed(record(1, true)), None, now, DELAY);
        assert!(view.strikethrough);
        assert!(view.completed);
    }

    #[test]
    fn optimistic_row_is_dimmed_and_inert() {
        let now = Instant::now();
        let view = row_view(&TodoEntry::Optimistic(record(-5, false)), None, now, DELAY);
        assert_eq!(view.opacity, OPTIMISTIC_OPACITY);
        assert!(!view.interactive);
    }

    #[test]
    fn pending_removal_fades_linearly_across_the_delay() {
        let started = Instant::now();
        let entry = TodoEntry::Confirmed(record(1, false));

        let at_start = row_view(&entry, Some(started), started, DELAY);
        assert_eq!(at_start.opacity, 1.0);
        assert!(!at_start.interactive);

        let halfway = row_view(&entry, Some(started), started + DELAY / 2, DELAY);
        assert!((halfway.opacity - 0.5).abs() < 1e-3);
        assert!((halfway.height_factor - 0.5).abs() < 1e-3);

        let done = row_view(&entry, Some(started), started + DELAY * 2, DELAY);
        assert_eq!(done.opacity, 0.0);
        assert_eq!(done.height_factor, 0.0);
    }

    #[test]
    fn zero_delay_removal_collapses_immediately() {
        let started = Instant::now();
        let view = row_view(
            &TodoEntry::Confirmed(record(1, false)),
            Some(started),
            started,
            Duration::ZERO,
        );
        assert_eq!(view.height_factor, 0.0);
    }

    #[test]
    fn row_views_follow_snapshot_order() {
        let now = Instant::now();
        let mut snapshot = ListSnapshot {
            entries: vec![
                TodoEntry::Confirmed(record(2, false)),
                TodoEntry::Confirmed(record(1, true)),
            ],
            ..Default::default()
        };
        snapshot.pending_removal.insert(TodoId(1), now);

        let views = row_views(&snapshot, now, DELAY);
        assert_eq!(views.iter().map(|v| v.id).collect::<Vec<_>>(), vec![TodoId(2), TodoId(1)]);
        assert!(views[0].interactive);
        assert!(!views[1].interactive);
    }

    #[test]
    fn remaining_label_matches_heading_copy() {
        assert_eq!(remaining_label(0), "0 items remaining");
        assert_eq!(remaining_label(3), "3 items remaining");
    }
}
