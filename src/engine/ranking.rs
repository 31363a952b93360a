//! Filtering and ranking of the visible feed.
//!
//! [`derive`] is the single re-derivation routine: every trigger (fresh
//! fetch, settled filter change, permission change) recomputes the whole
//! visible list from the unfiltered list, a filter snapshot and the usable
//! position. It reads no clock and no shared state.
//!
//! Ordering uses a two-key rule: when a position is known and two events'
//! distances differ by more than the tie-break threshold, the nearer one
//! comes first; otherwise the one starting earlier comes first. Events with
//! unknown distance count as infinitely far.

use std::cmp::Ordering;

use crate::domain::{Event, FilterState, Position};

/// Distance difference, in meters, at or below which start time decides.
pub const DEFAULT_TIE_BREAK_METERS: f64 = 1_000.0;

/// An event in the derived list with its distance from the current position.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEvent {
    /// The event record.
    pub event: Event,
    /// Distance from the current position in meters; `None` when no position
    /// is usable or the venue has no valid coordinates.
    pub distance_meters: Option<f64>,
}

/// Filters and ranks `events` for display.
///
/// Text, category and date predicates come from `filters`. With an `origin`,
/// events farther than `filters.radius_meters` are dropped (events whose
/// distance cannot be computed are kept) and ranking uses distance with a
/// `tie_break_meters` window; without one, ranking is by start time only.
#[must_use]
pub fn derive(
    events: &[Event],
    filters: &FilterState,
    origin: Option<Position>,
    tie_break_meters: f64,
) -> Vec<RankedEvent> {
    let mut ranked: Vec<RankedEvent> = Vec::with_capacity(events.len());
    let position_known = origin.is_some();

    for event in events.iter().filter(|e| filters.matches(e)) {
        let distance_meters = origin.and_then(|o| event.distance_from(&o));
        if distance_meters.is_some_and(|d| d > filters.radius_meters) {
            continue;
        }
        let entry = RankedEvent {
            event: event.clone(),
            distance_meters,
        };
        insert_ranked(&mut ranked, entry, position_known, tie_break_meters);
    }

    ranked
}

/// Orders two ranked events.
///
/// Not a total order: the tie window makes it non-transitive (A ~ B and
/// B ~ C does not imply A ~ C), so it must not be handed to
/// `slice::sort_by`, which may panic on such comparators.
#[must_use]
pub fn compare(
    a: &RankedEvent,
    b: &RankedEvent,
    position_known: bool,
    tie_break_meters: f64,
) -> Ordering {
    if position_known {
        let da = a.distance_meters.unwrap_or(f64::INFINITY);
        let db = b.distance_meters.unwrap_or(f64::INFINITY);
        // Both infinite gives NaN, which falls through to start time.
        if (da - db).abs() > tie_break_meters {
            return da.partial_cmp(&db).unwrap_or(Ordering::Equal);
        }
    }
    a.event.start_time.cmp(&b.event.start_time)
}

/// Stable insertion: `entry` moves in front of already placed events only
/// while it compares strictly less than them.
fn insert_ranked(
    ranked: &mut Vec<RankedEvent>,
    entry: RankedEvent,
    position_known: bool,
    tie_break_meters: f64,
) {
    let index = ranked
        .iter()
        .rposition(|placed| compare(&entry, placed, position_known, tie_break_meters) != Ordering::Less)
        .map_or(0, |i| i + 1);
    ranked.insert(index, entry);
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Category, DateRange, EventId};
    use crate::engine::testing::{base_time, event_at, event_north, origin};
    use chrono::Duration;
    use std::collections::HashSet;

    fn ids(ranked: &[RankedEvent]) -> Vec<&str> {
        ranked.iter().map(|r| r.event.id.as_str()).collect()
    }

    fn sample_events() -> Vec<Event> {
        let t = base_time();
        let mut music = event_north("music", 800.0, t + Duration::hours(5));
        music.category = Category::Music;
        music.title = "Jazz in the Park".to_string();

        let mut food = event_north("food", 2_500.0, t + Duration::hours(1));
        food.category = Category::Food;
        food.description = "Street food market with live jazz".to_string();

        let mut tech = event_north("tech", 300.0, t + Duration::hours(3));
        tech.category = Category::Technology;

        let far = event_north("far", 25_000.0, t);

        vec![music, food, tech, far]
    }

    #[test]
    fn tie_window_orders_by_start_time() {
        let t = base_time();
        // A: 500 m, starts later. B: 1400 m, starts earlier. |diff| = 900.
        let a = event_north("a", 500.0, t + Duration::hours(2));
        let b = event_north("b", 1_400.0, t + Duration::hours(1));

        let ranked = derive(
            &[a, b],
            &FilterState::default(),
            Some(origin()),
            DEFAULT_TIE_BREAK_METERS,
        );
        assert_eq!(ids(&ranked), vec!["b", "a"]);
    }

    #[test]
    fn beyond_tie_window_distance_decides() {
        let t = base_time();
        // B: 1600 m, starts earlier. |diff| = 1100.
        let a = event_north("a", 500.0, t + Duration::hours(2));
        let b = event_north("b", 1_600.0, t + Duration::hours(1));

        let ranked = derive(
            &[b, a],
            &FilterState::default(),
            Some(origin()),
            DEFAULT_TIE_BREAK_METERS,
        );
        assert_eq!(ids(&ranked), vec!["a", "b"]);
    }

    #[test]
    fn exactly_at_threshold_is_a_tie() {
        let t = base_time();
        let near = event_north("near", 1_000.0, t + Duration::hours(2));
        let far = event_north("far", 2_000.0, t + Duration::hours(1));
        let a = RankedEvent {
            event: near,
            distance_meters: Some(1_000.0),
        };
        let b = RankedEvent {
            event: far,
            distance_meters: Some(2_000.0),
        };
        assert_eq!(compare(&a, &b, true, DEFAULT_TIE_BREAK_METERS), Ordering::Greater);
    }

    #[test]
    fn no_position_orders_by_start_time_only() {
        let ranked = derive(
            &sample_events(),
            &FilterState::default(),
            None,
            DEFAULT_TIE_BREAK_METERS,
        );
        assert_eq!(ids(&ranked), vec!["far", "food", "tech", "music"]);
        assert!(ranked.iter().all(|r| r.distance_meters.is_none()));
    }

    #[test]
    fn radius_excludes_distant_events_only_with_position() {
        let events = sample_events();
        let filters = FilterState::default();

        let with_position = derive(&events, &filters, Some(origin()), DEFAULT_TIE_BREAK_METERS);
        assert!(!ids(&with_position).contains(&"far"));

        let without_position = derive(&events, &filters, None, DEFAULT_TIE_BREAK_METERS);
        assert!(ids(&without_position).contains(&"far"));
    }

    #[test]
    fn ranking_with_position_mixes_distance_and_time() {
        let ranked = derive(
            &sample_events(),
            &FilterState::default(),
            Some(origin()),
            DEFAULT_TIE_BREAK_METERS,
        );
        // tech (300 m, +3h) and music (800 m, +5h) tie on distance; food is
        // more than 1 km beyond both.
        assert_eq!(ids(&ranked), vec!["tech", "music", "food"]);
    }

    #[test]
    fn unknown_venue_distance_is_kept_and_sorted_last() {
        let t = base_time();
        let mut broken = event_at("broken", 0.0, 0.0, t);
        broken.location.latitude = f64::NAN;
        let near = event_north("near", 100.0, t + Duration::hours(4));

        let ranked = derive(
            &[broken, near],
            &FilterState::with_radius(500.0),
            Some(origin()),
            DEFAULT_TIE_BREAK_METERS,
        );
        assert_eq!(ids(&ranked), vec!["near", "broken"]);
    }

    #[test]
    fn text_filter_matches_title_or_description() {
        let mut filters = FilterState::default();
        filters.search_text = "JAZZ".to_string();
        let ranked = derive(&sample_events(), &filters, None, DEFAULT_TIE_BREAK_METERS);
        assert_eq!(ids(&ranked), vec!["food", "music"]);
    }

    #[test]
    fn exact_title_query_keeps_event() {
        let events = sample_events();
        for event in &events {
            let mut filters = FilterState::default();
            filters.search_text = event.title.to_uppercase();
            let ranked = derive(&events, &filters, None, DEFAULT_TIE_BREAK_METERS);
            assert!(
                ranked.iter().any(|r| r.event.id == event.id),
                "title query should keep {}",
                event.id
            );
        }
    }

    #[test]
    fn text_filter_folds_sharp_s() {
        let mut fest = event_at("fest", 0.0, 0.0, base_time());
        fest.title = "Straße Fest".to_string();
        let mut filters = FilterState::default();
        filters.search_text = "STRASSE".to_string();
        let ranked = derive(&[fest], &filters, None, DEFAULT_TIE_BREAK_METERS);
        assert_eq!(ids(&ranked), vec!["fest"]);
    }

    #[test]
    fn category_filter_restricts_to_selection() {
        let mut filters = FilterState::default();
        filters.categories.insert(Category::Food);
        filters.categories.insert(Category::Technology);
        let ranked = derive(&sample_events(), &filters, None, DEFAULT_TIE_BREAK_METERS);
        assert_eq!(ids(&ranked), vec!["food", "tech"]);
    }

    #[test]
    fn date_filter_is_inclusive() {
        let t = base_time();
        let Ok(range) = DateRange::new(t + Duration::hours(1), t + Duration::hours(3)) else {
            panic!("valid range");
        };
        let mut filters = FilterState::default();
        filters.date_range = Some(range);
        let ranked = derive(&sample_events(), &filters, None, DEFAULT_TIE_BREAK_METERS);
        assert_eq!(ids(&ranked), vec!["food", "tech"]);
    }

    #[test]
    fn derive_is_deterministic_and_a_subset() {
        let events = sample_events();
        let source_ids: HashSet<EventId> = events.iter().map(|e| e.id.clone()).collect();

        let mut filter_sets = vec![FilterState::default(), FilterState::with_radius(1_000.0)];
        let mut text = FilterState::default();
        text.search_text = "a".to_string();
        filter_sets.push(text);
        let mut cats = FilterState::default();
        cats.categories.insert(Category::Music);
        filter_sets.push(cats);

        for filters in &filter_sets {
            for origin in [None, Some(origin())] {
                let first = derive(&events, filters, origin, DEFAULT_TIE_BREAK_METERS);
                let second = derive(&events, filters, origin, DEFAULT_TIE_BREAK_METERS);
                assert_eq!(first, second);
                assert!(first.iter().all(|r| source_ids.contains(&r.event.id)));
                assert!(first.len() <= events.len());
            }
        }
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let t = base_time();
        let a = event_north("a", 100.0, t);
        let b = event_north("b", 200.0, t);
        let c = event_north("c", 300.0, t);
        let ranked = derive(
            &[c, a, b],
            &FilterState::default(),
            Some(origin()),
            DEFAULT_TIE_BREAK_METERS,
        );
        assert_eq!(ids(&ranked), vec!["c", "a", "b"]);
    }
}
