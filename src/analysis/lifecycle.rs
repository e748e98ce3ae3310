use crate::models::lifecycle::{LifecyclePhase, LifecyclePhaseData};
use chrono::{DateTime, Utc};

/// Phase whose interval contains `now` (first in table order), else the most
/// recently started phase. A phase without a start date has no interval.
pub fn current_phase(phases: &[LifecyclePhaseData], now: DateTime<Utc>) -> Option<LifecyclePhase> {
    let mut ordered: Vec<&LifecyclePhaseData> = phases.iter().collect();
    ordered.sort_by_key(|slot| table_index(slot.phase));

    let containing = ordered.iter().find(|slot| match slot.start_date {
        Some(start) => start <= now && slot.end_date.map_or(true, |end| now <= end),
        None => false,
    });
    if let Some(slot) = containing {
        return Some(slot.phase);
    }

    // Ties on start date keep the earlier table entry.
    let mut latest: Option<(&LifecyclePhaseData, DateTime<Utc>)> = None;
    for slot in ordered {
        let Some(start) = slot.start_date else {
            continue;
        };
        if latest.map_or(true, |(_, best)| start > best) {
            latest = Some((slot, start));
        }
    }
    latest.map(|(slot, _)| slot.phase)
}

fn table_index(phase: LifecyclePhase) -> usize {
    LifecyclePhase::ALL
        .iter()
        .position(|candidate| *candidate == phase)
        .unwrap_or(LifecyclePhase::ALL.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lifecycle::default_phases;
    use chrono::{Duration, TimeZone};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
    }

    fn slot(phase: LifecyclePhase, start: Option<u32>, end: Option<u32>) -> LifecyclePhaseData {
        LifecyclePhaseData {
            phase,
            start_date: start.map(at),
            end_date: end.map(at),
        }
    }

    #[test]
    fn containing_phase_beats_earlier_started_one() {
        let phases = vec![
            slot(LifecyclePhase::Implementing, Some(1), Some(5)),
            slot(LifecyclePhase::Certifying, Some(6), None),
            slot(LifecyclePhase::Current, Some(10), Some(20)),
        ];

        // Certifying is open-ended and started earlier, but table order puts
        // it first; both contain day 12.
        assert_eq!(current_phase(&phases, at(12)), Some(LifecyclePhase::Certifying));

        let phases = vec![
            slot(LifecyclePhase::Implementing, Some(1), Some(5)),
            slot(LifecyclePhase::Current, Some(10), Some(20)),
        ];
        assert_eq!(current_phase(&phases, at(12)), Some(LifecyclePhase::Current));
    }

    #[test]
    fn falls_back_to_latest_start_when_nothing_contains_now() {
        let phases = vec![
            slot(LifecyclePhase::Implementing, Some(1), Some(3)),
            slot(LifecyclePhase::Certifying, Some(4), Some(6)),
        ];
        assert_eq!(current_phase(&phases, at(20)), Some(LifecyclePhase::Certifying));
    }

    #[test]
    fn containing_phase_beats_later_scheduled_one() {
        let phases = vec![
            slot(LifecyclePhase::Current, Some(1), None),
            slot(LifecyclePhase::Deprecated, Some(25), Some(28)),
        ];
        assert_eq!(current_phase(&phases, at(12)), Some(LifecyclePhase::Current));
        assert_eq!(current_phase(&phases, at(26)), Some(LifecyclePhase::Current));
    }

    #[test]
    fn interval_bounds_are_inclusive() {
        let phases = vec![slot(LifecyclePhase::Deprecated, Some(10), Some(12))];
        assert_eq!(current_phase(&phases, at(12)), Some(LifecyclePhase::Deprecated));
        // Past the end only the latest-start fallback applies.
        assert_eq!(
            current_phase(&phases, at(12) + Duration::seconds(1)),
            Some(LifecyclePhase::Deprecated)
        );
    }

    #[test]
    fn no_dates_means_no_phase() {
        assert_eq!(current_phase(&default_phases(), at(1)), None);
    }
}
