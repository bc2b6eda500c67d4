use super::*;
use crate::foundation::core::Bandwidth;

fn fixture() -> (Plane, TargetMask) {
    let plane = Plane::from_fn(3, 3, |r, c| (10 * (r * 3 + c)) as u8);
    let mask = TargetMask::from_fn(3, 3, |r, c| (r, c) == (1, 1) || (r, c) == (0, 2));
    (plane, mask)
}

#[test]
fn marked_cells_start_missing() {
    let (plane, mask) = fixture();
    let state = WorkingState::from_plane(&plane, &mask).unwrap();
    assert_eq!(state.get(1, 1), None);
    assert_eq!(state.get(0, 2), None);
    assert_eq!(state.get(2, 2), Some(80.0));

    let all = Bandwidth::new(1, 1).window_at(1, 1, 3, 3);
    assert_eq!(state.present_in(all), 7);
}

#[test]
fn shape_mismatch_is_rejected() {
    let (plane, _) = fixture();
    let mask = TargetMask::empty(2, 3);
    let err = WorkingState::from_plane(&plane, &mask).unwrap_err();
    assert!(matches!(err, AttackError::Validation(_)));
}

#[test]
fn median_skips_marked_cells_and_sees_assignments() {
    let (plane, mask) = fixture();
    let mut state = WorkingState::from_plane(&plane, &mask).unwrap();
    let all = Bandwidth::new(1, 1).window_at(1, 1, 3, 3);
    let mut scratch = Vec::new();

    // present: 0, 10, 30, 50, 60, 70, 80
    assert_eq!(state.window_median(all, &mut scratch), Some(50.0));

    state.assign(0, 0, 200.0);
    state.assign(1, 0, 200.0);
    // present: 10, 50, 60, 70, 80, 200, 200
    assert_eq!(state.window_median(all, &mut scratch), Some(70.0));
}

#[test]
fn window_cells_are_row_major() {
    let (plane, mask) = fixture();
    let state = WorkingState::from_plane(&plane, &mask).unwrap();
    let top = Bandwidth::new(0, 1).window_at(0, 1, 3, 3);
    assert_eq!(state.window_cells(top), vec![Some(0.0), Some(10.0), None]);
}

#[test]
fn consumption_marker_only_shrinks() {
    let (plane, mask) = fixture();
    let state = WorkingState::from_plane(&plane, &mask).unwrap();
    let mut marker = ConsumptionMarker::from_state(&state);
    let all = Bandwidth::new(1, 1).window_at(1, 1, 3, 3);

    assert_eq!(marker.available_in(all), 7);
    assert!(!marker.is_available(1, 1));
    marker.consume(2, 0);
    marker.consume(2, 0);
    assert!(!marker.is_available(2, 0));
    assert_eq!(marker.available_in(all), 6);
}
