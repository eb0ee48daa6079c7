//! Mathematical helpers for geometry folding and periodic indexing.

use std::f32::consts::FRAC_PI_2;

/// Folds an angle (radians) into `[0, pi/2)` by repeatedly adding/subtracting `pi/2`.
///
/// Mirrors the detector-pixel profile's use of the trapezoid's quarter-turn symmetry:
/// the profile shape only depends on the view angle modulo a right angle.
pub(crate) fn fold_quarter_turn(angle: f32) -> f32 {
    let mut folded = angle;
    while folded >= FRAC_PI_2 {
        folded -= FRAC_PI_2;
    }
    while folded < 0.0 {
        folded += FRAC_PI_2;
    }
    folded
}

/// Advances `index` by one step along an axis of length `len` with periodic wrap-around.
pub(crate) fn wrap_next(index: usize, len: usize) -> usize {
    let next = index + 1;
    if next < len {
        next
    } else {
        0
    }
}

/// Steps `index` back by one along an axis of length `len` with periodic wrap-around.
pub(crate) fn wrap_prev(index: usize, len: usize) -> usize {
    if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

#[cfg(test)]
mod tests {
    use super::{fold_quarter_turn, wrap_next, wrap_prev};
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn fold_quarter_turn_maps_into_range() {
        assert!((fold_quarter_turn(0.1) - 0.1).abs() < 1e-6);
        assert!((fold_quarter_turn(FRAC_PI_2 + 0.1) - 0.1).abs() < 1e-6);
        assert!((fold_quarter_turn(PI + 0.2) - 0.2).abs() < 1e-5);
        assert!((fold_quarter_turn(-0.1) - (FRAC_PI_2 - 0.1)).abs() < 1e-6);
    }

    #[test]
    fn wrap_next_wraps_at_boundary() {
        assert_eq!(wrap_next(0, 4), 1);
        assert_eq!(wrap_next(3, 4), 0);
    }

    #[test]
    fn wrap_prev_wraps_at_boundary() {
        assert_eq!(wrap_prev(0, 4), 3);
        assert_eq!(wrap_prev(2, 4), 1);
    }
}
