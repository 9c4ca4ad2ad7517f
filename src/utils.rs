// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! contains useful type definitions and validation functions.
use nalgebra::{SVector, Vector6 as NVector6};

/// Joint-space degrees of freedom of a teleoperated arm.
pub const JOINT_DOF: usize = 7;
/// Cartesian-space degrees of freedom.
pub const CARTESIAN_DOF: usize = 6;

/// A Vector with 7 entries
pub type Vector7 = SVector<f64, JOINT_DOF>;
/// A Vector with 6 entries
pub type Vector6 = NVector6<f64>;

/// Determines whether every joint position lies inside the closed interval `[q_min, q_max]`.
pub fn is_within_joint_limits(
    q: &[f64; JOINT_DOF],
    q_min: &[f64; JOINT_DOF],
    q_max: &[f64; JOINT_DOF],
) -> bool {
    let q = Vector7::from_row_slice(q);
    let lower = Vector7::from_row_slice(q_min);
    let upper = Vector7::from_row_slice(q_max);
    q.iter().all(|x| x.is_finite())
        && q.zip_map(&lower, |x, min| x >= min).iter().all(|x| *x)
        && q.zip_map(&upper, |x, max| x <= max).iter().all(|x| *x)
}

/// Determines whether a wrench limit `[f_x, f_y, f_z, m_x, m_y, m_z]` only contains finite,
/// non-negative entries.
pub fn is_valid_wrench_limit(wrench: &[f64; CARTESIAN_DOF]) -> bool {
    Vector6::from_row_slice(wrench)
        .iter()
        .all(|x| x.is_finite() && *x >= 0.)
}

#[cfg(test)]
mod test {
    use crate::utils::{is_valid_wrench_limit, is_within_joint_limits};

    const Q_MIN: [f64; 7] = [-2.7, -2.2, -2.9, -1.8, -2.9, -1.6, -2.9];
    const Q_MAX: [f64; 7] = [2.7, 2.2, 2.9, 2.6, 2.9, 3.7, 2.9];

    #[test]
    fn joint_limits() {
        let inside = [-0.67, -0.98, 0.89, 1.55, -0.85, 0.54, 0.46];
        assert!(is_within_joint_limits(&inside, &Q_MIN, &Q_MAX));
        assert!(is_within_joint_limits(&Q_MIN, &Q_MIN, &Q_MAX));
        let mut outside = inside;
        outside[3] = 2.7;
        assert!(!is_within_joint_limits(&outside, &Q_MIN, &Q_MAX));
        outside[3] = f64::NAN;
        assert!(!is_within_joint_limits(&outside, &Q_MIN, &Q_MAX));
    }

    #[test]
    fn wrench_limits() {
        assert!(is_valid_wrench_limit(&[80., 80., 80., 24., 24., 24.]));
        assert!(is_valid_wrench_limit(&[0.; 6]));
        assert!(!is_valid_wrench_limit(&[80., -1., 80., 24., 24., 24.]));
        assert!(!is_valid_wrench_limit(&[80., 80., f64::INFINITY, 24., 24., 24.]));
    }
}
