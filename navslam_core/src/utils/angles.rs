// navslam_core/src/utils/angles.rs

use num_traits::{Float, FloatConst};

/// Wraps an angle (radians) into the half-open interval (-pi, pi].
///
/// Works for any float type, so the same helper serves the `f64` filter code
/// and any `f32` consumers.
pub fn wrap_angle<T: Float + FloatConst>(angle: T) -> T {
    let two_pi = T::TAU();
    let r = (angle + T::PI()) % two_pi;
    // `%` keeps the sign of the dividend, so fold negatives back into [0, 2pi).
    let r = if r < T::zero() { r + two_pi } else { r };
    let wrapped = r - T::PI();
    if wrapped <= -T::PI() {
        wrapped + two_pi
    } else {
        wrapped
    }
}

/// Signed smallest difference `a - b`, wrapped to (-pi, pi].
pub fn angle_difference<T: Float + FloatConst>(a: T, b: T) -> T {
    wrap_angle(a - b)
}
