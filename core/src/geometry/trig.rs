//! Triangle trigonometry in degrees
//!
//! Angles enter and leave in degrees; radians only exist inside the calls to
//! the trigonometric functions.

use crate::ir::ANGLE_TOLERANCE;

/// Sine of an angle given in degrees
pub fn sin_deg(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

/// Cosine of an angle given in degrees
pub fn cos_deg(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

/// Side opposite an angle, from the two sides enclosing it
///
/// `c² = a² + b² − 2ab·cos C`
pub fn cosine_rule_side(a: f64, b: f64, included_degrees: f64) -> f64 {
    (a * a + b * b - 2.0 * a * b * cos_deg(included_degrees))
        .max(0.0)
        .sqrt()
}

/// Angle opposite `opposite`, in degrees, from all three sides
///
/// The cosine is clamped to `[-1, 1]` before inversion. Returns None when an
/// adjacent side has zero length.
pub fn cosine_rule_angle(opposite: f64, adjacent1: f64, adjacent2: f64) -> Option<f64> {
    let denominator = 2.0 * adjacent1 * adjacent2;
    if denominator == 0.0 {
        return None;
    }
    let cos = (adjacent1 * adjacent1 + adjacent2 * adjacent2 - opposite * opposite) / denominator;
    Some(cos.clamp(-1.0, 1.0).acos().to_degrees())
}

/// Side opposite `angle`, given a side and its opposite angle
///
/// `b = sin B · a / sin A`. Returns None when `sin A` vanishes.
pub fn sine_rule_side(known_side: f64, known_angle: f64, angle: f64) -> Option<f64> {
    let sin_known = sin_deg(known_angle);
    if sin_known.abs() < ANGLE_TOLERANCE {
        return None;
    }
    Some(sin_deg(angle) * known_side / sin_known)
}

/// Outcome of solving for an angle with the law of sines
#[derive(Debug, Clone, PartialEq)]
pub enum SineRuleAngle {
    /// Exactly one admissible angle
    Unique(f64),
    /// Both the acute and the obtuse solution fit the triangle
    Ambiguous(f64, f64),
    /// No triangle has these measurements
    Impossible,
}

/// Angle opposite `side`, given another side and its opposite angle
///
/// `sin B = b · sin A / a`. Both `asin` solutions are checked against the
/// known angle: a candidate survives only if the two angles leave room for a
/// third.
pub fn sine_rule_angle(known_side: f64, known_angle: f64, side: f64) -> SineRuleAngle {
    if known_side <= 0.0 {
        return SineRuleAngle::Impossible;
    }
    let ratio = side * sin_deg(known_angle) / known_side;
    if ratio > 1.0 + 1e-12 || ratio <= 0.0 {
        return SineRuleAngle::Impossible;
    }

    let acute = ratio.min(1.0).asin().to_degrees();
    let obtuse = 180.0 - acute;
    let fits = |angle: f64| angle + known_angle < 180.0 - ANGLE_TOLERANCE;

    let right_angle = (acute - obtuse).abs() < ANGLE_TOLERANCE;
    match (fits(acute), fits(obtuse) && !right_angle) {
        (true, true) => SineRuleAngle::Ambiguous(acute, obtuse),
        (true, false) => SineRuleAngle::Unique(acute),
        (false, true) => SineRuleAngle::Unique(obtuse),
        (false, false) => SineRuleAngle::Impossible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_rule_side() {
        let bc = cosine_rule_side(5.0, 7.0, 60.0);
        assert!((bc - 39f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_rule_angle_equilateral() {
        let angle = cosine_rule_angle(2.0, 2.0, 2.0).unwrap();
        assert!((angle - 60.0).abs() < 1e-10);
        assert_eq!(cosine_rule_angle(1.0, 0.0, 1.0), None);
    }

    #[test]
    fn test_cosine_rule_angle_clamps_flat_triangles() {
        // 1 + 2 == 3 up to round-off: a straight angle, not NaN
        let angle = cosine_rule_angle(3.0, 1.0, 2.0).unwrap();
        assert!((angle - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_sine_rule_side() {
        // 30-60-90 triangle with hypotenuse 2
        let short = sine_rule_side(2.0, 90.0, 30.0).unwrap();
        assert!((short - 1.0).abs() < 1e-12);
        assert_eq!(sine_rule_side(1.0, 0.0, 30.0), None);
    }

    #[test]
    fn test_sine_rule_angle_unique_when_opposite_side_is_shorter() {
        match sine_rule_angle(2.0, 90.0, 1.0) {
            SineRuleAngle::Unique(angle) => assert!((angle - 30.0).abs() < 1e-10),
            other => panic!("expected unique angle, got {:?}", other),
        }
    }

    #[test]
    fn test_sine_rule_angle_ambiguous_case() {
        match sine_rule_angle(6.0, 30.0, 10.0) {
            SineRuleAngle::Ambiguous(acute, obtuse) => {
                assert!((acute + obtuse - 180.0).abs() < 1e-10);
                assert!((sin_deg(acute) - 10.0 * 0.5 / 6.0).abs() < 1e-12);
            }
            other => panic!("expected two candidates, got {:?}", other),
        }
    }

    #[test]
    fn test_sine_rule_angle_impossible() {
        assert_eq!(sine_rule_angle(1.0, 30.0, 5.0), SineRuleAngle::Impossible);
        // obtuse known angle cannot face the shorter side
        assert_eq!(sine_rule_angle(5.0, 120.0, 5.5), SineRuleAngle::Impossible);
    }
}
