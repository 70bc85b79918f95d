//! Triangle angle sum

use super::{note, triangles_touching, AgendaItem, Rule, Trigger};
use crate::ir::{approx_eq, EngineError, EngineResult, FactRef, FactStore, ANGLE_TOLERANCE};

/// Angles of a triangle sum to 180°
///
/// Two known angles fix the third. One known angle fixes the other two when
/// they share a class, and three angles in one class are each 60°.
pub struct AngleSum;

impl Rule for AngleSum {
    fn id(&self) -> &'static str {
        "angle_sum"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Angle
    }

    fn apply(&self, item: &AgendaItem, facts: &mut FactStore) -> EngineResult<Vec<FactRef>> {
        let AgendaItem::Fact(fact) = item else {
            return Ok(Vec::new());
        };

        let mut changed = Vec::new();
        for tri in triangles_touching(facts, fact) {
            let values = tri.angles().clone().map(|a| facts.angle_value(&a));
            let known: Vec<usize> = (0..3).filter(|&i| values[i].is_some()).collect();
            let sum: f64 = values.iter().flatten().sum();

            match known.as_slice() {
                [_, _, _] => {
                    if !approx_eq(sum, 180.0, ANGLE_TOLERANCE) {
                        return Err(EngineError::impossible(format!(
                            "angles of {} sum to {}",
                            tri, sum
                        )));
                    }
                }
                [i, j] => {
                    let k = 3 - i - j;
                    let third = 180.0 - sum;
                    if third <= 0.0 {
                        return Err(EngineError::impossible(format!(
                            "angles of {} leave {} degrees for {}",
                            tri,
                            third,
                            tri.angle(k)
                        )));
                    }
                    let angle = tri.angle(k);
                    note(&mut changed, facts.set_angle_value(angle, third)?, angle.clone());
                }
                [i] => {
                    let (j, k) = ((i + 1) % 3, (i + 2) % 3);
                    if facts.same_angle_class(tri.angle(j), tri.angle(k)) {
                        let each = (180.0 - sum) / 2.0;
                        if facts.set_angle_value(tri.angle(j), each)? {
                            changed.push(tri.angle(j).clone().into());
                            changed.push(tri.angle(k).clone().into());
                        }
                    }
                }
                _ => {
                    let [a0, a1, a2] = tri.angles();
                    if facts.same_angle_class(a0, a1)
                        && facts.same_angle_class(a1, a2)
                        && facts.set_angle_value(a0, 60.0)?
                    {
                        changed.extend(tri.angles().iter().cloned().map(FactRef::from));
                    }
                }
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Triangle;
    use crate::ir::{angle_key, Point};

    fn abc() -> (FactStore, [Point; 3]) {
        let points = ["A", "B", "C"].map(Point::new);
        let mut facts = FactStore::new();
        facts.register_triangle(Triangle::new(&points[0], &points[1], &points[2]));
        (facts, points)
    }

    #[test]
    fn test_third_angle() {
        let (mut facts, [a, b, c]) = abc();
        facts.set_angle_value(&angle_key(&b, &a, &c), 50.0).unwrap();
        facts.set_angle_value(&angle_key(&a, &b, &c), 60.0).unwrap();

        let changed = AngleSum
            .apply(&AgendaItem::Fact(angle_key(&a, &b, &c).into()), &mut facts)
            .unwrap();

        let acb = angle_key(&a, &c, &b);
        assert_eq!(changed, vec![FactRef::from(acb.clone())]);
        assert!((facts.angle_value(&acb).unwrap() - 70.0).abs() < 1e-10);
    }

    #[test]
    fn test_isosceles_base_angles() {
        let (mut facts, [a, b, c]) = abc();
        let (bac, abc, acb) = (angle_key(&b, &a, &c), angle_key(&a, &b, &c), angle_key(&a, &c, &b));
        facts.set_angle_value(&bac, 40.0).unwrap();
        facts.merge_angles(&abc, &acb).unwrap();

        AngleSum
            .apply(&AgendaItem::Fact(bac.into()), &mut facts)
            .unwrap();

        assert_eq!(facts.angle_value(&abc), Some(70.0));
        assert_eq!(facts.angle_value(&acb), Some(70.0));
    }

    #[test]
    fn test_equiangular() {
        let (mut facts, [a, b, c]) = abc();
        let (bac, abc, acb) = (angle_key(&b, &a, &c), angle_key(&a, &b, &c), angle_key(&a, &c, &b));
        facts.merge_angles(&bac, &abc).unwrap();
        facts.merge_angles(&abc, &acb).unwrap();

        let changed = AngleSum
            .apply(&AgendaItem::Fact(acb.clone().into()), &mut facts)
            .unwrap();
        assert_eq!(changed.len(), 3);
        assert_eq!(facts.angle_value(&bac), Some(60.0));
    }

    #[test]
    fn test_overfull_triangle_is_impossible() {
        let (mut facts, [a, b, c]) = abc();
        facts.set_angle_value(&angle_key(&b, &a, &c), 100.0).unwrap();
        facts.set_angle_value(&angle_key(&a, &b, &c), 90.0).unwrap();

        let err = AngleSum
            .apply(&AgendaItem::Fact(angle_key(&a, &b, &c).into()), &mut facts)
            .unwrap_err();
        assert!(err.is_contradiction());
    }
}
