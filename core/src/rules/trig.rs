//! Law of cosines and law of sines

use super::{note, triangles_touching, AgendaItem, Rule, Trigger};
use crate::geometry::{self, SineRuleAngle};
use crate::ir::{approx_eq, EngineError, EngineResult, FactRef, FactStore, SEGMENT_TOLERANCE};

/// `c² = a² + b² − 2ab·cos C`, forwards and backwards
///
/// Two sides and the included angle give the third side; three sides give
/// every angle.
pub struct LawOfCosines;

impl Rule for LawOfCosines {
    fn id(&self) -> &'static str {
        "law_of_cosines"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Fact
    }

    fn apply(&self, item: &AgendaItem, facts: &mut FactStore) -> EngineResult<Vec<FactRef>> {
        let AgendaItem::Fact(fact) = item else {
            return Ok(Vec::new());
        };

        let mut changed = Vec::new();
        for tri in triangles_touching(facts, fact) {
            for i in 0..3 {
                let (j, k) = ((i + 1) % 3, (i + 2) % 3);
                if facts.segment_value(tri.side(i)).is_some() {
                    continue;
                }
                if let (Some(b), Some(c), Some(angle)) = (
                    facts.segment_value(tri.side(j)),
                    facts.segment_value(tri.side(k)),
                    facts.angle_value(tri.angle(i)),
                ) {
                    let side = geometry::cosine_rule_side(b, c, angle);
                    let updated = facts.set_segment_value(tri.side(i), side)?;
                    note(&mut changed, updated, tri.side(i).clone());
                }
            }

            let sides = tri.sides().clone().map(|s| facts.segment_value(&s));
            let [Some(s0), Some(s1), Some(s2)] = sides else {
                continue;
            };
            let lengths = [s0, s1, s2];
            check_triangle_inequality(&tri, lengths)?;

            for i in 0..3 {
                if facts.angle_value(tri.angle(i)).is_some() {
                    continue;
                }
                let (j, k) = ((i + 1) % 3, (i + 2) % 3);
                let Some(angle) = geometry::cosine_rule_angle(lengths[i], lengths[j], lengths[k])
                else {
                    continue;
                };
                let updated = facts.set_angle_value(tri.angle(i), angle)?;
                note(&mut changed, updated, tri.angle(i).clone());
            }
        }
        Ok(changed)
    }
}

fn check_triangle_inequality(tri: &geometry::Triangle, lengths: [f64; 3]) -> EngineResult<()> {
    let total: f64 = lengths.iter().sum();
    for (i, &side) in lengths.iter().enumerate() {
        let rest = total - side;
        if side > rest && !approx_eq(side, rest, SEGMENT_TOLERANCE) {
            return Err(EngineError::impossible(format!(
                "{} = {} is longer than the other two sides of {} together",
                tri.side(i),
                side,
                tri
            )));
        }
    }
    Ok(())
}

/// `a / sin A = b / sin B`
///
/// Needs one vertex whose side and angle are both known. A missing side
/// follows directly; a missing angle may have an acute and an obtuse
/// solution, which is recorded as an ambiguity for the solver to split on.
pub struct LawOfSines;

impl Rule for LawOfSines {
    fn id(&self) -> &'static str {
        "law_of_sines"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Fact
    }

    fn apply(&self, item: &AgendaItem, facts: &mut FactStore) -> EngineResult<Vec<FactRef>> {
        let AgendaItem::Fact(fact) = item else {
            return Ok(Vec::new());
        };

        let mut changed = Vec::new();
        for tri in triangles_touching(facts, fact) {
            let reference = (0..3).find_map(|r| {
                let side = facts.segment_value(tri.side(r))?;
                let angle = facts.angle_value(tri.angle(r))?;
                (side > 0.0 && angle > 0.0 && angle < 180.0).then_some((r, side, angle))
            });
            let Some((r, known_side, known_angle)) = reference else {
                continue;
            };
            let all_sides_known = tri
                .sides()
                .iter()
                .all(|s| facts.segment_value(s).is_some());

            for i in (0..3).filter(|&i| i != r) {
                let side = facts.segment_value(tri.side(i));
                let angle = facts.angle_value(tri.angle(i));
                match (side, angle) {
                    (None, Some(angle)) => {
                        let Some(length) = geometry::sine_rule_side(known_side, known_angle, angle)
                        else {
                            continue;
                        };
                        let updated = facts.set_segment_value(tri.side(i), length)?;
                        note(&mut changed, updated, tri.side(i).clone());
                    }
                    (Some(side), None) => {
                        match geometry::sine_rule_angle(known_side, known_angle, side) {
                            SineRuleAngle::Unique(angle) => {
                                let updated = facts.set_angle_value(tri.angle(i), angle)?;
                                note(&mut changed, updated, tri.angle(i).clone());
                            }
                            // three known sides settle it through the law of cosines
                            SineRuleAngle::Ambiguous(_, _) if all_sides_known => {}
                            SineRuleAngle::Ambiguous(acute, obtuse) => {
                                if facts.record_ambiguity(tri.angle(i), vec![acute, obtuse]) {
                                    log::debug!(
                                        "{} is {} or {} by the law of sines",
                                        tri.angle(i),
                                        acute,
                                        obtuse
                                    );
                                }
                            }
                            SineRuleAngle::Impossible => {
                                return Err(EngineError::impossible(format!(
                                    "no triangle {} has {} = {} opposite {} = {} and {} = {}",
                                    tri,
                                    tri.side(r),
                                    known_side,
                                    tri.angle(r),
                                    known_angle,
                                    tri.side(i),
                                    side
                                )));
                            }
                        }
                    }
                    _ => {}
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
    use crate::ir::{angle_key, segment_key, Point};

    fn abc() -> (FactStore, [Point; 3]) {
        let points = ["A", "B", "C"].map(Point::new);
        let mut facts = FactStore::new();
        facts.register_triangle(Triangle::new(&points[0], &points[1], &points[2]));
        (facts, points)
    }

    #[test]
    fn test_side_from_two_sides_and_included_angle() {
        let (mut facts, [a, b, c]) = abc();
        facts.set_segment_value(&segment_key(&a, &b), 5.0).unwrap();
        facts.set_segment_value(&segment_key(&a, &c), 7.0).unwrap();
        facts.set_angle_value(&angle_key(&b, &a, &c), 60.0).unwrap();

        let changed = LawOfCosines
            .apply(&AgendaItem::Fact(angle_key(&b, &a, &c).into()), &mut facts)
            .unwrap();

        let bc = segment_key(&b, &c);
        assert!(changed.contains(&FactRef::from(bc.clone())));
        assert!((facts.segment_value(&bc).unwrap() - 39f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_angles_from_three_sides() {
        let (mut facts, [a, b, c]) = abc();
        facts.set_segment_value(&segment_key(&a, &b), 3.0).unwrap();
        facts.set_segment_value(&segment_key(&b, &c), 4.0).unwrap();
        facts.set_segment_value(&segment_key(&a, &c), 5.0).unwrap();

        LawOfCosines
            .apply(&AgendaItem::Fact(segment_key(&a, &c).into()), &mut facts)
            .unwrap();

        let right = facts.angle_value(&angle_key(&a, &b, &c)).unwrap();
        assert!((right - 90.0).abs() < 1e-10);
        assert!(facts.angle_value(&angle_key(&b, &a, &c)).is_some());
        assert!(facts.angle_value(&angle_key(&a, &c, &b)).is_some());
    }

    #[test]
    fn test_triangle_inequality_violation() {
        let (mut facts, [a, b, c]) = abc();
        facts.set_segment_value(&segment_key(&a, &b), 1.0).unwrap();
        facts.set_segment_value(&segment_key(&b, &c), 1.0).unwrap();
        facts.set_segment_value(&segment_key(&a, &c), 5.0).unwrap();

        let err = LawOfCosines
            .apply(&AgendaItem::Fact(segment_key(&a, &c).into()), &mut facts)
            .unwrap_err();
        assert!(err.is_contradiction());
    }

    #[test]
    fn test_sine_rule_side() {
        let (mut facts, [a, b, c]) = abc();
        // BC opposite A, AC opposite B
        facts.set_segment_value(&segment_key(&b, &c), 2.0).unwrap();
        facts.set_angle_value(&angle_key(&b, &a, &c), 30.0).unwrap();
        facts.set_angle_value(&angle_key(&a, &b, &c), 90.0).unwrap();

        LawOfSines
            .apply(&AgendaItem::Fact(angle_key(&a, &b, &c).into()), &mut facts)
            .unwrap();

        let ac = facts.segment_value(&segment_key(&a, &c)).unwrap();
        assert!((ac - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_ambiguous_angle_is_recorded() {
        let (mut facts, [a, b, c]) = abc();
        facts.set_angle_value(&angle_key(&b, &a, &c), 30.0).unwrap();
        facts.set_segment_value(&segment_key(&b, &c), 6.0).unwrap();
        facts.set_segment_value(&segment_key(&a, &c), 10.0).unwrap();

        let changed = LawOfSines
            .apply(&AgendaItem::Fact(segment_key(&a, &c).into()), &mut facts)
            .unwrap();
        assert!(changed.is_empty());

        let ambiguities = facts.take_ambiguities();
        assert_eq!(ambiguities.len(), 1);
        assert_eq!(ambiguities[0].angle, angle_key(&a, &b, &c));
        let [acute, obtuse] = [ambiguities[0].candidates[0], ambiguities[0].candidates[1]];
        assert!((acute + obtuse - 180.0).abs() < 1e-10);
        assert!(acute < 90.0);
    }

    #[test]
    fn test_unreachable_side_is_impossible() {
        let (mut facts, [a, b, c]) = abc();
        facts.set_angle_value(&angle_key(&b, &a, &c), 30.0).unwrap();
        facts.set_segment_value(&segment_key(&b, &c), 1.0).unwrap();
        facts.set_segment_value(&segment_key(&a, &c), 5.0).unwrap();

        let err = LawOfSines
            .apply(&AgendaItem::Fact(segment_key(&a, &c).into()), &mut facts)
            .unwrap_err();
        assert!(err.is_contradiction());
    }
}
