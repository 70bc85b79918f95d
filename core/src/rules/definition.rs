//! Translation of asserted constraints into fact store updates

use super::{note, AgendaItem, Rule, Trigger};
use crate::ir::{ConstraintShape, EngineError, EngineResult, FactRef, FactStore, Operand};

/// Applies a freshly asserted value, equality or parallel constraint
///
/// `AB == 3` sets a length, `∠ABC == 40` a measure, `AB == CD` and
/// `∠ABC == ∠DEF` merge classes, `AB // CD` merges direction classes.
/// Other shapes are handled by the solver, not by propagation.
pub struct Definition;

impl Rule for Definition {
    fn id(&self) -> &'static str {
        "definition"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Constraint
    }

    fn apply(&self, item: &AgendaItem, facts: &mut FactStore) -> EngineResult<Vec<FactRef>> {
        let AgendaItem::Constraint(constraint) = item else {
            return Ok(Vec::new());
        };

        let mut changed = Vec::new();
        match (constraint.shape(), constraint.left(), constraint.right()) {
            (ConstraintShape::SegmentValue, Operand::Segment(s), Operand::Number(v)) => {
                if *v < 0.0 {
                    return Err(EngineError::impossible(format!(
                        "{} cannot have negative length {}",
                        s, v
                    )));
                }
                note(&mut changed, facts.set_segment_value(s, *v)?, s.clone());
            }
            (ConstraintShape::AngleValue, Operand::Angle(a), Operand::Number(v)) => {
                if !(0.0..=180.0).contains(v) {
                    return Err(EngineError::impossible(format!(
                        "{} cannot measure {} degrees",
                        a, v
                    )));
                }
                note(&mut changed, facts.set_angle_value(a, *v)?, a.clone());
            }
            (ConstraintShape::SegmentEquality, Operand::Segment(l), Operand::Segment(r)) => {
                if facts.merge_segments(l, r)? {
                    changed.push(l.clone().into());
                    changed.push(r.clone().into());
                }
            }
            (ConstraintShape::AngleEquality, Operand::Angle(l), Operand::Angle(r)) => {
                if facts.merge_angles(l, r)? {
                    changed.push(l.clone().into());
                    changed.push(r.clone().into());
                }
            }
            (ConstraintShape::SegmentParallel, Operand::Segment(l), Operand::Segment(r)) => {
                // direction classes carry no value, nothing downstream reacts
                facts.merge_parallels(l, r);
            }
            _ => {}
        }
        Ok(changed)
    }
}
