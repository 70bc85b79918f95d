//! Value-equality closure (segments, angles)

use super::{AgendaItem, Rule, Trigger};
use crate::ir::{approx_eq, EngineResult, FactRef, FactStore, ANGLE_TOLERANCE, SEGMENT_TOLERANCE};

/// Classes holding the same value are the same class: AB = 4, CD = 4 ⇒ AB = CD
///
/// Catches lengths or measures computed independently that happen to agree.
pub struct ValueEquality;

impl Rule for ValueEquality {
    fn id(&self) -> &'static str {
        "value_equality"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Fact
    }

    fn apply(&self, item: &AgendaItem, facts: &mut FactStore) -> EngineResult<Vec<FactRef>> {
        let AgendaItem::Fact(fact) = item else {
            return Ok(Vec::new());
        };
        let Some(value) = facts.value(fact) else {
            return Ok(Vec::new());
        };

        let mut changed = Vec::new();
        match fact {
            FactRef::Segment(s) => {
                for (other, known) in facts.valued_segments() {
                    if approx_eq(value, known, SEGMENT_TOLERANCE)
                        && !facts.same_segment_class(s, &other)
                        && facts.merge_segments(s, &other)?
                    {
                        changed.push(other.into());
                    }
                }
            }
            FactRef::Angle(a) => {
                for (other, known) in facts.valued_angles() {
                    if approx_eq(value, known, ANGLE_TOLERANCE)
                        && !facts.same_angle_class(a, &other)
                        && facts.merge_angles(a, &other)?
                    {
                        changed.push(other.into());
                    }
                }
            }
        }
        Ok(changed)
    }
}
