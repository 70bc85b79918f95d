//! Isosceles triangle rules

use super::{triangles_touching, AgendaItem, Rule, Trigger};
use crate::ir::{EngineResult, FactRef, FactStore};

/// Vertex index pairs of a triangle
const PAIRS: [(usize, usize); 3] = [(0, 1), (1, 2), (0, 2)];

/// Equal base angles ⇒ equal opposite sides: ∠ABC = ∠ACB ⇒ AB = AC
pub struct IsoscelesAngleToSide;

impl Rule for IsoscelesAngleToSide {
    fn id(&self) -> &'static str {
        "isosceles_angle_to_side"
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
            for (i, j) in PAIRS {
                if facts.same_angle_class(tri.angle(i), tri.angle(j))
                    && facts.merge_segments(tri.side(i), tri.side(j))?
                {
                    changed.push(tri.side(i).clone().into());
                    changed.push(tri.side(j).clone().into());
                }
            }
        }
        Ok(changed)
    }
}

/// Equal sides ⇒ equal opposite angles: AB = AC ⇒ ∠ABC = ∠ACB
pub struct IsoscelesSideToAngle;

impl Rule for IsoscelesSideToAngle {
    fn id(&self) -> &'static str {
        "isosceles_side_to_angle"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Segment
    }

    fn apply(&self, item: &AgendaItem, facts: &mut FactStore) -> EngineResult<Vec<FactRef>> {
        let AgendaItem::Fact(fact) = item else {
            return Ok(Vec::new());
        };

        let mut changed = Vec::new();
        for tri in triangles_touching(facts, fact) {
            for (i, j) in PAIRS {
                if facts.same_segment_class(tri.side(i), tri.side(j))
                    && facts.merge_angles(tri.angle(i), tri.angle(j))?
                {
                    changed.push(tri.angle(i).clone().into());
                    changed.push(tri.angle(j).clone().into());
                }
            }
        }
        Ok(changed)
    }
}
