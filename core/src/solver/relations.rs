//! Validation of relational constraints
//!
//! Comparisons, non-parallelism and point incidence never change the fact
//! store. They are checked against it after each propagation run.

use crate::ir::{
    approx_eq, ops, segment_key, Constraint, ConstraintShape, FactStore, Operand, Operator, Point,
    Segment, Slot, SymbolTable, ANGLE_TOLERANCE,
};

/// Tolerance for deciding a relation on computed values
const RELATION_TOLERANCE: f64 = ANGLE_TOLERANCE;

/// Tolerance for point incidence on coordinates
const INCIDENCE_EPSILON: f64 = 1e-10;

/// State of a relational constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Holds,
    Violated,
    /// Not enough is known yet
    Pending,
}

impl From<Option<bool>> for Verdict {
    fn from(holds: Option<bool>) -> Self {
        match holds {
            Some(true) => Verdict::Holds,
            Some(false) => Verdict::Violated,
            None => Verdict::Pending,
        }
    }
}

/// Judge one relational constraint; non-relational shapes are `Pending`
pub fn check_relation(
    constraint: &Constraint,
    facts: &FactStore,
    symbols: &SymbolTable,
    lookup: &impl Fn(&Slot) -> Option<f64>,
) -> Verdict {
    match constraint.shape() {
        ConstraintShape::Comparison => compare(constraint, facts, lookup).into(),
        ConstraintShape::NotParallel => match (constraint.left(), constraint.right()) {
            (Operand::Segment(l), Operand::Segment(r)) if l == r || facts.are_parallel(l, r) => {
                Verdict::Violated
            }
            // may still become parallel
            _ => Verdict::Pending,
        },
        ConstraintShape::Incidence => {
            let (Operand::Point(p), Operand::Segment(s)) = (constraint.left(), constraint.right())
            else {
                return Verdict::Pending;
            };
            let on = lies_on(p, s, facts, symbols);
            match constraint.operator() {
                Operator::NotOn => on.map(|on| !on).into(),
                _ => on.into(),
            }
        }
        _ => Verdict::Pending,
    }
}

fn compare(
    constraint: &Constraint,
    facts: &FactStore,
    lookup: &impl Fn(&Slot) -> Option<f64>,
) -> Option<bool> {
    let operator = constraint.operator();

    // classes decide equality before any value is known
    let same_class = match (constraint.left(), constraint.right()) {
        (Operand::Segment(l), Operand::Segment(r)) => facts.same_segment_class(l, r),
        (Operand::Angle(l), Operand::Angle(r)) => facts.same_angle_class(l, r),
        _ => false,
    };
    if same_class {
        return Some(matches!(operator, Operator::Le | Operator::Ge | Operator::Eq));
    }

    let l = constraint.left().as_expr()?.evaluate(lookup)?;
    let r = constraint.right().as_expr()?.evaluate(lookup)?;
    let equal = approx_eq(l, r, RELATION_TOLERANCE);
    Some(match operator {
        Operator::Eq => equal,
        Operator::NotEq => !equal,
        Operator::Lt => !equal && l < r,
        Operator::Le => equal || l < r,
        Operator::Gt => !equal && l > r,
        Operator::Ge => equal || l > r,
        _ => true,
    })
}

/// Whether `p` lies on the closed segment `s`, if that can be told yet
///
/// Coordinates decide when all three points have them; otherwise known
/// lengths do, through `PA + PB == AB`.
fn lies_on(p: &Point, s: &Segment, facts: &FactStore, symbols: &SymbolTable) -> Option<bool> {
    let [a, b] = s.points();
    if s.contains(p) {
        return Some(true);
    }

    if let (Some(pp), Some(pa), Some(pb)) = (
        symbols.coordinates(p),
        symbols.coordinates(a),
        symbols.coordinates(b),
    ) {
        return Some(ops::is_on_segment(pp, pa, pb, INCIDENCE_EPSILON));
    }

    let length = |x: &Point, y: &Point| facts.segment_value(&segment_key(x, y));
    let (to_a, to_b, whole) = (length(p, a)?, length(p, b)?, length(a, b)?);
    Some(approx_eq(to_a + to_b, whole, RELATION_TOLERANCE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{angle_key, Point2D};

    fn lookup_in(facts: &FactStore) -> impl Fn(&Slot) -> Option<f64> + '_ {
        move |slot| match slot {
            Slot::Fact(fact) => facts.value(fact),
            Slot::Unknown(_) => None,
        }
    }

    #[test]
    fn test_comparison_verdicts() {
        let [a, b, c, d] = ["A", "B", "C", "D"].map(Point::new);
        let (ab, cd) = (segment_key(&a, &b), segment_key(&c, &d));
        let symbols = SymbolTable::new();
        let mut facts = FactStore::new();

        let gt = Constraint::new(ab.clone(), Operator::Gt, 8.0).unwrap();
        assert_eq!(check_relation(&gt, &facts, &symbols, &lookup_in(&facts)), Verdict::Pending);

        facts.set_segment_value(&ab, 5.0).unwrap();
        assert_eq!(check_relation(&gt, &facts, &symbols, &lookup_in(&facts)), Verdict::Violated);

        let ne = Constraint::new(ab.clone(), Operator::NotEq, cd.clone()).unwrap();
        facts.merge_segments(&ab, &cd).unwrap();
        assert_eq!(check_relation(&ne, &facts, &symbols, &lookup_in(&facts)), Verdict::Violated);

        let le = Constraint::new(ab, Operator::Le, 5.0).unwrap();
        assert_eq!(check_relation(&le, &facts, &symbols, &lookup_in(&facts)), Verdict::Holds);
    }

    #[test]
    fn test_angle_comparison() {
        let [a, b, c] = ["A", "B", "C"].map(Point::new);
        let abc = angle_key(&a, &b, &c);
        let symbols = SymbolTable::new();
        let mut facts = FactStore::new();
        facts.set_angle_value(&abc, 90.0).unwrap();

        let acute = Constraint::new(abc, Operator::Lt, 90.0).unwrap();
        assert_eq!(check_relation(&acute, &facts, &symbols, &lookup_in(&facts)), Verdict::Violated);
    }

    #[test]
    fn test_not_parallel() {
        let [a, b, c, d] = ["A", "B", "C", "D"].map(Point::new);
        let (ab, cd) = (segment_key(&a, &b), segment_key(&c, &d));
        let symbols = SymbolTable::new();
        let mut facts = FactStore::new();

        let np = Constraint::new(ab.clone(), Operator::NotParallel, cd.clone()).unwrap();
        assert_eq!(check_relation(&np, &facts, &symbols, &lookup_in(&facts)), Verdict::Pending);

        facts.merge_parallels(&ab, &cd);
        assert_eq!(check_relation(&np, &facts, &symbols, &lookup_in(&facts)), Verdict::Violated);
    }

    #[test]
    fn test_incidence_from_coordinates() {
        let mut symbols = SymbolTable::new();
        symbols.add_point_at("A", Point2D::new(0.0, 0.0));
        symbols.add_point_at("B", Point2D::new(4.0, 0.0));
        symbols.add_point_at("P", Point2D::new(1.0, 0.0));
        symbols.add_point_at("Q", Point2D::new(1.0, 1.0));
        let [a, b, p, q] = ["A", "B", "P", "Q"].map(Point::new);
        let ab = segment_key(&a, &b);
        let facts = FactStore::new();

        let p_on = Constraint::new(p, Operator::On, ab.clone()).unwrap();
        let q_not_on = Constraint::new(ab.clone(), Operator::NotOn, q.clone()).unwrap();
        let q_on = Constraint::new(q, Operator::On, ab).unwrap();

        assert_eq!(check_relation(&p_on, &facts, &symbols, &lookup_in(&facts)), Verdict::Holds);
        assert_eq!(check_relation(&q_not_on, &facts, &symbols, &lookup_in(&facts)), Verdict::Holds);
        assert_eq!(check_relation(&q_on, &facts, &symbols, &lookup_in(&facts)), Verdict::Violated);
    }

    #[test]
    fn test_incidence_from_lengths() {
        let [a, b, p] = ["A", "B", "P"].map(Point::new);
        let symbols = SymbolTable::new();
        let mut facts = FactStore::new();
        let on = Constraint::new(p.clone(), Operator::On, segment_key(&a, &b)).unwrap();

        assert_eq!(check_relation(&on, &facts, &symbols, &lookup_in(&facts)), Verdict::Pending);

        facts.set_segment_value(&segment_key(&a, &b), 5.0).unwrap();
        facts.set_segment_value(&segment_key(&p, &a), 2.0).unwrap();
        facts.set_segment_value(&segment_key(&p, &b), 3.0).unwrap();
        assert_eq!(check_relation(&on, &facts, &symbols, &lookup_in(&facts)), Verdict::Holds);
    }
}
