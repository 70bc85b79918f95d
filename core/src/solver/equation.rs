//! Closed-form solving of arithmetic equations
//!
//! An equation is reduced to a polynomial in its single free slot once every
//! other slot has a value. Degrees up to two are solved directly; anything
//! else waits until more is known.

use crate::ir::{approx_eq, EngineError, EngineResult, Expr, Slot, ANGLE_TOLERANCE};

/// Result of looking at an equation in the current state
#[derive(Debug, Clone, PartialEq)]
pub enum EquationOutcome {
    /// Nothing is free and both sides agree
    Satisfied,
    /// The free slot can take exactly these admissible values, ascending
    Roots { slot: Slot, roots: Vec<f64> },
    /// Not reducible in closed form yet
    Pending,
}

/// Polynomial `c0 + c1·x + c2·x²`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Quadratic([f64; 3]);

impl Quadratic {
    fn constant(c: f64) -> Self {
        Self([c, 0.0, 0.0])
    }

    fn variable() -> Self {
        Self([0.0, 1.0, 0.0])
    }

    fn degree(&self) -> usize {
        match self.0 {
            [_, _, c2] if c2 != 0.0 => 2,
            [_, c1, _] if c1 != 0.0 => 1,
            _ => 0,
        }
    }

    fn add(self, other: Self) -> Self {
        let [a0, a1, a2] = self.0;
        let [b0, b1, b2] = other.0;
        Self([a0 + b0, a1 + b1, a2 + b2])
    }

    fn scale(self, k: f64) -> Self {
        Self(self.0.map(|c| c * k))
    }

    fn mul(self, other: Self) -> Option<Self> {
        if self.degree() + other.degree() > 2 {
            return None;
        }
        let [a0, a1, a2] = self.0;
        let [b0, b1, b2] = other.0;
        Some(Self([a0 * b0, a0 * b1 + a1 * b0, a0 * b2 + a1 * b1 + a2 * b0]))
    }

    /// Real roots, ascending, a double root reported once
    fn real_roots(&self) -> Vec<f64> {
        let [c, b, a] = self.0;
        match self.degree() {
            0 => Vec::new(),
            1 => vec![-c / b],
            _ => {
                let mut disc = b * b - 4.0 * a * c;
                if disc < 0.0 && disc.abs() <= 1e-12 * (b * b).max((4.0 * a * c).abs()) {
                    disc = 0.0;
                }
                if disc < 0.0 {
                    return Vec::new();
                }
                if disc == 0.0 {
                    return vec![-b / (2.0 * a)];
                }
                // avoids cancellation between -b and the root
                let q = -0.5 * (b + b.signum() * disc.sqrt());
                let (r1, r2) = if q == 0.0 {
                    let half = disc.sqrt() / (2.0 * a);
                    (-half, half)
                } else {
                    (q / a, c / q)
                };
                let mut roots = vec![r1.min(r2), r1.max(r2)];
                roots.dedup_by(|x, y| approx_eq(*x, *y, ANGLE_TOLERANCE));
                roots
            }
        }
    }
}

/// Reduce `expr` to a polynomial in `free`, all other slots looked up
fn reduce(expr: &Expr, free: &Slot, lookup: &impl Fn(&Slot) -> Option<f64>) -> Option<Quadratic> {
    let slot_value = |slot: Slot| {
        if &slot == free {
            Some(Quadratic::variable())
        } else {
            lookup(&slot).map(Quadratic::constant)
        }
    };

    match expr {
        Expr::Number(n) => Some(Quadratic::constant(*n)),
        Expr::Fact(fact) => slot_value(Slot::Fact(fact.clone())),
        Expr::Unknown(u) => slot_value(Slot::Unknown(u.clone())),
        Expr::Add(l, r) => Some(reduce(l, free, lookup)?.add(reduce(r, free, lookup)?)),
        Expr::Sub(l, r) => Some(reduce(l, free, lookup)?.add(reduce(r, free, lookup)?.scale(-1.0))),
        Expr::Mul(l, r) => reduce(l, free, lookup)?.mul(reduce(r, free, lookup)?),
        Expr::Div(l, r) => {
            let denominator = reduce(r, free, lookup)?;
            let [d, ..] = denominator.0;
            if denominator.degree() > 0 || d == 0.0 {
                return None;
            }
            Some(reduce(l, free, lookup)?.scale(1.0 / d))
        }
        Expr::Neg(inner) => Some(reduce(inner, free, lookup)?.scale(-1.0)),
    }
}

fn admits(slot: &Slot, value: f64) -> bool {
    match slot {
        Slot::Fact(fact) => fact.admits(value),
        Slot::Unknown(_) => value.is_finite(),
    }
}

/// Examine `left == right` against the values `lookup` knows
///
/// A violated equation, or one whose roots are all inadmissible, is an
/// `ImpossibleConstraint`.
pub fn solve_equation(
    left: &Expr,
    right: &Expr,
    lookup: &impl Fn(&Slot) -> Option<f64>,
) -> EngineResult<EquationOutcome> {
    let mut slots = left.slots();
    right.collect_slots(&mut slots);
    let free: Vec<Slot> = slots.into_iter().filter(|s| lookup(s).is_none()).collect();

    match free.as_slice() {
        [] => {
            let (Some(l), Some(r)) = (left.evaluate(lookup), right.evaluate(lookup)) else {
                return Err(EngineError::impossible(format!(
                    "{} == {} divides by zero",
                    left, right
                )));
            };
            if approx_eq(l, r, ANGLE_TOLERANCE) {
                Ok(EquationOutcome::Satisfied)
            } else {
                Err(EngineError::impossible(format!(
                    "{} == {} evaluates to {} == {}",
                    left, right, l, r
                )))
            }
        }
        [slot] => {
            let (Some(l), Some(r)) = (reduce(left, slot, lookup), reduce(right, slot, lookup))
            else {
                return Ok(EquationOutcome::Pending);
            };
            let residual = l.add(r.scale(-1.0));
            if residual.degree() == 0 {
                // the free slot cancelled out
                let [c, ..] = residual.0;
                return if approx_eq(c, 0.0, ANGLE_TOLERANCE) {
                    Ok(EquationOutcome::Pending)
                } else {
                    Err(EngineError::impossible(format!(
                        "{} == {} has no solution",
                        left, right
                    )))
                };
            }

            let roots: Vec<f64> = residual
                .real_roots()
                .into_iter()
                .filter(|&v| admits(slot, v))
                .collect();
            if roots.is_empty() {
                return Err(EngineError::impossible(format!(
                    "{} == {} has no admissible value for {}",
                    left, right, slot
                )));
            }
            Ok(EquationOutcome::Roots {
                slot: slot.clone(),
                roots,
            })
        }
        _ => Ok(EquationOutcome::Pending),
    }
}
