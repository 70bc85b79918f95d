//! Demonstration of the constraint engine
//!
//! Run with: cargo run --example engine_demo

use eukleia_core::*;

fn main() -> EngineResult<()> {
    println!("=== Eukleia Engine Demo ===\n");

    // 1. Angle sum
    println!("1. Angle sum:");
    let mut solver = Solver::new();
    let [a, b, c] = ["A", "B", "C"].map(|name| solver.add_point(name));
    solver.constrain(angle_key(&b, &a, &c), Operator::Eq, 50.0)?;
    solver.constrain(angle_key(&a, &b, &c), Operator::Eq, 60.0)?;
    let acb: FactRef = angle_key(&a, &c, &b).into();
    let solutions = solver.solve(&[acb.clone()])?;
    println!("   {} = {:?}\n", acb, solutions.distinct_values(&acb));

    // 2. Two triangles fit side-side-angle
    println!("2. Ambiguous side-side-angle:");
    let mut solver = Solver::new();
    let [a, b, c] = ["A", "B", "C"].map(|name| solver.add_point(name));
    solver.constrain(angle_key(&b, &a, &c), Operator::Eq, 30.0)?;
    solver.constrain(segment_key(&b, &c), Operator::Eq, 6.0)?;
    solver.constrain(segment_key(&a, &c), Operator::Eq, 10.0)?;
    let ab: FactRef = segment_key(&a, &b).into();
    let solutions = solver.solve(&[ab.clone()])?;
    println!("   Branches: {}", solver.num_branches());
    println!("   {} = {:?}", ab, solutions.distinct_values(&ab));

    solver.constrain(segment_key(&a, &b), Operator::Gt, 8.0)?;
    let solutions = solver.solve(&[ab.clone()])?;
    println!("   After {} > 8: {:?}\n", ab, solutions.distinct_values(&ab));

    // 3. Contradictions are rejected
    println!("3. Contradiction:");
    match solver.constrain(segment_key(&a, &b), Operator::Lt, 1.0) {
        Ok(()) => println!("   accepted?"),
        Err(err) => println!("   rejected: {}", err),
    }
    println!("   Branches still live: {}\n", solver.num_branches());

    // 4. Derivation trace
    println!("4. Derivation trace:");
    for step in &solver.branches()[0].trace().steps {
        println!("   {} {} on {}", step.id, step.rule_id, step.trigger);
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
