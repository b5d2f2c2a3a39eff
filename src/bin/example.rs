//! Spring Element Example - Cantilever column spring with P-Delta
//!
//! Usage: `spring-example [definition.json]`
//!
//! Without an argument a 2D column spring is used: node 1 is fixed, node 2
//! carries a gravity load and an increasing lateral push.

use std::env;
use std::fs;

use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use nalgebra::DVector;
use spring_element::prelude::*;

const MAX_ITERATIONS: usize = 25;
const TOLERANCE: f64 = 1e-9;

fn default_definition() -> SpringDefinition {
    // axial, shear and rotational stiffness of a short column
    SpringDefinition::new(
        1,
        2,
        3,
        1,
        2,
        &[0, 1, 2],
        vec![
            vec![5.0e5, 0.0, 0.0],
            vec![0.0, 1.2e3, 0.0],
            vec![0.0, 0.0, 4.0e3],
        ],
    )
    .with_moment_ratios([0.0, 0.0, 0.0, 1.0])
}

fn load_definition() -> Result<SpringDefinition> {
    match env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path))
        }
        None => Ok(default_definition()),
    }
}

/// Newton iterations on the free node for one load level
fn solve_step(
    spring: &mut SpringElement,
    domain: &mut NodeRegistry,
    free_node: i32,
    target: &DVector<f64>,
) -> Result<usize> {
    let ndf = target.len();
    for iteration in 1..=MAX_ITERATIONS {
        spring.update(&*domain)?;
        let force = spring.resisting_force()?;
        let residual = target - force.rows(ndf, ndf);
        if residual.norm() < TOLERANCE * target.norm().max(1.0) {
            return Ok(iteration);
        }

        let k = spring.tangent_stiff()?;
        let k_ff = k.view((ndf, ndf), (ndf, ndf)).clone_owned();
        let du = k_ff
            .lu()
            .solve(&residual)
            .ok_or_else(|| anyhow!("singular tangent at iteration {}", iteration))?;

        let u: Vec<f64> = domain
            .node(free_node)?
            .trial_displacement()
            .iter()
            .zip(du.iter())
            .map(|(u, du)| u + du)
            .collect();
        domain.set_trial_displacement(free_node, &u)?;
    }
    bail!("no convergence after {} iterations", MAX_ITERATIONS)
}

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Spring Element Example: Column Spring ===\n");

    let definition = load_definition()?;
    let mut spring = SpringElement::new(&definition)?;
    let layout = spring.layout();
    let ndf = layout.dofs_per_node();

    // Fixed base at the origin, free top one unit along global Y (or X in 1D)
    let [base, top] = spring.external_nodes();
    let axis = if layout.dimension() == 1 { 0 } else { 1 };
    let base_coords = [0.0; 3];
    let mut top_coords = [0.0; 3];
    top_coords[axis] = 1.0;

    let dim = layout.dimension();
    let mut domain = NodeRegistry::new();
    domain.add_node(base, Node::new(&base_coords[..dim], ndf))?;
    domain.add_node(top, Node::new(&top_coords[..dim], ndf))?;
    spring.set_domain(&domain)?;

    println!(
        "Layout {:?}, {} DOFs, directions {:?}, length {:.3}",
        layout,
        spring.num_dof(),
        spring.directions(),
        spring.length().unwrap_or(0.0)
    );

    // gravity along -Y and a lateral push along X, both ramped
    let mut reference = DVector::<f64>::zeros(ndf);
    reference[0] = 10.0;
    if layout.dimension() > 1 {
        reference[1] = -2000.0;
    }

    let steps = 10;
    let mut lambda = 0.0;
    let mut increment = 1.0 / steps as f64;
    let mut committed = vec![0.0; ndf];
    while lambda < 1.0 - 1e-12 {
        let next = (lambda + increment).min(1.0);
        match solve_step(&mut spring, &mut domain, top, &(&reference * next)) {
            Ok(iterations) => {
                spring.commit_state();
                committed = domain.node(top)?.trial_displacement().to_vec();
                lambda = next;
                info!("load factor {:.3} converged in {} iterations", lambda, iterations);
            }
            Err(err) => {
                warn!("load factor {:.3} failed ({}), halving the increment", next, err);
                spring.revert_to_last_commit();
                domain.set_trial_displacement(top, &committed)?;
                increment /= 2.0;
                if increment < 1e-6 {
                    bail!("increment too small at load factor {:.3}", lambda);
                }
            }
        }
    }

    println!("\nTop node displacement: {:?}", committed);
    for name in ["basicForce", "localForce", "globalForce"] {
        let response = spring.response(name)?;
        if let Some(v) = response.as_vector() {
            println!("  {:<12} {:?}", name, v.as_slice());
        }
    }

    // checkpoint and restore through a channel
    let mut channel = MemoryChannel::new();
    spring.send_self(1, &mut channel)?;
    let mut restored = SpringElement::recv_self(1, &mut channel)?;
    restored.set_domain(&domain)?;
    restored.update(&domain)?;
    println!(
        "\nRestored element reproduces the resisting force: {}",
        restored.resisting_force()? == spring.resisting_force()?
    );

    println!("\n=== Analysis Complete ===");
    Ok(())
}
