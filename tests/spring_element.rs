use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector};
use spring_element::prelude::*;

fn domain_with(ndf: usize, i: &[f64], j: &[f64]) -> NodeRegistry {
    let mut domain = NodeRegistry::new();
    domain.add_node(1, Node::new(i, ndf)).unwrap();
    domain.add_node(2, Node::new(j, ndf)).unwrap();
    domain
}

/// Full symmetric 6x6 stiffness, given as upper rows
fn coupled_stiffness() -> Vec<Vec<f64>> {
    let mut rows = vec![vec![0.0; 6]; 6];
    for r in 0..6 {
        for c in r..6 {
            rows[r][c] = if r == c {
                1000.0 * (r + 1) as f64
            } else {
                10.0 * (r + c) as f64
            };
        }
    }
    rows
}

fn inclined_3d_spring() -> (SpringElement, NodeRegistry) {
    let domain = domain_with(6, &[0.0, 0.0, 0.0], &[1.0, 2.0, 2.0]);
    let def = SpringDefinition::new(7, 3, 6, 1, 2, &[0, 1, 2, 3, 4, 5], coupled_stiffness());
    let mut spring = SpringElement::new(&def).unwrap();
    spring.set_domain(&domain).unwrap();
    (spring, domain)
}

#[test]
fn test_layout_classification_table() {
    let supported = [
        (1, 1, DofLayout::D1N2),
        (2, 2, DofLayout::D2N4),
        (2, 3, DofLayout::D2N6),
        (3, 3, DofLayout::D3N6),
        (3, 6, DofLayout::D3N12),
    ];
    for dim in 0..5 {
        for ndf in 0..8 {
            let expected = supported
                .iter()
                .find(|(d, n, _)| *d == dim && *n == ndf)
                .map(|(_, _, layout)| *layout);
            match expected {
                Some(layout) => assert_eq!(DofLayout::classify(dim, ndf).unwrap(), layout),
                None => assert!(matches!(
                    DofLayout::classify(dim, ndf),
                    Err(SpringError::Configuration(_))
                )),
            }
        }
    }
}

#[test]
fn test_two_dimensional_scenario() {
    let mut domain = domain_with(2, &[0.0, 0.0], &[3.0, 0.0]);
    let def = SpringDefinition::new(
        1,
        2,
        2,
        1,
        2,
        &[0, 1],
        vec![vec![1000.0, 0.0], vec![0.0, 2000.0]],
    );
    let mut spring = SpringElement::new(&def).unwrap();
    spring.set_domain(&domain).unwrap();

    domain.set_trial_displacement(2, &[0.01, 0.0]).unwrap();
    spring.update(&domain).unwrap();

    let ub = spring.response("basicDeformation").unwrap();
    assert_relative_eq!(ub.as_vector().unwrap()[0], 0.01, epsilon = 1e-15);
    let qb = spring.response("basicForces").unwrap();
    assert_relative_eq!(
        qb.as_vector().unwrap(),
        &DVector::from_vec(vec![10.0, 0.0]),
        epsilon = 1e-12
    );
}

#[test]
fn test_zero_displacement_gives_zero_force() {
    let (mut spring, domain) = inclined_3d_spring();
    spring.update(&domain).unwrap();
    assert_relative_eq!(spring.resisting_force().unwrap(), DVector::<f64>::zeros(12));

    let mut domain = domain_with(3, &[0.0, 0.0], &[0.0, 2.0]);
    domain.zero_response();
    let stiffness = coupled_stiffness()[..3]
        .iter()
        .map(|row| row[..3].to_vec())
        .collect();
    let def = SpringDefinition::new(2, 2, 3, 1, 2, &[0, 1, 2], stiffness);
    let mut frame_spring = SpringElement::new(&def).unwrap();
    frame_spring.set_domain(&domain).unwrap();
    frame_spring.update(&domain).unwrap();
    assert_relative_eq!(frame_spring.resisting_force().unwrap(), DVector::<f64>::zeros(6));
}

#[test]
fn test_unit_basic_displacement_returns_stiffness_column() {
    let (mut spring, _) = inclined_3d_spring();
    let t = spring.transformations().unwrap().clone();
    let kb = spring.basic_stiffness().clone();

    // global -> local is orthogonal, so its transpose maps local back to global
    for i in 0..6 {
        let mut ul = DVector::<f64>::zeros(12);
        ul[i + 6] = 1.0;
        let ug = t.global_local.transpose() * ul;
        spring.update_from(ug.as_slice(), None).unwrap();
        assert_relative_eq!(spring.trial_state().qb, kb.column(i).into_owned(), epsilon = 1e-8);
    }
}

#[test]
fn test_global_stiffness_is_symmetric_and_rigid_body_free() {
    let (spring, _) = inclined_3d_spring();
    let k = spring.tangent_stiff().unwrap();
    assert_relative_eq!(k, k.transpose(), epsilon = 1e-8);

    // rigid translation along an arbitrary direction
    let mut ug = DVector::<f64>::zeros(12);
    for node in 0..2 {
        ug[node * 6] = 0.3;
        ug[node * 6 + 1] = -0.4;
        ug[node * 6 + 2] = 0.5;
    }
    assert_relative_eq!(&k * ug, DVector::<f64>::zeros(12), epsilon = 1e-8);
}

#[test]
fn test_revert_to_start_after_history() {
    let (mut spring, mut domain) = inclined_3d_spring();
    for step in 1..=3 {
        let u = 0.001 * step as f64;
        domain
            .set_trial_displacement(2, &[u, -u, 2.0 * u, 0.0, u, 0.0])
            .unwrap();
        spring.update(&domain).unwrap();
        spring.commit_state();
    }
    spring
        .add_load(&ElementLoad::basic(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]), 3.0)
        .unwrap();
    assert!(spring.resisting_force().unwrap().norm() > 0.0);

    spring.revert_to_start();
    assert_relative_eq!(spring.resisting_force().unwrap(), DVector::<f64>::zeros(12));
    assert!(spring.committed_state().is_zero());
}

#[test]
fn test_zero_moment_ratios_match_no_p_delta() {
    let domain = domain_with(3, &[0.0, 0.0], &[2.0, 1.0]);
    let base = SpringDefinition::new(
        1,
        2,
        3,
        1,
        2,
        &[0, 1, 2],
        vec![
            vec![1000.0, 0.0, 0.0],
            vec![0.0, 500.0, 20.0],
            vec![0.0, 0.0, 800.0],
        ],
    );
    let mut plain = SpringElement::new(&base).unwrap();
    let mut zero = SpringElement::new(&base.clone().with_moment_ratios([0.0; 4])).unwrap();
    plain.set_domain(&domain).unwrap();
    zero.set_domain(&domain).unwrap();
    assert!(zero.p_delta_active());

    let ug = [0.0, 0.0, 0.0, 0.01, 0.02, 0.003];
    plain.update_from(&ug, None).unwrap();
    zero.update_from(&ug, None).unwrap();

    assert_relative_eq!(zero.resisting_force().unwrap(), plain.resisting_force().unwrap());
    assert_relative_eq!(zero.tangent_stiff().unwrap(), plain.tangent_stiff().unwrap());
}

#[test]
fn test_p_delta_shear_couple() {
    let domain = domain_with(2, &[0.0, 0.0], &[2.0, 0.0]);
    let def = SpringDefinition::new(
        1,
        2,
        2,
        1,
        2,
        &[0, 1],
        vec![vec![1000.0, 0.0], vec![0.0, 500.0]],
    )
    .with_moment_ratios([0.0, 0.0, 0.5, 0.5]);
    let mut spring = SpringElement::new(&def).unwrap();
    spring.set_domain(&domain).unwrap();

    // N = 1, Δ = 0.01, couple N·Δ / L carried fully
    spring.update_from(&[0.0, 0.0, 0.001, 0.01], None).unwrap();
    let p = spring.resisting_force().unwrap();
    assert_relative_eq!(
        p,
        DVector::from_vec(vec![-1.0, -5.005, 1.0, 5.005]),
        epsilon = 1e-12
    );

    let kt = spring.tangent_stiff().unwrap();
    let k0 = spring.initial_stiff().unwrap();
    assert_relative_eq!(kt[(1, 1)], 500.5, epsilon = 1e-12);
    assert_relative_eq!(k0[(1, 1)], 500.0, epsilon = 1e-12);
    assert_relative_eq!(kt[(1, 3)], -500.5, epsilon = 1e-12);

    // committed stiffness still reflects the unloaded state
    assert_relative_eq!(spring.committed_stiff().unwrap(), k0);
    spring.commit_state();
    assert_relative_eq!(spring.committed_stiff().unwrap(), kt);

    // local force includes the correction, basic force does not
    let ql = spring.response("localForce").unwrap();
    assert_relative_eq!(ql.as_vector().unwrap()[3], 5.005, epsilon = 1e-12);
    let qb = spring.response("basicForce").unwrap();
    assert_relative_eq!(qb.as_vector().unwrap()[1], 5.0, epsilon = 1e-12);
}

#[test]
fn test_p_delta_end_moments_in_frame_layout() {
    let domain = domain_with(3, &[0.0, 0.0], &[0.0, 4.0]);
    let def = SpringDefinition::new(
        1,
        2,
        3,
        1,
        2,
        &[0, 1, 2],
        vec![
            vec![2000.0, 0.0, 0.0],
            vec![0.0, 300.0, 0.0],
            vec![0.0, 0.0, 900.0],
        ],
    )
    .with_moment_ratios([0.0, 0.0, 0.4, 0.6]);
    let mut spring = SpringElement::new(&def).unwrap();
    spring.set_domain(&domain).unwrap();

    // compress the vertical spring and sway the top node
    let ug = [0.0, 0.0, 0.0, 0.02, -0.001, 0.0];
    spring.update_from(&ug, None).unwrap();
    let n = spring.trial_state().qb[0];
    assert_relative_eq!(n, -2.0, epsilon = 1e-12);

    // end moments share N·Δ with the given ratios
    let ul = &spring.trial_state().ul;
    let delta = ul[4] - ul[1];
    let ql = spring.response("localForces").unwrap();
    let ql = ql.as_vector().unwrap();
    let qb_moments = spring.trial_state().qb[2];
    assert_relative_eq!(ql[2] + qb_moments, n * 0.4 * delta, epsilon = 1e-12);
    assert_relative_eq!(ql[5] - qb_moments, n * 0.6 * delta, epsilon = 1e-12);

    let k = spring.tangent_stiff().unwrap();
    assert_eq!(k.nrows(), 6);
    assert!((k.clone() - spring.initial_stiff().unwrap()).norm() > 0.0);
}

#[test]
fn test_update_through_domain_matches_direct_update() {
    let (mut via_domain, mut domain) = inclined_3d_spring();
    let (mut direct, _) = inclined_3d_spring();

    let ui = [0.001, 0.0, -0.002, 0.0, 0.01, 0.0];
    let uj = [0.003, 0.002, 0.0, 0.02, 0.0, -0.01];
    domain.set_trial_displacement(1, &ui).unwrap();
    domain.set_trial_displacement(2, &uj).unwrap();
    via_domain.update(&domain).unwrap();

    let ug: Vec<f64> = ui.iter().chain(uj.iter()).copied().collect();
    direct.update_from(&ug, None).unwrap();

    assert_eq!(via_domain.trial_state(), direct.trial_state());
}

#[test]
fn test_explicit_orientation_allows_coincident_nodes() {
    let domain = domain_with(6, &[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]);
    let def = SpringDefinition::new(
        3,
        3,
        6,
        1,
        2,
        &[0, 1, 2],
        vec![
            vec![100.0, 0.0, 0.0],
            vec![0.0, 200.0, 0.0],
            vec![0.0, 0.0, 300.0],
        ],
    )
    .with_x([0.0, 0.0, 1.0])
    .with_y([1.0, 0.0, 0.0]);
    let mut spring = SpringElement::new(&def).unwrap();
    spring.set_domain(&domain).unwrap();
    assert_relative_eq!(spring.length().unwrap(), 0.0);

    let r = spring.transformations().unwrap().orientation;
    assert_relative_eq!(r * r.transpose(), nalgebra::Matrix3::identity(), epsilon = 1e-12);

    // global Z is local x
    spring
        .update_from(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.01, 0.0, 0.0, 0.0], None)
        .unwrap();
    assert_relative_eq!(spring.trial_state().qb[0], 1.0, epsilon = 1e-12);
}

#[test]
fn test_one_dimensional_spring_with_damping() {
    let mut domain = domain_with(1, &[0.0], &[0.0]);
    let def = SpringDefinition::new(1, 1, 1, 1, 2, &[0], vec![vec![250.0]])
        .with_damping(vec![vec![10.0]]);
    let mut spring = SpringElement::new(&def).unwrap();
    spring.set_domain(&domain).unwrap();

    domain.set_trial_displacement(1, &[-0.01]).unwrap();
    domain.set_trial_velocity(2, &[0.5]).unwrap();
    spring.update(&domain).unwrap();

    assert_relative_eq!(spring.trial_state().ub[0], 0.01, epsilon = 1e-15);
    assert_relative_eq!(spring.trial_state().qb[0], 2.5 + 5.0, epsilon = 1e-12);
    let c = spring.damp().unwrap();
    assert_relative_eq!(c, DMatrix::from_row_slice(2, 2, &[10.0, -10.0, -10.0, 10.0]));
}

#[test]
fn test_element_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SpringElement>();
    assert_send_sync::<NodeRegistry>();
}

#[test]
fn test_p_delta_end_moments_about_local_y() {
    let domain = domain_with(6, &[0.0, 0.0, 0.0], &[2.0, 0.0, 0.0]);
    let def = SpringDefinition::new(
        1,
        3,
        6,
        1,
        2,
        &[0, 2, 4],
        vec![
            vec![1000.0, 0.0, 0.0],
            vec![0.0, 500.0, 0.0],
            vec![0.0, 0.0, 800.0],
        ],
    )
    .with_moment_ratios([0.6, 0.4, 0.0, 0.0]);
    let mut spring = SpringElement::new(&def).unwrap();
    spring.set_domain(&domain).unwrap();

    // compression with a sway along local z
    spring
        .update_from(
            &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.002, 0.0, 0.01, 0.0, 0.0, 0.0],
            None,
        )
        .unwrap();
    let state = spring.trial_state();
    let n = state.qb[0];
    let dz = state.ul[8] - state.ul[2];
    assert_relative_eq!(n, -2.0, epsilon = 1e-12);
    assert_relative_eq!(dz, 0.01, epsilon = 1e-15);
    assert_relative_eq!(state.qb[2], 0.0);

    // moments about local y take the opposite sign to those about local z
    let ql = spring.response("localForce").unwrap();
    let ql = ql.as_vector().unwrap();
    assert_relative_eq!(ql[4], -0.6 * n * dz, epsilon = 1e-12);
    assert_relative_eq!(ql[10], -0.4 * n * dz, epsilon = 1e-12);
    assert_relative_eq!(ql[4], 0.012, epsilon = 1e-12);
    assert_relative_eq!(ql[10], 0.008, epsilon = 1e-12);

    // rotations carry the moment, so the shears are the elastic ones
    assert_relative_eq!(ql[2], -5.0, epsilon = 1e-12);
    assert_relative_eq!(ql[8], 5.0, epsilon = 1e-12);

    // element axes coincide with global axes
    let dk = spring.tangent_stiff().unwrap() - spring.initial_stiff().unwrap();
    assert_relative_eq!(dk[(4, 2)], 0.6 * n, epsilon = 1e-12);
    assert_relative_eq!(dk[(4, 8)], -0.6 * n, epsilon = 1e-12);
    assert_relative_eq!(dk[(10, 8)], -0.4 * n, epsilon = 1e-12);
}

#[test]
fn test_p_delta_shear_couple_about_local_y() {
    let domain = domain_with(3, &[0.0, 0.0, 0.0], &[2.0, 0.0, 0.0]);
    let def = SpringDefinition::new(
        1,
        3,
        3,
        1,
        2,
        &[0, 2],
        vec![vec![1000.0, 0.0], vec![0.0, 500.0]],
    )
    .with_moment_ratios([0.3, 0.2, 0.0, 0.0]);
    let mut spring = SpringElement::new(&def).unwrap();
    spring.set_domain(&domain).unwrap();
    let length = spring.length().unwrap();

    spring
        .update_from(&[0.0, 0.0, 0.0, -0.002, 0.0, 0.01], None)
        .unwrap();
    let state = spring.trial_state();
    let n = state.qb[0];
    let dz = state.ul[5] - state.ul[2];
    let shear = state.qb[1];
    assert_relative_eq!(n, -2.0, epsilon = 1e-12);
    assert_relative_eq!(shear, 5.0, epsilon = 1e-12);

    let couple = (0.3 + 0.2) * n * dz / length;
    let p = spring.resisting_force().unwrap();
    assert_relative_eq!(p[2] + shear, -couple, epsilon = 1e-12);
    assert_relative_eq!(p[5] - shear, couple, epsilon = 1e-12);
    assert_relative_eq!(p[2], -5.0 + 0.005, epsilon = 1e-12);
    assert_relative_eq!(p[5], 5.0 - 0.005, epsilon = 1e-12);

    // the unused rz pair has no effect on the local y direction
    assert_relative_eq!(p[1], 0.0);
    assert_relative_eq!(p[4], 0.0);
}
