//! Element geometry and the global -> local -> basic transformation chain

use log::{debug, warn};

use super::{Mat, Mat3, MomentRatios, PDeltaCorrector, Vec3};
use crate::elements::DofLayout;
use crate::error::{SpringError, SpringResult};

/// Nodes closer than this are treated as coincident
pub const LENGTH_TOLERANCE: f64 = 1e-10;

/// Minimum |x × y| for unit orientation vectors
const COLLINEAR_TOLERANCE: f64 = 1e-10;

/// Transformation matrices fixed when the element is bound to its nodes
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationSet {
    /// Rows are the unit local x, y and z axes in global coordinates
    pub orientation: Mat3,
    /// Global to local, `num_dof x num_dof`
    pub global_local: Mat,
    /// Local to basic, `num_dir x num_dof`
    pub local_basic: Mat,
}

impl TransformationSet {
    /// Combined global to basic transformation `Tlb · Tgl`
    pub fn global_basic(&self) -> Mat {
        &self.local_basic * &self.global_local
    }
}

/// Everything derived from node positions at bind time
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Distance between the two nodes
    pub length: f64,
    pub transformations: TransformationSet,
    /// Present only when moment ratios are set and the axial direction is declared
    pub p_delta: Option<PDeltaCorrector>,
}

/// Pad a coordinate slice to three components
fn coords3(coords: &[f64]) -> Vec3 {
    Vec3::new(
        coords.first().copied().unwrap_or(0.0),
        coords.get(1).copied().unwrap_or(0.0),
        coords.get(2).copied().unwrap_or(0.0),
    )
}

/// Distance between two nodes given by their coordinates
pub fn element_length(i_coords: &[f64], j_coords: &[f64]) -> f64 {
    (coords3(j_coords) - coords3(i_coords)).norm()
}

/// Default local y axis for a given local x axis
///
/// Global Y, except for members along global Y where local y points to
/// -X (member pointing up) or +X (member pointing down).
fn default_local_y(x: &Vec3) -> Vec3 {
    let xn = x.normalize();
    if xn[0].abs() < COLLINEAR_TOLERANCE && xn[2].abs() < COLLINEAR_TOLERANCE {
        if xn[1] > 0.0 {
            Vec3::new(-1.0, 0.0, 0.0)
        } else {
            Vec3::new(1.0, 0.0, 0.0)
        }
    } else {
        Vec3::new(0.0, 1.0, 0.0)
    }
}

/// Compute the orientation matrix of the element
///
/// # Arguments
/// * `layout` - DOF layout of the element
/// * `i_coords` / `j_coords` - Node coordinates
/// * `x` - Explicit local x axis, overrides the node-to-node direction
/// * `y` - Explicit local y axis, orthogonalized against x
///
/// # Returns
/// Element length and the 3x3 orientation matrix (rows = local axes)
pub fn orientation_matrix(
    layout: DofLayout,
    i_coords: &[f64],
    j_coords: &[f64],
    x: Option<&Vec3>,
    y: Option<&Vec3>,
) -> SpringResult<(f64, Mat3)> {
    let xp = coords3(j_coords) - coords3(i_coords);
    let length = xp.norm();

    let x = match x {
        Some(x) => {
            if length > LENGTH_TOLERANCE && layout.dimension() > 1 {
                warn!("ignoring node positions and using the specified local x vector for orientation");
            }
            *x
        }
        // 1D axis is fixed, coincident nodes are fine
        None if layout.dimension() == 1 => Vec3::new(1.0, 0.0, 0.0),
        None if length > LENGTH_TOLERANCE => xp,
        None => {
            return Err(SpringError::Geometry(format!(
                "nodes are coincident (length {:e}) and no local x vector was given for layout {:?}",
                length, layout
            )));
        }
    };

    let xn = x.norm();
    if xn < LENGTH_TOLERANCE || !xn.is_finite() {
        return Err(SpringError::Geometry(
            "local x vector has zero length".to_string(),
        ));
    }

    let y = y.copied().unwrap_or_else(|| default_local_y(&x));
    let yn = y.norm();
    if yn < LENGTH_TOLERANCE || !yn.is_finite() {
        return Err(SpringError::Geometry(
            "local y vector has zero length".to_string(),
        ));
    }

    // z = x cross y, then y = z cross x
    let z = x.cross(&y);
    if z.norm() / (xn * yn) < COLLINEAR_TOLERANCE {
        return Err(SpringError::Geometry(
            "local x and y vectors are collinear".to_string(),
        ));
    }
    let y = z.cross(&x);

    let x = x / xn;
    let y = y / y.norm();
    let z = z / z.norm();

    #[rustfmt::skip]
    let orientation = Mat3::new(
        x[0], x[1], x[2],
        y[0], y[1], y[2],
        z[0], z[1], z[2],
    );

    Ok((length, orientation))
}

/// Copy the leading `size x size` block of the orientation matrix onto the diagonal at `offset`
fn place_block(t: &mut Mat, orientation: &Mat3, offset: usize, size: usize) {
    for row in 0..size {
        for col in 0..size {
            t[(offset + row, offset + col)] = orientation[(row, col)];
        }
    }
}

/// Build the global to local transformation
///
/// Block diagonal: the orientation block is repeated for every translation
/// and rotation group of both nodes.
pub fn global_local_matrix(layout: DofLayout, orientation: &Mat3) -> Mat {
    let n = layout.num_dof();
    let ndf = layout.dofs_per_node();
    let mut t = Mat::zeros(n, n);

    match layout {
        DofLayout::D1N2 => {
            t[(0, 0)] = orientation[(0, 0)];
            t[(1, 1)] = orientation[(0, 0)];
        }
        DofLayout::D2N4 => {
            place_block(&mut t, orientation, 0, 2);
            place_block(&mut t, orientation, ndf, 2);
        }
        DofLayout::D2N6 => {
            place_block(&mut t, orientation, 0, 2);
            place_block(&mut t, orientation, ndf, 2);
            // in-plane rotation about local z
            t[(2, 2)] = orientation[(2, 2)];
            t[(5, 5)] = orientation[(2, 2)];
        }
        DofLayout::D3N6 => {
            place_block(&mut t, orientation, 0, 3);
            place_block(&mut t, orientation, ndf, 3);
        }
        DofLayout::D3N12 => {
            for i in 0..4 {
                place_block(&mut t, orientation, i * 3, 3);
            }
        }
    }

    t
}

/// Build the local to basic transformation
///
/// Each basic direction measures the relative displacement of node j with
/// respect to node i along that local DOF.
pub fn local_basic_matrix(layout: DofLayout, directions: &[usize]) -> Mat {
    let n = layout.num_dof();
    let ndf = layout.dofs_per_node();
    let mut t = Mat::zeros(directions.len(), n);

    for (i, &dir) in directions.iter().enumerate() {
        t[(i, dir)] = -1.0;
        t[(i, dir + ndf)] = 1.0;
    }

    t
}

/// Run the one-time geometry pass for a bound element
pub fn build_geometry(
    layout: DofLayout,
    directions: &[usize],
    i_coords: &[f64],
    j_coords: &[f64],
    x: Option<&Vec3>,
    y: Option<&Vec3>,
    moment_ratios: Option<&MomentRatios>,
) -> SpringResult<Geometry> {
    let (length, orientation) = orientation_matrix(layout, i_coords, j_coords, x, y)?;

    let transformations = TransformationSet {
        global_local: global_local_matrix(layout, &orientation),
        local_basic: local_basic_matrix(layout, directions),
        orientation,
    };

    let p_delta = moment_ratios
        .and_then(|ratios| PDeltaCorrector::new(layout, directions, ratios, length));
    if moment_ratios.is_some() && p_delta.is_none() {
        debug!("moment ratios given but axial direction not declared; P-Delta inactive");
    }

    Ok(Geometry {
        length,
        transformations,
        p_delta,
    })
}
