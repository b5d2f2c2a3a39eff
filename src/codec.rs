//! Versioned wire representation of a spring element
//!
//! A [`Packet`] carries everything needed to rebuild an element: a fixed
//! numeric header, the node tags, the direction codes, the basic matrices
//! and the optional orientation and moment-ratio vectors. Trial and
//! committed response is not part of the packet.
//!
//! Decoding always goes back through [`SpringElement::new`], so a packet the
//! direction classifier would reject never produces an element.

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::RayleighFactors;
use crate::elements::{DofLayout, SpringDefinition, SpringElement};
use crate::error::DecodeError;

/// Current packet layout version
pub const FORMAT_VERSION: u32 = 1;

/// Number of header fields
pub const HEADER_LEN: usize = 13;

// Header field positions
const TAG: usize = 0;
const DIMENSION: usize = 1;
const NUM_DOF: usize = 2;
const NUM_DIR: usize = 3;
const X_LEN: usize = 4;
const Y_LEN: usize = 5;
const RATIOS_LEN: usize = 6;
const RAYLEIGH: usize = 7;
const ALPHA_M: usize = 8;
const BETA_K: usize = 9;
const BETA_K0: usize = 10;
const BETA_KC: usize = 11;
const DAMPING: usize = 12;

/// Flattened element parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub format_version: u32,
    /// Commit tag of the analysis step the packet was taken at
    pub commit_tag: i32,
    /// tag, dim, numDOF, numDIR, |x|, |y|, |ratios|, rayleigh, αM, βK, βK0, βKc, damping
    pub header: Vec<f64>,
    pub nodes: Vec<i32>,
    pub directions: Vec<usize>,
    /// `kb` row-major, then `cb` row-major if the damping flag is set
    pub matrices: Vec<f64>,
    /// x, y and moment ratios, each only if present
    pub vectors: Vec<f64>,
}

impl Packet {
    /// Encode as bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Read a non-negative integer header field
fn header_count(header: &[f64], index: usize, name: &str) -> Result<usize, DecodeError> {
    let value = header[index];
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(DecodeError::Invalid(format!(
            "header field '{}' is not a count: {}",
            name, value
        )));
    }
    Ok(value as usize)
}

fn check_count(section: &'static str, expected: usize, actual: usize) -> Result<(), DecodeError> {
    if expected != actual {
        return Err(DecodeError::FieldCount {
            section,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Flatten an element into a packet
pub fn pack(element: &SpringElement, commit_tag: i32) -> Packet {
    let num_dir = element.num_dir();
    let factors = element.rayleigh_factors();
    let damping = element.basic_damping();

    let header = vec![
        element.tag() as f64,
        element.layout().dimension() as f64,
        element.num_dof() as f64,
        num_dir as f64,
        if element.orientation_x().is_some() { 3.0 } else { 0.0 },
        if element.orientation_y().is_some() { 3.0 } else { 0.0 },
        if element.moment_ratios().is_some() { 4.0 } else { 0.0 },
        flag(element.add_rayleigh()),
        factors.alpha_m,
        factors.beta_k,
        factors.beta_k0,
        factors.beta_kc,
        flag(damping.is_some()),
    ];

    // nalgebra storage is column-major; transpose for row-major order
    let mut matrices = Vec::with_capacity(num_dir * num_dir * 2);
    matrices.extend(element.basic_stiffness().transpose().iter().copied());
    if let Some(cb) = damping {
        matrices.extend(cb.transpose().iter().copied());
    }

    let mut vectors = Vec::new();
    if let Some(x) = element.orientation_x() {
        vectors.extend(x.iter().copied());
    }
    if let Some(y) = element.orientation_y() {
        vectors.extend(y.iter().copied());
    }
    if let Some(ratios) = element.moment_ratios() {
        vectors.extend(ratios.as_array());
    }

    Packet {
        format_version: FORMAT_VERSION,
        commit_tag,
        header,
        nodes: element.external_nodes().to_vec(),
        directions: element.directions().to_vec(),
        matrices,
        vectors,
    }
}

/// Rebuild an element from a packet
///
/// The element is returned unbound; call `set_domain` before use.
pub fn unpack(packet: &Packet, expected_commit_tag: i32) -> Result<SpringElement, DecodeError> {
    if packet.format_version != FORMAT_VERSION {
        return Err(DecodeError::Version {
            expected: FORMAT_VERSION,
            found: packet.format_version,
        });
    }
    if packet.commit_tag != expected_commit_tag {
        return Err(DecodeError::StaleCommitTag {
            expected: expected_commit_tag,
            found: packet.commit_tag,
        });
    }
    check_count("header", HEADER_LEN, packet.header.len())?;
    check_count("nodes", 2, packet.nodes.len())?;

    let h = &packet.header;
    let tag = h[TAG];
    if tag.fract() != 0.0 || tag < i32::MIN as f64 || tag > i32::MAX as f64 {
        return Err(DecodeError::Invalid(format!("element tag {} is not an integer", tag)));
    }

    let dimension = header_count(h, DIMENSION, "dim")?;
    let num_dof = header_count(h, NUM_DOF, "numDOF")?;
    let num_dir = header_count(h, NUM_DIR, "numDIR")?;
    let layout = DofLayout::from_element_dofs(dimension, num_dof)?;
    check_count("directions", num_dir, packet.directions.len())?;

    let has_damping = h[DAMPING] != 0.0;
    let block = num_dir * num_dir;
    check_count(
        "matrices",
        if has_damping { 2 * block } else { block },
        packet.matrices.len(),
    )?;

    let x_len = header_count(h, X_LEN, "|x|")?;
    let y_len = header_count(h, Y_LEN, "|y|")?;
    let ratios_len = header_count(h, RATIOS_LEN, "|Mratio|")?;
    for (name, len, allowed) in [("x", x_len, 3), ("y", y_len, 3), ("Mratio", ratios_len, 4)] {
        if len != 0 && len != allowed {
            return Err(DecodeError::Invalid(format!(
                "{} vector must have 0 or {} entries, header says {}",
                name, allowed, len
            )));
        }
    }
    check_count("vectors", x_len + y_len + ratios_len, packet.vectors.len())?;

    let rows = |values: &[f64]| -> Vec<Vec<f64>> {
        values.chunks(num_dir.max(1)).map(|row| row.to_vec()).collect()
    };
    let stiffness = rows(&packet.matrices[..block]);
    let damping = has_damping.then(|| rows(&packet.matrices[block..]));

    let (x, rest) = packet.vectors.split_at(x_len);
    let (y, ratios) = rest.split_at(y_len);
    let optional = |v: &[f64]| (!v.is_empty()).then(|| v.to_vec());

    let definition = SpringDefinition {
        tag: tag as i32,
        dimension,
        dofs_per_node: layout.dofs_per_node(),
        nodes: [packet.nodes[0], packet.nodes[1]],
        directions: packet.directions.clone(),
        stiffness,
        damping,
        x: optional(x),
        y: optional(y),
        moment_ratios: optional(ratios),
        add_rayleigh: h[RAYLEIGH] != 0.0,
    };

    let mut element = SpringElement::new(&definition)?;
    element.set_rayleigh_factors(RayleighFactors::new(
        h[ALPHA_M],
        h[BETA_K],
        h[BETA_K0],
        h[BETA_KC],
    ));
    Ok(element)
}

/// Ordered byte transport between processes
pub trait Channel {
    /// Send one message
    fn send(&mut self, commit_tag: i32, bytes: Vec<u8>) -> Result<(), DecodeError>;

    /// Receive the next message
    fn recv(&mut self, commit_tag: i32) -> Result<Vec<u8>, DecodeError>;
}

/// In-process FIFO channel
#[derive(Debug, Default)]
pub struct MemoryChannel {
    queue: VecDeque<Vec<u8>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages waiting to be received
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Channel for MemoryChannel {
    fn send(&mut self, _commit_tag: i32, bytes: Vec<u8>) -> Result<(), DecodeError> {
        self.queue.push_back(bytes);
        Ok(())
    }

    fn recv(&mut self, commit_tag: i32) -> Result<Vec<u8>, DecodeError> {
        self.queue.pop_front().ok_or_else(|| {
            DecodeError::Channel(format!("no message pending for commit tag {}", commit_tag))
        })
    }
}

impl SpringElement {
    /// Pack the element and send it over a channel
    pub fn send_self<C: Channel + ?Sized>(
        &self,
        commit_tag: i32,
        channel: &mut C,
    ) -> Result<(), DecodeError> {
        let bytes = pack(self, commit_tag).to_bytes()?;
        debug!("sending spring {} ({} bytes, commit {})", self.tag(), bytes.len(), commit_tag);
        channel.send(commit_tag, bytes)
    }

    /// Receive a packed element from a channel
    pub fn recv_self<C: Channel + ?Sized>(
        commit_tag: i32,
        channel: &mut C,
    ) -> Result<Self, DecodeError> {
        let bytes = channel.recv(commit_tag)?;
        let packet = Packet::from_bytes(&bytes)?;
        unpack(&packet, commit_tag)
    }
}
