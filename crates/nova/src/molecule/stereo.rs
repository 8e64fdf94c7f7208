//! Stereo descriptors from molfile geometry.
//!
//! On 2D records a tetrahedral centre needs a wedge or hash bond drawn
//! from it; the wedged neighbour is lifted out of the plane by its bond
//! length. On 3D records the coordinates are used as they are. Double-bond
//! configuration is read from coordinates in both cases.

use super::sdf::{BondOrder, BondStereo};
use super::smiles::Graph;

type Vec3 = [f64; 3];

const EPSILON: f64 = 1e-6;

/// SMILES tetrahedral mark, seen from the first listed neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Chirality {
    /// `@`: the other three neighbours run anticlockwise.
    Anticlockwise,
    /// `@@`: they run clockwise.
    Clockwise,
}

impl Chirality {
    pub(super) fn symbol(self) -> &'static str {
        match self {
            Chirality::Anticlockwise => "@",
            Chirality::Clockwise => "@@",
        }
    }
}

/// A neighbour of a stereocentre in written order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Neighbour {
    Atom(usize),
    /// The bracket hydrogen.
    Hydrogen,
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn scale(a: Vec3, k: f64) -> Vec3 {
    [a[0] * k, a[1] * k, a[2] * k]
}

fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// Sp3 atom with four distinct substituents and, on 2D records, a wedge.
pub(super) fn is_tetrahedral_centre(graph: &Graph, ranks: &[usize], atom: usize) -> bool {
    let a = &graph.atoms[atom];
    let heavy = &graph.adjacency[atom];
    if a.aromatic || a.hydrogens > 1 || heavy.len() + a.hydrogens as usize != 4 {
        return false;
    }
    if heavy
        .iter()
        .any(|&(_, b)| graph.bonds[b].order != BondOrder::Single)
    {
        return false;
    }

    let mut classes: Vec<usize> = heavy.iter().map(|&(n, _)| ranks[n]).collect();
    classes.sort_unstable();
    classes.dedup();
    if classes.len() != heavy.len() {
        return false;
    }

    let stereo = heavy
        .iter()
        .filter(|&&(_, b)| graph.bonds[b].a == atom)
        .map(|&(_, b)| graph.bonds[b].stereo)
        .chain(a.folded.iter().map(|&(_, s)| s));
    let mut wedged = false;
    for s in stereo {
        match s {
            BondStereo::Either => return false,
            BondStereo::Up | BondStereo::Down => wedged = true,
            BondStereo::None => {}
        }
    }
    graph.three_d || wedged
}

/// Vector from the centre to a neighbour, wedge offset applied in 2D.
fn offset(graph: &Graph, centre: Vec3, position: Vec3, stereo: BondStereo) -> Vec3 {
    let mut v = sub(position, centre);
    if !graph.three_d {
        let planar = (v[0] * v[0] + v[1] * v[1]).sqrt();
        v[2] = match stereo {
            BondStereo::Up => planar,
            BondStereo::Down => -planar,
            _ => 0.0,
        };
    }
    v
}

/// Tetrahedral mark for `atom` with neighbours listed in `order`.
pub(super) fn chirality(graph: &Graph, atom: usize, order: &[Neighbour]) -> Option<Chirality> {
    if order.len() != 4 {
        return None;
    }
    let centre = graph.atoms[atom].position;

    let heavy: Vec<(usize, Vec3)> = graph.adjacency[atom]
        .iter()
        .map(|&(n, b)| {
            let bond = &graph.bonds[b];
            let stereo = if bond.a == atom { bond.stereo } else { BondStereo::None };
            (n, offset(graph, centre, graph.atoms[n].position, stereo))
        })
        .collect();

    let hydrogen = match graph.atoms[atom].folded.first() {
        Some(&(position, stereo)) => offset(graph, centre, position, stereo),
        None => {
            let sum = heavy
                .iter()
                .fold([0.0; 3], |acc, (_, v)| [acc[0] + v[0], acc[1] + v[1], acc[2] + v[2]]);
            scale(sum, -1.0)
        }
    };

    let mut vectors = Vec::with_capacity(4);
    for neighbour in order {
        let v = match *neighbour {
            Neighbour::Hydrogen => hydrogen,
            Neighbour::Atom(n) => heavy.iter().find(|(m, _)| *m == n)?.1,
        };
        vectors.push(v);
    }

    let volume = dot(
        sub(vectors[1], vectors[0]),
        cross(sub(vectors[2], vectors[0]), sub(vectors[3], vectors[0])),
    );
    if volume.abs() < EPSILON {
        None
    } else if volume < 0.0 {
        Some(Chirality::Anticlockwise)
    } else {
        Some(Chirality::Clockwise)
    }
}

/// Acyclic double bond whose ends each carry two different substituents.
pub(super) fn is_stereo_double_bond(graph: &Graph, ranks: &[usize], bond: usize) -> bool {
    let b = &graph.bonds[bond];
    if b.order != BondOrder::Double || b.ring || b.stereo == BondStereo::Either {
        return false;
    }
    [(b.a, b.b), (b.b, b.a)].iter().all(|&(end, partner)| {
        let others: Vec<usize> = graph.adjacency[end]
            .iter()
            .map(|&(n, _)| n)
            .filter(|&n| n != partner)
            .collect();
        let hydrogens = graph.atoms[end].hydrogens as usize;
        match others.as_slice() {
            [_] => hydrogens <= 1,
            [x, y] => hydrogens == 0 && ranks[*x] != ranks[*y],
            _ => false,
        }
    })
}

/// Whether `ra` (on `a`) and `rb` (on `b`) sit on the same side of the
/// `a`-`b` axis. `None` when the geometry is degenerate.
pub(super) fn same_side(graph: &Graph, a: usize, b: usize, ra: usize, rb: usize) -> Option<bool> {
    let position = |atom: usize| graph.atoms[atom].position;
    let axis = sub(position(b), position(a));
    let length = norm(axis);
    if length < EPSILON {
        return None;
    }
    let unit = scale(axis, 1.0 / length);
    let across = |v: Vec3| sub(v, scale(unit, dot(v, unit)));

    let da = across(sub(position(ra), position(a)));
    let db = across(sub(position(rb), position(b)));
    let alignment = dot(da, db);
    if norm(da) < EPSILON || norm(db) < EPSILON || alignment.abs() < EPSILON {
        None
    } else {
        Some(alignment > 0.0)
    }
}
