//! Aromaticity perception for Kekulé ring systems.
//!
//! Every atom gets a pi-electron contribution from its Kekulé bonds. A
//! cycle is aromatic when all of its atoms contribute and the total is
//! 4n + 2. Cycles up to ten atoms are tried, so fused pairs such as
//! naphthalene or azulene are judged as a whole as well as ring by ring.
//! Atoms and bonds of aromatic cycles are rewritten in place.

use super::sdf::BondOrder;
use super::smiles::{AROMATIC_CAPABLE, Graph};

const MAX_CYCLE: usize = 10;

pub(super) fn perceive(graph: &mut Graph) {
    let electrons: Vec<Option<u32>> = (0..graph.atoms.len())
        .map(|atom| pi_electrons(graph, atom))
        .collect();
    let allowed: Vec<bool> = (0..graph.atoms.len())
        .map(|atom| {
            electrons[atom].is_some()
                && graph.adjacency[atom]
                    .iter()
                    .filter(|&&(_, b)| graph.bonds[b].ring)
                    .count()
                    >= 2
        })
        .collect();

    let mut aromatic_bonds = Vec::new();
    for cycle in simple_cycles(graph, &allowed) {
        let total: u32 = cycle.atoms.iter().filter_map(|&a| electrons[a]).sum();
        if total % 4 == 2 {
            aromatic_bonds.extend(cycle.bonds);
        }
    }

    for bond in aromatic_bonds {
        let (a, b) = (graph.bonds[bond].a, graph.bonds[bond].b);
        graph.bonds[bond].order = BondOrder::Aromatic;
        graph.atoms[a].aromatic = true;
        graph.atoms[b].aromatic = true;
    }
}

/// Electrons an atom donates to a ring pi system, `None` when it cannot
/// take part.
fn pi_electrons(graph: &Graph, atom: usize) -> Option<u32> {
    let a = &graph.atoms[atom];
    if !AROMATIC_CAPABLE.contains(&a.element.as_str()) {
        return None;
    }

    let mut ring_double = 0;
    let mut exocyclic_double = None;
    for &(neighbour, b) in &graph.adjacency[atom] {
        let bond = &graph.bonds[b];
        match bond.order {
            BondOrder::Single => {}
            BondOrder::Double if bond.ring => ring_double += 1,
            BondOrder::Double => exocyclic_double = Some(neighbour),
            BondOrder::Triple | BondOrder::Aromatic => return None,
        }
    }

    let connections = graph.adjacency[atom].len() as u32 + a.hydrogens;
    match (ring_double, exocyclic_double) {
        (1, None) => Some(1),
        // Carbonyl-like exocyclic bonds leave an empty p orbital.
        (0, Some(other)) => {
            matches!(graph.atoms[other].element.as_str(), "O" | "S" | "N").then_some(0)
        }
        (0, None) => match (a.element.as_str(), a.charge) {
            ("C", -1) => Some(2),
            ("C", 1) | ("B", 0) => Some(0),
            ("N", 0) | ("P", 0) if connections == 3 => Some(2),
            ("N", -1) | ("O", 0) | ("S", 0) if connections == 2 => Some(2),
            _ => None,
        },
        _ => None,
    }
}

struct Cycle {
    atoms: Vec<usize>,
    bonds: Vec<usize>,
}

/// Simple cycles through allowed atoms over ring bonds, each reported once.
fn simple_cycles(graph: &Graph, allowed: &[bool]) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    for start in 0..graph.atoms.len() {
        if !allowed[start] {
            continue;
        }
        let mut atoms = vec![start];
        let mut bonds = Vec::new();
        extend_cycles(graph, allowed, start, &mut atoms, &mut bonds, &mut cycles);
    }
    cycles
}

fn extend_cycles(
    graph: &Graph,
    allowed: &[bool],
    start: usize,
    atoms: &mut Vec<usize>,
    bonds: &mut Vec<usize>,
    cycles: &mut Vec<Cycle>,
) {
    let Some(&last) = atoms.last() else {
        return;
    };
    for &(next, bond) in &graph.adjacency[last] {
        if !graph.bonds[bond].ring {
            continue;
        }
        if next == start {
            // Each cycle is found twice from its lowest atom; keep one direction.
            if atoms.len() >= 3 && atoms[1] < last {
                let mut closed = bonds.clone();
                closed.push(bond);
                cycles.push(Cycle {
                    atoms: atoms.clone(),
                    bonds: closed,
                });
            }
            continue;
        }
        if next < start || !allowed[next] || atoms.contains(&next) || atoms.len() == MAX_CYCLE {
            continue;
        }
        atoms.push(next);
        bonds.push(bond);
        extend_cycles(graph, allowed, start, atoms, bonds, cycles);
        atoms.pop();
        bonds.pop();
    }
}
