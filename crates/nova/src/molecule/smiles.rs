//! SMILES writer for parsed connection tables.
//!
//! Output is deterministic: atoms are ranked by iterated neighbour
//! invariants and the depth-first walk always follows the lowest rank, so
//! reordering the atom block does not change the string for most inputs.
//! Plain hydrogens are folded into their heavy atom's hydrogen count.
//! Kekulé rings are perceived as aromatic before ranking, and tetrahedral
//! and double-bond stereo are written when the record's geometry defines it.

use super::aromaticity;
use super::sdf::{BondOrder, BondStereo, Molecule};
use super::stereo::{self, Chirality, Neighbour};

/// Write a SMILES string for a molecule.
pub fn to_smiles(mol: &Molecule) -> String {
    let mut graph = Graph::build(mol);
    aromaticity::perceive(&mut graph);
    let ranks = graph.canonical_ranks();
    let walk = Walk::run(&graph, &ranks);
    walk.write(&graph, &ranks)
}

const ORGANIC_SUBSET: [&str; 10] = ["B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I"];
pub(super) const AROMATIC_CAPABLE: [&str; 6] = ["B", "C", "N", "O", "P", "S"];

fn default_valences(element: &str) -> &'static [u32] {
    match element {
        "B" => &[3],
        "C" => &[4],
        "N" => &[3, 5],
        "O" => &[2],
        "P" => &[3, 5],
        "S" => &[2, 4, 6],
        "F" | "Cl" | "Br" | "I" => &[1],
        _ => &[],
    }
}

/// Allowed valences adjusted for formal charge.
///
/// Groups 15-17 gain valence with positive charge (N+ behaves like C);
/// boron and carbon lose valence with any charge.
fn charged_valences(element: &str, charge: i32) -> Vec<u32> {
    let base = default_valences(element);
    if charge == 0 {
        return base.to_vec();
    }
    let electron_poor = matches!(element, "B" | "C");
    base.iter()
        .filter_map(|&v| {
            let adjusted = if electron_poor {
                v as i32 - charge.abs()
            } else {
                v as i32 + charge
            };
            (adjusted >= 0).then_some(adjusted as u32)
        })
        .collect()
}

/// Smallest allowed valence that accommodates `used`, minus `used`.
fn implicit_hydrogens(valences: &[u32], used: u32) -> u32 {
    valences
        .iter()
        .find(|&&v| v >= used)
        .map(|&v| v - used)
        .unwrap_or(0)
}

pub(super) struct GraphAtom {
    pub(super) element: String,
    pub(super) charge: i32,
    pub(super) isotope: Option<u32>,
    pub(super) aromatic: bool,
    /// Total hydrogen count, folded and implicit.
    pub(super) hydrogens: u32,
    pub(super) position: [f64; 3],
    /// Folded hydrogens with the stereo of their bond, when this atom is
    /// the bond's narrow end.
    pub(super) folded: Vec<([f64; 3], BondStereo)>,
}

pub(super) struct GraphBond {
    /// Narrow end for wedge stereo.
    pub(super) a: usize,
    pub(super) b: usize,
    pub(super) order: BondOrder,
    pub(super) stereo: BondStereo,
    /// Whether the bond lies on a cycle.
    pub(super) ring: bool,
}

impl GraphBond {
    pub(super) fn other(&self, atom: usize) -> usize {
        if self.a == atom { self.b } else { self.a }
    }
}

pub(super) struct Graph {
    pub(super) atoms: Vec<GraphAtom>,
    pub(super) bonds: Vec<GraphBond>,
    /// `(neighbour, bond)` per atom.
    pub(super) adjacency: Vec<Vec<(usize, usize)>>,
    /// Any non-zero `z` coordinate in the record.
    pub(super) three_d: bool,
}

impl Graph {
    fn build(mol: &Molecule) -> Self {
        let n = mol.atoms.len();
        let mut degree = vec![0usize; n];
        for bond in &mol.bonds {
            degree[bond.from] += 1;
            degree[bond.to] += 1;
        }

        // Plain hydrogens on a single bond to a heavy atom are implicit.
        let mut folded = vec![false; n];
        for bond in &mol.bonds {
            for (h, other) in [(bond.from, bond.to), (bond.to, bond.from)] {
                let atom = &mol.atoms[h];
                if atom.element == "H"
                    && atom.isotope.is_none()
                    && atom.charge == 0
                    && degree[h] == 1
                    && bond.order == BondOrder::Single
                    && mol.atoms[other].element != "H"
                {
                    folded[h] = true;
                }
            }
        }

        let mut local = vec![usize::MAX; n];
        let mut kept = Vec::new();
        for i in 0..n {
            if !folded[i] {
                local[i] = kept.len();
                kept.push(i);
            }
        }

        let mut folded_h: Vec<Vec<([f64; 3], BondStereo)>> = vec![Vec::new(); kept.len()];
        let mut bonds = Vec::new();
        let mut adjacency = vec![Vec::new(); kept.len()];
        for bond in &mol.bonds {
            match (folded[bond.from], folded[bond.to]) {
                (false, false) => {
                    let (a, b) = (local[bond.from], local[bond.to]);
                    adjacency[a].push((b, bonds.len()));
                    adjacency[b].push((a, bonds.len()));
                    bonds.push(GraphBond {
                        a,
                        b,
                        order: bond.order,
                        stereo: bond.stereo,
                        ring: false,
                    });
                }
                (true, false) => {
                    let position = mol.atoms[bond.from].position;
                    folded_h[local[bond.to]].push((position, BondStereo::None));
                }
                (false, true) => {
                    let position = mol.atoms[bond.to].position;
                    folded_h[local[bond.from]].push((position, bond.stereo));
                }
                (true, true) => {}
            }
        }

        let atoms = kept
            .iter()
            .zip(folded_h)
            .enumerate()
            .map(|(i, (&orig, folded))| {
                let source = &mol.atoms[orig];
                let mut aromatic_bonds = 0u32;
                let mut used = 0u32;
                for &(_, b) in &adjacency[i] {
                    match bonds[b].order {
                        BondOrder::Single => used += 1,
                        BondOrder::Double => used += 2,
                        BondOrder::Triple => used += 3,
                        BondOrder::Aromatic => aromatic_bonds += 1,
                    }
                }
                if aromatic_bonds > 0 {
                    used += aromatic_bonds + 1;
                }

                let explicit = folded.len() as u32;
                let valences = charged_valences(&source.element, source.charge);
                let hydrogens = explicit + implicit_hydrogens(&valences, used + explicit);

                GraphAtom {
                    element: source.element.clone(),
                    charge: source.charge,
                    isotope: source.isotope,
                    aromatic: aromatic_bonds > 0
                        && AROMATIC_CAPABLE.contains(&source.element.as_str()),
                    hydrogens,
                    position: source.position,
                    folded,
                }
            })
            .collect();

        let three_d = mol.atoms.iter().any(|a| a.position[2].abs() > 1e-4);

        let mut graph = Graph {
            atoms,
            bonds,
            adjacency,
            three_d,
        };
        graph.mark_ring_bonds();
        graph
    }

    /// A bond is in a ring when its ends stay connected without it.
    fn mark_ring_bonds(&mut self) {
        for bond in 0..self.bonds.len() {
            let (start, goal) = (self.bonds[bond].a, self.bonds[bond].b);
            let mut seen = vec![false; self.atoms.len()];
            let mut stack = vec![start];
            seen[start] = true;
            let mut ring = false;
            while let Some(atom) = stack.pop() {
                for &(next, via) in &self.adjacency[atom] {
                    if via == bond || seen[next] {
                        continue;
                    }
                    if next == goal {
                        ring = true;
                        break;
                    }
                    seen[next] = true;
                    stack.push(next);
                }
                if ring {
                    break;
                }
            }
            self.bonds[bond].ring = ring;
        }
    }

    /// Rank atoms by refined invariants; ties broken by atom position.
    fn canonical_ranks(&self) -> Vec<usize> {
        let initial: Vec<_> = self
            .atoms
            .iter()
            .enumerate()
            .map(|(i, a)| {
                (
                    self.adjacency[i].len(),
                    a.element.clone(),
                    a.isotope,
                    a.charge,
                    a.hydrogens,
                    a.aromatic,
                )
            })
            .collect();
        let mut ranks = rank_keys(&initial);
        let mut classes = count_classes(&ranks);

        loop {
            let keys: Vec<(usize, Vec<(usize, BondOrder)>)> = (0..self.atoms.len())
                .map(|i| {
                    let mut neighbours: Vec<(usize, BondOrder)> = self.adjacency[i]
                        .iter()
                        .map(|&(n, b)| (ranks[n], self.bonds[b].order))
                        .collect();
                    neighbours.sort_unstable();
                    (ranks[i], neighbours)
                })
                .collect();
            let refined = rank_keys(&keys);
            let refined_classes = count_classes(&refined);
            if refined_classes <= classes {
                break;
            }
            ranks = refined;
            classes = refined_classes;
        }

        ranks
    }

    fn bond_symbol(&self, bond: usize) -> &'static str {
        let GraphBond { a, b, order, .. } = &self.bonds[bond];
        let (a, b, order) = (*a, *b, *order);
        let both_aromatic = self.atoms[a].aromatic && self.atoms[b].aromatic;
        match order {
            BondOrder::Single if both_aromatic => "-",
            BondOrder::Single => "",
            BondOrder::Double => "=",
            BondOrder::Triple => "#",
            BondOrder::Aromatic if both_aromatic => "",
            BondOrder::Aromatic => ":",
        }
    }

    /// Whether a SMILES reader would infer this atom's hydrogens from a
    /// bare symbol.
    fn is_bare(&self, atom: usize) -> bool {
        let a = &self.atoms[atom];
        if !ORGANIC_SUBSET.contains(&a.element.as_str()) || a.charge != 0 || a.isotope.is_some() {
            return false;
        }
        let mut used = 0u32;
        let mut aromatic_bonds = 0u32;
        for &(_, b) in &self.adjacency[atom] {
            match self.bonds[b].order {
                BondOrder::Single => used += 1,
                BondOrder::Double => used += 2,
                BondOrder::Triple => used += 3,
                BondOrder::Aromatic => aromatic_bonds += 1,
            }
        }
        used += aromatic_bonds;
        if a.aromatic {
            used += 1;
        }
        a.hydrogens == implicit_hydrogens(default_valences(&a.element), used)
    }

    fn atom_token(&self, atom: usize, chirality: Option<Chirality>) -> String {
        let a = &self.atoms[atom];
        let symbol = if a.aromatic {
            a.element.to_lowercase()
        } else {
            a.element.clone()
        };
        if chirality.is_none() && self.is_bare(atom) {
            return symbol;
        }

        let mut token = String::from("[");
        if let Some(isotope) = a.isotope {
            token.push_str(&isotope.to_string());
        }
        token.push_str(&symbol);
        if let Some(chirality) = chirality {
            token.push_str(chirality.symbol());
        }
        match a.hydrogens {
            0 => {}
            1 => token.push('H'),
            n => token.push_str(&format!("H{}", n)),
        }
        match a.charge {
            0 => {}
            1 => token.push('+'),
            -1 => token.push('-'),
            c if c > 0 => token.push_str(&format!("+{}", c)),
            c => token.push_str(&format!("-{}", c.abs())),
        }
        token.push(']');
        token
    }
}

fn rank_keys<K: Ord + Clone>(keys: &[K]) -> Vec<usize> {
    let mut sorted: Vec<K> = keys.to_vec();
    sorted.sort();
    sorted.dedup();
    keys.iter()
        .map(|k| sorted.binary_search(k).unwrap_or(0))
        .collect()
}

fn count_classes(ranks: &[usize]) -> usize {
    let mut unique = ranks.to_vec();
    unique.sort_unstable();
    unique.dedup();
    unique.len()
}

/// Depth-first spanning tree plus ring-closure events.
struct Walk {
    roots: Vec<usize>,
    /// Atoms in the order they are written.
    order: Vec<usize>,
    parent: Vec<Option<(usize, usize)>>,
    children: Vec<Vec<(usize, usize)>>,
    /// `(bond, opens)` per atom; closures sort before openings.
    rings: Vec<Vec<(usize, bool)>>,
}

impl Walk {
    fn run(graph: &Graph, ranks: &[usize]) -> Self {
        let n = graph.atoms.len();
        let mut walk = Walk {
            roots: Vec::new(),
            order: Vec::with_capacity(n),
            parent: vec![None; n],
            children: vec![Vec::new(); n],
            rings: vec![Vec::new(); n],
        };
        let mut visited = vec![false; n];
        let mut used = vec![false; graph.bonds.len()];

        let mut starts: Vec<usize> = (0..n).collect();
        starts.sort_by_key(|&i| (ranks[i], i));

        for start in starts {
            if visited[start] {
                continue;
            }
            walk.roots.push(start);
            walk.visit(graph, ranks, start, &mut visited, &mut used);
        }

        for events in &mut walk.rings {
            events.sort_by_key(|&(_, opens)| opens);
        }
        walk
    }

    fn visit(
        &mut self,
        graph: &Graph,
        ranks: &[usize],
        atom: usize,
        visited: &mut [bool],
        used: &mut [bool],
    ) {
        visited[atom] = true;
        self.order.push(atom);

        let mut neighbours = graph.adjacency[atom].clone();
        neighbours.sort_by_key(|&(n, _)| (ranks[n], n));

        for (next, bond) in neighbours {
            if used[bond] {
                continue;
            }
            used[bond] = true;
            if visited[next] {
                // Back edge: the ancestor opens the ring, this atom closes it.
                self.rings[next].push((bond, true));
                self.rings[atom].push((bond, false));
            } else {
                self.children[atom].push((next, bond));
                self.parent[next] = Some((atom, bond));
                self.visit(graph, ranks, next, visited, used);
            }
        }
    }

    /// Neighbours of `atom` in the order the string lists them.
    fn neighbour_order(&self, graph: &Graph, atom: usize) -> Vec<Neighbour> {
        let mut order = Vec::with_capacity(4);
        if let Some((parent, _)) = self.parent[atom] {
            order.push(Neighbour::Atom(parent));
        }
        if graph.atoms[atom].hydrogens > 0 {
            order.push(Neighbour::Hydrogen);
        }
        for &(bond, _) in &self.rings[atom] {
            order.push(Neighbour::Atom(graph.bonds[bond].other(atom)));
        }
        for &(child, _) in &self.children[atom] {
            order.push(Neighbour::Atom(child));
        }
        order
    }

    fn chirality(&self, graph: &Graph, ranks: &[usize]) -> Vec<Option<Chirality>> {
        (0..graph.atoms.len())
            .map(|atom| {
                if !stereo::is_tetrahedral_centre(graph, ranks, atom) {
                    return None;
                }
                stereo::chirality(graph, atom, &self.neighbour_order(graph, atom))
            })
            .collect()
    }

    /// `/` and `\` marks for tree bonds, as printed.
    ///
    /// Each stereo double bond gets one marked single bond per end. A mark
    /// shared between conjugated double bonds is reused, not overwritten.
    fn bond_directions(&self, graph: &Graph, ranks: &[usize]) -> Vec<Option<char>> {
        let mut marks: Vec<Option<char>> = vec![None; graph.bonds.len()];

        for &a in &self.order {
            for &(b, double) in &self.children[a] {
                if !stereo::is_stereo_double_bond(graph, ranks, double) {
                    continue;
                }

                // Side `a`: its parent is written before it, children after.
                let single = |bond: usize| graph.bonds[bond].order == BondOrder::Single;
                let mut refs_a: Vec<(usize, usize, bool)> = Vec::new();
                if let Some((parent, bond)) = self.parent[a] {
                    if single(bond) {
                        refs_a.push((parent, bond, true));
                    }
                }
                for &(child, bond) in &self.children[a] {
                    if child != b && single(bond) {
                        refs_a.push((child, bond, false));
                    }
                }
                let refs_b: Vec<(usize, usize)> = self.children[b]
                    .iter()
                    .copied()
                    .filter(|&(_, bond)| single(bond))
                    .collect();

                let pick_a = refs_a
                    .iter()
                    .find(|r| marks[r.1].is_some())
                    .or_else(|| refs_a.first())
                    .copied();
                let pick_b = refs_b
                    .iter()
                    .find(|r| marks[r.1].is_some())
                    .or_else(|| refs_b.first())
                    .copied();
                let (Some((ra, bond_a, before)), Some((rb, bond_b))) = (pick_a, pick_b) else {
                    continue;
                };
                let Some(cis) = stereo::same_side(graph, a, b, ra, rb) else {
                    continue;
                };

                // Normalize to "ref before a" reading.
                let printed_a = marks[bond_a].unwrap_or(if before { '/' } else { '\\' });
                let effective_a = if before { printed_a } else { flip(printed_a) };
                let wanted_b = if cis { flip(effective_a) } else { effective_a };
                if marks[bond_b].is_some_and(|m| m != wanted_b) {
                    tracing::debug!(bond = double, "conflicting double bond marks, configuration dropped");
                    continue;
                }
                marks[bond_a] = Some(printed_a);
                marks[bond_b] = Some(wanted_b);
            }
        }

        marks
    }

    fn write(&self, graph: &Graph, ranks: &[usize]) -> String {
        let chirality = self.chirality(graph, ranks);
        let marks = self.bond_directions(graph, ranks);
        let mut writer = Writer {
            graph,
            walk: self,
            chirality: &chirality,
            marks: &marks,
            digits: RingDigits::default(),
            out: String::new(),
        };
        for (i, &root) in self.roots.iter().enumerate() {
            if i > 0 {
                writer.out.push('.');
            }
            writer.write_atom(root);
        }
        writer.out
    }
}

fn flip(mark: char) -> char {
    if mark == '/' { '\\' } else { '/' }
}

struct Writer<'a> {
    graph: &'a Graph,
    walk: &'a Walk,
    chirality: &'a [Option<Chirality>],
    marks: &'a [Option<char>],
    digits: RingDigits,
    out: String,
}

impl Writer<'_> {
    fn write_atom(&mut self, atom: usize) {
        let (graph, walk) = (self.graph, self.walk);
        self.out.push_str(&graph.atom_token(atom, self.chirality[atom]));

        for &(bond, opens) in &walk.rings[atom] {
            if opens {
                let digit = self.digits.open(bond);
                self.out.push_str(graph.bond_symbol(bond));
                self.out.push_str(&format_ring_digit(digit));
            } else {
                let digit = self.digits.close(bond);
                self.out.push_str(&format_ring_digit(digit));
            }
        }

        let children = &walk.children[atom];
        for (i, &(child, bond)) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            if !last {
                self.out.push('(');
            }
            match self.marks[bond] {
                Some(mark) => self.out.push(mark),
                None => self.out.push_str(graph.bond_symbol(bond)),
            }
            self.write_atom(child);
            if !last {
                self.out.push(')');
            }
        }
    }
}

/// Lowest-free ring closure digit allocation.
#[derive(Default)]
struct RingDigits {
    in_use: Vec<Option<usize>>,
}

impl RingDigits {
    fn open(&mut self, bond: usize) -> usize {
        match self.in_use.iter().position(Option::is_none) {
            Some(slot) => {
                self.in_use[slot] = Some(bond);
                slot + 1
            }
            None => {
                self.in_use.push(Some(bond));
                self.in_use.len()
            }
        }
    }

    fn close(&mut self, bond: usize) -> usize {
        match self.in_use.iter().position(|b| *b == Some(bond)) {
            Some(slot) => {
                self.in_use[slot] = None;
                slot + 1
            }
            // Unreachable: every closure follows its opening.
            None => 0,
        }
    }
}

fn format_ring_digit(digit: usize) -> String {
    if digit < 10 {
        digit.to_string()
    } else {
        format!("%{}", digit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::sdf::parse_molfile;

    /// Build a molfile from `(symbol, charge code)` atoms and `(a, b, type)` bonds.
    fn molfile(atoms: &[(&str, u32)], bonds: &[(usize, usize, u32)], props: &[&str]) -> String {
        let mut text = String::from("test\n  nova\n\n");
        text.push_str(&format!(
            "{:>3}{:>3}  0  0  0  0            999 V2000\n",
            atoms.len(),
            bonds.len()
        ));
        for (symbol, charge) in atoms {
            text.push_str(&format!(
                "    0.0000    0.0000    0.0000 {:<3} 0{:>3}  0  0  0  0\n",
                symbol, charge
            ));
        }
        for (a, b, t) in bonds {
            text.push_str(&format!("{:>3}{:>3}{:>3}  0\n", a, b, t));
        }
        for line in props {
            text.push_str(line);
            text.push('\n');
        }
        text.push_str("M  END\n");
        text
    }

    fn smiles(atoms: &[(&str, u32)], bonds: &[(usize, usize, u32)], props: &[&str]) -> String {
        to_smiles(&parse_molfile(&molfile(atoms, bonds, props)).unwrap())
    }

    #[test]
    fn test_ethanol() {
        assert_eq!(
            smiles(&[("C", 0), ("C", 0), ("O", 0)], &[(1, 2, 1), (2, 3, 1)], &[]),
            "CCO"
        );
    }

    #[test]
    fn test_atom_order_does_not_matter() {
        let forward = smiles(&[("C", 0), ("C", 0), ("O", 0)], &[(1, 2, 1), (2, 3, 1)], &[]);
        let reversed = smiles(&[("O", 0), ("C", 0), ("C", 0)], &[(1, 2, 1), (2, 3, 1)], &[]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_explicit_hydrogens_are_folded() {
        // Methanol with all hydrogens drawn.
        let atoms = [
            ("C", 0),
            ("O", 0),
            ("H", 0),
            ("H", 0),
            ("H", 0),
            ("H", 0),
        ];
        let bonds = [(1, 2, 1), (1, 3, 1), (1, 4, 1), (1, 5, 1), (2, 6, 1)];
        assert_eq!(smiles(&atoms, &bonds, &[]), "CO");
    }

    #[test]
    fn test_benzene_aromatic() {
        let atoms = [("C", 0); 6];
        let bonds = [(1, 2, 4), (2, 3, 4), (3, 4, 4), (4, 5, 4), (5, 6, 4), (6, 1, 4)];
        assert_eq!(smiles(&atoms, &bonds, &[]), "c1ccccc1");
    }

    #[test]
    fn test_cyclohexane_ring_closure() {
        let atoms = [("C", 0); 6];
        let bonds = [(1, 2, 1), (2, 3, 1), (3, 4, 1), (4, 5, 1), (5, 6, 1), (6, 1, 1)];
        assert_eq!(smiles(&atoms, &bonds, &[]), "C1CCCCC1");
    }

    #[test]
    fn test_double_and_triple_bonds() {
        assert_eq!(smiles(&[("C", 0), ("O", 0)], &[(1, 2, 2)], &[]), "C=O");
        assert_eq!(smiles(&[("C", 0), ("N", 0)], &[(1, 2, 3)], &[]), "C#N");
    }

    #[test]
    fn test_branches() {
        // Isobutane: central carbon bonded to three methyls.
        let atoms = [("C", 0); 4];
        let bonds = [(1, 2, 1), (1, 3, 1), (1, 4, 1)];
        assert_eq!(smiles(&atoms, &bonds, &[]), "CC(C)C");
    }

    #[test]
    fn test_charges_and_fragments() {
        assert_eq!(smiles(&[("N", 3)], &[], &[]), "[NH4+]");
        assert_eq!(
            smiles(&[("Na", 0), ("Cl", 0)], &[], &["M  CHG  2   1   1   2  -1"]),
            "[Cl-].[Na+]"
        );
    }

    #[test]
    fn test_carboxylate_from_chg_block() {
        let atoms = [("C", 0), ("C", 0), ("O", 0), ("O", 0)];
        let bonds = [(1, 2, 1), (2, 3, 2), (2, 4, 1)];
        assert_eq!(
            smiles(&atoms, &bonds, &["M  CHG  1   4  -1"]),
            "CC([O-])=O"
        );
    }

    #[test]
    fn test_isotope_is_bracketed() {
        assert_eq!(
            smiles(&[("C", 0), ("O", 0)], &[(1, 2, 1)], &["M  ISO  1   1  13"]),
            "[13CH3]O"
        );
    }

    #[test]
    fn test_single_drawn_hydrogen_keeps_implicit_ones() {
        // Ethane with one hydrogen drawn on the first carbon.
        let atoms = [("C", 0), ("C", 0), ("H", 0)];
        let bonds = [(1, 2, 1), (1, 3, 1)];
        assert_eq!(smiles(&atoms, &bonds, &[]), "CC");
    }

    #[test]
    fn test_kekule_benzene_is_aromatic() {
        let atoms = [("C", 0); 6];
        let one = [(1, 2, 2), (2, 3, 1), (3, 4, 2), (4, 5, 1), (5, 6, 2), (6, 1, 1)];
        let other = [(1, 2, 1), (2, 3, 2), (3, 4, 1), (4, 5, 2), (5, 6, 1), (6, 1, 2)];
        assert_eq!(smiles(&atoms, &one, &[]), "c1ccccc1");
        assert_eq!(smiles(&atoms, &other, &[]), "c1ccccc1");
    }

    #[test]
    fn test_toluene() {
        let atoms = [("C", 0); 7];
        let bonds = [
            (1, 2, 2),
            (2, 3, 1),
            (3, 4, 2),
            (4, 5, 1),
            (5, 6, 2),
            (6, 1, 1),
            (1, 7, 1),
        ];
        assert_eq!(smiles(&atoms, &bonds, &[]), "Cc1ccccc1");
    }

    #[test]
    fn test_kekule_and_aromatic_pyridine_agree() {
        let atoms = [("N", 0), ("C", 0), ("C", 0), ("C", 0), ("C", 0), ("C", 0)];
        let kekule = [(1, 2, 2), (2, 3, 1), (3, 4, 2), (4, 5, 1), (5, 6, 2), (6, 1, 1)];
        let aromatic = [(1, 2, 4), (2, 3, 4), (3, 4, 4), (4, 5, 4), (5, 6, 4), (6, 1, 4)];

        let from_kekule = smiles(&atoms, &kekule, &[]);
        assert_eq!(from_kekule, smiles(&atoms, &aromatic, &[]));
        assert!(from_kekule.contains('n'));
        assert!(!from_kekule.contains('='));
    }

    #[test]
    fn test_pyrrole_keeps_nh() {
        let atoms = [("N", 0), ("C", 0), ("C", 0), ("C", 0), ("C", 0)];
        let bonds = [(1, 2, 1), (2, 3, 2), (3, 4, 1), (4, 5, 2), (5, 1, 1)];
        assert_eq!(smiles(&atoms, &bonds, &[]), "c1cc[nH]c1");
    }

    #[test]
    fn test_fused_rings_are_aromatic() {
        // Naphthalene, Kekulé form.
        let atoms = [("C", 0); 10];
        let bonds = [
            (1, 2, 2),
            (2, 3, 1),
            (3, 4, 2),
            (4, 5, 1),
            (5, 6, 2),
            (6, 1, 1),
            (5, 7, 1),
            (7, 8, 2),
            (8, 9, 1),
            (9, 10, 2),
            (10, 6, 1),
        ];
        let s = smiles(&atoms, &bonds, &[]);
        assert!(!s.contains('='), "{s}");
        assert!(!s.contains('C'), "{s}");
        assert_eq!(s.matches('c').count(), 10);
    }

    #[test]
    fn test_quinone_is_not_aromatic() {
        let atoms = [
            ("C", 0),
            ("C", 0),
            ("C", 0),
            ("C", 0),
            ("C", 0),
            ("C", 0),
            ("O", 0),
            ("O", 0),
        ];
        let bonds = [
            (1, 2, 1),
            (2, 3, 2),
            (3, 4, 1),
            (4, 5, 1),
            (5, 6, 2),
            (6, 1, 1),
            (1, 7, 2),
            (4, 8, 2),
        ];
        let s = smiles(&atoms, &bonds, &[]);
        assert!(!s.contains('c'), "{s}");
        assert_eq!(s.matches('=').count(), 4);
    }

    /// Build a molfile with coordinates and `(a, b, type, stereo)` bonds.
    fn molfile_xyz(atoms: &[(&str, [f64; 3])], bonds: &[(usize, usize, u32, u32)]) -> String {
        let mut text = String::from("test\n  nova\n\n");
        text.push_str(&format!(
            "{:>3}{:>3}  0  0  0  0            999 V2000\n",
            atoms.len(),
            bonds.len()
        ));
        for (symbol, [x, y, z]) in atoms {
            text.push_str(&format!(
                "{:>10.4}{:>10.4}{:>10.4} {:<3} 0  0  0  0  0  0\n",
                x, y, z, symbol
            ));
        }
        for (a, b, t, stereo) in bonds {
            text.push_str(&format!("{:>3}{:>3}{:>3}{:>3}\n", a, b, t, stereo));
        }
        text.push_str("M  END\n");
        text
    }

    fn smiles_xyz(atoms: &[(&str, [f64; 3])], bonds: &[(usize, usize, u32, u32)]) -> String {
        to_smiles(&parse_molfile(&molfile_xyz(atoms, bonds)).unwrap())
    }

    fn halomethane_3d(z: f64) -> String {
        let atoms = [
            ("C", [0.0, 0.0, 0.0]),
            ("F", [-0.5, -0.866, -0.33 * z]),
            ("Cl", [-0.5, 0.866, -0.33 * z]),
            ("Br", [0.0, 0.0, z]),
            ("H", [1.0, 0.0, -0.33 * z]),
        ];
        let bonds = [(1, 2, 1, 0), (1, 3, 1, 0), (1, 4, 1, 0), (1, 5, 1, 0)];
        smiles_xyz(&atoms, &bonds)
    }

    #[test]
    fn test_tetrahedral_centre_from_coordinates() {
        assert_eq!(halomethane_3d(1.0), "Br[C@H](Cl)F");
        assert_eq!(halomethane_3d(-1.0), "Br[C@@H](Cl)F");
    }

    fn halomethane_wedged(first: &str, stereo: u32) -> String {
        let atoms = [
            ("C", [0.0, 0.0, 0.0]),
            (first, [0.0, 1.0, 0.0]),
            ("Cl", [-0.87, -0.5, 0.0]),
            ("F", [0.87, -0.5, 0.0]),
        ];
        let bonds = [(1, 2, 1, stereo), (1, 3, 1, 0), (1, 4, 1, 0)];
        smiles_xyz(&atoms, &bonds)
    }

    #[test]
    fn test_wedge_and_hash_set_opposite_marks() {
        assert_eq!(halomethane_wedged("Br", 1), "Br[C@H](Cl)F");
        assert_eq!(halomethane_wedged("Br", 6), "Br[C@@H](Cl)F");
        assert_eq!(halomethane_wedged("Br", 0), "BrC(Cl)F");
    }

    #[test]
    fn test_wedge_on_non_stereocentre_is_ignored() {
        assert_eq!(halomethane_wedged("Cl", 1), "ClC(Cl)F");
    }

    fn butene(end: [f64; 3]) -> String {
        let atoms = [
            ("C", [-0.5, 0.87, 0.0]),
            ("C", [0.0, 0.0, 0.0]),
            ("C", [1.0, 0.0, 0.0]),
            ("C", end),
        ];
        let bonds = [(1, 2, 1, 0), (2, 3, 2, 0), (3, 4, 1, 0)];
        smiles_xyz(&atoms, &bonds)
    }

    #[test]
    fn test_double_bond_configuration() {
        assert_eq!(butene([1.5, -0.87, 0.0]), "C/C=C/C");
        assert_eq!(butene([1.5, 0.87, 0.0]), "C/C=C\\C");
    }

    #[test]
    fn test_ring_digit_format() {
        assert_eq!(format_ring_digit(1), "1");
        assert_eq!(format_ring_digit(9), "9");
        assert_eq!(format_ring_digit(12), "%12");
    }
}
