//! Structure-data file (SDF) reader for V2000 molfile records.
//!
//! Records are separated by `$$$$` lines. Each record holds a three-line
//! header (the first line is the molecule name), a counts line, the atom
//! and bond blocks, a property block terminated by `M  END`, and optional
//! `> <name>` data items.

use indexmap::IndexMap;

use crate::error::{NovaError, Result};

/// A parsed connection table.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    /// First header line (`_Name`).
    pub title: String,
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// `> <name>` data items in file order.
    pub data: IndexMap<String, String>,
}

/// An atom from the atom block, with charge/isotope properties applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: String,
    pub charge: i32,
    pub isotope: Option<u32>,
    /// `x`, `y`, `z` from the atom block.
    pub position: [f64; 3],
}

/// A bond between two atoms (zero-based indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub from: usize,
    pub to: usize,
    pub order: BondOrder,
    pub stereo: BondStereo,
}

/// Bond-block stereo field. Wedges are read from `from`, the narrow end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BondStereo {
    #[default]
    None,
    /// Wedge: `to` sits in front of the drawing plane.
    Up,
    /// Hash: `to` sits behind the drawing plane.
    Down,
    /// Wavy single bond or crossed double bond.
    Either,
}

impl BondStereo {
    fn from_code(code: u32) -> Self {
        match code {
            1 => BondStereo::Up,
            6 => BondStereo::Down,
            3 | 4 => BondStereo::Either,
            _ => BondStereo::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(BondOrder::Single),
            2 => Some(BondOrder::Double),
            3 => Some(BondOrder::Triple),
            4 => Some(BondOrder::Aromatic),
            _ => None,
        }
    }
}

/// Split SDF text into record blocks (without the `$$$$` terminators).
///
/// Blocks containing only whitespace are dropped, so a trailing newline
/// after the last terminator does not produce an empty record.
pub fn split_records(text: &str) -> Vec<Vec<&str>> {
    let mut records = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim_end() == "$$$$" {
            records.push(std::mem::take(&mut current));
        } else {
            current.push(line);
        }
    }
    records.push(current);

    records
        .into_iter()
        .filter(|lines| lines.iter().any(|l| !l.trim().is_empty()))
        .collect()
}

/// Parse every record, pairing each result with its zero-based index.
pub fn read_sdf(text: &str) -> Vec<(usize, Result<Molecule>)> {
    split_records(text)
        .iter()
        .enumerate()
        .map(|(index, lines)| (index, parse_record(lines)))
        .collect()
}

/// Parse a single molfile given as text.
pub fn parse_molfile(text: &str) -> Result<Molecule> {
    let lines: Vec<&str> = text.lines().collect();
    parse_record(&lines)
}

fn parse_error(line: usize, message: impl Into<String>) -> NovaError {
    NovaError::Parse {
        row: line + 1,
        column: 0,
        message: message.into(),
    }
}

/// Parse one record's lines.
pub fn parse_record(lines: &[&str]) -> Result<Molecule> {
    if lines.len() < 4 {
        return Err(parse_error(lines.len(), "record too short for a molfile header"));
    }

    let title = lines[0].trim().to_string();

    let counts = lines[3];
    if counts.contains("V3000") {
        return Err(parse_error(3, "V3000 molfiles are not supported"));
    }
    let (atom_count, bond_count) = parse_counts_line(counts).ok_or_else(|| {
        parse_error(3, format!("invalid counts line '{}'", counts.trim_end()))
    })?;
    if atom_count == 0 {
        return Err(parse_error(3, "molecule has no atoms"));
    }

    let atom_start = 4;
    let bond_start = atom_start + atom_count;
    let props_start = bond_start + bond_count;
    if lines.len() < props_start {
        return Err(parse_error(lines.len(), "unexpected end of connection table"));
    }

    let mut atoms = Vec::with_capacity(atom_count);
    for (offset, line) in lines[atom_start..bond_start].iter().enumerate() {
        atoms.push(parse_atom_line(line).map_err(|m| parse_error(atom_start + offset, m))?);
    }

    let mut bonds = Vec::with_capacity(bond_count);
    for (offset, line) in lines[bond_start..props_start].iter().enumerate() {
        let bond = parse_bond_line(line, atom_count)
            .map_err(|m| parse_error(bond_start + offset, m))?;
        bonds.push(bond);
    }

    let data_start = apply_properties(&lines[props_start..], &mut atoms)
        .map_err(|(offset, m)| parse_error(props_start + offset, m))?;
    let data = parse_data_items(&lines[props_start + data_start..]);

    Ok(Molecule {
        title,
        atoms,
        bonds,
        data,
    })
}

/// Fixed-width field, trimmed. `None` when the line is too short.
fn field(line: &str, start: usize, end: usize) -> Option<&str> {
    let end = end.min(line.len());
    line.get(start..end).map(str::trim)
}

fn parse_counts_line(line: &str) -> Option<(usize, usize)> {
    let fixed = field(line, 0, 3)
        .and_then(|a| a.parse().ok())
        .zip(field(line, 3, 6).and_then(|b| b.parse().ok()));
    fixed.or_else(|| {
        let mut parts = line.split_whitespace();
        let atoms = parts.next()?.parse().ok()?;
        let bonds = parts.next()?.parse().ok()?;
        Some((atoms, bonds))
    })
}

fn parse_atom_line(line: &str) -> std::result::Result<Atom, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(format!("invalid atom line '{}'", line.trim_end()));
    }
    let mut position = [0.0; 3];
    for (slot, coordinate) in position.iter_mut().zip(&parts[..3]) {
        *slot = coordinate
            .parse::<f64>()
            .map_err(|_| format!("invalid coordinate '{}'", coordinate))?;
    }

    let symbol = parts[3];
    let (element, isotope) = match symbol {
        "D" => ("H".to_string(), Some(2)),
        "T" => ("H".to_string(), Some(3)),
        s if is_element_symbol(s) => (s.to_string(), None),
        s => return Err(format!("unsupported atom symbol '{}'", s)),
    };

    let charge = match parts.get(5) {
        Some(code) => {
            let code: u32 = code
                .parse()
                .map_err(|_| format!("invalid charge field '{}'", code))?;
            charge_from_code(code).ok_or_else(|| format!("invalid charge code {}", code))?
        }
        None => 0,
    };

    Ok(Atom {
        element,
        charge,
        isotope,
        position,
    })
}

fn is_element_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            let rest: Vec<char> = chars.collect();
            rest.len() <= 2 && rest.iter().all(|c| c.is_ascii_lowercase())
        }
        _ => false,
    }
}

/// Atom-block charge field: 1..=3 positive, 5..=7 negative, 4 is a radical.
fn charge_from_code(code: u32) -> Option<i32> {
    match code {
        0 | 4 => Some(0),
        1 => Some(3),
        2 => Some(2),
        3 => Some(1),
        5 => Some(-1),
        6 => Some(-2),
        7 => Some(-3),
        _ => None,
    }
}

fn parse_bond_line(line: &str, atom_count: usize) -> std::result::Result<Bond, String> {
    let parse = |s: Option<&str>| s.and_then(|v| v.parse::<u32>().ok());

    // Indices above 99 run together in fixed-width columns.
    let fixed = (
        parse(field(line, 0, 3)),
        parse(field(line, 3, 6)),
        parse(field(line, 6, 9)),
    );
    let (from, to, code, stereo) = match fixed {
        (Some(a), Some(b), Some(t)) => (a, b, t, parse(field(line, 9, 12)).unwrap_or(0)),
        _ => {
            let mut parts = line.split_whitespace();
            match (parse(parts.next()), parse(parts.next()), parse(parts.next())) {
                (Some(a), Some(b), Some(t)) => (a, b, t, parse(parts.next()).unwrap_or(0)),
                _ => return Err(format!("invalid bond line '{}'", line.trim_end())),
            }
        }
    };

    let in_range = |i: u32| i >= 1 && (i as usize) <= atom_count;
    if !in_range(from) || !in_range(to) || from == to {
        return Err(format!("bond references invalid atoms {} and {}", from, to));
    }
    let order = BondOrder::from_code(code).ok_or_else(|| format!("unsupported bond type {}", code))?;

    Ok(Bond {
        from: from as usize - 1,
        to: to as usize - 1,
        order,
        stereo: BondStereo::from_code(stereo),
    })
}

/// Apply `M  CHG` and `M  ISO` lines. Returns the offset just past `M  END`
/// (or of the first data item when `M  END` is missing).
fn apply_properties(
    lines: &[&str],
    atoms: &mut [Atom],
) -> std::result::Result<usize, (usize, String)> {
    let mut charges_reset = false;

    for (offset, line) in lines.iter().enumerate() {
        if line.starts_with("M  END") {
            return Ok(offset + 1);
        }
        if line.starts_with('>') {
            return Ok(offset);
        }

        let is_chg = line.starts_with("M  CHG");
        let is_iso = line.starts_with("M  ISO");
        if !is_chg && !is_iso {
            continue;
        }

        let values: Vec<i64> = line
            .split_whitespace()
            .skip(2)
            .map(|v| v.parse::<i64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| (offset, format!("invalid property line '{}'", line.trim_end())))?;
        let (count, pairs) = values
            .split_first()
            .ok_or_else(|| (offset, "empty property line".to_string()))?;
        if *count < 0 || pairs.len() < (*count as usize) * 2 {
            return Err((offset, format!("truncated property line '{}'", line.trim_end())));
        }

        // Charge properties supersede every atom-block charge.
        if is_chg && !charges_reset {
            for atom in atoms.iter_mut() {
                atom.charge = 0;
            }
            charges_reset = true;
        }

        for pair in pairs.chunks(2).take(*count as usize) {
            let index = pair[0];
            if index < 1 || index as usize > atoms.len() {
                return Err((offset, format!("property references invalid atom {}", index)));
            }
            let atom = &mut atoms[index as usize - 1];
            if is_chg {
                atom.charge = pair[1] as i32;
            } else if pair[1] > 0 {
                atom.isotope = Some(pair[1] as u32);
            }
        }
    }

    Ok(lines.len())
}

fn parse_data_items(lines: &[&str]) -> IndexMap<String, String> {
    let mut data = IndexMap::new();
    let mut iter = lines.iter();

    while let Some(line) = iter.next() {
        if !line.starts_with('>') {
            continue;
        }
        let name = match (line.find('<'), line.rfind('>')) {
            (Some(start), Some(end)) if end > start => line[start + 1..end].to_string(),
            _ => continue,
        };
        let mut value = Vec::new();
        for line in iter.by_ref() {
            if line.trim().is_empty() {
                break;
            }
            value.push(*line);
        }
        data.insert(name, value.join("\n"));
    }

    data
}
