//! Structure editing: hit testing, grafting new shapes onto atoms,
//! deletion and label changes.
//!
//! All operations here work on a structure clone owned by the caller;
//! nothing in this module touches the history. Functions return whether
//! they changed anything so the session can decide what to commit.

use std::fmt;

use crate::constants::{Direction, GeomConsts, BOND_ANGLE_DEG, FREQ_DEG, MAX_BONDS, VECTOR_PRECISION};
use crate::templates::{build_ring_chain, generate_bond, possible_vectors, closest_vector, StructureCluster};
use crate::types::{Atom, Bond, Label, Structure, StructureItem};
use crate::vector::{inside_circle, Vector};

/// Why a new bond or ring could not be placed on an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// The atom already carries the maximum number of bonds.
    FullAtom,
    /// Every one of the 24 compass directions is already occupied.
    NoFreeDirection,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::FullAtom => write!(f, "atom already has the maximum number of bonds"),
            PlacementError::NoFreeDirection => {
                write!(f, "no free direction left around the atom")
            }
        }
    }
}

impl std::error::Error for PlacementError {}

/// Finds the first atom whose position lies within the hit-test
/// tolerance of `position` and returns its absolute coordinates.
pub fn hit_test(structure: &Structure, position: Vector, consts: &GeomConsts) -> Option<Vector> {
    fn check(atom: &Atom, abs: Vector, position: Vector, consts: &GeomConsts) -> Option<Vector> {
        if inside_circle(abs, position, consts.circ_r) {
            return Some(abs);
        }
        for bond in &atom.bonds {
            if let Some(hit) = check(&bond.atom, abs.add(bond.atom.coords), position, consts) {
                return Some(hit);
            }
        }
        None
    }
    for item in &structure.items {
        if let StructureItem::Atom(atom) = item {
            if let Some(hit) = check(atom, structure.origin.add(atom.coords), position, consts) {
                return Some(hit);
            }
        }
    }
    None
}

/// Seed vector shared by the automatic and manual direction choices:
/// the bisector of the first incoming and outgoing bonds.
fn bisector(first_in: Vector, first_out: Vector, consts: &GeomConsts) -> Vector {
    match (first_in.norm(), first_out.norm()) {
        (Some(a), Some(b)) => {
            let angle = a.dot(b).clamp(-1.0, 1.0).acos().to_degrees();
            first_in.rotate_ccw((180.0 - angle) / 2.0)
        }
        _ => consts.bond_vector(Direction::N),
    }
}

/// Rotates `vector` clockwise in 15° steps until it no longer collides
/// with an occupied direction slot on `atom`.
///
/// At most one full turn is attempted; a crowded atom where every slot
/// collides yields [`PlacementError::NoFreeDirection`] instead of
/// spinning forever.
fn check_attached_bonds(mut vector: Vector, atom: &Atom) -> Result<Vector, PlacementError> {
    if atom.attached.count() >= MAX_BONDS {
        return Err(PlacementError::FullAtom);
    }
    for _ in 0..24 {
        let conflict = atom
            .attached
            .incoming
            .iter()
            // Incoming slots are recorded pointing at the atom, so they
            // block the opposite outgoing direction.
            .map(|b| b.vector.rotate_cw(180.0))
            .chain(atom.attached.outgoing.iter().map(|b| b.vector))
            .any(|occupied| occupied.compare(vector, VECTOR_PRECISION));
        if !conflict {
            return Ok(vector);
        }
        vector = vector.rotate_cw(FREQ_DEG);
    }
    Err(PlacementError::NoFreeDirection)
}

/// Decides where the next bond should go after a plain click on an atom.
pub fn choose_direction_automatically(
    atom: &Atom,
    consts: &GeomConsts,
) -> Result<Vector, PlacementError> {
    let first_in = atom.attached.incoming.first().map(|b| b.vector);
    let first_out = atom.attached.outgoing.first().map(|b| b.vector);
    let seed = match (first_in, first_out) {
        (Some(inc), Some(out)) => {
            let vect = bisector(inc, out, consts);
            if vect.compare(out, VECTOR_PRECISION) {
                // The bisector landed on the existing outgoing bond, so
                // mirror it to the other side.
                match (inc.norm(), out.norm()) {
                    (Some(a), Some(b)) => {
                        let angle = a.dot(b).clamp(-1.0, 1.0).acos().to_degrees();
                        inc.rotate_cw((180.0 - angle) / 2.0)
                    }
                    _ => vect,
                }
            } else {
                vect
            }
        }
        (Some(inc), None) => inc.rotate_ccw(BOND_ANGLE_DEG / 2.0),
        (None, Some(out)) => out.rotate_ccw(BOND_ANGLE_DEG),
        (None, None) => consts.bond_vector(Direction::N),
    };
    check_attached_bonds(seed, atom)
}

/// Decides where the next bond should go after a drag off an atom: the
/// seed direction is rotated in 15° steps and the candidate closest to
/// the drag wins. No occupancy check is performed; the user's drag is
/// taken literally.
pub fn choose_direction_manually(
    atom: &Atom,
    down: Vector,
    mouse_pos: Vector,
    consts: &GeomConsts,
) -> Vector {
    let first_in = atom.attached.incoming.first().map(|b| b.vector);
    let first_out = atom.attached.outgoing.first().map(|b| b.vector);
    let seed = match (first_in, first_out) {
        (Some(inc), Some(out)) => bisector(inc, out, consts),
        (Some(inc), None) => inc,
        (None, Some(out)) => out,
        (None, None) => consts.bond_vector(Direction::N),
    };
    let candidates = possible_vectors(seed, FREQ_DEG);
    closest_vector(down, mouse_pos, &candidates).unwrap_or(seed)
}

/// Stamps the cluster's shape onto `atom` in the given direction.
fn update_atom(atom: &mut Atom, vector: Vector, cluster: &StructureCluster) {
    if cluster.ring_size > 1 {
        // The ring's first edge bisects the angle left of the chosen
        // direction.
        let first_edge = vector.rotate_ccw(cluster.angle_deg / 2.0);
        let (chain, closing) = build_ring_chain(first_edge, cluster.ring_size, cluster.angle_deg);
        atom.bonds.push(Bond::new(cluster.bond_kind, chain));
        atom.attach_outgoing(first_edge, 1);
        atom.attach_incoming(closing, 1);
    } else {
        let kind = cluster.bond_kind;
        atom.bonds.push(generate_bond(vector, kind));
        atom.attach_outgoing(vector, kind.multiplicity());
    }
}

/// Grafts the chosen cluster onto the atom under the gesture.
///
/// A click (`moved == false`) inside an atom's hit circle places the
/// shape in an automatically chosen direction. A drag that started on
/// an atom (`down_atom`) and ended outside its circle places the shape
/// in the direction closest to the drag.
///
/// # Returns
///
/// The absolute position of the modified atom, or `None` when no atom
/// matched the gesture.
pub fn graft(
    structure: &mut Structure,
    cluster: &StructureCluster,
    mouse_pos: Vector,
    down_atom: Option<Vector>,
    moved: bool,
    consts: &GeomConsts,
) -> Result<Option<Vector>, PlacementError> {
    fn walk(
        atom: &mut Atom,
        abs: Vector,
        cluster: &StructureCluster,
        mouse_pos: Vector,
        down_atom: Option<Vector>,
        moved: bool,
        consts: &GeomConsts,
    ) -> Result<Option<Vector>, PlacementError> {
        let inside = inside_circle(abs, mouse_pos, consts.circ_r);
        if inside && !moved {
            let vector = choose_direction_automatically(atom, consts)?;
            update_atom(atom, vector, cluster);
            return Ok(Some(abs));
        }
        if !inside {
            if let Some(down) = down_atom {
                if down.compare(abs, VECTOR_PRECISION) {
                    let vector = choose_direction_manually(atom, down, mouse_pos, consts);
                    update_atom(atom, vector, cluster);
                    return Ok(Some(abs));
                }
            }
        }
        for bond in &mut atom.bonds {
            let child_abs = abs.add(bond.atom.coords);
            if let Some(hit) = walk(
                &mut bond.atom,
                child_abs,
                cluster,
                mouse_pos,
                down_atom,
                moved,
                consts,
            )? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    let origin = structure.origin;
    for item in &mut structure.items {
        if let StructureItem::Atom(atom) = item {
            let abs = origin.add(atom.coords);
            if let Some(hit) = walk(atom, abs, cluster, mouse_pos, down_atom, moved, consts)? {
                return Ok(Some(hit));
            }
        }
    }
    Ok(None)
}

/// Deletes whatever sits under `point`: atoms (children are kept and
/// reparented onto the former parent, with their absolute positions
/// preserved), arrows hit at either endpoint, and aromatic circles
/// whose center is within the ring radius.
///
/// # Returns
///
/// `true` if anything was removed.
pub fn delete_at(structure: &mut Structure, point: Vector, consts: &GeomConsts) -> bool {
    let mut changed = false;
    // Coincident atoms (a closed ring's first and last vertex) are
    // removed one per pass, so keep going until a pass finds nothing.
    while delete_pass(structure, point, consts) {
        changed = true;
    }
    let before = structure.decorations.aromatic.len();
    structure
        .decorations
        .aromatic
        .retain(|arom| !inside_circle(arom.coords, point, consts.aromatic_r));
    changed || structure.decorations.aromatic.len() != before
}

fn delete_pass(structure: &mut Structure, point: Vector, consts: &GeomConsts) -> bool {
    let origin = structure.origin;
    let mut changed = false;
    let mut new_items = Vec::with_capacity(structure.items.len());
    for item in structure.items.drain(..) {
        match item {
            StructureItem::Arrow(arrow) => {
                let start = origin.add(arrow.origin);
                let end = origin.add(arrow.end());
                if inside_circle(start, point, consts.circ_r)
                    || inside_circle(end, point, consts.circ_r)
                {
                    changed = true;
                } else {
                    new_items.push(StructureItem::Arrow(arrow));
                }
            }
            StructureItem::Atom(mut atom) => {
                let abs = origin.add(atom.coords);
                if inside_circle(abs, point, consts.circ_r) {
                    changed = true;
                    // Children become top-level items at unchanged
                    // absolute positions.
                    for bond in atom.bonds {
                        let mut child = bond.atom;
                        child.coords = atom.coords.add(child.coords);
                        new_items.push(StructureItem::Atom(child));
                    }
                } else {
                    changed |= delete_in_atom(&mut atom, abs, point, consts);
                    new_items.push(StructureItem::Atom(atom));
                }
            }
            StructureItem::Selection(selection) => {
                new_items.push(StructureItem::Selection(selection));
            }
        }
    }
    structure.items = new_items;
    changed
}

/// Deletes matching descendants of `atom`, reparenting grandchildren
/// onto `atom` itself.
fn delete_in_atom(atom: &mut Atom, atom_abs: Vector, point: Vector, consts: &GeomConsts) -> bool {
    let mut changed = false;
    let mut new_bonds = Vec::with_capacity(atom.bonds.len());
    for mut bond in atom.bonds.drain(..) {
        let child_abs = atom_abs.add(bond.atom.coords);
        if inside_circle(child_abs, point, consts.circ_r) {
            changed = true;
            for grandchild in bond.atom.bonds {
                let mut adopted = grandchild;
                adopted.atom.coords = bond.atom.coords.add(adopted.atom.coords);
                new_bonds.push(adopted);
            }
        } else {
            changed |= delete_in_atom(&mut bond.atom, child_abs, point, consts);
            new_bonds.push(bond);
        }
    }
    atom.bonds = new_bonds;
    changed
}

/// Replaces the label of the atom under `point`.
///
/// When the atom was already labelled, the new label's orientation is
/// flipped relative to the old one, so repeated clicks toggle which
/// side the text extends towards.
///
/// # Returns
///
/// `true` if an atom was found under `point`.
pub fn modify_label(
    structure: &mut Structure,
    point: Vector,
    label: Label,
    consts: &GeomConsts,
) -> bool {
    fn apply(atom: &mut Atom, abs: Vector, point: Vector, label: &mut Option<Label>, consts: &GeomConsts) -> bool {
        if inside_circle(abs, point, consts.circ_r) {
            if let Some(mut new_label) = label.take() {
                if let Some(previous) = atom.label.take() {
                    let effective = previous.mode.unwrap_or_else(|| atom.guess_label_mode());
                    new_label.mode = Some(effective.toggled());
                }
                atom.label = Some(new_label);
            }
            return true;
        }
        for bond in &mut atom.bonds {
            let child_abs = abs.add(bond.atom.coords);
            if apply(&mut bond.atom, child_abs, point, label, consts) {
                return true;
            }
        }
        false
    }

    let origin = structure.origin;
    let mut label = Some(label);
    for item in &mut structure.items {
        if let StructureItem::Atom(atom) = item {
            let abs = origin.add(atom.coords);
            if apply(atom, abs, point, &mut label, consts) {
                return true;
            }
        }
    }
    false
}
