//! Template clusters: the pre-generated shapes behind the toolbar.
//!
//! Every bond, ring and arrow button owns a *cluster* of 24 ready-made
//! definitions, one per compass direction. When the user drags on the
//! canvas, the drag vector is snapped to the closest direction and the
//! matching definition is stamped into the drawing. Clicking without a
//! drag uses the cluster's default definition instead.

use crate::constants::{Direction, GeomConsts, BOND_ANGLE_DEG, VECTOR_PRECISION};
use crate::types::{Arrow, ArrowKind, Atom, Bond, BondKind, Label, Structure, StructureItem};
use crate::vector::{compare_floats, Vector};

/// Snaps a drag gesture to the candidate vector with the smallest
/// angular distance. Returns `None` for a zero-length drag, whose
/// direction is undefined. Angles within the vector comparison
/// precision count as equal, and ties go to the earlier candidate.
pub fn closest_vector(down: Vector, up: Vector, candidates: &[Vector]) -> Option<Vector> {
    let drag = up.subtract(down).norm()?;
    let mut best: Option<(f64, Vector)> = None;
    for candidate in candidates {
        let unit = match candidate.norm() {
            Some(unit) => unit,
            None => continue,
        };
        let angle = drag.dot(unit).clamp(-1.0, 1.0).acos().abs();
        let better = match best {
            Some((best_angle, _)) => {
                angle < best_angle && !compare_floats(angle, best_angle, VECTOR_PRECISION)
            }
            None => true,
        };
        if better {
            best = Some((angle, *candidate));
        }
    }
    best.map(|(_, v)| v)
}

/// Generates the 24 vectors obtained by rotating `start` clockwise in
/// `freq_deg` steps. The last entry is `start` rotated a full turn.
pub fn possible_vectors(start: Vector, freq_deg: f64) -> Vec<Vector> {
    let mut result = Vec::with_capacity(24);
    let mut vector = start;
    let steps = (360.0 / freq_deg) as usize;
    for _ in 0..steps {
        vector = vector.rotate_cw(freq_deg);
        result.push(vector);
    }
    result
}

/// A ring shape available from the toolbar.
#[derive(Debug, Clone, Copy)]
pub struct RingTemplate {
    pub name: &'static str,
    /// Number of distinct ring vertices.
    pub size: usize,
    /// Interior angle of the regular polygon, in degrees.
    pub angle_deg: f64,
    pub aromatic: bool,
}

/// The built-in ring templates, from cyclopropane up to cyclononane,
/// plus benzene.
pub const RING_TEMPLATES: [RingTemplate; 8] = [
    RingTemplate { name: "cyclopropane", size: 3, angle_deg: 60.0, aromatic: false },
    RingTemplate { name: "cyclobutane", size: 4, angle_deg: 90.0, aromatic: false },
    RingTemplate { name: "cyclopentane", size: 5, angle_deg: 108.0, aromatic: false },
    RingTemplate { name: "cyclohexane", size: 6, angle_deg: 120.0, aromatic: false },
    RingTemplate { name: "benzene", size: 6, angle_deg: 120.0, aromatic: true },
    RingTemplate { name: "cycloheptane", size: 7, angle_deg: 128.57, aromatic: false },
    RingTemplate { name: "cyclooctane", size: 8, angle_deg: 135.0, aromatic: false },
    RingTemplate { name: "cyclononane", size: 9, angle_deg: 140.0, aromatic: false },
];

/// A cluster of 24 pre-generated structure definitions, one per compass
/// direction.
#[derive(Debug, Clone)]
pub struct StructureCluster {
    pub name: String,
    /// One definition per direction; each is named after the direction
    /// its shape extends towards.
    pub defs: Vec<Structure>,
    /// Number of ring vertices, or 0 for a plain bond.
    pub ring_size: usize,
    /// Interior ring angle in degrees, or the default bond angle for
    /// plain bonds.
    pub angle_deg: f64,
    pub aromatic: bool,
    /// Kind of bond this cluster stamps when it is a plain bond.
    pub bond_kind: BondKind,
}

impl StructureCluster {
    /// The definition used for a click without a drag.
    pub fn default_def(&self) -> &Structure {
        &self.defs[0]
    }

    /// Resolves a drag gesture to the definition extending in the
    /// closest compass direction. Falls back to the default for a
    /// zero-length drag.
    pub fn def_for_drag(&self, down: Vector, up: Vector, consts: &GeomConsts) -> &Structure {
        let closest = match closest_vector(down, up, consts.bond_vectors()) {
            Some(v) => v,
            None => return self.default_def(),
        };
        self.defs
            .iter()
            .find(|def| {
                Direction::from_name(&def.name)
                    .map(|dir| consts.bond_vector(dir).compare(closest, VECTOR_PRECISION))
                    .unwrap_or(false)
            })
            .unwrap_or_else(|| self.default_def())
    }
}

/// A cluster of 24 pre-generated arrows, one per compass direction.
#[derive(Debug, Clone)]
pub struct ArrowCluster {
    pub name: String,
    pub kind: ArrowKind,
    pub defs: Vec<Arrow>,
}

impl ArrowCluster {
    /// Builds the cluster for one arrow kind.
    pub fn new(name: impl Into<String>, kind: ArrowKind, consts: &GeomConsts) -> Self {
        let defs = consts
            .bond_vectors()
            .iter()
            .map(|v| Arrow::new(kind, *v))
            .collect();
        Self {
            name: name.into(),
            kind,
            defs,
        }
    }

    /// The arrow used for a click without a drag: the one pointing East.
    pub fn default_arrow(&self, consts: &GeomConsts) -> Arrow {
        let east = consts.bond_vector(Direction::E);
        self.defs
            .iter()
            .find(|arrow| arrow.relative_end.compare(east, VECTOR_PRECISION))
            .cloned()
            .unwrap_or_else(|| Arrow::new(self.kind, east))
    }

    /// Resolves a drag gesture to the arrow pointing in the closest
    /// compass direction.
    pub fn arrow_for_drag(&self, down: Vector, up: Vector, consts: &GeomConsts) -> Arrow {
        let candidates: Vec<Vector> = self.defs.iter().map(|a| a.relative_end).collect();
        match closest_vector(down, up, &candidates) {
            Some(closest) => self
                .defs
                .iter()
                .find(|arrow| arrow.relative_end.compare(closest, VECTOR_PRECISION))
                .cloned()
                .unwrap_or_else(|| Arrow::new(self.kind, closest)),
            None => self.default_arrow(consts),
        }
    }
}

/// Builds a child atom reached by `vector`, bonded with the given kind.
pub fn generate_bond(vector: Vector, kind: BondKind) -> Bond {
    let mut atom = Atom::new(vector);
    atom.attach_incoming(vector, kind.multiplicity());
    Bond::new(kind, atom)
}

/// Builds the chain of ring atoms that follows `first_edge` around the
/// polygon.
///
/// The chain holds `size` atoms; the last one coincides with the atom
/// the ring is attached to, closing the polygon visually.
///
/// # Returns
///
/// The root of the chain and the closing edge vector to record as an
/// incoming slot on the host atom.
pub fn build_ring_chain(first_edge: Vector, size: usize, angle_deg: f64) -> (Atom, Vector) {
    let turn = 180.0 - angle_deg;
    let mut edges = Vec::with_capacity(size + 1);
    edges.push(first_edge);
    for k in 1..=size {
        edges.push(edges[k - 1].rotate_cw(turn));
    }
    let ring_atom = |k: usize| {
        let mut atom = Atom::new(edges[k - 1]);
        atom.attach_incoming(edges[k - 1], 1);
        atom.attach_outgoing(edges[k], 1);
        atom
    };
    let mut atom = ring_atom(size);
    for k in (1..size).rev() {
        let mut parent = ring_atom(k);
        parent.bonds.push(Bond::new(BondKind::Single, atom));
        atom = parent;
    }
    (atom, edges[size - 1])
}

/// Builds the 24-definition cluster for a plain bond of the given kind.
pub fn bond_cluster(name: impl Into<String>, kind: BondKind, consts: &GeomConsts) -> StructureCluster {
    let defs = Direction::ALL
        .iter()
        .map(|dir| {
            let vector = consts.bond_vector(*dir);
            let mut root = Atom::new(Vector::ZERO);
            root.attach_outgoing(vector, kind.multiplicity());
            root.bonds.push(generate_bond(vector, kind));
            let mut def = Structure::new(dir.name());
            def.items.push(StructureItem::Atom(root));
            def
        })
        .collect();
    StructureCluster {
        name: name.into(),
        defs,
        ring_size: 0,
        angle_deg: BOND_ANGLE_DEG,
        aromatic: false,
        bond_kind: kind,
    }
}

/// Builds the 24-definition cluster for a ring template.
pub fn ring_cluster(template: &RingTemplate, consts: &GeomConsts) -> StructureCluster {
    let defs = Direction::ALL
        .iter()
        .map(|dir| {
            // The definition is named after the direction the ring body
            // extends towards, which is opposite to the generating one.
            let towards = dir.opposite();
            let bond = consts.bond_vector(towards);
            let first_edge = bond.rotate_ccw(template.angle_deg / 2.0);
            let (chain, closing) = build_ring_chain(first_edge, template.size, template.angle_deg);
            let mut root = Atom::new(Vector::ZERO);
            root.attach_outgoing(first_edge, 1);
            root.attach_incoming(closing, 1);
            root.bonds.push(Bond::new(BondKind::Single, chain));
            let mut def = Structure::new(towards.name());
            def.aromatic = template.aromatic;
            def.items.push(StructureItem::Atom(root));
            def
        })
        .collect();
    StructureCluster {
        name: template.name.to_string(),
        defs,
        ring_size: template.size,
        angle_deg: template.angle_deg,
        aromatic: template.aromatic,
        bond_kind: BondKind::Single,
    }
}

/// The built-in element labels with their standard valences.
pub fn standard_labels() -> Vec<Label> {
    vec![
        Label::new("O", 2),
        Label::new("S", 2),
        Label::new("P", 3),
        Label::new("N", 3),
        Label::new("C", 4),
        Label::new("F", 1),
        Label::new("Cl", 1),
        Label::new("Br", 1),
        Label::new("I", 1),
        Label::new("H", 1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::vec2;

    fn consts() -> GeomConsts {
        GeomConsts::default()
    }

    #[test]
    fn test_closest_vector_snaps_to_nearest_direction() {
        let consts = consts();
        // A drag 5° off East must snap to East.
        let up = vec2(20.0, 0.0).rotate_cw(5.0);
        let closest = closest_vector(Vector::ZERO, up, consts.bond_vectors()).unwrap();
        assert!(closest.compare(consts.bond_vector(Direction::E), 5));
    }

    #[test]
    fn test_closest_vector_tie_prefers_first_candidate() {
        let consts = consts();
        // Exactly between N and NE1: 7.5° off both.
        let up = vec2(0.0, -20.0).rotate_cw(7.5);
        let closest = closest_vector(Vector::ZERO, up, consts.bond_vectors()).unwrap();
        assert!(closest.compare(consts.bond_vector(Direction::N), 5));
    }

    #[test]
    fn test_closest_vector_zero_drag_is_none() {
        let consts = consts();
        let p = vec2(3.0, 4.0);
        assert!(closest_vector(p, p, consts.bond_vectors()).is_none());
    }

    #[test]
    fn test_possible_vectors_closes_the_circle() {
        let start = vec2(0.0, -20.0);
        let vectors = possible_vectors(start, 15.0);
        assert_eq!(vectors.len(), 24);
        assert!(vectors[23].compare(start, 5));
    }

    #[test]
    fn test_bond_cluster_has_24_directed_defs() {
        let consts = consts();
        let cluster = bond_cluster("single", BondKind::Single, &consts);
        assert_eq!(cluster.defs.len(), 24);
        assert_eq!(cluster.default_def().name, "N");
        let def = cluster.def_for_drag(vec2(100.0, 100.0), vec2(130.0, 101.0), &consts);
        assert_eq!(def.name, "E");
        match &def.items[0] {
            StructureItem::Atom(root) => {
                assert_eq!(root.coords, Vector::ZERO);
                assert_eq!(root.bonds.len(), 1);
                assert!(root.bonds[0]
                    .atom
                    .coords
                    .compare(consts.bond_vector(Direction::E), 5));
            }
            _ => panic!("expected an atom"),
        }
    }

    #[test]
    fn test_double_bond_cluster_records_multiplicity() {
        let consts = consts();
        let cluster = bond_cluster("double", BondKind::Double, &consts);
        match &cluster.default_def().items[0] {
            StructureItem::Atom(root) => {
                assert_eq!(root.attached.outgoing[0].multiplicity, 2);
                assert_eq!(root.bonds[0].kind, BondKind::Double);
            }
            _ => panic!("expected an atom"),
        }
    }

    #[test]
    fn test_ring_cluster_default_is_named_south() {
        let consts = consts();
        let benzene = &RING_TEMPLATES[4];
        assert_eq!(benzene.name, "benzene");
        let cluster = ring_cluster(benzene, &consts);
        assert_eq!(cluster.defs.len(), 24);
        assert!(cluster.aromatic);
        // The first definition is generated from North, so its body
        // extends South.
        assert_eq!(cluster.default_def().name, "S");
    }

    #[test]
    fn test_hexagon_chain_closes_on_first_atom() {
        let consts = consts();
        let first_edge = consts.bond_vector(Direction::S).rotate_ccw(60.0);
        let (chain, closing) = build_ring_chain(first_edge, 6, 120.0);
        // Walk the chain summing relative coordinates.
        let mut count = 1;
        let mut abs = chain.coords;
        let mut atom = &chain;
        while let Some(bond) = atom.bonds.first() {
            atom = &bond.atom;
            abs = abs.add(atom.coords);
            count += 1;
        }
        assert_eq!(count, 6);
        assert!(abs.compare(Vector::ZERO, 5), "ring must close on its first atom");
        assert!(closing.compare(atom.coords, 5));
    }

    #[test]
    fn test_benzene_first_vertex_position() {
        let consts = consts();
        let cluster = ring_cluster(&RING_TEMPLATES[4], &consts);
        match &cluster.default_def().items[0] {
            StructureItem::Atom(root) => {
                let first = &root.bonds[0].atom;
                assert!(first.coords.compare(vec2(17.32051, 10.0), 5));
            }
            _ => panic!("expected an atom"),
        }
    }

    #[test]
    fn test_arrow_cluster_default_points_east() {
        let consts = consts();
        let cluster = ArrowCluster::new("one-way-arrow", ArrowKind::OneWay, &consts);
        let default = cluster.default_arrow(&consts);
        assert!(default.relative_end.compare(vec2(20.0, 0.0), 5));
        let snapped = cluster.arrow_for_drag(vec2(0.0, 0.0), vec2(-1.0, -30.0), &consts);
        assert!(snapped.relative_end.compare(consts.bond_vector(Direction::N), 4));
    }

    #[test]
    fn test_standard_labels_valences() {
        let labels = standard_labels();
        let carbon = labels.iter().find(|l| l.text == "C").unwrap();
        assert_eq!(carbon.max_bonds, 4);
        let chlorine = labels.iter().find(|l| l.text == "Cl").unwrap();
        assert_eq!(chlorine.max_bonds, 1);
    }
}
