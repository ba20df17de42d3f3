//! Core data types for the chemical structure editor.
//!
//! A drawing is a [`Structure`]: a flat list of top-level items, each of
//! which is an atom tree, an arrow or a transient selection box. Atom
//! positions are stored *relative* to their parent (or to the structure
//! origin for top-level atoms), so moving a parent moves its whole
//! subtree for free. Arrows are the exception and carry absolute
//! coordinates, since they never nest.

use serde::{Deserialize, Serialize};

use crate::constants::MOVE_STEP;
use crate::vector::{compare_floats, vec2, Vector};

/// Decimal precision used when matching decorations to their anchor atom.
const AROM_PRECISION: i32 = 3;

/// The visual kind of a bond between two atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondKind {
    Single,
    Double,
    Triple,
    /// Stereochemical bond pointing out of the drawing plane.
    Wedge,
    /// Stereochemical bond pointing behind the drawing plane.
    Dash,
}

impl BondKind {
    /// How many bonding electrons pairs this bond consumes when counting
    /// implicit hydrogens. Stereo bonds count as single bonds.
    pub fn multiplicity(self) -> u32 {
        match self {
            BondKind::Single | BondKind::Wedge | BondKind::Dash => 1,
            BondKind::Double => 2,
            BondKind::Triple => 3,
        }
    }
}

/// Direction slot occupied on an atom, recorded so that later placements
/// can avoid overlapping an existing bond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttachedBond {
    /// Bond vector in the atom's local frame.
    pub vector: Vector,
    /// Bond multiplicity occupying the slot.
    pub multiplicity: u32,
}

/// The incoming and outgoing direction slots of an atom.
///
/// "Incoming" vectors point from the parent towards this atom,
/// "outgoing" vectors point from this atom towards a child.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachedBonds {
    pub incoming: Vec<AttachedBond>,
    pub outgoing: Vec<AttachedBond>,
}

impl AttachedBonds {
    /// Total number of occupied direction slots.
    pub fn count(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }
}

/// Which side of the atom anchor a label's text extends towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelMode {
    /// Text reads left to right away from the anchor.
    Lr,
    /// Text is right-aligned against the anchor.
    Rl,
}

impl LabelMode {
    /// The opposite orientation.
    pub fn toggled(self) -> LabelMode {
        match self {
            LabelMode::Lr => LabelMode::Rl,
            LabelMode::Rl => LabelMode::Lr,
        }
    }
}

/// A text label attached to an atom, e.g. `O` or `NH2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Element symbol or free text.
    pub text: String,
    /// Standard valence of the labelled atom, used to derive the number
    /// of implicit hydrogens. Zero disables hydrogen counting.
    pub max_bonds: u32,
    /// Orientation, or `None` if it should be guessed from the attached
    /// bonds at render time.
    pub mode: Option<LabelMode>,
}

impl Label {
    /// Creates an element label with the given valence.
    pub fn new(text: impl Into<String>, max_bonds: u32) -> Self {
        Self {
            text: text.into(),
            max_bonds,
            mode: None,
        }
    }

    /// Creates a free-text label that does not count hydrogens.
    pub fn custom(text: impl Into<String>) -> Self {
        Label::new(text, 0)
    }
}

/// An atom node together with the bonds leading to its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Position relative to the parent atom, or to the structure origin
    /// for top-level atoms.
    pub coords: Vector,
    /// Bonds to child atoms.
    pub bonds: Vec<Bond>,
    /// Occupied direction slots.
    pub attached: AttachedBonds,
    /// Optional text label.
    pub label: Option<Label>,
    /// Whether this atom is part of the current selection.
    pub selected: bool,
}

impl Atom {
    /// Creates an unlabelled atom at the given relative position.
    pub fn new(coords: Vector) -> Self {
        Self {
            coords,
            bonds: Vec::new(),
            attached: AttachedBonds::default(),
            label: None,
            selected: false,
        }
    }

    /// Records an incoming bond slot.
    pub fn attach_incoming(&mut self, vector: Vector, multiplicity: u32) {
        self.attached.incoming.push(AttachedBond {
            vector,
            multiplicity,
        });
    }

    /// Records an outgoing bond slot.
    pub fn attach_outgoing(&mut self, vector: Vector, multiplicity: u32) {
        self.attached.outgoing.push(AttachedBond {
            vector,
            multiplicity,
        });
    }

    /// Marks this atom and every descendant as selected or not.
    pub fn set_selected_deep(&mut self, selected: bool) {
        self.selected = selected;
        for bond in &mut self.bonds {
            bond.atom.set_selected_deep(selected);
        }
    }

    /// Expands `min_max` to cover every atom in this subtree.
    ///
    /// # Arguments
    ///
    /// * `abs` - absolute position of this atom.
    /// * `min_max` - accumulator to update in place.
    pub fn min_max_into(&self, abs: Vector, min_max: &mut MinMax) {
        min_max.update(abs);
        for bond in &self.bonds {
            bond.atom.min_max_into(abs.add(bond.atom.coords), min_max);
        }
    }

    /// Guesses which way a label should extend when no orientation was
    /// ever recorded. A bond pointing to the right means the neighbour
    /// sits there, so the text has to grow leftwards.
    pub fn guess_label_mode(&self) -> LabelMode {
        let rightward = self
            .attached
            .incoming
            .iter()
            .chain(self.attached.outgoing.iter())
            .any(|b| b.vector.x > 0.0);
        if rightward {
            LabelMode::Rl
        } else {
            LabelMode::Lr
        }
    }
}

/// A bond from a parent atom to one child atom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub kind: BondKind,
    /// The child atom, positioned relative to the parent.
    pub atom: Atom,
}

impl Bond {
    pub fn new(kind: BondKind, atom: Atom) -> Self {
        Self { kind, atom }
    }
}

/// The visual kind of a reaction arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrowKind {
    OneWay,
    TwoWay,
    Equilibrium,
}

/// A reaction arrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub kind: ArrowKind,
    /// Position of the arrow tail, relative to the structure origin.
    pub origin: Vector,
    /// Head position relative to the tail.
    pub relative_end: Vector,
    pub selected: bool,
}

impl Arrow {
    /// Creates an arrow with its tail at the structure origin.
    pub fn new(kind: ArrowKind, relative_end: Vector) -> Self {
        Self {
            kind,
            origin: Vector::ZERO,
            relative_end,
            selected: false,
        }
    }

    /// Position of the arrow head, relative to the structure origin.
    pub fn end(&self) -> Vector {
        self.origin.add(self.relative_end)
    }
}

/// An axis-aligned rectangle, as used for selection boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Whether a point lies inside this rectangle (inclusive).
    pub fn contains(&self, point: Vector) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// A rubber-band selection box dragged by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Drag start, relative to the structure origin.
    pub origin: Vector,
    /// Current drag position, absolute.
    pub current: Vector,
}

impl Selection {
    pub fn new(origin: Vector, current: Vector) -> Self {
        Self { origin, current }
    }

    /// Resolves the box into an absolute rectangle, given the owning
    /// structure's origin. Degenerate drags yield zero-sized rects.
    pub fn rect(&self, structure_origin: Vector) -> Rect {
        let start = structure_origin.add(self.origin);
        let end = self.current;
        Rect {
            x: start.x.min(end.x),
            y: start.y.min(end.y),
            width: (end.x - start.x).abs(),
            height: (end.y - start.y).abs(),
        }
    }
}

/// A top-level item of a [`Structure`].
///
/// This is a closed set: every consumer pattern-matches on it, so adding
/// a new item kind is a compile-checked change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StructureItem {
    Atom(Atom),
    Arrow(Arrow),
    Selection(Selection),
}

/// An aromatic ring decoration: a circle drawn inside a benzene ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AromaticRing {
    /// Relative coordinates of the top-level atom this ring belongs to.
    /// Used to keep the circle following that atom when it moves.
    pub from_which: Vector,
    /// Absolute center of the circle.
    pub coords: Vector,
}

/// Non-bond visuals associated with a structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decorations {
    pub aromatic: Vec<AromaticRing>,
}

/// Running min/max accumulator over absolute positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl MinMax {
    /// An empty accumulator that any real point will override.
    pub const EMPTY: MinMax = MinMax {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Expands the bounds to include `pos`.
    pub fn update(&mut self, pos: Vector) {
        self.min_x = self.min_x.min(pos.x);
        self.min_y = self.min_y.min(pos.y);
        self.max_x = self.max_x.max(pos.x);
        self.max_y = self.max_y.max(pos.y);
    }

    /// True if no point was ever recorded.
    pub fn is_empty(&self) -> bool {
        !self.min_x.is_finite()
    }
}

impl Default for MinMax {
    fn default() -> Self {
        MinMax::EMPTY
    }
}

/// Direction of a keyboard or pointer move of the selected items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveDirection {
    Left,
    Up,
    Right,
    Down,
    /// Free move by the drag delta of a pointer gesture.
    Pointer(Vector),
}

impl MoveDirection {
    /// Translation performed by this move.
    pub fn delta(self) -> Vector {
        match self {
            MoveDirection::Left => vec2(-MOVE_STEP, 0.0),
            MoveDirection::Up => vec2(0.0, -MOVE_STEP),
            MoveDirection::Right => vec2(MOVE_STEP, 0.0),
            MoveDirection::Down => vec2(0.0, MOVE_STEP),
            MoveDirection::Pointer(delta) => delta,
        }
    }
}

/// Edge of the drawing that selected items are aligned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Up,
    Down,
    Left,
    Right,
}

/// A complete drawing: top-level items plus decorations, anchored at an
/// absolute origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Name of the template cluster this drawing started from.
    pub name: String,
    /// Absolute position that all relative coordinates resolve against.
    pub origin: Vector,
    pub items: Vec<StructureItem>,
    pub decorations: Decorations,
    /// Whether the originating template was aromatic.
    pub aromatic: bool,
    /// Set while every item is selected.
    pub selected_all: bool,
}

impl Structure {
    /// Creates an empty structure with the given template name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the absolute origin that all relative coordinates resolve
    /// against. Called once when the structure is first placed.
    pub fn set_origin(&mut self, origin: Vector) {
        self.origin = origin;
    }

    /// Marks every item as selected.
    pub fn select_all(&mut self) {
        self.selected_all = true;
        for item in &mut self.items {
            match item {
                StructureItem::Atom(atom) => atom.set_selected_deep(true),
                StructureItem::Arrow(arrow) => arrow.selected = true,
                StructureItem::Selection(_) => {}
            }
        }
    }

    /// Clears the selection on every item.
    pub fn deselect_all(&mut self) {
        self.selected_all = false;
        for item in &mut self.items {
            match item {
                StructureItem::Atom(atom) => atom.set_selected_deep(false),
                StructureItem::Arrow(arrow) => arrow.selected = false,
                StructureItem::Selection(_) => {}
            }
        }
    }

    /// Selects the items covered by a rubber-band box. An atom tree is
    /// selected when its whole bond tree lies inside the box, an arrow
    /// when both of its endpoints do.
    pub fn select(&mut self, selection: &Selection) {
        let rect = selection.rect(self.origin);
        let origin = self.origin;
        for item in &mut self.items {
            match item {
                StructureItem::Atom(atom) => {
                    let mut bounds = MinMax::EMPTY;
                    atom.min_max_into(origin.add(atom.coords), &mut bounds);
                    if rect.contains(vec2(bounds.min_x, bounds.min_y))
                        && rect.contains(vec2(bounds.max_x, bounds.max_y))
                    {
                        atom.set_selected_deep(true);
                    }
                }
                StructureItem::Arrow(arrow) => {
                    if rect.contains(origin.add(arrow.origin)) && rect.contains(origin.add(arrow.end()))
                    {
                        arrow.selected = true;
                    }
                }
                StructureItem::Selection(_) => {}
            }
        }
    }

    /// Removes every selected item, together with aromatic decorations
    /// anchored on a removed atom.
    pub fn delete_selected(&mut self) {
        let mut removed_anchors = Vec::new();
        self.items.retain(|item| match item {
            StructureItem::Atom(atom) => {
                if atom.selected {
                    removed_anchors.push(atom.coords);
                    false
                } else {
                    true
                }
            }
            StructureItem::Arrow(arrow) => !arrow.selected,
            StructureItem::Selection(_) => true,
        });
        self.decorations.aromatic.retain(|arom| {
            !removed_anchors
                .iter()
                .any(|anchor| arom.from_which.compare(*anchor, AROM_PRECISION))
        });
        self.selected_all = false;
    }

    /// Translates every selected item by the move's delta. Aromatic
    /// decorations follow the atom they are anchored on.
    pub fn move_selected(&mut self, direction: MoveDirection) {
        let delta = direction.delta();
        for item in &mut self.items {
            match item {
                StructureItem::Atom(atom) => {
                    if atom.selected {
                        update_arom(&mut self.decorations, atom.coords, delta);
                        atom.coords = atom.coords.add(delta);
                    }
                }
                StructureItem::Arrow(arrow) => {
                    if arrow.selected {
                        arrow.origin = arrow.origin.add(delta);
                    }
                }
                StructureItem::Selection(_) => {}
            }
        }
    }

    /// Computes the absolute bounds of the selected items.
    pub fn find_min_max(&self) -> MinMax {
        let mut min_max = MinMax::EMPTY;
        for item in &self.items {
            match item {
                StructureItem::Atom(atom) if atom.selected => {
                    atom.min_max_into(self.origin.add(atom.coords), &mut min_max);
                }
                StructureItem::Arrow(arrow) if arrow.selected => {
                    min_max.update(self.origin.add(arrow.origin));
                    min_max.update(self.origin.add(arrow.end()));
                }
                _ => {}
            }
        }
        min_max
    }

    /// Aligns every selected item flush against the given edge
    /// coordinate.
    ///
    /// # Returns
    ///
    /// `true` if any item actually moved.
    pub fn align(&mut self, edge: Edge, coord: f64) -> bool {
        let origin = self.origin;
        let mut changed = false;
        let mut moves: Vec<(usize, Vector, Vector)> = Vec::new();
        for (i, item) in self.items.iter().enumerate() {
            match item {
                StructureItem::Atom(atom) if atom.selected => {
                    let mut min_max = MinMax::EMPTY;
                    atom.min_max_into(origin.add(atom.coords), &mut min_max);
                    let d = edge_distance(edge, coord, &min_max);
                    if !compare_floats(d, 0.0, 5) {
                        moves.push((i, atom.coords, edge_delta(edge, d)));
                    }
                }
                StructureItem::Arrow(arrow) if arrow.selected => {
                    let mut min_max = MinMax::EMPTY;
                    min_max.update(origin.add(arrow.origin));
                    min_max.update(origin.add(arrow.end()));
                    let d = edge_distance(edge, coord, &min_max);
                    if !compare_floats(d, 0.0, 5) {
                        moves.push((i, arrow.origin, edge_delta(edge, d)));
                    }
                }
                _ => {}
            }
        }
        for (i, old_coords, delta) in moves {
            changed = true;
            match &mut self.items[i] {
                StructureItem::Atom(atom) => {
                    update_arom(&mut self.decorations, old_coords, delta);
                    atom.coords = atom.coords.add(delta);
                }
                StructureItem::Arrow(arrow) => {
                    arrow.origin = arrow.origin.add(delta);
                }
                StructureItem::Selection(_) => {}
            }
        }
        changed
    }

    /// Adds an aromatic ring decoration.
    pub fn add_aromatic(&mut self, ring: AromaticRing) {
        self.decorations.aromatic.push(ring);
    }

    /// True when the structure holds nothing visible.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serializes the structure to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restores a structure from its JSON serialization.
    pub fn from_json(json: &str) -> Result<Structure, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Shifts aromatic decorations anchored at `anchor` (the atom's relative
/// coordinates before the move) by `delta`.
fn update_arom(decorations: &mut Decorations, anchor: Vector, delta: Vector) {
    for arom in &mut decorations.aromatic {
        if arom.from_which.compare(anchor, AROM_PRECISION) {
            arom.from_which = arom.from_which.add(delta);
            arom.coords = arom.coords.add(delta);
        }
    }
}

/// Signed distance from the relevant extreme of `min_max` to the target
/// edge coordinate.
fn edge_distance(edge: Edge, coord: f64, min_max: &MinMax) -> f64 {
    match edge {
        Edge::Up => coord - min_max.min_y,
        Edge::Down => coord - min_max.max_y,
        Edge::Left => coord - min_max.min_x,
        Edge::Right => coord - min_max.max_x,
    }
}

/// Translation vector realizing an alignment move of distance `d`.
fn edge_delta(edge: Edge, d: f64) -> Vector {
    match edge {
        Edge::Up | Edge::Down => vec2(0.0, d),
        Edge::Left | Edge::Right => vec2(d, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(coords: &[Vector]) -> Atom {
        // Nested single-bond chain with the given relative coordinates.
        let mut atom = Atom::new(coords[coords.len() - 1]);
        for c in coords.iter().rev().skip(1) {
            let mut parent = Atom::new(*c);
            parent.bonds.push(Bond::new(BondKind::Single, atom));
            atom = parent;
        }
        atom
    }

    #[test]
    fn test_bond_multiplicity() {
        assert_eq!(BondKind::Single.multiplicity(), 1);
        assert_eq!(BondKind::Wedge.multiplicity(), 1);
        assert_eq!(BondKind::Double.multiplicity(), 2);
        assert_eq!(BondKind::Triple.multiplicity(), 3);
    }

    #[test]
    fn test_selection_rect_normalizes_any_drag_quadrant() {
        // Dragging up-left must give the same rect as down-right.
        let a = Selection::new(vec2(0.0, 0.0), vec2(-10.0, -20.0)).rect(Vector::ZERO);
        let b = Selection::new(vec2(-10.0, -20.0), vec2(0.0, 0.0)).rect(Vector::ZERO);
        assert_eq!(a, b);
        assert_eq!(a.x, -10.0);
        assert_eq!(a.y, -20.0);
        assert_eq!(a.width, 10.0);
        assert_eq!(a.height, 20.0);
    }

    #[test]
    fn test_select_atom_tree_fully_inside_the_box() {
        let mut structure = Structure::new("test");
        structure.origin = vec2(100.0, 100.0);
        structure
            .items
            .push(StructureItem::Atom(chain(&[vec2(0.0, 0.0), vec2(0.0, -20.0)])));
        let selection = Selection::new(vec2(-5.0, -25.0), vec2(110.0, 110.0));
        structure.select(&selection);
        match &structure.items[0] {
            StructureItem::Atom(atom) => {
                assert!(atom.selected);
                assert!(atom.bonds[0].atom.selected, "selection must cover the subtree");
            }
            _ => panic!("expected an atom"),
        }
    }

    #[test]
    fn test_select_skips_tree_with_a_branch_outside_the_box() {
        let mut structure = Structure::new("test");
        structure.origin = vec2(100.0, 100.0);
        // Root at (100, 100), child sticking out at (100, 80).
        structure
            .items
            .push(StructureItem::Atom(chain(&[vec2(0.0, 0.0), vec2(0.0, -20.0)])));
        // Box covers the root but cuts the child off.
        structure.select(&Selection::new(vec2(-10.0, -10.0), vec2(110.0, 110.0)));
        match &structure.items[0] {
            StructureItem::Atom(atom) => {
                assert!(!atom.selected);
                assert!(!atom.bonds[0].atom.selected);
            }
            _ => panic!("expected an atom"),
        }
    }

    #[test]
    fn test_arrow_selected_only_when_both_ends_inside() {
        let mut structure = Structure::new("test");
        let mut arrow = Arrow::new(ArrowKind::OneWay, vec2(20.0, 0.0));
        arrow.origin = vec2(5.0, 5.0);
        structure.items.push(StructureItem::Arrow(arrow));
        // Box covers the tail but not the head.
        structure.select(&Selection::new(vec2(0.0, 0.0), vec2(10.0, 10.0)));
        match &structure.items[0] {
            StructureItem::Arrow(arrow) => assert!(!arrow.selected),
            _ => panic!("expected an arrow"),
        }
        structure.select(&Selection::new(vec2(0.0, 0.0), vec2(30.0, 10.0)));
        match &structure.items[0] {
            StructureItem::Arrow(arrow) => assert!(arrow.selected),
            _ => panic!("expected an arrow"),
        }
    }

    #[test]
    fn test_delete_selected_drops_matching_decorations() {
        let mut structure = Structure::new("benzene");
        let mut atom = Atom::new(vec2(0.0, 0.0));
        atom.set_selected_deep(true);
        structure.items.push(StructureItem::Atom(atom));
        structure.items.push(StructureItem::Atom(Atom::new(vec2(50.0, 0.0))));
        structure.add_aromatic(AromaticRing {
            from_which: vec2(0.0, 0.0),
            coords: vec2(100.0, 120.0),
        });
        structure.delete_selected();
        assert_eq!(structure.items.len(), 1);
        assert!(structure.decorations.aromatic.is_empty());
    }

    #[test]
    fn test_move_selected_carries_decorations() {
        let mut structure = Structure::new("benzene");
        structure.origin = vec2(100.0, 100.0);
        let mut atom = Atom::new(vec2(0.0, 0.0));
        atom.selected = true;
        structure.items.push(StructureItem::Atom(atom));
        structure.add_aromatic(AromaticRing {
            from_which: vec2(0.0, 0.0),
            coords: vec2(100.0, 120.0),
        });
        structure.move_selected(MoveDirection::Pointer(vec2(7.0, -3.0)));
        match &structure.items[0] {
            StructureItem::Atom(atom) => assert_eq!(atom.coords, vec2(7.0, -3.0)),
            _ => panic!("expected an atom"),
        }
        assert_eq!(structure.decorations.aromatic[0].coords, vec2(107.0, 117.0));
        assert_eq!(structure.decorations.aromatic[0].from_which, vec2(7.0, -3.0));
    }

    #[test]
    fn test_keyboard_move_uses_fixed_step() {
        assert_eq!(MoveDirection::Left.delta(), vec2(-5.0, 0.0));
        assert_eq!(MoveDirection::Down.delta(), vec2(0.0, 5.0));
    }

    #[test]
    fn test_align_up_moves_items_to_common_top() {
        let mut structure = Structure::new("test");
        let mut a = Atom::new(vec2(0.0, 0.0));
        a.selected = true;
        let mut b = Atom::new(vec2(40.0, 30.0));
        b.selected = true;
        structure.items.push(StructureItem::Atom(a));
        structure.items.push(StructureItem::Atom(b));
        let min_max = structure.find_min_max();
        assert_eq!(min_max.min_y, 0.0);
        let changed = structure.align(Edge::Up, min_max.min_y);
        assert!(changed);
        let tops: Vec<f64> = structure
            .items
            .iter()
            .map(|item| match item {
                StructureItem::Atom(atom) => atom.coords.y,
                _ => panic!("expected atoms"),
            })
            .collect();
        assert_eq!(tops, vec![0.0, 0.0]);
        // Aligning again is a no-op.
        assert!(!structure.align(Edge::Up, min_max.min_y));
    }

    #[test]
    fn test_min_max_covers_subtree() {
        let atom = chain(&[vec2(0.0, 0.0), vec2(20.0, 0.0), vec2(0.0, 20.0)]);
        let mut min_max = MinMax::EMPTY;
        atom.min_max_into(vec2(100.0, 100.0), &mut min_max);
        assert_eq!(min_max.min_x, 100.0);
        assert_eq!(min_max.max_x, 120.0);
        assert_eq!(min_max.max_y, 120.0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut structure = Structure::new("benzene");
        structure.origin = vec2(100.0, 100.0);
        structure.aromatic = true;
        let mut atom = Atom::new(vec2(0.0, 0.0));
        atom.label = Some(Label::new("N", 3));
        atom.attach_outgoing(vec2(0.0, -20.0), 2);
        atom.bonds
            .push(Bond::new(BondKind::Double, Atom::new(vec2(0.0, -20.0))));
        structure.items.push(StructureItem::Atom(atom));
        structure
            .items
            .push(StructureItem::Arrow(Arrow::new(ArrowKind::Equilibrium, vec2(20.0, 0.0))));
        let json = structure.to_json().unwrap();
        let restored = Structure::from_json(&json).unwrap();
        assert_eq!(structure, restored);
    }

    #[test]
    fn test_guess_label_mode() {
        let mut atom = Atom::new(Vector::ZERO);
        atom.attach_outgoing(vec2(-20.0, 0.0), 1);
        assert_eq!(atom.guess_label_mode(), LabelMode::Lr);
        atom.attach_incoming(vec2(17.32, 10.0), 1);
        assert_eq!(atom.guess_label_mode(), LabelMode::Rl);
    }
}
