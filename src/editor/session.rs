//! The interactive editor session: tools, mouse gestures, undo wiring
//! and content publication.
//!
//! A session owns everything one open editor needs: the geometry
//! constants, the undo history, the instance host it publishes SVG
//! into, and the transient state of the current mouse gesture. There is
//! no global state; embedding several editors means creating several
//! sessions.

use log::debug;
use uuid::Uuid;

use crate::constants::{Direction, GeomConsts};
use crate::editor::engine::{self, PlacementError};
use crate::editor::history::History;
use crate::editor::host::InstanceHost;
use crate::editor::render::{self, RenderedShape};
use crate::templates::{ArrowCluster, StructureCluster};
use crate::types::{
    AromaticRing, Edge, Label, MoveDirection, Selection, Structure, StructureItem,
};
use crate::vector::Vector;

/// The currently active toolbar tool, together with whatever shape or
/// label it stamps.
#[derive(Debug, Clone)]
pub enum Tool {
    /// Stamp a bond or ring cluster.
    Structure(StructureCluster),
    /// Stamp a reaction arrow.
    Arrow(ArrowCluster),
    /// Put a predefined element label on an atom.
    Label(Label),
    /// Put free text on an atom.
    CustomLabel(String),
    /// Rubber-band selection.
    Select,
    /// Drag selected items around.
    MoveStructure,
    /// Remove whatever is clicked.
    Delete,
}

/// Transient state of the mouse gesture in progress.
#[derive(Debug, Default)]
struct MouseState {
    mouse_down: bool,
    down_coords: Option<Vector>,
    down_on_atom: bool,
    down_atom_coords: Option<Vector>,
    moved_on_empty: bool,
}

/// One open editor.
#[derive(Debug)]
pub struct EditorSession {
    consts: GeomConsts,
    tool: Option<Tool>,
    history: History,
    host: InstanceHost,
    shape_id: String,
    mouse: MouseState,
}

impl EditorSession {
    /// Opens an editor session publishing into the named instance.
    pub fn new(instance: &str) -> Self {
        let mut host = InstanceHost::new();
        host.run_editor(instance);
        Self {
            consts: GeomConsts::default(),
            tool: None,
            history: History::new(),
            host,
            shape_id: format!("cmpd-{}", Uuid::new_v4()),
            mouse: MouseState::default(),
        }
    }

    /// Replaces the default geometry, rescaling the drawing.
    pub fn with_consts(mut self, consts: GeomConsts) -> Self {
        self.consts = consts;
        self
    }

    pub fn consts(&self) -> &GeomConsts {
        &self.consts
    }

    /// Picks the active tool.
    pub fn select_tool(&mut self, tool: Tool) {
        self.tool = Some(tool);
    }

    /// The structure currently on the canvas, if any.
    pub fn current_structure(&self) -> Option<&Structure> {
        self.history.current_structure()
    }

    /// The SVG currently shown on the canvas.
    pub fn current_svg(&self) -> &str {
        self.history.current_svg()
    }

    pub fn host(&self) -> &InstanceHost {
        &self.host
    }

    /// True while nothing was ever drawn (or everything was cleared).
    pub fn is_content_empty(&self) -> bool {
        self.history.current_structure().is_none()
    }

    /// Handles a left-button press at canvas coordinates `pos`.
    pub fn mouse_down(&mut self, pos: Vector) {
        self.mouse.mouse_down = true;
        self.mouse.down_coords = Some(pos);
        // Atom lookup only matters for tools that act on an atom.
        let needs_atom = matches!(
            self.tool,
            Some(Tool::Label(_)) | Some(Tool::CustomLabel(_)) | Some(Tool::Structure(_))
        );
        if needs_atom {
            if let Some(structure) = self.history.current_structure() {
                if let Some(abs) = engine::hit_test(structure, pos, &self.consts) {
                    self.mouse.down_on_atom = true;
                    self.mouse.down_atom_coords = Some(abs);
                }
            }
        }
    }

    /// Handles mouse movement with the button held: live previews that
    /// are published but never committed to the history.
    pub fn mouse_move(&mut self, pos: Vector) {
        if !self.mouse.mouse_down {
            return;
        }
        let down = match self.mouse.down_coords {
            Some(down) => down,
            None => return,
        };
        let tool = match &self.tool {
            Some(tool) => tool.clone(),
            None => return,
        };
        let preview = match tool {
            Tool::Label(_) | Tool::CustomLabel(_) | Tool::Delete => None,
            Tool::Select => {
                let (mut structure, selection) = self.make_selection(down, pos);
                structure.items.push(StructureItem::Selection(selection));
                Some(structure)
            }
            Tool::MoveStructure => self.history.current_structure().map(|current| {
                let mut structure = current.clone();
                structure.move_selected(MoveDirection::Pointer(pos.subtract(down)));
                structure
            }),
            Tool::Arrow(cluster) => {
                self.mouse.moved_on_empty = true;
                Some(self.place_arrow(&cluster, down, pos, true))
            }
            Tool::Structure(cluster) => {
                if self.mouse.down_on_atom {
                    self.graft_preview(&cluster, pos)
                } else {
                    self.mouse.moved_on_empty = true;
                    Some(self.place_structure(&cluster, down, pos, true))
                }
            }
        };
        if let Some(structure) = preview {
            let shape = self.render(&structure);
            self.host.set_content(shape.editor_svg(), "");
        }
    }

    /// Handles releasing the left button: resolves the gesture into an
    /// edit and commits it. Gestures that change nothing leave the
    /// history untouched.
    pub fn mouse_up(&mut self, pos: Vector) {
        let tool = match &self.tool {
            Some(tool) => tool.clone(),
            None => {
                self.reset_mouse();
                return;
            }
        };
        if !self.mouse.mouse_down {
            self.reset_mouse();
            return;
        }
        let down = self.mouse.down_coords.unwrap_or(pos);
        let moved = self.mouse.moved_on_empty;
        let result = match tool {
            Tool::Delete => self.history.current_structure().and_then(|current| {
                let mut structure = current.clone();
                engine::delete_at(&mut structure, pos, &self.consts).then_some(structure)
            }),
            Tool::Select => {
                // The rubber-band box itself is a preview artifact; only
                // the selection marks survive the gesture.
                let (structure, _) = self.make_selection(down, pos);
                Some(structure)
            }
            Tool::MoveStructure => self.history.current_structure().map(|current| {
                let mut structure = current.clone();
                structure.move_selected(MoveDirection::Pointer(pos.subtract(down)));
                structure
            }),
            Tool::Arrow(cluster) => Some(self.place_arrow(&cluster, down, pos, moved)),
            Tool::Label(label) if self.mouse.down_on_atom => self.apply_label(label, down),
            Tool::CustomLabel(text) if self.mouse.down_on_atom => {
                self.apply_label(Label::custom(text), down)
            }
            Tool::Label(_) | Tool::CustomLabel(_) => None,
            Tool::Structure(cluster) => {
                if self.mouse.down_on_atom {
                    self.graft_commit(&cluster, pos)
                } else {
                    Some(self.place_structure(&cluster, down, pos, moved))
                }
            }
        };
        if let Some(structure) = result {
            self.commit(structure);
        }
        self.reset_mouse();
    }

    /// Steps one snapshot back and redraws. Returns `false` at the
    /// oldest snapshot.
    pub fn undo(&mut self) -> bool {
        if !self.history.undo() {
            return false;
        }
        self.redraw_current();
        true
    }

    /// Steps one snapshot forward and redraws. Returns `false` at the
    /// newest snapshot.
    pub fn redo(&mut self) -> bool {
        if !self.history.redo() {
            return false;
        }
        self.redraw_current();
        true
    }

    /// Clears the canvas. The cleared state is itself a snapshot, so it
    /// can be undone.
    pub fn clear(&mut self) {
        self.history.commit(None);
        self.host.clear_content("");
    }

    /// Selects every item on the canvas.
    pub fn select_all(&mut self) {
        if let Some(current) = self.history.current_structure() {
            let mut structure = current.clone();
            structure.select_all();
            self.commit(structure);
        }
    }

    /// Drops the current selection.
    pub fn deselect_all(&mut self) {
        if let Some(current) = self.history.current_structure() {
            let mut structure = current.clone();
            structure.deselect_all();
            self.commit(structure);
        }
    }

    /// Deletes every selected item.
    pub fn delete_selected(&mut self) {
        if let Some(current) = self.history.current_structure() {
            let mut structure = current.clone();
            structure.delete_selected();
            self.commit(structure);
        }
    }

    /// Moves the selected items one step in a direction.
    pub fn move_selected(&mut self, direction: MoveDirection) {
        if let Some(current) = self.history.current_structure() {
            let mut structure = current.clone();
            structure.move_selected(direction);
            self.commit(structure);
        }
    }

    /// Aligns the selected items against the given edge of their
    /// common bounds. Returns `true` if anything moved.
    pub fn align(&mut self, edge: Edge) -> bool {
        let current = match self.history.current_structure() {
            Some(current) => current,
            None => return false,
        };
        let mut structure = current.clone();
        let min_max = structure.find_min_max();
        if min_max.is_empty() {
            return false;
        }
        let coord = match edge {
            Edge::Up => min_max.min_y,
            Edge::Down => min_max.max_y,
            Edge::Left => min_max.min_x,
            Edge::Right => min_max.max_x,
        };
        if !structure.align(edge, coord) {
            return false;
        }
        self.commit(structure);
        true
    }

    /// Renders the current drawing as a standalone SVG document and
    /// hands it, together with the structure, to the instance host.
    pub fn transfer(&mut self) -> Option<String> {
        let structure = self.history.current_structure()?.clone();
        let shape = render::draw(&structure, "transfer", &self.consts);
        let document = shape.document_svg();
        self.host.set_content(document.clone(), "");
        self.host.set_structure(Some(structure));
        Some(document)
    }

    fn render(&self, structure: &Structure) -> RenderedShape {
        render::draw(structure, &self.shape_id, &self.consts)
    }

    fn commit(&mut self, structure: Structure) {
        let shape = self.render(&structure);
        self.history.commit(Some(structure));
        let svg = shape.editor_svg();
        self.history.set_current_svg(svg.clone());
        self.host.set_content(svg, "");
    }

    fn redraw_current(&mut self) {
        match self.history.current_structure() {
            Some(structure) => {
                let shape = render::draw(structure, &self.shape_id, &self.consts);
                let svg = shape.editor_svg();
                self.history.set_current_svg(svg.clone());
                self.host.set_content(svg, "");
            }
            None => {
                self.history.set_current_svg(String::new());
                self.host.clear_content("");
            }
        }
    }

    fn reset_mouse(&mut self) {
        self.mouse = MouseState::default();
    }

    /// Builds the structure-plus-selection pair shared by the select
    /// tool's preview and commit paths.
    fn make_selection(&self, down: Vector, pos: Vector) -> (Structure, Selection) {
        let (mut structure, selection) = match self.history.current_structure() {
            Some(current) => {
                let structure = current.clone();
                let origin = structure.origin;
                (structure, Selection::new(down.subtract(origin), pos))
            }
            None => {
                let mut structure = Structure::default();
                structure.set_origin(down);
                (structure, Selection::new(Vector::ZERO, pos))
            }
        };
        structure.select(&selection);
        (structure, selection)
    }

    fn place_arrow(
        &self,
        cluster: &ArrowCluster,
        down: Vector,
        pos: Vector,
        moved: bool,
    ) -> Structure {
        let mut arrow = if moved {
            cluster.arrow_for_drag(down, pos, &self.consts)
        } else {
            cluster.default_arrow(&self.consts)
        };
        match self.history.current_structure() {
            Some(current) => {
                let mut structure = current.clone();
                arrow.origin = down.subtract(structure.origin);
                structure.items.push(StructureItem::Arrow(arrow));
                structure
            }
            None => {
                let mut structure = Structure::default();
                structure.set_origin(down);
                structure.items.push(StructureItem::Arrow(arrow));
                structure
            }
        }
    }

    /// Stamps the chosen cluster on empty canvas space.
    fn place_structure(
        &self,
        cluster: &StructureCluster,
        down: Vector,
        pos: Vector,
        moved: bool,
    ) -> Structure {
        let def = if moved {
            cluster.def_for_drag(down, pos, &self.consts)
        } else {
            cluster.default_def()
        };
        // The structure anchors where the gesture started.
        let anchor = down;
        match self.history.current_structure() {
            Some(current) => {
                let mut structure = current.clone();
                let new_coords = down.subtract(structure.origin);
                let mut root = def.items[0].clone();
                if let StructureItem::Atom(atom) = &mut root {
                    atom.coords = new_coords;
                }
                structure.items.push(root);
                if cluster.aromatic {
                    structure.add_aromatic(self.aromatic_ring(def, new_coords, anchor));
                }
                structure
            }
            None => {
                let mut structure = def.clone();
                structure.set_origin(anchor);
                if cluster.aromatic {
                    structure.add_aromatic(self.aromatic_ring(def, Vector::ZERO, anchor));
                }
                structure
            }
        }
    }

    /// The circle decoration for an aromatic ring stamped at `anchor`,
    /// following the top-level atom at `from_which`.
    fn aromatic_ring(&self, def: &Structure, from_which: Vector, anchor: Vector) -> AromaticRing {
        let bond = Direction::from_name(&def.name)
            .map(|dir| self.consts.bond_vector(dir))
            .unwrap_or(Vector::ZERO);
        AromaticRing {
            from_which,
            coords: anchor.add(bond),
        }
    }

    fn graft_preview(&mut self, cluster: &StructureCluster, pos: Vector) -> Option<Structure> {
        let mut structure = self.history.current_structure()?.clone();
        match engine::graft(
            &mut structure,
            cluster,
            pos,
            self.mouse.down_atom_coords,
            true,
            &self.consts,
        ) {
            Ok(Some(_)) => Some(structure),
            Ok(None) => None,
            Err(err) => {
                debug!("graft preview skipped: {}", err);
                None
            }
        }
    }

    fn graft_commit(&mut self, cluster: &StructureCluster, pos: Vector) -> Option<Structure> {
        let mut structure = self.history.current_structure()?.clone();
        match engine::graft(
            &mut structure,
            cluster,
            pos,
            self.mouse.down_atom_coords,
            false,
            &self.consts,
        ) {
            Ok(Some(abs)) => {
                debug!("grafted '{}' at ({:.2}, {:.2})", cluster.name, abs.x, abs.y);
                Some(structure)
            }
            Ok(None) => None,
            Err(err @ PlacementError::FullAtom) | Err(err @ PlacementError::NoFreeDirection) => {
                debug!("placement rejected: {}", err);
                None
            }
        }
    }

    fn apply_label(&mut self, label: Label, down: Vector) -> Option<Structure> {
        let mut structure = self.history.current_structure()?.clone();
        engine::modify_label(&mut structure, down, label, &self.consts).then_some(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{bond_cluster, ring_cluster, ArrowCluster, RING_TEMPLATES};
    use crate::types::{ArrowKind, BondKind};
    use crate::vector::vec2;

    fn session() -> EditorSession {
        EditorSession::new("test")
    }

    fn single_bond_tool(session: &EditorSession) -> Tool {
        Tool::Structure(bond_cluster("single", BondKind::Single, session.consts()))
    }

    #[test]
    fn test_click_places_default_bond() {
        let mut session = session();
        let tool = single_bond_tool(&session);
        session.select_tool(tool);
        session.mouse_down(vec2(100.0, 100.0));
        session.mouse_up(vec2(101.0, 99.0));
        let structure = session.current_structure().unwrap();
        assert_eq!(structure.origin, vec2(100.0, 100.0));
        match &structure.items[0] {
            StructureItem::Atom(atom) => {
                assert!(atom.bonds[0].atom.coords.compare(vec2(0.0, -20.0), 5));
            }
            _ => panic!("expected an atom"),
        }
        assert!(session.current_svg().starts_with("<svg>"));
        assert_eq!(session.host().get_content("test"), session.current_svg());
    }

    #[test]
    fn test_click_on_atom_grafts_second_bond() {
        let mut session = session();
        let tool = single_bond_tool(&session);
        session.select_tool(tool);
        session.mouse_down(vec2(100.0, 100.0));
        session.mouse_up(vec2(100.0, 100.0));
        // Click the root atom again: a second bond must appear, rotated
        // off the occupied North slot.
        session.mouse_down(vec2(101.0, 99.0));
        session.mouse_up(vec2(101.0, 99.0));
        let structure = session.current_structure().unwrap();
        match &structure.items[0] {
            StructureItem::Atom(atom) => assert_eq!(atom.bonds.len(), 2),
            _ => panic!("expected an atom"),
        }
        assert_eq!(session.history.len(), 3);
    }

    #[test]
    fn test_failed_gesture_does_not_commit() {
        let mut session = session();
        let tool = single_bond_tool(&session);
        session.select_tool(tool);
        session.mouse_down(vec2(100.0, 100.0));
        session.mouse_up(vec2(100.0, 100.0));
        let before = session.history.len();
        // Delete far away from everything.
        session.select_tool(Tool::Delete);
        session.mouse_down(vec2(400.0, 400.0));
        session.mouse_up(vec2(400.0, 400.0));
        assert_eq!(session.history.len(), before);
    }

    #[test]
    fn test_benzene_click_adds_decoration_south_of_anchor() {
        let mut session = session();
        let cluster = ring_cluster(&RING_TEMPLATES[4], session.consts());
        session.select_tool(Tool::Structure(cluster));
        session.mouse_down(vec2(100.0, 100.0));
        session.mouse_up(vec2(100.0, 100.0));
        let structure = session.current_structure().unwrap();
        assert_eq!(structure.decorations.aromatic.len(), 1);
        let arom = &structure.decorations.aromatic[0];
        assert_eq!(arom.from_which, Vector::ZERO);
        assert!(arom.coords.compare(vec2(100.0, 120.0), 5));
    }

    #[test]
    fn test_arrow_drag_snaps_to_direction() {
        let mut session = session();
        let cluster = ArrowCluster::new("one-way-arrow", ArrowKind::OneWay, session.consts());
        session.select_tool(Tool::Arrow(cluster));
        session.mouse_down(vec2(100.0, 100.0));
        session.mouse_move(vec2(120.0, 101.0));
        session.mouse_up(vec2(130.0, 101.0));
        let structure = session.current_structure().unwrap();
        assert_eq!(structure.origin, vec2(100.0, 100.0));
        match &structure.items[0] {
            StructureItem::Arrow(arrow) => {
                assert!(arrow.relative_end.compare(vec2(20.0, 0.0), 4));
            }
            _ => panic!("expected an arrow"),
        }
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut session = session();
        let tool = single_bond_tool(&session);
        session.select_tool(tool);
        session.mouse_down(vec2(100.0, 100.0));
        session.mouse_up(vec2(100.0, 100.0));
        let svg_after_first = session.current_svg().to_string();
        session.mouse_down(vec2(100.0, 80.0));
        session.mouse_up(vec2(100.0, 80.0));
        assert!(session.undo());
        assert_eq!(session.current_svg(), svg_after_first);
        assert!(session.redo());
        assert!(!session.redo());
    }

    #[test]
    fn test_undo_after_clear_restores_exact_svg() {
        let mut session = session();
        let tool = single_bond_tool(&session);
        session.select_tool(tool);
        session.mouse_down(vec2(100.0, 100.0));
        session.mouse_up(vec2(100.0, 100.0));
        let svg = session.current_svg().to_string();
        session.clear();
        assert!(session.is_content_empty());
        assert!(session.undo());
        assert_eq!(session.current_svg(), svg);
    }

    #[test]
    fn test_label_click_labels_atom() {
        let mut session = session();
        let tool = single_bond_tool(&session);
        session.select_tool(tool);
        session.mouse_down(vec2(100.0, 100.0));
        session.mouse_up(vec2(100.0, 100.0));
        session.select_tool(Tool::Label(Label::new("O", 2)));
        session.mouse_down(vec2(101.0, 101.0));
        session.mouse_up(vec2(101.0, 101.0));
        let structure = session.current_structure().unwrap();
        match &structure.items[0] {
            StructureItem::Atom(atom) => {
                assert_eq!(atom.label.as_ref().unwrap().text, "O");
            }
            _ => panic!("expected an atom"),
        }
    }

    #[test]
    fn test_transfer_publishes_document() {
        let mut session = session();
        let tool = single_bond_tool(&session);
        session.select_tool(tool);
        session.mouse_down(vec2(100.0, 100.0));
        session.mouse_up(vec2(100.0, 100.0));
        let document = session.transfer().unwrap();
        assert!(document.contains("viewBox="));
        assert_eq!(session.host().get_content("test"), document);
        assert!(session.host().get_structure("test").is_some());
    }

    #[test]
    fn test_transfer_on_empty_canvas_is_none() {
        let mut session = session();
        assert!(session.transfer().is_none());
    }
}
