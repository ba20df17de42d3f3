//! # Chem Sketch
//!
//! An interactive editor core for two-dimensional chemical structure
//! diagrams rendered as SVG. Drawings are trees of atoms connected by
//! typed bonds, plus reaction arrows and aromatic ring decorations:
//! - **Structures**: bonds and rings stamped or grafted onto atoms
//! - **Arrows**: one-way, two-way and equilibrium reaction arrows
//! - **Labels**: element symbols with automatic hydrogen counts
//!
//! ## Features
//! - Mouse-gesture editing: click to stamp, drag to aim, click atoms to graft
//! - 24-direction placement grid with occupancy-aware direction choice
//! - Bounded undo/redo history of structure snapshots
//! - Deterministic SVG output for the canvas and for standalone documents
//! - Named editor instances for embedding several editors side by side

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod constants;
mod editor;
mod templates;
mod types;
mod vector;

// Re-export the public surface
pub use constants::{Direction, GeomConsts};
pub use editor::{
    draw, EditorSession, History, Instance, InstanceHost, PlacementError, RenderedShape, Tool,
};
pub use templates::{
    bond_cluster, ring_cluster, standard_labels, ArrowCluster, RingTemplate, StructureCluster,
    RING_TEMPLATES,
};
pub use types::*;
pub use vector::{compare_floats, inside_circle, vec2, Vector};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_default() {
        let structure = Structure::default();
        assert!(structure.items.is_empty());
        assert!(structure.decorations.aromatic.is_empty());
        assert!(!structure.aromatic);
    }

    #[test]
    fn test_session_starts_empty() {
        let session = EditorSession::new("main");
        assert!(session.is_content_empty());
        assert_eq!(session.current_svg(), "");
    }

    #[test]
    fn test_structure_json_round_trip() {
        let mut structure = Structure::new("single");
        structure.set_origin(vec2(100.0, 100.0));
        structure
            .items
            .push(StructureItem::Atom(Atom::new(Vector::ZERO)));
        let json = structure.to_json().unwrap();
        assert_eq!(Structure::from_json(&json).unwrap(), structure);
    }
}
