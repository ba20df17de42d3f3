use chem_sketch::{bond_cluster, ring_cluster, vec2, EditorSession, Label, Tool, RING_TEMPLATES};

fn main() {
    // Set up logging for development
    env_logger::init();

    // Draw a small sample: benzene with a phenol oxygen, plus a chain.
    let mut session = EditorSession::new("demo");

    let benzene = ring_cluster(&RING_TEMPLATES[4], session.consts());
    session.select_tool(Tool::Structure(benzene));
    session.mouse_down(vec2(100.0, 100.0));
    session.mouse_up(vec2(100.0, 100.0));

    let single = bond_cluster("single", chem_sketch::BondKind::Single, session.consts());
    session.select_tool(Tool::Structure(single));
    session.mouse_down(vec2(100.0, 100.0));
    session.mouse_up(vec2(100.0, 100.0));

    session.select_tool(Tool::Label(Label::new("O", 2)));
    session.mouse_down(vec2(100.0, 80.0));
    session.mouse_up(vec2(100.0, 80.0));

    if let Some(document) = session.transfer() {
        println!("{}", document);
    }
}
