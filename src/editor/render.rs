//! SVG rendering of structures.
//!
//! Rendering produces two variants of the same drawing: a *full* one for
//! the editor canvas (interactive hit circles, hover styles, selection
//! rects) and a *mini* one for embedding outside the editor (geometry
//! and labels only). Both are plain strings of SVG elements prefixed
//! with a style block; the session wraps them in `<g>`/`<svg>` tags.
//!
//! All numeric attributes are written with two decimals so that
//! rendering the same structure twice yields byte-identical output.

use std::fmt::Write;

use crate::constants::{
    GeomConsts, ARROW_SIZE, ARROW_START, BETWEEN_DBL_BONDS, BETWEEN_TRP_BONDS, CANVAS_PADDING,
    FONT_SIZE, SUB_FONT_SIZE,
};
use crate::types::{
    ArrowKind, Atom, BondKind, Label, LabelMode, MinMax, Structure, StructureItem,
};
use crate::vector::Vector;

/// A rendered drawing: the editor and embed variants plus the bounds of
/// everything drawn.
#[derive(Debug, Clone)]
pub struct RenderedShape {
    pub full: String,
    pub mini: String,
    pub min_max: MinMax,
    pub id: String,
}

impl RenderedShape {
    /// The full variant wrapped for display on the editor canvas.
    pub fn editor_svg(&self) -> String {
        format!("<svg><g id='{}' >{}</g></svg>", self.id, self.full)
    }

    /// The mini variant wrapped as a standalone SVG document with a
    /// viewBox fitted around the drawing.
    pub fn document_svg(&self) -> String {
        let view_box = format!(
            "{:.2} {:.2} {:.2} {:.2}",
            self.min_max.min_x - CANVAS_PADDING,
            self.min_max.min_y - CANVAS_PADDING,
            self.min_max.max_x - self.min_max.min_x + 2.0 * CANVAS_PADDING,
            self.min_max.max_y - self.min_max.min_y + 2.0 * CANVAS_PADDING,
        );
        format!(
            "<svg viewBox='{}' height='100%' width='100%' \
             xmlns='http://www.w3.org/2000/svg' \
             xmlns:xlink='http://www.w3.org/1999/xlink' >\
             <g id='{}' >{}</g></svg>",
            view_box, self.id, self.mini
        )
    }
}

/// Renders a structure into its two SVG variants.
pub fn draw(structure: &Structure, id: &str, consts: &GeomConsts) -> RenderedShape {
    let parsed = parse(structure, consts);
    let mut full = generate_style(true, consts);
    let mut mini = generate_style(false, consts);

    for rect in &parsed.rects {
        let element = format!(
            "<rect class='selection' x='{:.2}' y='{:.2}' width='{:.2}' height='{:.2}'></rect>",
            rect.0, rect.1, rect.2, rect.3
        );
        full.push_str(&element);
        mini.push_str(&element);
    }
    for path in &parsed.paths {
        let element = match path.class {
            Some(class) => format!("<path class='{}' d='{}'></path>", class, path.d),
            None => format!("<path d='{}'></path>", path.d),
        };
        full.push_str(&element);
        mini.push_str(&element);
    }
    // Hit-test circles only make sense inside the editor.
    for (selected, pos) in &parsed.circles {
        let class = if *selected { "edit" } else { "atom" };
        let _ = write!(
            full,
            "<circle class='{}' cx='{:.2}' cy='{:.2}' r='{:.2}'></circle>",
            class, pos.x, pos.y, consts.circ_r
        );
    }
    for label in &parsed.labels {
        let element = label_element(label, consts);
        full.push_str(&element);
        mini.push_str(&element);
    }
    for arom in &structure.decorations.aromatic {
        full.push_str(&aromatic_element(arom.coords, "arom", consts));
        mini.push_str(&aromatic_element(arom.coords, "tr-arom", consts));
    }

    RenderedShape {
        full,
        mini,
        min_max: parsed.min_max,
        id: id.to_string(),
    }
}

struct PathSpec {
    class: Option<&'static str>,
    d: String,
}

/// A label resolved for drawing: hydrogens appended, orientation fixed.
struct LabelDraw {
    text: String,
    mode: LabelMode,
    atom: Vector,
    label_x: f64,
    label_y: f64,
}

struct Parsed {
    rects: Vec<(f64, f64, f64, f64)>,
    paths: Vec<PathSpec>,
    circles: Vec<(bool, Vector)>,
    labels: Vec<LabelDraw>,
    min_max: MinMax,
}

fn parse(structure: &Structure, consts: &GeomConsts) -> Parsed {
    let origin = structure.origin;
    let mut parsed = Parsed {
        rects: Vec::new(),
        paths: Vec::new(),
        circles: Vec::new(),
        labels: Vec::new(),
        min_max: MinMax::EMPTY,
    };
    // The origin anchors the bounds even on an otherwise empty canvas.
    parsed.min_max.update(origin);

    for item in &structure.items {
        match item {
            StructureItem::Selection(selection) => {
                let rect = selection.rect(origin);
                parsed.rects.push((rect.x, rect.y, rect.width, rect.height));
            }
            StructureItem::Atom(atom) => {
                let abs = origin.add(atom.coords);
                parsed.min_max.update(abs);
                push_label(&mut parsed.labels, abs, atom, consts);
                parsed.circles.push((atom.selected, abs));
                let mut d = String::new();
                move_to(&mut d, abs);
                parsed.paths.push(PathSpec { class: None, d });
                connect(&atom.bonds, abs, &mut parsed, consts);
            }
            StructureItem::Arrow(arrow) => {
                let start = origin.add(arrow.origin);
                let end = origin.add(arrow.end());
                parsed.min_max.update(start);
                parsed.min_max.update(end);
                parsed.circles.push((arrow.selected, start));
                parsed.circles.push((arrow.selected, end));
                parsed.paths.push(calc_arrow(start, end, arrow.kind));
            }
        }
    }
    parsed
}

/// Walks an atom's bonds depth first, extending the current path for
/// single bonds and emitting dedicated paths for everything else.
fn connect(bonds: &[crate::types::Bond], prev_abs: Vector, parsed: &mut Parsed, consts: &GeomConsts) {
    for (i, bond) in bonds.iter().enumerate() {
        let abs = prev_abs.add(bond.atom.coords);
        parsed.min_max.update(abs);
        push_label(&mut parsed.labels, abs, &bond.atom, consts);
        parsed.circles.push((bond.atom.selected, abs));
        match bond.kind {
            BondKind::Single => {
                if i == 0 {
                    // First bond continues the parent's line.
                    if let Some(last) = parsed.paths.last_mut() {
                        line_to(&mut last.d, abs);
                    }
                } else {
                    let mut d = String::new();
                    move_to(&mut d, prev_abs);
                    line_to(&mut d, abs);
                    parsed.paths.push(PathSpec { class: None, d });
                }
            }
            BondKind::Double => {
                parsed.paths.push(calc_double_bond(prev_abs, abs));
                parsed.paths.push(restart_at(abs));
            }
            BondKind::Triple => {
                parsed.paths.push(calc_triple_bond(prev_abs, abs));
                parsed.paths.push(restart_at(abs));
            }
            BondKind::Wedge => {
                parsed.paths.push(calc_wedge_bond(prev_abs, abs));
                parsed.paths.push(restart_at(abs));
            }
            BondKind::Dash => {
                parsed.paths.push(calc_dash_bond(prev_abs, abs));
                parsed.paths.push(restart_at(abs));
            }
        }
        connect(&bond.atom.bonds, abs, parsed, consts);
    }
}

fn restart_at(abs: Vector) -> PathSpec {
    let mut d = String::new();
    move_to(&mut d, abs);
    PathSpec { class: None, d }
}

fn move_to(d: &mut String, pos: Vector) {
    let _ = write!(d, "M {:.2} {:.2} ", pos.x, pos.y);
}

fn line_to(d: &mut String, pos: Vector) {
    let _ = write!(d, "L {:.2} {:.2} ", pos.x, pos.y);
}

/// Perpendicular of a vector, 90° counter-clockwise.
fn perp_ccw(v: Vector) -> Vector {
    Vector::new(-v.y, v.x)
}

/// Perpendicular of a vector, 90° clockwise.
fn perp_cw(v: Vector) -> Vector {
    Vector::new(v.y, -v.x)
}

fn calc_arrow(start: Vector, end: Vector, kind: ArrowKind) -> PathSpec {
    let v = end.subtract(start);
    let ccw = perp_ccw(v);
    let cw = perp_cw(v);
    let mut d = String::new();
    match kind {
        ArrowKind::OneWay => {
            let marker = start.add_scaled(v, ARROW_START);
            move_to(&mut d, start);
            line_to(&mut d, end);
            move_to(&mut d, marker);
            line_to(&mut d, marker.add_scaled(ccw, ARROW_SIZE));
            line_to(&mut d, end);
            line_to(&mut d, marker.add_scaled(cw, ARROW_SIZE));
            d.push_str("Z ");
            PathSpec { class: Some("arrow"), d }
        }
        ArrowKind::TwoWay => {
            let end_marker = start.add_scaled(v, ARROW_START);
            let start_marker = start.add_scaled(v, 1.0 - ARROW_START);
            move_to(&mut d, start);
            line_to(&mut d, end);
            move_to(&mut d, end_marker);
            line_to(&mut d, end_marker.add_scaled(ccw, ARROW_SIZE));
            line_to(&mut d, end);
            line_to(&mut d, end_marker.add_scaled(cw, ARROW_SIZE));
            d.push_str("Z ");
            move_to(&mut d, start_marker);
            line_to(&mut d, start_marker.add_scaled(ccw, ARROW_SIZE));
            line_to(&mut d, start);
            line_to(&mut d, start_marker.add_scaled(cw, ARROW_SIZE));
            d.push_str("Z ");
            PathSpec { class: Some("arrow"), d }
        }
        ArrowKind::Equilibrium => {
            // Two offset half-arrows, one barb each.
            let m1 = start.add_scaled(ccw, BETWEEN_DBL_BONDS);
            let l1 = end.add_scaled(ccw, BETWEEN_DBL_BONDS);
            let end_marker = m1.add_scaled(v, ARROW_START);
            move_to(&mut d, m1);
            line_to(&mut d, l1);
            line_to(&mut d, end_marker.add_scaled(ccw, ARROW_SIZE));
            let m2 = end.add_scaled(cw, BETWEEN_DBL_BONDS);
            let l3 = start.add_scaled(cw, BETWEEN_DBL_BONDS);
            let start_marker = l3.add_scaled(v, 1.0 - ARROW_START);
            move_to(&mut d, m2);
            line_to(&mut d, l3);
            line_to(&mut d, start_marker.add_scaled(cw, ARROW_SIZE));
            PathSpec { class: Some("arrow-eq"), d }
        }
    }
}

fn calc_double_bond(start: Vector, end: Vector) -> PathSpec {
    let v = end.subtract(start);
    let ccw = perp_ccw(v);
    let cw = perp_cw(v);
    let mut d = String::new();
    move_to(&mut d, start.add_scaled(ccw, BETWEEN_DBL_BONDS));
    line_to(&mut d, end.add_scaled(ccw, BETWEEN_DBL_BONDS));
    move_to(&mut d, start.add_scaled(cw, BETWEEN_DBL_BONDS));
    line_to(&mut d, end.add_scaled(cw, BETWEEN_DBL_BONDS));
    PathSpec { class: None, d }
}

fn calc_triple_bond(start: Vector, end: Vector) -> PathSpec {
    let v = end.subtract(start);
    let ccw = perp_ccw(v);
    let cw = perp_cw(v);
    let mut d = String::new();
    move_to(&mut d, start.add_scaled(ccw, BETWEEN_TRP_BONDS));
    line_to(&mut d, end.add_scaled(ccw, BETWEEN_TRP_BONDS));
    move_to(&mut d, start);
    line_to(&mut d, end);
    move_to(&mut d, start.add_scaled(cw, BETWEEN_TRP_BONDS));
    line_to(&mut d, end.add_scaled(cw, BETWEEN_TRP_BONDS));
    PathSpec { class: None, d }
}

fn calc_wedge_bond(start: Vector, end: Vector) -> PathSpec {
    let v = end.subtract(start);
    let mut d = String::new();
    move_to(&mut d, start);
    line_to(&mut d, end.add_scaled(perp_ccw(v), BETWEEN_DBL_BONDS));
    line_to(&mut d, end.add_scaled(perp_cw(v), BETWEEN_DBL_BONDS));
    d.push_str("Z ");
    PathSpec { class: Some("wedge"), d }
}

fn calc_dash_bond(start: Vector, end: Vector) -> PathSpec {
    const TICKS: usize = 7;
    let v = end.subtract(start);
    let ccw = perp_ccw(v);
    let cw = perp_cw(v);
    let mut d = String::new();
    let mut factor = BETWEEN_DBL_BONDS / TICKS as f64;
    let mut current = start;
    // Perpendicular ticks widening towards the far atom.
    for _ in 0..TICKS {
        factor += BETWEEN_DBL_BONDS / TICKS as f64;
        current = current.add_scaled(v, 1.0 / TICKS as f64);
        move_to(&mut d, current.add_scaled(ccw, factor));
        line_to(&mut d, current.add_scaled(cw, factor));
    }
    PathSpec { class: None, d }
}

fn push_label(labels: &mut Vec<LabelDraw>, abs: Vector, atom: &Atom, consts: &GeomConsts) {
    if let Some(label) = &atom.label {
        labels.push(resolve_label(label, atom, abs, consts));
    }
}

/// Appends implicit hydrogens to a label's text and resolves its final
/// orientation.
fn resolve_label(label: &Label, atom: &Atom, abs: Vector, consts: &GeomConsts) -> LabelDraw {
    let bonds_in: u32 = atom.attached.incoming.iter().map(|b| b.multiplicity).sum();
    let bonds_out: u32 = atom.bonds.iter().map(|b| b.kind.multiplicity()).sum();
    let remaining = label.max_bonds as i64 - bonds_in as i64 - bonds_out as i64;
    let hydrogens = remaining.max(0);
    let mode = label.mode.unwrap_or_else(|| atom.guess_label_mode());

    let text = if hydrogens > 0 {
        let suffix = if hydrogens == 1 {
            "H".to_string()
        } else {
            format!("H{}", hydrogens)
        };
        match mode {
            LabelMode::Rl => format!("{}{}", suffix, label.text),
            LabelMode::Lr => format!("{}{}", label.text, suffix),
        }
    } else if mode == LabelMode::Rl {
        invert_group(&label.text)
    } else {
        label.text.clone()
    };

    let correct_x = match mode {
        LabelMode::Rl => 0.175 * consts.bond_length,
        LabelMode::Lr => -0.175 * consts.bond_length,
    };
    LabelDraw {
        text,
        mode,
        atom: abs,
        label_x: abs.x + correct_x,
        label_y: abs.y + 0.09 * consts.bond_length,
    }
}

/// Reverses the order of element groups in a label, so that e.g.
/// "N3OH" reads "HON3" when the label extends to the left.
/// A group is an uppercase letter with its trailing lowercase letters
/// and digits.
fn invert_group(text: &str) -> String {
    let mut groups: Vec<String> = Vec::new();
    for c in text.chars() {
        if c.is_ascii_uppercase() || groups.is_empty() {
            groups.push(c.to_string());
        } else if let Some(last) = groups.last_mut() {
            last.push(c);
        }
    }
    groups.reverse();
    groups.concat()
}

fn label_element(label: &LabelDraw, consts: &GeomConsts) -> String {
    let anchor = match label.mode {
        LabelMode::Rl => "end",
        LabelMode::Lr => "start",
    };
    let mut element = backdrop_polygon(label.atom, consts);
    let _ = write!(
        element,
        "<text dy='0.2125em' x='{:.2}' y='{:.2}' atomx='{:.2}' atomy='{:.2}' text-anchor='{}' >",
        label.label_x, label.label_y, label.atom.x, label.atom.y, anchor
    );
    element.push_str(&label_tspans(&label.text));
    element.push_str("</text>");
    element
}

/// White polygon drawn behind a label so bond lines do not cross the
/// text. Its vertices follow the 24 compass directions scaled down to
/// the text height.
fn backdrop_polygon(atom: Vector, consts: &GeomConsts) -> String {
    let factor = 0.5 * FONT_SIZE / consts.bond_length;
    let mut points = String::new();
    for v in consts.bond_vectors() {
        let p = atom.add_scaled(*v, factor);
        let _ = write!(points, "{:.2} {:.2} ", p.x, p.y);
    }
    format!("<polygon class='text' points='{}'></polygon>", points)
}

/// Renders label text as tspans: digits become subscripts, and the
/// character after a digit run moves back up to the baseline.
fn label_tspans(text: &str) -> String {
    let shift = FONT_SIZE * 0.25;
    let mut output = String::new();
    let mut after_digit = false;
    for c in text.chars() {
        let escaped = escape_xml_char(c);
        if c.is_ascii_digit() {
            let _ = write!(output, "<tspan class='sub' dy='{}' >{}</tspan>", shift, escaped);
            after_digit = true;
        } else if after_digit {
            let _ = write!(output, "<tspan dy='-{}' >{}</tspan>", shift, escaped);
            after_digit = false;
        } else {
            let _ = write!(output, "<tspan>{}</tspan>", escaped);
        }
    }
    output
}

fn escape_xml_char(c: char) -> String {
    match c {
        '<' => "&lt;".to_string(),
        '>' => "&gt;".to_string(),
        '&' => "&amp;".to_string(),
        '\'' => "&apos;".to_string(),
        '"' => "&quot;".to_string(),
        _ => c.to_string(),
    }
}

fn aromatic_element(center: Vector, class: &str, consts: &GeomConsts) -> String {
    format!(
        "<circle class='{}' cx='{:.2}' cy='{:.2}' r='{:.2}' ></circle>",
        class, center.x, center.y, consts.aromatic_r
    )
}

/// Builds the style block. The base rules are always present; the
/// expanded ones add editor-only affordances (hover feedback, selection
/// outlines).
fn generate_style(expanded: bool, consts: &GeomConsts) -> String {
    let stroke = consts.bond_width;
    let mut style = String::from("<style type=\"text/css\">");
    let _ = write!(
        style,
        "path{{stroke:black;stroke-width:{:.2};fill:none;}}\
         path.wedge{{fill:black;}}\
         path.arrow{{fill:black;}}\
         path.arrow-eq{{fill:none;}}\
         circle.arom{{stroke:black;stroke-width:{:.2};fill:none;}}\
         circle.tr-arom{{stroke:black;stroke-width:{:.2};fill:none;}}\
         text{{font-family:Arial;cursor:default;font-size:{}px;}}\
         tspan.sub{{font-size:{}px;}}\
         polygon.text{{fill:white;}}",
        stroke, stroke, stroke, FONT_SIZE, SUB_FONT_SIZE
    );
    if expanded {
        let _ = write!(
            style,
            "circle.atom:hover{{opacity:0.3;stroke:black;stroke-width:{:.2};}}\
             circle.arom:hover{{opacity:0.3;stroke:black;stroke-width:{:.2};fill:black;}}\
             text:hover{{opacity:0.3;}}\
             circle.atom{{opacity:0;}}\
             circle.edit{{stroke:black;fill:none;}}\
             rect.selection{{stroke:black;stroke-dasharray:10 5;fill:none;}}",
            stroke, stroke
        );
    }
    style.push_str("</style>");
    style
}
