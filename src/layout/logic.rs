use super::markup::Markup;
use super::shapes::{shape_svg, Stroke};
use crate::synth::{
    LogicGrid, Maze, OddOneOut, PatternRows, PatternSlot, PictureMatching, ShapeSynthesis, Sorting, SpotDifference,
    WorksheetTypeId, WALL_EAST, WALL_NORTH, WALL_SOUTH, WALL_WEST,
};

pub(super) const CSS: &str = r#"
.maze { position: relative; align-self: center; }
.maze svg { display: block; }
.maze .start, .maze .end { position: absolute; width: 56px; height: 56px; font-size: 44px; line-height: 56px; }
.maze .start { left: -60px; top: -8px; }
.maze .end { right: -60px; bottom: -8px; }
.pairs { display: flex; justify-content: space-between; flex: 1; padding: 0 70px; }
.pairs .column { display: flex; flex-direction: column; justify-content: space-around; }
.pairs .item { display: flex; align-items: center; gap: 14px; }
.pairs .item .asset { width: 120px; height: 120px; font-size: 96px; line-height: 120px; }
.pairs .dot { width: 16px; height: 16px; border-radius: 50%; background: var(--primary); }
.shadow .asset { filter: brightness(0); opacity: 0.75; }
.half-left .asset { clip-path: inset(0 50% 0 0); }
.half-right .asset { clip-path: inset(0 0 0 50%); }
.groups { display: flex; gap: 24px; }
.groups .group { flex: 1; min-height: 300px; border: 3px dashed var(--primary); border-radius: 18px; padding: 10px; text-align: center; font-size: 26px; }
.groups .group .asset { width: 60px; height: 60px; font-size: 48px; }
.cutouts { display: flex; flex-wrap: wrap; gap: 14px; justify-content: center; }
.cutouts .cut { border: 2px dashed #888; padding: 8px; }
.cutouts .cut .asset { width: 90px; height: 90px; font-size: 72px; line-height: 90px; }
.spot .asset { width: 100%; max-height: 720px; }
.spot .placeholder { height: 600px; }
.spot .counter { display: flex; gap: 12px; justify-content: center; }
.spot .counter span { width: 40px; height: 40px; border-radius: 50%; border: 3px solid var(--primary); }
.pattern { display: flex; align-items: center; gap: 10px; padding: 6px 10px; border: 2px solid var(--secondary); border-radius: 14px; }
.pattern .asset { width: 76px; height: 76px; font-size: 60px; line-height: 76px; }
.pattern .next { width: 84px; height: 84px; border: 3px dashed var(--accent); border-radius: 12px; font-size: 48px; line-height: 78px; text-align: center; color: var(--accent); }
.odd-row { display: flex; justify-content: space-around; padding: 10px; border-bottom: 2px dashed #ccc; }
.odd-row .asset { width: 100px; height: 100px; font-size: 80px; line-height: 100px; }
.sudoku { display: grid; grid-template-columns: repeat(3, 150px); grid-template-rows: repeat(3, 150px); align-self: center; border: 4px solid #333; }
.sudoku .cell { border: 2px solid #333; display: flex; align-items: center; justify-content: center; }
.sudoku .cell .asset { width: 110px; height: 110px; font-size: 88px; line-height: 110px; }
.legend { display: flex; gap: 20px; justify-content: center; }
.legend .asset { width: 60px; height: 60px; font-size: 48px; }
.combo { display: flex; align-items: center; gap: 18px; font-size: 44px; justify-content: center; }
.word-bank { display: flex; gap: 30px; justify-content: center; font-size: 56px; }
"#;

/// Pixel size of the drawn maze
const MAZE_PIXELS: f64 = 600.0;

pub(super) fn maze(out: &mut Markup<'_>, m: &Maze) {
    let cell = MAZE_PIXELS / m.width.max(m.height).max(1) as f64;
    let (w, h) = (cell * m.width as f64, cell * m.height as f64);
    out.open("div", "maze").raw(&format!(
        r#"<svg width="{w:.0}" height="{h:.0}" viewBox="-2 -2 {:.0} {:.0}"><g stroke="var(--accent)" stroke-width="4" stroke-linecap="round">"#,
        w + 4.0,
        h + 4.0
    ));
    for row in 0..m.height {
        for col in 0..m.width {
            let walls = m.walls_at(row, col);
            let (x, y) = (col as f64 * cell, row as f64 * cell);
            // shared walls are drawn once, from the north/west side
            let mut line = |x1: f64, y1: f64, x2: f64, y2: f64| {
                out.raw(&format!(r#"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}"/>"#));
            };
            if walls & WALL_NORTH != 0 {
                line(x, y, x + cell, y);
            }
            if walls & WALL_WEST != 0 {
                line(x, y, x, y + cell);
            }
            if row + 1 == m.height && walls & WALL_SOUTH != 0 {
                line(x, y + cell, x + cell, y + cell);
            }
            if col + 1 == m.width && walls & WALL_EAST != 0 {
                line(x + cell, y, x + cell, y + cell);
            }
        }
    }
    out.raw("</g></svg>")
        .asset(&m.start_picture, "start")
        .asset(&m.end_picture, "end")
        .close("div");
}

pub(super) fn picture_matching(out: &mut Markup<'_>, m: &PictureMatching, kind: WorksheetTypeId) {
    let (left_class, right_class) = match kind {
        WorksheetTypeId::MatchingHalves => ("item half-left", "item half-right"),
        _ => ("item", "item shadow"),
    };
    out.open("div", "pairs").open("div", "column left");
    for picture in &m.left {
        out.open("div", left_class).asset(picture, "").empty("dot").close("div");
    }
    out.close("div").open("div", "column right");
    for picture in &m.right {
        out.open("div", right_class).empty("dot").asset(picture, "").close("div");
    }
    out.close("div").close("div");
}

pub(super) fn sorting(out: &mut Markup<'_>, s: &Sorting) {
    out.open("div", "groups");
    for group in &s.groups {
        out.open("div", "group")
            .asset(&group.sample, "")
            .element("div", "label", &group.label)
            .close("div");
    }
    out.close("div").open("div", "cutouts");
    for item in &s.items {
        out.open("div", "cut").asset(&item.picture, "").close("div");
    }
    out.close("div");
}

pub(super) fn spot_difference(out: &mut Markup<'_>, s: &SpotDifference) {
    out.open("div", "spot").asset(&s.picture, "").open("div", "counter");
    for _ in 0..s.differences {
        out.element("span", "", "");
    }
    out.close("div").close("div");
}

pub(super) fn pattern_rows(out: &mut Markup<'_>, p: &PatternRows) {
    for row in &p.rows {
        out.open("div", "pattern");
        for slot in &row.sequence {
            let picture = match slot {
                PatternSlot::A => &row.slots[0],
                PatternSlot::B => &row.slots[1],
            };
            out.asset(picture, "");
        }
        out.element("span", "next", "?").close("div");
    }
}

pub(super) fn odd_one_out(out: &mut Markup<'_>, o: &OddOneOut) {
    for row in &o.rows {
        out.open("div", "odd-row");
        for item in &row.items {
            out.asset(item, "");
        }
        out.close("div");
    }
}

pub(super) fn logic_grid(out: &mut Markup<'_>, g: &LogicGrid) {
    out.open("div", "legend");
    for symbol in &g.symbols {
        out.asset(symbol, "");
    }
    out.close("div").open("div", "sudoku");
    for (cell, &symbol) in g.grid.iter().enumerate() {
        if g.hidden.contains(&cell) {
            out.empty("cell blank");
        } else {
            out.open("div", "cell");
            if let Some(asset) = g.symbols.get(symbol) {
                out.asset(asset, "");
            }
            out.close("div");
        }
    }
    out.close("div");
}

pub(super) fn shape_synthesis(out: &mut Markup<'_>, s: &ShapeSynthesis) {
    for combo in &s.problems {
        out.open("div", "combo")
            .raw(&shape_svg(combo.parts[0], 90.0, "var(--accent)", "var(--light)", Stroke::Solid))
            .text("+")
            .raw(&shape_svg(combo.parts[1], 90.0, "var(--accent)", "var(--light)", Stroke::Solid))
            .text("=")
            .empty("box")
            .close("div");
    }
    out.open("div", "word-bank");
    for combo in &s.problems {
        out.element("span", "", &combo.glyph);
    }
    out.close("div");
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{count, synth};
    use super::super::LayoutComposer;
    use crate::synth::{ContentBody, WorksheetRequest, WorksheetTypeId};
    use scraper::Html;

    #[test]
    fn pattern_rows_show_six_items_and_a_question() {
        let spec = synth(WorksheetRequest::new(WorksheetTypeId::PatternSequencing), 6);
        let ContentBody::PatternRows(p) = &spec.body else { panic!("wrong body") };
        let doc = LayoutComposer::default().compose(&spec, &spec.theme.palette());
        let html = Html::parse_document(&doc.html);
        assert_eq!(count(&html, ".pattern"), p.rows.len());
        assert_eq!(count(&html, ".pattern .asset"), 6 * p.rows.len());
        assert_eq!(count(&html, ".pattern .next"), p.rows.len());
    }

    #[test]
    fn halves_are_clipped_and_shadows_darkened() {
        let spec = synth(WorksheetRequest::new(WorksheetTypeId::MatchingHalves), 0);
        let doc = LayoutComposer::default().compose(&spec, &spec.theme.palette());
        let html = Html::parse_document(&doc.html);
        assert_eq!(count(&html, ".half-left"), 4);
        assert_eq!(count(&html, ".half-right"), 4);

        let spec = synth(WorksheetRequest::new(WorksheetTypeId::ShadowMatching), 0);
        let doc = LayoutComposer::default().compose(&spec, &spec.theme.palette());
        let html = Html::parse_document(&doc.html);
        assert_eq!(count(&html, ".shadow"), 4);
    }

    #[test]
    fn logic_grid_blanks_hidden_cells() {
        let spec = synth(WorksheetRequest::new(WorksheetTypeId::LogicGrid), 2);
        let doc = LayoutComposer::default().compose(&spec, &spec.theme.palette());
        let html = Html::parse_document(&doc.html);
        assert_eq!(count(&html, ".sudoku .cell"), 9);
        assert_eq!(count(&html, ".sudoku .cell.blank"), 3);
    }

    #[test]
    fn maze_draws_each_wall_once() {
        let spec = synth(WorksheetRequest::new(WorksheetTypeId::Maze), 1);
        let ContentBody::Maze(m) = &spec.body else { panic!("wrong body") };
        let doc = LayoutComposer::default().compose(&spec, &spec.theme.palette());
        let html = Html::parse_document(&doc.html);
        // every wall segment of the grid minus one per opened passage
        let (w, h) = (m.width, m.height);
        let segments = w * (h + 1) + h * (w + 1);
        assert_eq!(count(&html, ".maze line"), segments - (w * h - 1));
    }
}
