use super::markup::Markup;
use super::shapes::{shape_svg, Stroke};
use crate::synth::{
    AnswerMode, BondPart, Comparison, Counting, DotToDot, NumberBonds, NumberSequences, NumberTracing,
    PictureAddition, PictureSubtraction, ShapeCount, TenFrames,
};

pub(super) const CSS: &str = r#"
.number-row { display: flex; align-items: center; gap: 14px; border-bottom: 2px dashed #bbb; padding: 4px 0; }
.number-row .trace { font-size: 64px; width: 64px; text-align: center; }
.number-row .pics { display: flex; flex-wrap: wrap; gap: 4px; flex: 1; }
.pics .asset { width: 36px; height: 36px; font-size: 30px; line-height: 36px; }
.count-row { display: flex; align-items: center; gap: 16px; padding: 8px 12px; border: 2px solid var(--secondary); border-radius: 14px; }
.count-row .pics { display: flex; flex-wrap: wrap; gap: 6px; flex: 1; }
.count-row .pics .asset { width: 44px; height: 44px; font-size: 36px; line-height: 44px; }
.options { display: flex; gap: 14px; }
.option { width: 48px; height: 48px; border-radius: 50%; border: 3px solid var(--primary); font-size: 28px; line-height: 42px; text-align: center; }
.dots { position: relative; width: 620px; height: 620px; align-self: center; }
.dots svg { width: 100%; height: 100%; }
.dots .helper { position: absolute; right: -20px; bottom: -10px; width: 110px; height: 110px; font-size: 90px; }
.compare-row { display: flex; align-items: center; justify-content: space-between; gap: 18px; }
.compare-row .group { display: flex; flex-wrap: wrap; gap: 4px; width: 300px; min-height: 84px; padding: 8px; border: 3px solid var(--secondary); border-radius: 14px; }
.compare-row .vs { font-size: 28px; color: var(--accent); }
.bonds { display: grid; grid-template-columns: repeat(4, 1fr); gap: 18px; }
.bond { display: flex; flex-direction: column; align-items: center; gap: 10px; }
.bond .whole, .bond .part { width: 64px; height: 64px; border-radius: 50%; border: 3px solid var(--primary); font-size: 30px; line-height: 58px; text-align: center; }
.bond .whole { background: var(--light); }
.bond .parts { display: flex; gap: 20px; }
.frames { display: grid; grid-template-columns: repeat(2, 1fr); gap: 24px; }
.frame { display: grid; grid-template-columns: repeat(5, 52px); grid-template-rows: repeat(2, 52px); border: 3px solid #333; width: max-content; }
.frame .slot { border: 1px solid #333; display: flex; align-items: center; justify-content: center; }
.frame .slot .asset { width: 42px; height: 42px; font-size: 34px; }
.sum { display: flex; align-items: center; gap: 12px; font-size: 38px; }
.sum .pics { display: flex; flex-wrap: wrap; gap: 4px; max-width: 220px; }
.shape-canvas { position: relative; align-self: center; border: 3px solid var(--secondary); border-radius: 14px; }
.shape-canvas .shape { position: absolute; }
.tallies { display: flex; justify-content: space-around; }
.tally { display: flex; flex-direction: column; align-items: center; gap: 6px; }
.subtract .item { position: relative; }
.subtract .item.crossed::after { content: ''; position: absolute; left: -4px; right: -4px; top: 50%; border-top: 4px solid #d32f2f; transform: rotate(-35deg); }
.sequence-row { display: flex; gap: 14px; justify-content: center; }
.sequence-row .number, .sequence-row .box { width: 80px; height: 72px; font-size: 40px; line-height: 66px; text-align: center; border: 3px solid var(--secondary); border-radius: 12px; }
"#;

pub(super) fn number_tracing(out: &mut Markup<'_>, n: &NumberTracing) {
    for (number, picture) in n.numbers.iter().zip(&n.pictures) {
        out.open("div", "number-row")
            .element("span", "trace", &number.to_string())
            .element("span", "trace", &number.to_string())
            .open("div", "pics")
            .assets(picture, *number, "")
            .close("div")
            .empty("box")
            .close("div");
    }
}

pub(super) fn counting(out: &mut Markup<'_>, c: &Counting) {
    for row in &c.rows {
        out.open_with("div", "count-row", &[("data-count", &row.count.to_string())])
            .open("div", "pics")
            .assets(&row.picture, row.count, "")
            .close("div")
            .open("div", "options");
        for option in row.options {
            out.element("span", "option", &option.to_string());
        }
        out.close("div");
        if c.mode == AnswerMode::Write {
            out.empty("box");
        }
        out.close("div");
    }
}

pub(super) fn dot_to_dot(out: &mut Markup<'_>, d: &DotToDot) {
    out.open("div", "dots")
        .raw(r#"<svg viewBox="0 0 100 100" xmlns="http://www.w3.org/2000/svg">"#);
    for dot in &d.dots {
        out.raw(&format!(
            r##"<circle class="dot" cx="{:.2}" cy="{:.2}" r="0.9" fill="#222"/><text x="{:.2}" y="{:.2}" font-size="2.6">{}</text>"##,
            dot.x,
            dot.y,
            dot.x + 1.2,
            dot.y - 1.2,
            dot.number
        ));
    }
    out.raw("</svg>").asset(&d.character, "helper").close("div");
}

pub(super) fn comparison(out: &mut Markup<'_>, c: &Comparison) {
    for row in &c.rows {
        out.open("div", "compare-row")
            .open("div", "group left")
            .assets(&row.picture, row.left, "")
            .close("div")
            .element("span", "vs", "or")
            .open("div", "group right")
            .assets(&row.picture, row.right, "")
            .close("div")
            .close("div");
    }
}

pub(super) fn number_bonds(out: &mut Markup<'_>, nb: &NumberBonds) {
    out.open("div", "bonds");
    for bond in &nb.bonds {
        out.open("div", "bond")
            .element("div", "whole", &nb.whole.to_string())
            .open("div", "parts");
        for (part, value) in [(BondPart::First, bond.parts[0]), (BondPart::Second, bond.parts[1])] {
            if part == bond.hidden {
                out.empty("part hidden");
            } else {
                out.element("div", "part", &value.to_string());
            }
        }
        out.close("div").close("div");
    }
    out.close("div");
}

pub(super) fn ten_frames(out: &mut Markup<'_>, t: &TenFrames) {
    out.open("div", "frames");
    for frame in &t.frames {
        out.open("div", "frame-block").open("div", "frame");
        for slot in 0..10 {
            out.open("div", "slot");
            if slot < frame.count {
                out.asset(&frame.picture, "");
            }
            out.close("div");
        }
        out.close("div").empty("box").close("div");
    }
    out.close("div");
}

pub(super) fn picture_addition(out: &mut Markup<'_>, p: &PictureAddition) {
    for problem in &p.problems {
        out.open("div", "sum")
            .open("div", "pics")
            .assets(&problem.picture, problem.a, "")
            .close("div")
            .text("+")
            .open("div", "pics")
            .assets(&problem.picture, problem.b, "")
            .close("div")
            .text("=")
            .empty("box")
            .close("div");
    }
}

pub(super) fn shape_count(out: &mut Markup<'_>, s: &ShapeCount) {
    let canvas = format!("width: {:.0}px; height: {:.0}px;", s.region.width, s.region.height);
    out.open_with("div", "shape-canvas", &[("style", &canvas)]);
    let half = s.shape_size / 2.0;
    for shape in &s.shapes {
        let pos = format!("left: {:.1}px; top: {:.1}px;", shape.x - half, shape.y - half);
        out.open_with("div", "placed", &[("style", &pos)])
            .raw(&shape_svg(shape.kind, s.shape_size, "#333", "none", Stroke::Solid))
            .close("div");
    }
    out.close("div");

    out.open("div", "tallies");
    for tally in &s.tallies {
        out.open("div", "tally")
            .raw(&shape_svg(tally.kind, 40.0, "#333", "none", Stroke::Solid))
            .empty("box")
            .close("div");
    }
    out.close("div");
}

pub(super) fn picture_subtraction(out: &mut Markup<'_>, p: &PictureSubtraction) {
    for problem in &p.problems {
        out.open("div", "sum subtract").open("div", "pics");
        for i in 0..problem.total {
            let class = if i < problem.subtract { "item crossed" } else { "item" };
            out.open("span", class).asset(&problem.picture, "").close("span");
        }
        out.close("div")
            .text(&format!("{} − {} =", problem.total, problem.subtract))
            .empty("box")
            .close("div");
    }
}

pub(super) fn number_sequences(out: &mut Markup<'_>, n: &NumberSequences) {
    for row in &n.rows {
        out.open("div", "sequence-row");
        for (i, number) in row.numbers.iter().enumerate() {
            if row.hidden.contains(&i) {
                out.empty("box");
            } else {
                out.element("span", "number", &number.to_string());
            }
        }
        out.close("div");
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{count, synth};
    use super::super::LayoutComposer;
    use crate::synth::{ContentBody, WorksheetRequest, WorksheetTypeId};
    use scraper::{Html, Selector};

    #[test]
    fn crossed_out_pictures_match_the_subtraction() {
        for seed in 0..10 {
            let spec = synth(WorksheetRequest::new(WorksheetTypeId::PictureSubtraction).with("total", 6), seed);
            let ContentBody::PictureSubtraction(ps) = &spec.body else { panic!("wrong body") };
            let doc = LayoutComposer::default().compose(&spec, &spec.theme.palette());
            let html = Html::parse_document(&doc.html);

            let problems: Vec<_> = html.select(&Selector::parse(".subtract").unwrap()).collect();
            assert_eq!(problems.len(), ps.problems.len());
            let crossed = Selector::parse(".item.crossed").unwrap();
            let plain = Selector::parse(".item:not(.crossed)").unwrap();
            for (el, problem) in problems.iter().zip(&ps.problems) {
                assert_eq!(el.select(&crossed).count() as u32, problem.subtract);
                assert_eq!(el.select(&plain).count() as u32, problem.result);
            }
        }
    }

    #[test]
    fn counting_rows_show_three_options_and_the_true_count() {
        let spec = synth(WorksheetRequest::new(WorksheetTypeId::CountingObjects), 4);
        let ContentBody::Counting(c) = &spec.body else { panic!("wrong body") };
        let doc = LayoutComposer::default().compose(&spec, &spec.theme.palette());
        let html = Html::parse_document(&doc.html);

        let rows: Vec<_> = html.select(&Selector::parse(".count-row").unwrap()).collect();
        assert_eq!(rows.len(), 4);
        let option = Selector::parse(".option").unwrap();
        let pic = Selector::parse(".pics .asset").unwrap();
        for (el, row) in rows.iter().zip(&c.rows) {
            let options: Vec<String> = el.select(&option).map(|o| o.text().collect()).collect();
            assert_eq!(options.len(), 3);
            assert_eq!(options.iter().filter(|o| **o == row.count.to_string()).count(), 1);
            assert_eq!(el.select(&pic).count() as u32, row.count);
        }
    }

    #[test]
    fn hidden_bond_parts_are_blank() {
        let spec = synth(WorksheetRequest::new(WorksheetTypeId::NumberBonds), 1);
        let doc = LayoutComposer::default().compose(&spec, &spec.theme.palette());
        let html = Html::parse_document(&doc.html);
        assert_eq!(count(&html, ".bond"), 8);
        assert_eq!(count(&html, ".bond .part.hidden"), 8);
        assert_eq!(count(&html, ".bond .part"), 16);
    }

    #[test]
    fn every_placed_shape_is_drawn() {
        let spec = synth(WorksheetRequest::new(WorksheetTypeId::CountShapes), 8);
        let ContentBody::ShapeCount(sc) = &spec.body else { panic!("wrong body") };
        let doc = LayoutComposer::default().compose(&spec, &spec.theme.palette());
        let html = Html::parse_document(&doc.html);
        assert_eq!(count(&html, ".shape-canvas .placed svg"), sc.shapes.len());
        assert_eq!(count(&html, ".tally"), 5);
    }
}
