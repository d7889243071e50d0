use super::markup::Markup;
use super::shapes::{shape_svg, Stroke};
use crate::synth::{Coloring, CreativePrompt, LineKind, ShapePath, ShapeTracing, TraceLines};

pub(super) const CSS: &str = r#"
.trace-line { display: flex; align-items: center; gap: 8px; height: 150px; }
.trace-line .asset { width: 90px; height: 90px; font-size: 72px; line-height: 90px; }
.trace-line svg { flex: 1; height: 120px; }
.shape-model { display: flex; align-items: center; gap: 24px; }
.shape-model .asset { width: 110px; height: 110px; font-size: 88px; }
.shape-grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 18px; justify-items: center; }
.draw-box { flex: 1; min-height: 220px; border: 3px dashed var(--secondary); border-radius: 18px; }
.coloring { display: flex; flex-direction: column; flex: 1; gap: 14px; }
.coloring .art { width: 100%; flex: 1; max-height: 760px; }
.coloring.with-draw .art { max-height: 440px; }
.prompt { display: flex; flex-direction: column; gap: 14px; flex: 1; }
.prompt .art { width: 100%; max-height: 600px; }
.prompt .caption { font-size: 26px; text-align: center; color: var(--accent); }
.prompt .lines div { height: 46px; border-bottom: 2px solid #999; }
.path-grid { display: grid; gap: 6px; align-self: center; }
.path-grid .cell { display: flex; align-items: center; justify-content: center; border: 2px solid #ddd; border-radius: 10px; }
.path-ends { display: flex; justify-content: space-between; font-size: 22px; color: var(--accent); }
"#;

/// SVG path across a 600×100 strip for one trace row
fn line_path(kind: LineKind) -> String {
    match kind {
        LineKind::Straight => "M 10 50 L 590 50".to_string(),
        LineKind::Wavy => {
            let mut d = String::from("M 10 50");
            let mut x = 10.0;
            let mut up = true;
            while x < 580.0 {
                let y = if up { 10.0 } else { 90.0 };
                d.push_str(&format!(" Q {:.0} {:.0} {:.0} 50", x + 36.0, y, x + 72.0));
                x += 72.0;
                up = !up;
            }
            d
        }
        LineKind::Zigzag => {
            let mut d = String::from("M 10 80");
            let mut x = 10.0;
            let mut top = true;
            while x < 570.0 {
                x += 48.0;
                d.push_str(&format!(" L {:.0} {}", x, if top { 20 } else { 80 }));
                top = !top;
            }
            d
        }
        LineKind::Loop => {
            let mut d = String::from("M 10 70");
            let mut x = 10.0;
            while x < 560.0 {
                d.push_str(&format!(
                    " C {:.0} 70 {:.0} 10 {:.0} 30 C {:.0} 50 {:.0} 70 {:.0} 70",
                    x + 40.0,
                    x + 70.0,
                    x + 50.0,
                    x + 40.0,
                    x + 60.0,
                    x + 80.0
                ));
                x += 80.0;
            }
            d
        }
    }
}

pub(super) fn trace_lines(out: &mut Markup<'_>, t: &TraceLines) {
    let path = line_path(t.line);
    for row in &t.rows {
        out.open("div", "trace-line")
            .asset(&row.start, "")
            .raw(&format!(
                r##"<svg viewBox="0 0 600 100" preserveAspectRatio="none"><path d="{path}" fill="none" stroke="#9e9e9e" stroke-width="5" stroke-dasharray="10 8" stroke-linecap="round"/></svg>"##
            ))
            .asset(&row.end, "")
            .close("div");
    }
}

pub(super) fn shape_tracing(out: &mut Markup<'_>, s: &ShapeTracing) {
    out.open("div", "shape-model")
        .raw(&shape_svg(s.shape, 140.0, "var(--primary)", "var(--light)", Stroke::Solid))
        .asset(&s.picture, "")
        .close("div");
    out.open("div", "shape-grid");
    for _ in 0..s.repeats {
        out.raw(&shape_svg(s.shape, 150.0, "#9e9e9e", "none", Stroke::Dashed));
    }
    out.close("div");
    out.empty("draw-box");
}

pub(super) fn coloring(out: &mut Markup<'_>, c: &Coloring) {
    let class = if c.draw_area { "coloring with-draw" } else { "coloring" };
    out.open("div", class).asset(&c.art, "art");
    if c.draw_area {
        out.empty("draw-box");
    }
    out.close("div");
}

pub(super) fn creative_prompt(out: &mut Markup<'_>, p: &CreativePrompt) {
    out.open("div", "prompt")
        .asset(&p.art, "art")
        .element("div", "caption", &p.caption)
        .open("div", "lines");
    for _ in 0..3 {
        out.empty("");
    }
    out.close("div").close("div");
}

pub(super) fn shape_path(out: &mut Markup<'_>, s: &ShapePath) {
    let cell = 96;
    let style = format!(
        "grid-template-columns: repeat({n}, {cell}px); grid-template-rows: repeat({n}, {cell}px);",
        n = s.size
    );
    out.open("div", "path-ends")
        .element("span", "", "Start →")
        .element("span", "", "→ Finish")
        .close("div");
    out.open_with("div", "path-grid", &[("style", &style)]);
    for kind in &s.cells {
        out.open("div", "cell")
            .raw(&shape_svg(*kind, 64.0, "#333", "none", Stroke::Solid))
            .close("div");
    }
    out.close("div");
}
