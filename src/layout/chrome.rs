//! Page chrome shared by every worksheet: stylesheet, name/date header,
//! title row, divider, safe area and border stickers

use super::markup::Markup;
use crate::catalog::{AssetRef, ThemePalette};
use crate::synth::ContentSpec;

pub const PAGE_WIDTH: u32 = 816;
pub const PAGE_HEIGHT: u32 = 1056;
/// Inset of the printable area from every page edge
pub const SAFE_MARGIN: u32 = 48;

const FONT_URL: &str = "https://fonts.googleapis.com/css2?family=Andika:wght@400;700&display=swap";

/// Sticker slots around the safe area as (left, top) in page pixels
const STICKER_SLOTS: [(u32, u32); 8] = [
    (6, 6),
    (766, 6),
    (6, 1006),
    (766, 1006),
    (386, 2),
    (386, 1010),
    (2, 506),
    (770, 506),
];

const BASE_CSS: &str = r#"
@page { size: 816px 1056px; margin: 0; }
* { box-sizing: border-box; }
html, body { margin: 0; padding: 0; width: 816px; height: 1056px; overflow: hidden; background: #fff; }
body { font-family: 'Andika', 'Comic Sans MS', sans-serif; color: #222; }
.page { position: relative; width: 816px; height: 1056px; }
.safe-area { position: absolute; left: 48px; top: 48px; right: 48px; bottom: 48px; display: flex; flex-direction: column; }
.header { display: flex; justify-content: space-between; font-size: 18px; margin-bottom: 12px; }
.header .field { display: flex; gap: 8px; align-items: flex-end; }
.header .line { display: inline-block; width: 220px; border-bottom: 2px solid #444; height: 22px; }
.title-row { display: flex; align-items: center; gap: 12px; }
.title-row h1 { margin: 0; font-size: 34px; color: var(--accent); }
.title-icon { width: 52px; height: 52px; font-size: 44px; line-height: 52px; text-align: center; }
.divider { height: 5px; border-radius: 3px; background: var(--primary); margin: 10px 0 12px; }
.instructions { font-size: 19px; margin: 0 0 14px; padding: 8px 12px; border-radius: 10px; background: var(--light); }
.body { flex: 1; position: relative; display: flex; flex-direction: column; gap: 12px; overflow: hidden; }
.sticker-slot { position: absolute; width: 40px; height: 40px; }
.sticker { width: 40px; height: 40px; font-size: 32px; line-height: 40px; text-align: center; object-fit: contain; }
.asset { object-fit: contain; }
.glyph { display: inline-block; text-align: center; }
.placeholder { display: inline-block; border: 2px dashed #ccc; border-radius: 8px; background: #fafafa; }
.box { display: inline-block; width: 56px; height: 56px; border: 3px solid var(--secondary); border-radius: 10px; background: #fff; }
.trace { color: transparent; -webkit-text-stroke: 2px #b5b5b5; }
.row { display: flex; align-items: center; gap: 10px; }
"#;

/// Write the full page around `body`.
pub(super) fn page(out: &mut Markup<'_>, spec: &ContentSpec, palette: &ThemePalette, body_css: &str, body: &str) {
    out.raw("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">")
        .open("title", "")
        .text(&spec.title)
        .close("title")
        .open_with("link", "", &[("rel", "stylesheet"), ("href", FONT_URL)])
        .raw("<style>");
    out.raw(&format!(
        ":root {{ --primary: {}; --secondary: {}; --accent: {}; --light: {}; }}",
        palette.primary, palette.secondary, palette.accent, palette.light
    ))
    .raw(BASE_CSS)
    .raw(body_css)
    .raw("</style></head><body>");

    let page_class = format!("page kind-{} theme-{}", spec.kind, spec.theme);
    out.open("div", &page_class);
    stickers(out, &spec.decor.stickers);

    out.open("div", "safe-area");
    header(out);
    out.open("div", "title-row");
    out.asset(&spec.decor.title_icon, "title-icon");
    out.element("h1", "title", &spec.title);
    out.close("div");
    out.empty("divider");
    out.element("p", "instructions", &spec.instructions);
    out.open("main", "body").raw(body).close("main");
    out.close("div");

    out.close("div").raw("</body></html>");
}

fn header(out: &mut Markup<'_>) {
    out.open("div", "header");
    for label in ["Name:", "Date:"] {
        out.open("div", "field")
            .element("span", "label", label)
            .element("span", "line", "")
            .close("div");
    }
    out.close("div");
}

fn stickers(out: &mut Markup<'_>, stickers: &[AssetRef]) {
    for (sticker, (left, top)) in stickers.iter().zip(STICKER_SLOTS) {
        if sticker.is_missing() {
            continue;
        }
        let style = format!("left: {left}px; top: {top}px;");
        out.open_with("div", "sticker-slot", &[("style", &style)])
            .asset(sticker, "sticker")
            .close("div");
    }
}
