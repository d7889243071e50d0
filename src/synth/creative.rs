//! Fine-motor and open-ended drawing worksheets

use super::spec::*;
use super::{ContentSpec, Registry, SynthContext, WorksheetRequest, WorksheetTypeId};
use crate::error::{Error, Result};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

pub(crate) fn register(reg: &mut Registry) {
    reg.register(WorksheetTypeId::TraceLines, trace_lines);
    reg.register(WorksheetTypeId::ShapeTracing, shape_tracing);
    reg.register(WorksheetTypeId::ColoringPage, coloring_page);
    reg.register(WorksheetTypeId::CreativePrompt, creative_prompt);
    reg.register(WorksheetTypeId::TraceAndDraw, trace_and_draw);
    reg.register(WorksheetTypeId::ShapePath, shape_path);
}

pub const TRACE_ROWS: usize = 4;
pub const PATH_GRID: usize = 6;

/// Shapes children trace; also the alphabet of the shape path grid
pub const TRACEABLE_SHAPES: [ShapeKind; 6] = [
    ShapeKind::Circle,
    ShapeKind::Square,
    ShapeKind::Triangle,
    ShapeKind::Star,
    ShapeKind::Heart,
    ShapeKind::Rectangle,
];

fn traceable(req: &WorksheetRequest, rng: &mut dyn RngCore) -> Result<ShapeKind> {
    match req.text("shape") {
        Some(name) => ShapeKind::parse(name)
            .filter(|s| TRACEABLE_SHAPES.contains(s))
            .ok_or_else(|| Error::InvalidRequest(format!("cannot trace shape {name:?}"))),
        None => Ok(*TRACEABLE_SHAPES.choose(rng).unwrap_or(&ShapeKind::Circle)),
    }
}

fn trace_lines(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let line = match req.text("line") {
        Some(name) => LineKind::parse(name).ok_or_else(|| Error::InvalidRequest(format!("unknown line {name:?}")))?,
        None => *LineKind::ALL.choose(rng).unwrap_or(&LineKind::Straight),
    };
    let mut pictures = ctx.pictures(TRACE_ROWS * 2, rng);
    let ends = pictures.split_off(TRACE_ROWS);
    let rows = pictures
        .into_iter()
        .zip(ends)
        .map(|(start, end)| TraceRow { start, end })
        .collect();
    Ok(ctx.page(
        WorksheetTypeId::TraceLines,
        "Trace the Lines",
        "Start at the dot and trace each line from left to right.",
        ContentBody::TraceLines(TraceLines { line, rows }),
        rng,
    ))
}

fn shape_tracing(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let shape = traceable(req, rng)?;
    let body = ContentBody::ShapeTracing(ShapeTracing {
        shape,
        repeats: 6,
        picture: ctx.catalog.character(ctx.theme),
    });
    Ok(ctx.page(
        WorksheetTypeId::ShapeTracing,
        format!("Trace the {}", title_case(shape.name())),
        format!("Trace each {} carefully, then draw one on your own.", shape.name()),
        body,
        rng,
    ))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|c| c.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default()
}

fn coloring_page(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let art = ctx.catalog.line_art(ctx.theme, rng);
    Ok(ctx.page(
        WorksheetTypeId::ColoringPage,
        "Color Me In",
        "Use your favorite colors to finish the picture.",
        ContentBody::Coloring(Coloring { art, draw_area: false }),
        rng,
    ))
}

fn trace_and_draw(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let art = ctx.catalog.line_art(ctx.theme, rng);
    Ok(ctx.page(
        WorksheetTypeId::TraceAndDraw,
        "Trace and Draw",
        "Trace the picture, then draw your own in the empty box.",
        ContentBody::Coloring(Coloring { art, draw_area: true }),
        rng,
    ))
}

fn creative_prompt(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let prompt = match req.text("prompt") {
        Some("blank_sign") | Some("blank-sign") => PromptKind::BlankSign,
        Some("halfbody") => PromptKind::Halfbody,
        Some(other) => return Err(Error::InvalidRequest(format!("unknown prompt {other:?}"))),
        None => {
            if rng.random_bool(0.5) {
                PromptKind::BlankSign
            } else {
                PromptKind::Halfbody
            }
        }
    };
    let caption = match prompt {
        PromptKind::BlankSign => "What would you write on the sign?",
        PromptKind::Halfbody => "Finish the drawing! What does the rest look like?",
    };
    let art = ctx.catalog.creative_prompt(ctx.theme, prompt.as_str(), rng);
    Ok(ctx.page(
        WorksheetTypeId::CreativePrompt,
        "Imagine and Draw",
        caption,
        ContentBody::CreativePrompt(CreativePrompt {
            prompt,
            art,
            caption: caption.to_string(),
        }),
        rng,
    ))
}

/// Walk from the left edge to the right edge, only ever moving right or
/// vertically within a column.
pub fn monotone_walk(rng: &mut dyn RngCore, size: usize) -> Vec<(usize, usize)> {
    if size == 0 {
        return Vec::new();
    }
    let max = size as i64 - 1;
    let mut row = rng.random_range(0..size);
    let mut path = Vec::with_capacity(size * 2);
    for col in 0..size {
        let target = (row as i64 + rng.random_range(-2..=2i64)).clamp(0, max) as usize;
        path.push((row, col));
        while row != target {
            row = if target > row { row + 1 } else { row - 1 };
            path.push((row, col));
        }
    }
    path
}

fn shape_path(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let target = traceable(req, rng)?;
    let path = monotone_walk(rng, PATH_GRID);
    let distractors: Vec<ShapeKind> = TRACEABLE_SHAPES.iter().copied().filter(|s| *s != target).collect();

    let mut cells = Vec::with_capacity(PATH_GRID * PATH_GRID);
    for row in 0..PATH_GRID {
        for col in 0..PATH_GRID {
            if path.contains(&(row, col)) {
                cells.push(target);
            } else {
                cells.push(*distractors.choose(rng).unwrap_or(&ShapeKind::Square));
            }
        }
    }

    Ok(ctx.page(
        WorksheetTypeId::ShapePath,
        format!("Follow the {}s", title_case(target.name())),
        format!("Color the {}s to make a path from left to right.", target.name()),
        ContentBody::ShapePath(ShapePath {
            size: PATH_GRID,
            target,
            cells,
            path,
        }),
        rng,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{empty_catalog, rng};
    use super::*;
    use crate::catalog::AssetRef;

    fn run(req: WorksheetRequest, seed: u64) -> Result<ContentSpec> {
        Registry::standard().synthesize(&req, &empty_catalog(), &mut rng(seed))
    }

    #[test]
    fn walk_spans_the_grid_without_going_back() {
        for seed in 0..50 {
            let path = monotone_walk(&mut rng(seed), 6);
            assert_eq!(path.first().map(|p| p.1), Some(0));
            assert_eq!(path.last().map(|p| p.1), Some(5));
            for step in path.windows(2) {
                let (a, b) = (step[0], step[1]);
                let dr = a.0.abs_diff(b.0);
                let dc = b.1 as i64 - a.1 as i64;
                assert!((dr == 1 && dc == 0) || (dr == 0 && dc == 1), "{a:?} -> {b:?}");
            }
        }
    }

    #[test]
    fn shape_path_marks_the_walk() {
        let req = WorksheetRequest::new(WorksheetTypeId::ShapePath).with("shape", "heart");
        let ContentBody::ShapePath(sp) = run(req, 4).unwrap().body else { panic!("wrong body") };
        assert_eq!(sp.target, ShapeKind::Heart);
        for row in 0..sp.size {
            for col in 0..sp.size {
                let on_path = sp.path.contains(&(row, col));
                assert_eq!(sp.cells[row * sp.size + col] == ShapeKind::Heart, on_path);
            }
        }
    }

    #[test]
    fn untraceable_shapes_are_rejected() {
        let req = WorksheetRequest::new(WorksheetTypeId::ShapeTracing).with("shape", "oval");
        assert!(matches!(run(req, 0), Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn trace_lines_honours_requested_kind() {
        let req = WorksheetRequest::new(WorksheetTypeId::TraceLines).with("line", "zigzag");
        let ContentBody::TraceLines(t) = run(req, 1).unwrap().body else { panic!("wrong body") };
        assert_eq!(t.line, LineKind::Zigzag);
        assert_eq!(t.rows.len(), TRACE_ROWS);
    }

    #[test]
    fn coloring_without_art_is_a_placeholder() {
        let ContentBody::Coloring(c) = run(WorksheetRequest::new(WorksheetTypeId::TraceAndDraw), 0).unwrap().body
        else {
            panic!("wrong body")
        };
        assert_eq!(c.art, AssetRef::Missing);
        assert!(c.draw_area);
    }
}
