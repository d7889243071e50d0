use std::fs;
use std::path::PathBuf;

use kidsheet::catalog::FsAssetCatalog;
use kidsheet::layout::{AssetResolver, LayoutComposer};
use kidsheet::synth::{Bond, BondPart, ContentBody, NumberBonds, PageDecor, TenFrame, TenFrames};
use kidsheet::{AssetRef, ContentSpec, Registry, Theme, WorksheetRequest, WorksheetTypeId};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(format!("{}.sha256", name));
    p
}

/// Seeded document for `kind` with an empty catalog, so every picture falls
/// back to a glyph
fn fingerprint(kind: WorksheetTypeId, seed: u64) -> String {
    let catalog = FsAssetCatalog::new("/nonexistent/kidsheet-golden-assets");
    let request = WorksheetRequest::new(kind).with_theme("ocean");
    let spec = Registry::standard()
        .synthesize(&request, &catalog, &mut StdRng::seed_from_u64(seed))
        .expect("synthesize");
    LayoutComposer::new(AssetResolver::relative())
        .compose(&spec, &spec.theme.palette())
        .fingerprint()
}

#[test]
fn seeded_documents_match_goldens() {
    for kind in WorksheetTypeId::ALL {
        let actual = fingerprint(kind, 2024);
        let expected_path = golden_path(kind.as_str());

        if std::env::var("UPDATE_GOLDENS").is_ok() {
            fs::create_dir_all("tests/goldens/expected").ok();
            fs::write(&expected_path, &actual).expect("write golden");
            println!("Updated golden: {:?}", expected_path);
            continue;
        }

        if !expected_path.exists() {
            println!(
                "No golden at {:?}; run with UPDATE_GOLDENS=1 to create it. Skipping.",
                expected_path
            );
            continue;
        }

        let expected = fs::read_to_string(&expected_path).expect("unable to read golden");
        assert_eq!(actual, expected.trim(), "{}", kind);
    }
}

#[test]
fn fingerprints_depend_on_the_seed() {
    let a = fingerprint(WorksheetTypeId::Maze, 1);
    assert_eq!(a, fingerprint(WorksheetTypeId::Maze, 1));
    assert_ne!(a, fingerprint(WorksheetTypeId::Maze, 2));
}

/// Markup between `<main class="body">` and its closing tag
fn body_of(kind: WorksheetTypeId, body: ContentBody) -> String {
    let spec = ContentSpec {
        kind,
        title: "Golden".into(),
        instructions: "Fixed content".into(),
        theme: Theme::Ocean,
        decor: PageDecor::default(),
        body,
    };
    let html = LayoutComposer::new(AssetResolver::relative())
        .compose(&spec, &spec.theme.palette())
        .html;
    let open = "<main class=\"body\">";
    let start = html.find(open).expect("page body") + open.len();
    let end = start + html[start..].find("</main>").expect("closed page body");
    html[start..end].to_string()
}

fn expected_body(name: &str) -> String {
    let path = PathBuf::from("tests/goldens/expected").join(format!("{}.body.html", name));
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("unable to read {:?}: {}", path, e))
        .trim_end()
        .to_string()
}

#[test]
fn number_bond_markup_matches_golden() {
    let body = ContentBody::NumberBonds(NumberBonds {
        whole: 10,
        bonds: vec![
            Bond { parts: [3, 7], hidden: BondPart::Second, answer: 7 },
            Bond { parts: [6, 4], hidden: BondPart::First, answer: 6 },
        ],
    });
    assert_eq!(body_of(WorksheetTypeId::NumberBonds, body), expected_body("number-bonds"));
}

#[test]
fn ten_frame_markup_matches_golden() {
    let body = ContentBody::TenFrames(TenFrames {
        frames: vec![
            TenFrame { picture: AssetRef::Glyph("🐟".into()), count: 3 },
            TenFrame { picture: AssetRef::Image("/uploads/bigpng/fish.png".into()), count: 1 },
        ],
    });
    assert_eq!(body_of(WorksheetTypeId::TenFrame, body), expected_body("ten-frames"));
}
