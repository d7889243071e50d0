//! Layout composition
//!
//! Turns a resolved [`ContentSpec`] and a [`ThemePalette`] into a complete
//! HTML document sized for one 816×1056 page. Composition is a pure
//! function: it draws no random numbers, never fails, and renders absent
//! assets as placeholder boxes.

mod chrome;
mod creative;
mod literacy;
mod logic;
pub mod markup;
mod math;
pub mod shapes;

pub use chrome::{PAGE_HEIGHT, PAGE_WIDTH, SAFE_MARGIN};

use crate::catalog::ThemePalette;
use crate::synth::{Category, ContentBody, ContentSpec};
use markup::Markup;
use sha2::{Digest, Sha256};
use url::Url;

/// A composed page ready to load into a canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub html: String,
}

impl Document {
    /// Hex SHA-256 of the markup; equal inputs give equal fingerprints
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.html.as_bytes()))
    }
}

/// Turns catalog paths into URLs the rendering engine can fetch
#[derive(Debug, Clone, Default)]
pub struct AssetResolver {
    base: Option<Url>,
}

impl AssetResolver {
    /// Resolve rooted paths against `base`, e.g. `http://localhost:3001/`
    pub fn new(base: Url) -> Self {
        Self { base: Some(base) }
    }

    /// Leave paths untouched
    pub fn relative() -> Self {
        Self { base: None }
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("data:") || path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        match &self.base {
            Some(base) => base
                .join(path)
                .map(String::from)
                .unwrap_or_else(|_| path.to_string()),
            None => path.to_string(),
        }
    }
}

/// Composes worksheet pages
#[derive(Debug, Clone, Default)]
pub struct LayoutComposer {
    resolver: AssetResolver,
}

impl LayoutComposer {
    pub fn new(resolver: AssetResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    pub fn compose(&self, spec: &ContentSpec, palette: &ThemePalette) -> Document {
        let mut body = Markup::new(&self.resolver);
        match &spec.body {
            ContentBody::LetterTracing(b) => literacy::letter_tracing(&mut body, b),
            ContentBody::LetterGrid(b) => literacy::letter_grid(&mut body, b),
            ContentBody::NameTracing(b) => literacy::name_tracing(&mut body, b),
            ContentBody::AlphabetSequences(b) => literacy::alphabet_sequences(&mut body, b),
            ContentBody::LetterMatching(b) => literacy::letter_matching(&mut body, b),
            ContentBody::CvcWords(b) => literacy::cvc_words(&mut body, b),
            ContentBody::NumberTracing(b) => math::number_tracing(&mut body, b),
            ContentBody::Counting(b) => math::counting(&mut body, b),
            ContentBody::DotToDot(b) => math::dot_to_dot(&mut body, b),
            ContentBody::Comparison(b) => math::comparison(&mut body, b),
            ContentBody::NumberBonds(b) => math::number_bonds(&mut body, b),
            ContentBody::TenFrames(b) => math::ten_frames(&mut body, b),
            ContentBody::PictureAddition(b) => math::picture_addition(&mut body, b),
            ContentBody::ShapeCount(b) => math::shape_count(&mut body, b),
            ContentBody::PictureSubtraction(b) => math::picture_subtraction(&mut body, b),
            ContentBody::NumberSequences(b) => math::number_sequences(&mut body, b),
            ContentBody::Maze(b) => logic::maze(&mut body, b),
            ContentBody::PictureMatching(b) => logic::picture_matching(&mut body, b, spec.kind),
            ContentBody::Sorting(b) => logic::sorting(&mut body, b),
            ContentBody::SpotDifference(b) => logic::spot_difference(&mut body, b),
            ContentBody::PatternRows(b) => logic::pattern_rows(&mut body, b),
            ContentBody::OddOneOut(b) => logic::odd_one_out(&mut body, b),
            ContentBody::LogicGrid(b) => logic::logic_grid(&mut body, b),
            ContentBody::ShapeSynthesis(b) => logic::shape_synthesis(&mut body, b),
            ContentBody::TraceLines(b) => creative::trace_lines(&mut body, b),
            ContentBody::ShapeTracing(b) => creative::shape_tracing(&mut body, b),
            ContentBody::Coloring(b) => creative::coloring(&mut body, b),
            ContentBody::CreativePrompt(b) => creative::creative_prompt(&mut body, b),
            ContentBody::ShapePath(b) => creative::shape_path(&mut body, b),
        }
        let body = body.into_string();

        let css = match spec.kind.category() {
            Category::Literacy => literacy::CSS,
            Category::Math => math::CSS,
            Category::Logic => logic::CSS,
            Category::Creativity => creative::CSS,
        };

        let mut page = Markup::new(&self.resolver);
        chrome::page(&mut page, spec, palette, css, &body);
        Document {
            title: spec.title.clone(),
            html: page.into_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::catalog::FsAssetCatalog;
    use crate::synth::{ContentSpec, Registry, WorksheetRequest};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use scraper::{Html, Selector};

    pub fn synth(req: WorksheetRequest, seed: u64) -> ContentSpec {
        let catalog = FsAssetCatalog::new("/nonexistent/kidsheet-test-assets");
        Registry::standard()
            .synthesize(&req, &catalog, &mut StdRng::seed_from_u64(seed))
            .unwrap()
    }

    pub fn count(html: &Html, selector: &str) -> usize {
        html.select(&Selector::parse(selector).unwrap()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::catalog::{AssetRef, Theme};
    use crate::synth::{WorksheetRequest, WorksheetTypeId};
    use scraper::{Html, Selector};

    #[test]
    fn composition_is_pure() {
        let composer = LayoutComposer::default();
        for kind in WorksheetTypeId::ALL {
            let spec = synth(WorksheetRequest::new(kind), 17);
            let palette = spec.theme.palette();
            let a = composer.compose(&spec, &palette);
            let b = composer.compose(&spec, &palette);
            assert_eq!(a.fingerprint(), b.fingerprint(), "{kind}");
            assert_eq!(a.title, spec.title);
        }
    }

    #[test]
    fn every_page_has_the_shared_chrome() {
        let composer = LayoutComposer::default();
        for kind in WorksheetTypeId::ALL {
            let spec = synth(WorksheetRequest::new(kind).with_theme("space"), 3);
            let doc = composer.compose(&spec, &Theme::Space.palette());
            let html = Html::parse_document(&doc.html);
            assert_eq!(count(&html, ".safe-area"), 1, "{kind}");
            assert_eq!(count(&html, ".header .field"), 2, "{kind}");
            assert_eq!(count(&html, ".divider"), 1, "{kind}");
            assert_eq!(count(&html, "main.body"), 1, "{kind}");
            assert!(doc.html.contains("--primary: #673AB7"), "{kind}");
        }
    }

    #[test]
    fn title_is_escaped() {
        let mut spec = synth(WorksheetRequest::new(WorksheetTypeId::Maze), 1);
        spec.title = "Mazes <& Paths>".into();
        let doc = LayoutComposer::default().compose(&spec, &Theme::Dinosaur.palette());
        let html = Html::parse_document(&doc.html);
        let h1 = html.select(&Selector::parse("h1.title").unwrap()).next().unwrap();
        assert_eq!(h1.text().collect::<String>(), "Mazes <& Paths>");
        assert!(!doc.html.contains("<& Paths>"));
    }

    #[test]
    fn images_resolve_against_the_base_url() {
        let resolver = AssetResolver::new(Url::parse("http://localhost:3001/").unwrap());
        assert_eq!(
            resolver.resolve("/uploads/assets/a b.png"),
            "http://localhost:3001/uploads/assets/a%20b.png"
        );
        assert_eq!(resolver.resolve("data:image/png;base64,AA"), "data:image/png;base64,AA");

        let mut spec = synth(WorksheetRequest::new(WorksheetTypeId::ColoringPage), 0);
        spec.decor.title_icon = AssetRef::Image("/uploads/icon.png".into());
        let doc = LayoutComposer::new(resolver).compose(&spec, &spec.theme.palette());
        assert!(doc.html.contains("src=\"http://localhost:3001/uploads/icon.png\""));
    }

    #[test]
    fn missing_assets_become_placeholders() {
        let spec = synth(WorksheetRequest::new(WorksheetTypeId::ColoringPage), 0);
        let doc = LayoutComposer::default().compose(&spec, &spec.theme.palette());
        let html = Html::parse_document(&doc.html);
        assert_eq!(count(&html, ".coloring .art.placeholder"), 1);
    }

    #[test]
    fn stickers_fill_border_slots() {
        let mut spec = synth(WorksheetRequest::new(WorksheetTypeId::Sorting), 0);
        spec.decor.stickers = vec![AssetRef::Glyph("⭐".into()); 3];
        let doc = LayoutComposer::default().compose(&spec, &spec.theme.palette());
        let html = Html::parse_document(&doc.html);
        assert_eq!(count(&html, ".sticker-slot .sticker"), 3);
    }
}
