//! Asset catalog backed by the static server's public directory

use super::{default_letter_word, letter_glyph, AssetCatalog, AssetRef, LetterAsset, Theme, DECOR_GLYPHS};
use log::{debug, warn};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::RngCore;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const UPLOAD_CACHE_TTL: Duration = Duration::from_secs(60);

/// Looks up pictures under a public directory laid out as:
///
/// ```text
/// uploads/assets/A_main_assets/<theme>/color/*_color.png
/// uploads/assets/A_main_assets/<theme>/line/*_line.{svg,png}
/// uploads/assets/B_character_ip/<theme>/poses/color/*.png
/// uploads/assets/D_patterns/<theme>/borders/*_border.png
/// uploads/bigpng/**                      (decoration library)
/// uploads/Creative_Prompt/<theme>/<prompt>/*
/// images/letters/<L>/*
/// generated/pattern-compare/<theme>/*
/// ```
///
/// Directory listings are sorted so that a seeded RNG always picks the same
/// files.
pub struct FsAssetCatalog {
    public_dir: PathBuf,
    upload_cache: Mutex<Option<(Instant, Vec<String>)>>,
}

impl FsAssetCatalog {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
            upload_cache: Mutex::new(None),
        }
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    fn assets_dir(&self) -> PathBuf {
        self.public_dir.join("uploads").join("assets")
    }

    /// Public URL path for a file under the public directory
    fn public_path(&self, file: &Path) -> Option<String> {
        let rel = file.strip_prefix(&self.public_dir).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(format!("/{}", parts.join("/")))
    }

    /// Files directly inside `dir` whose name satisfies `keep`, as public paths
    fn list(&self, dir: &Path, keep: impl Fn(&str) -> bool) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            debug!("asset directory not found: {}", dir.display());
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| p.file_name().and_then(|n| n.to_str()).map(&keep).unwrap_or(false))
            .collect();
        files.sort();
        files.iter().filter_map(|p| self.public_path(p)).collect()
    }

    /// Every picture under the decoration library, cached for a minute
    fn upload_library(&self) -> Vec<String> {
        if let Ok(guard) = self.upload_cache.lock() {
            if let Some((at, paths)) = guard.as_ref() {
                if at.elapsed() < UPLOAD_CACHE_TTL {
                    return paths.clone();
                }
            }
        }

        let root = self.public_dir.join("uploads").join("bigpng");
        let mut found = Vec::new();
        walk(&root, &mut found);
        found.sort();
        let paths: Vec<String> = found
            .iter()
            .filter(|p| p.file_name().and_then(|n| n.to_str()).map(is_picture).unwrap_or(false))
            .filter_map(|p| self.public_path(p))
            .collect();

        if let Ok(mut guard) = self.upload_cache.lock() {
            *guard = Some((Instant::now(), paths.clone()));
        }
        paths
    }
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        match entry.file_type() {
            Ok(t) if t.is_dir() => walk(&path, out),
            Ok(t) if t.is_file() => out.push(path),
            _ => {}
        }
    }
}

fn is_picture(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    [".png", ".jpg", ".jpeg", ".svg"].iter().any(|ext| lower.ends_with(ext))
}

/// Up to `count` distinct entries of `pool` in random order
fn pick_distinct(pool: &[String], count: usize, rng: &mut dyn RngCore) -> Vec<AssetRef> {
    let mut copy = pool.to_vec();
    copy.shuffle(rng);
    copy.truncate(count);
    copy.into_iter().map(AssetRef::Image).collect()
}

fn pick_one(pool: &[String], rng: &mut dyn RngCore) -> AssetRef {
    pool.choose(rng).map(|p| AssetRef::Image(p.clone())).unwrap_or(AssetRef::Missing)
}

fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Leading alphabetic run of a file stem, e.g. `/x/cat_02.png` -> `cat`
fn word_from_path(path: &str) -> String {
    let stem = Path::new(path).file_stem().and_then(|s| s.to_str()).unwrap_or("");
    stem.chars().take_while(|c| c.is_ascii_alphabetic()).collect()
}

impl AssetCatalog for FsAssetCatalog {
    fn theme_pictures(&self, theme: Theme, count: usize, rng: &mut dyn RngCore) -> Vec<AssetRef> {
        let dir = self.assets_dir().join("A_main_assets").join(theme.as_str()).join("color");
        let files = self.list(&dir, |n| n.ends_with("_color.png"));
        if files.is_empty() {
            let mut glyphs: Vec<AssetRef> = theme.glyphs().iter().map(|g| AssetRef::Glyph(g.to_string())).collect();
            glyphs.shuffle(rng);
            glyphs.truncate(count);
            return glyphs;
        }
        pick_distinct(&files, count, rng)
    }

    fn decor_pictures(&self, count: usize, rng: &mut dyn RngCore) -> Vec<AssetRef> {
        let pool = self.upload_library();
        if pool.is_empty() {
            return DECOR_GLYPHS.iter().take(count).map(|g| AssetRef::Glyph(g.to_string())).collect();
        }
        pick_distinct(&pool, count, rng)
    }

    fn line_art(&self, theme: Theme, rng: &mut dyn RngCore) -> AssetRef {
        let dir = self.assets_dir().join("A_main_assets").join(theme.as_str()).join("line");
        let files = self.list(&dir, |n| n.ends_with("_line.svg") || n.ends_with("_line.png"));
        if files.is_empty() {
            warn!("no line art for theme {theme}");
        }
        pick_one(&files, rng)
    }

    fn character(&self, theme: Theme) -> AssetRef {
        let dir = self
            .assets_dir()
            .join("B_character_ip")
            .join(theme.as_str())
            .join("poses")
            .join("color");
        let files = self.list(&dir, |n| n.ends_with(".png"));
        files
            .iter()
            .find(|f| f.contains("waving_pose"))
            .or_else(|| files.iter().find(|f| word_from_path(f).contains(theme.as_str())))
            .or_else(|| files.first())
            .map(|f| AssetRef::Image(f.clone()))
            .unwrap_or_else(|| AssetRef::Glyph(theme.mascot().to_string()))
    }

    fn title_icon(&self, theme: Theme, rng: &mut dyn RngCore) -> AssetRef {
        let dir = self
            .assets_dir()
            .join("B_character_ip")
            .join(theme.as_str())
            .join("poses")
            .join("color");
        let files = self.list(&dir, |n| n.ends_with(".png"));
        if files.is_empty() {
            return AssetRef::Glyph(theme.mascot().to_string());
        }
        pick_one(&files, rng)
    }

    fn border_stickers(&self, theme: Theme, count: usize, rng: &mut dyn RngCore) -> Vec<AssetRef> {
        let dir = self.assets_dir().join("D_patterns").join(theme.as_str()).join("borders");
        let files = self.list(&dir, |n| n.ends_with("_border.png"));
        pick_distinct(&files, count, rng)
    }

    fn letter_picture(&self, letter: char, rng: &mut dyn RngCore) -> LetterAsset {
        let upper = letter.to_ascii_uppercase();
        let lower = upper.to_ascii_lowercase();

        let uploads: Vec<String> = self
            .upload_library()
            .into_iter()
            .filter(|p| {
                Path::new(p)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.to_ascii_lowercase().starts_with(lower))
                    .unwrap_or(false)
            })
            .collect();
        if let Some(chosen) = uploads.choose(rng) {
            let word = title_case(&word_from_path(chosen));
            return LetterAsset {
                picture: AssetRef::Image(chosen.clone()),
                word: if word.is_empty() { default_letter_word(upper).to_string() } else { word },
            };
        }

        let dir = self.public_dir.join("images").join("letters").join(upper.to_string());
        let files = self.list(&dir, is_picture);
        if let Some(chosen) = files.choose(rng) {
            return LetterAsset {
                picture: AssetRef::Image(chosen.clone()),
                word: default_letter_word(upper).to_string(),
            };
        }

        LetterAsset {
            picture: AssetRef::Glyph(letter_glyph(upper).to_string()),
            word: default_letter_word(upper).to_string(),
        }
    }

    fn creative_prompt(&self, theme: Theme, prompt: &str, rng: &mut dyn RngCore) -> AssetRef {
        let dir = self
            .public_dir
            .join("uploads")
            .join("Creative_Prompt")
            .join(theme.as_str())
            .join(prompt);
        let files = self.list(&dir, is_picture);
        if files.is_empty() {
            warn!("no creative prompt art for {theme}/{prompt}");
        }
        pick_one(&files, rng)
    }

    fn spot_difference(&self, theme: Theme, rng: &mut dyn RngCore) -> AssetRef {
        let dir = self.public_dir.join("generated").join("pattern-compare").join(theme.as_str());
        let files = self.list(&dir, |n| {
            let l = n.to_ascii_lowercase();
            l.ends_with(".png") || l.ends_with(".jpg") || l.ends_with(".webp")
        });
        pick_one(&files, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, b"x").unwrap();
    }

    #[test]
    fn theme_pictures_are_drawn_from_the_pool() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..6 {
            touch(dir.path(), &format!("uploads/assets/A_main_assets/ocean/color/fish{i}_color.png"));
        }
        touch(dir.path(), "uploads/assets/A_main_assets/ocean/color/readme.txt");
        let catalog = FsAssetCatalog::new(dir.path());
        let pool: HashSet<String> = (0..6)
            .map(|i| format!("/uploads/assets/A_main_assets/ocean/color/fish{i}_color.png"))
            .collect();

        let mut rng = StdRng::seed_from_u64(3);
        let first = catalog.theme_pictures(Theme::Ocean, 4, &mut rng);
        let second = catalog.theme_pictures(Theme::Ocean, 4, &mut rng);
        for pics in [&first, &second] {
            assert_eq!(pics.len(), 4);
            let distinct: HashSet<_> = pics.iter().collect();
            assert_eq!(distinct.len(), 4);
            for p in pics.iter() {
                assert!(pool.contains(p.image_path().unwrap()));
            }
        }
    }

    #[test]
    fn short_pools_return_fewer() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "uploads/assets/D_patterns/space/borders/a_border.png");
        touch(dir.path(), "uploads/assets/D_patterns/space/borders/b_border.png");
        let catalog = FsAssetCatalog::new(dir.path());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(catalog.border_stickers(Theme::Space, 8, &mut rng).len(), 2);
        assert!(catalog.border_stickers(Theme::Ocean, 8, &mut rng).is_empty());
    }

    #[test]
    fn empty_catalog_falls_back_to_glyphs() {
        let catalog = FsAssetCatalog::new("/definitely/not/here");
        let mut rng = StdRng::seed_from_u64(9);
        let pics = catalog.theme_pictures(Theme::Safari, 3, &mut rng);
        assert_eq!(pics.len(), 3);
        assert!(pics.iter().all(|p| matches!(p, AssetRef::Glyph(_))));
        assert_eq!(catalog.character(Theme::Space), AssetRef::Glyph("🚀".into()));
        assert_eq!(catalog.line_art(Theme::Space, &mut rng), AssetRef::Missing);
        let l = catalog.letter_picture('c', &mut rng);
        assert_eq!(l.word, "Cat");
        assert_eq!(l.picture, AssetRef::Glyph("🐱".into()));
    }

    #[test]
    fn letter_pictures_prefer_the_upload_library() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "uploads/bigpng/animals/cow_01.png");
        touch(dir.path(), "uploads/bigpng/animals/dog.png");
        touch(dir.path(), "images/letters/C/cat.png");
        let catalog = FsAssetCatalog::new(dir.path());
        let mut rng = StdRng::seed_from_u64(5);
        let l = catalog.letter_picture('C', &mut rng);
        assert_eq!(l.picture, AssetRef::Image("/uploads/bigpng/animals/cow_01.png".into()));
        assert_eq!(l.word, "Cow");
    }

    #[test]
    fn character_prefers_waving_pose() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "uploads/assets/B_character_ip/unicorn/poses/color/a_jump.png");
        touch(dir.path(), "uploads/assets/B_character_ip/unicorn/poses/color/b_waving_pose.png");
        let catalog = FsAssetCatalog::new(dir.path());
        assert_eq!(
            catalog.character(Theme::Unicorn),
            AssetRef::Image("/uploads/assets/B_character_ip/unicorn/poses/color/b_waving_pose.png".into())
        );
    }
}
