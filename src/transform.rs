//! Background removal for matching worksheets
//!
//! Shadow and half matching read badly when pictures keep their white
//! backgrounds, so those pages pass their pictures through a
//! [`BackgroundRemover`] before composition. Removal is best effort: any
//! failure keeps the original picture.

use crate::catalog::AssetRef;
use crate::synth::{ContentBody, ContentSpec};
use crate::Result;
use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, warn};
use std::collections::HashMap;

/// Turns an image path into a path or `data:` URI of the same picture
/// without its background
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    async fn remove(&self, path: &str) -> Result<String>;
}

/// Leaves every picture as it is
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBackgroundRemover;

#[async_trait]
impl BackgroundRemover for NoopBackgroundRemover {
    async fn remove(&self, path: &str) -> Result<String> {
        Ok(path.to_string())
    }
}

/// Clean the pictures of `spec` in place if its worksheet type asks for it
///
/// Each distinct picture is sent once. Returns how many were replaced.
pub async fn clean_pictures(remover: &dyn BackgroundRemover, spec: &mut ContentSpec) -> usize {
    if !spec.kind.wants_clean_pictures() {
        return 0;
    }
    let ContentBody::PictureMatching(matching) = &mut spec.body else {
        return 0;
    };

    let mut paths: Vec<String> = Vec::new();
    for asset in matching.left.iter().chain(&matching.right) {
        if let AssetRef::Image(path) = asset {
            if !path.starts_with("data:") && !paths.contains(path) {
                paths.push(path.clone());
            }
        }
    }
    if paths.is_empty() {
        return 0;
    }

    let results = join_all(paths.iter().map(|p| remover.remove(p))).await;
    let mut cleaned = HashMap::new();
    for (path, result) in paths.into_iter().zip(results) {
        match result {
            Ok(new_path) if new_path != path => {
                cleaned.insert(path, new_path);
            }
            Ok(_) => {}
            Err(e) => warn!("Background removal failed for {}, keeping original: {}", path, e),
        }
    }

    for asset in matching.left.iter_mut().chain(matching.right.iter_mut()) {
        if let AssetRef::Image(path) = asset {
            if let Some(new_path) = cleaned.get(path.as_str()) {
                *path = new_path.clone();
            }
        }
    }
    debug!("Cleaned {} picture(s) for {}", cleaned.len(), spec.kind);
    cleaned.len()
}

#[cfg(feature = "remote-bg")]
pub use remote::HttpBackgroundRemover;

#[cfg(feature = "remote-bg")]
mod remote {
    use super::BackgroundRemover;
    use crate::{Error, Result};
    use async_trait::async_trait;
    use base64::Engine as _;
    use std::path::PathBuf;
    use std::time::Duration;
    use url::Url;

    /// Posts PNG bytes to an HTTP endpoint that answers with the cleaned PNG
    ///
    /// Pictures are read from the public directory and come back as
    /// `data:image/png;base64,...` URIs.
    pub struct HttpBackgroundRemover {
        client: reqwest::Client,
        endpoint: Url,
        public_dir: PathBuf,
    }

    impl HttpBackgroundRemover {
        pub fn new(endpoint: Url, public_dir: impl Into<PathBuf>) -> Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(20))
                .build()
                .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
            Ok(Self {
                client,
                endpoint,
                public_dir: public_dir.into(),
            })
        }

        async fn clean(&self, path: &str) -> Result<String> {
            let rooted = path
                .strip_prefix('/')
                .ok_or_else(|| Error::Other(format!("Not a local picture: {}", path)))?;
            let bytes = tokio::fs::read(self.public_dir.join(rooted)).await?;

            let response = self
                .client
                .post(self.endpoint.clone())
                .header(reqwest::header::CONTENT_TYPE, "image/png")
                .body(bytes)
                .send()
                .await
                .map_err(|e| Error::Other(format!("Background removal request failed: {}", e)))?
                .error_for_status()
                .map_err(|e| Error::Other(format!("Background removal rejected: {}", e)))?;

            let cleaned = response
                .bytes()
                .await
                .map_err(|e| Error::Other(format!("Failed to read cleaned picture: {}", e)))?;
            if cleaned.is_empty() {
                return Err(Error::Other("Background removal returned nothing".into()));
            }
            Ok(format!(
                "data:image/png;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&cleaned)
            ))
        }
    }

    #[async_trait]
    impl BackgroundRemover for HttpBackgroundRemover {
        async fn remove(&self, path: &str) -> Result<String> {
            self.clean(path).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::test_support::{empty_catalog, rng};
    use crate::synth::{PictureMatching, Registry, WorksheetRequest, WorksheetTypeId};
    use crate::Error;

    struct Suffix;

    #[async_trait]
    impl BackgroundRemover for Suffix {
        async fn remove(&self, path: &str) -> Result<String> {
            Ok(format!("{}.clean", path))
        }
    }

    struct Broken;

    #[async_trait]
    impl BackgroundRemover for Broken {
        async fn remove(&self, _path: &str) -> Result<String> {
            Err(Error::Other("service down".into()))
        }
    }

    fn matching_spec(kind: WorksheetTypeId) -> ContentSpec {
        let mut spec = Registry::standard()
            .synthesize(&WorksheetRequest::new(kind), &empty_catalog(), &mut rng(1))
            .unwrap();
        let left: Vec<AssetRef> = (0..4).map(|i| AssetRef::Image(format!("/p/{}.png", i))).collect();
        let right = vec![left[2].clone(), left[0].clone(), left[3].clone(), left[1].clone()];
        if let ContentBody::PictureMatching(m) = &mut spec.body {
            *m = PictureMatching {
                left,
                right,
                answers: vec![1, 3, 0, 2],
            };
        }
        spec
    }

    fn pictures(spec: &ContentSpec) -> (Vec<AssetRef>, Vec<AssetRef>) {
        match &spec.body {
            ContentBody::PictureMatching(m) => (m.left.clone(), m.right.clone()),
            _ => panic!("wrong body"),
        }
    }

    #[tokio::test]
    async fn both_columns_get_the_same_clean_picture() {
        let mut spec = matching_spec(WorksheetTypeId::ShadowMatching);
        assert_eq!(clean_pictures(&Suffix, &mut spec).await, 4);
        let (left, right) = pictures(&spec);
        assert_eq!(left[0], AssetRef::Image("/p/0.png.clean".into()));
        assert_eq!(right[1], left[0]);
    }

    #[tokio::test]
    async fn failures_keep_the_original() {
        let mut spec = matching_spec(WorksheetTypeId::MatchingHalves);
        let before = pictures(&spec);
        assert_eq!(clean_pictures(&Broken, &mut spec).await, 0);
        assert_eq!(pictures(&spec), before);
    }

    #[tokio::test]
    async fn other_types_are_untouched() {
        let mut spec = Registry::standard()
            .synthesize(&WorksheetRequest::new(WorksheetTypeId::Sorting), &empty_catalog(), &mut rng(1))
            .unwrap();
        let before = spec.clone();
        assert_eq!(clean_pictures(&Suffix, &mut spec).await, 0);
        assert_eq!(spec, before);
    }

    #[tokio::test]
    async fn noop_changes_nothing() {
        let mut spec = matching_spec(WorksheetTypeId::ShadowMatching);
        let before = pictures(&spec);
        assert_eq!(clean_pictures(&NoopBackgroundRemover, &mut spec).await, 0);
        assert_eq!(pictures(&spec), before);
    }
}
