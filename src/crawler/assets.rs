//! Asset download, caching and math rasterization

use crate::crawler::fetcher::Fetcher;
use crate::crawler::CrawlPolicy;
use crate::transform::{AssetKind, AssetRef};
use crate::MirrorError;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Output pixels per SVG unit when rasterizing formulas
const RASTER_SCALE: f32 = 2.0;

/// Local asset files already populated in one session
#[derive(Debug, Default)]
pub struct AssetCache {
    stored: HashSet<PathBuf>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.stored.contains(path)
    }

    /// Records a populated file; returns false if it was already known
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.stored.insert(path)
    }

    pub fn len(&self) -> usize {
        self.stored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stored.is_empty()
    }
}

/// How an asset reference was satisfied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// The file was fetched in this call
    Downloaded(String),
    /// Another page of the session already stored it
    Cached(String),
}

impl AssetOutcome {
    /// Name of the local file the document should reference
    pub fn local_name(&self) -> &str {
        match self {
            Self::Downloaded(name) | Self::Cached(name) => name,
        }
    }
}

/// File name of an asset after any format conversion
pub fn local_name(asset: &AssetRef, policy: &CrawlPolicy) -> String {
    if asset.kind == AssetKind::Math && policy.rasterize_math {
        let stem = asset
            .file_name
            .strip_suffix(".svg")
            .unwrap_or(&asset.file_name);
        format!("{}.png", stem)
    } else {
        asset.file_name.clone()
    }
}

/// Makes sure the asset exists in the policy's tree
///
/// Downloads the asset unless the session cache already holds its
/// destination. Math formulas are converted to PNG when the policy asks for
/// it; the SVG never stays on disk in that case.
pub async fn ensure_asset(
    fetcher: &Fetcher,
    asset: &AssetRef,
    policy: &CrawlPolicy,
    cache: &mut AssetCache,
) -> Result<AssetOutcome, MirrorError> {
    let name = local_name(asset, policy);
    let dir = policy.resolve(Path::new(asset.kind.subdir()));
    let destination = dir.join(&name);

    if cache.contains(&destination) {
        tracing::trace!("Asset already stored: {}", destination.display());
        return Ok(AssetOutcome::Cached(name));
    }

    tokio::fs::create_dir_all(&dir).await?;

    let data = fetcher.fetch_bytes(asset.source.as_str()).await?;

    if name != asset.file_name {
        let png = rasterize_svg(&data, &destination)?;
        tokio::fs::write(&destination, png).await?;
        remove_if_present(&dir.join(&asset.file_name)).await?;
    } else {
        tokio::fs::write(&destination, data).await?;
    }

    tracing::debug!("Stored {} as {}", asset.source, destination.display());
    cache.insert(destination);
    Ok(AssetOutcome::Downloaded(name))
}

/// Renders SVG data to PNG
///
/// `destination` only names the file in errors.
pub fn rasterize_svg(data: &[u8], destination: &Path) -> Result<Vec<u8>, MirrorError> {
    let raster_error = |message: String| MirrorError::Raster {
        path: destination.to_path_buf(),
        message,
    };

    let tree = Tree::from_data(data, &Options::default()).map_err(|e| raster_error(e.to_string()))?;

    let size = tree
        .size()
        .to_int_size()
        .scale_by(RASTER_SCALE)
        .ok_or_else(|| raster_error("image has no area".to_string()))?;

    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| raster_error("image has no area".to_string()))?;

    resvg::render(
        &tree,
        Transform::from_scale(RASTER_SCALE, RASTER_SCALE),
        &mut pixmap.as_mut(),
    );

    pixmap.encode_png().map_err(|e| raster_error(e.to_string()))
}

async fn remove_if_present(path: &Path) -> Result<(), MirrorError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
