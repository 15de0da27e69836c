use std::path::Path;

use crate::model::{Meta, Point};

/// Extensions probed, in order, when images are resolved by order number.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Upper bound for the `max_extra_images` meta setting.
pub const MAX_EXTRA_IMAGES_LIMIT: usize = 20;

const REMOTE_PREFIXES: [&str; 4] = ["http://", "https://", "data:", "cid:"];

/// Existence check used to decide whether a local image reference is kept.
pub trait ImageProbe {
    /// Returns whether `candidate`, relative to `base` unless absolute, exists.
    fn exists(&self, base: &Path, candidate: &str) -> bool;
}

/// [`ImageProbe`] backed by the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl ImageProbe for FsProbe {
    fn exists(&self, base: &Path, candidate: &str) -> bool {
        base.join(candidate).exists()
    }
}

/// Image lookup settings taken from the meta table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSettings {
    pub image_dir: String,
    pub auto_by_order: bool,
    pub max_extra_images: usize,
}

impl ImageSettings {
    pub fn from_meta(meta: &Meta) -> Self {
        let image_dir = match meta.text("image_dir") {
            "" => ".".to_string(),
            dir => dir.to_string(),
        };
        let max_extra = meta.number("max_extra_images", 10.0).trunc();
        Self {
            image_dir,
            auto_by_order: meta.flag("auto_image_by_order"),
            max_extra_images: max_extra.clamp(0.0, MAX_EXTRA_IMAGES_LIMIT as f64) as usize,
        }
    }

    fn candidate(&self, file_name: &str) -> String {
        let mut dir = self.image_dir.trim_end_matches('/');
        while let Some(rest) = dir.strip_prefix("./") {
            dir = rest;
        }
        if dir.is_empty() || dir == "." {
            file_name.to_string()
        } else {
            format!("{dir}/{file_name}")
        }
    }
}

/// Whether an image reference points outside the output directory and is
/// used without an existence check.
pub fn is_remote_source(path: &str) -> bool {
    REMOTE_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Resolves the primary image of `point`.
///
/// An explicit `image_path` wins. Otherwise, when lookup by order is enabled,
/// the first existing `<order>.<ext>` inside the image directory is used.
/// Local references that do not exist relative to `output_dir` are dropped.
pub fn resolve_primary(
    point: &Point,
    settings: &ImageSettings,
    probe: &dyn ImageProbe,
    output_dir: &Path,
) -> Option<String> {
    let explicit = point.image_path.trim();
    let candidate = if !explicit.is_empty() {
        explicit.to_string()
    } else if settings.auto_by_order {
        IMAGE_EXTENSIONS
            .iter()
            .map(|extension| settings.candidate(&format!("{}.{extension}", point.order)))
            .find(|candidate| probe.exists(output_dir, candidate))?
    } else {
        return None;
    };

    if is_remote_source(&candidate) || probe.exists(output_dir, &candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// Resolves the secondary images of `point`, named `<order>.<index>.<ext>`
/// with `index` running from 1 to the configured maximum. Each index keeps
/// only its first existing extension.
pub fn resolve_extras(
    point: &Point,
    settings: &ImageSettings,
    probe: &dyn ImageProbe,
    output_dir: &Path,
) -> Vec<String> {
    if !settings.auto_by_order {
        return Vec::new();
    }
    (1..=settings.max_extra_images)
        .filter_map(|index| {
            IMAGE_EXTENSIONS
                .iter()
                .map(|extension| settings.candidate(&format!("{}.{index}.{extension}", point.order)))
                .find(|candidate| probe.exists(output_dir, candidate))
        })
        .collect()
}
