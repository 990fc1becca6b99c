//! Upload acceptance policy
//!
//! Every strategy runs uploads through the same `UploadPolicy` before any byte
//! is written, so a rejected upload never leaves a partial object behind.

use crate::media_types::extension_of;
use market_core::{MediaPolicyConfig, MediaType, UploadTarget};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max for {media_type}: {max} bytes)")]
    FileTooLarge {
        media_type: MediaType,
        size: u64,
        max: u64,
    },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("{media_type} uploads are not accepted for {target}")]
    MediaClassNotAllowed {
        media_type: MediaType,
        target: &'static str,
    },
}

/// Size and extension limits per media class
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_image_size: u64,
    max_video_size: u64,
    image_extensions: Vec<String>,
    video_extensions: Vec<String>,
}

impl UploadPolicy {
    pub fn new(
        max_image_size: u64,
        max_video_size: u64,
        image_extensions: Vec<String>,
        video_extensions: Vec<String>,
    ) -> Self {
        Self {
            max_image_size,
            max_video_size,
            image_extensions,
            video_extensions,
        }
    }

    pub fn from_config(config: &MediaPolicyConfig) -> Self {
        Self::new(
            config.max_image_size_bytes,
            config.max_video_size_bytes,
            config.image_extensions.clone(),
            config.video_extensions.clone(),
        )
    }

    pub fn max_size(&self, media_type: MediaType) -> u64 {
        match media_type {
            MediaType::Image => self.max_image_size,
            MediaType::Video => self.max_video_size,
        }
    }

    fn allowed_extensions(&self, media_type: MediaType) -> &[String] {
        match media_type {
            MediaType::Image => &self.image_extensions,
            MediaType::Video => &self.video_extensions,
        }
    }

    /// Check an upload for `target` and return its media classification and
    /// normalized (lowercase) extension.
    pub fn validate(
        &self,
        filename: &str,
        content_type: &str,
        size: u64,
        target: UploadTarget,
    ) -> Result<(MediaType, String), PolicyViolation> {
        if size == 0 {
            return Err(PolicyViolation::EmptyFile);
        }

        let media_type = MediaType::from_content_type(content_type)
            .ok_or_else(|| PolicyViolation::InvalidContentType(content_type.to_string()))?;

        if !target.accepts(media_type) {
            return Err(PolicyViolation::MediaClassNotAllowed {
                media_type,
                target: target.label(),
            });
        }

        let extension = extension_of(filename)
            .ok_or_else(|| PolicyViolation::InvalidFilename(filename.to_string()))?;

        let allowed = self.allowed_extensions(media_type);
        if !allowed.contains(&extension) {
            return Err(PolicyViolation::InvalidExtension {
                extension,
                allowed: allowed.to_vec(),
            });
        }

        let max = self.max_size(media_type);
        if size > max {
            return Err(PolicyViolation::FileTooLarge {
                media_type,
                size,
                max,
            });
        }

        Ok((media_type, extension))
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&MediaPolicyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: UploadTarget = UploadTarget::ShopProfile { shop_id: 1 };
    const ITEM: UploadTarget = UploadTarget::ItemMedia {
        shop_id: 1,
        item_id: 2,
    };

    #[test]
    fn test_accepts_image_for_profile() {
        let policy = UploadPolicy::default();
        let (media_type, ext) = policy
            .validate("Avatar.PNG", "image/png", 1024, PROFILE)
            .unwrap();
        assert_eq!(media_type, MediaType::Image);
        assert_eq!(ext, "png");
    }

    #[test]
    fn test_rejects_video_for_profile() {
        let policy = UploadPolicy::default();
        let err = policy
            .validate("clip.mp4", "video/mp4", 1024, PROFILE)
            .unwrap_err();
        assert!(matches!(err, PolicyViolation::MediaClassNotAllowed { .. }));

        assert!(policy.validate("clip.mp4", "video/mp4", 1024, ITEM).is_ok());
    }

    #[test]
    fn test_size_limits_per_class() {
        let policy = UploadPolicy::default();
        let six_mb = 6 * 1024 * 1024;
        let err = policy
            .validate("big.jpg", "image/jpeg", six_mb, ITEM)
            .unwrap_err();
        assert!(matches!(err, PolicyViolation::FileTooLarge { max, .. } if max == 5 * 1024 * 1024));

        assert!(policy.validate("big.mp4", "video/mp4", six_mb, ITEM).is_ok());
        assert!(policy
            .validate("huge.mp4", "video/mp4", 51 * 1024 * 1024, ITEM)
            .is_err());
    }

    #[test]
    fn test_rejects_empty_bad_extension_and_content_type() {
        let policy = UploadPolicy::default();
        assert_eq!(
            policy.validate("a.png", "image/png", 0, ITEM),
            Err(PolicyViolation::EmptyFile)
        );
        assert!(matches!(
            policy.validate("a.exe", "image/png", 10, ITEM),
            Err(PolicyViolation::InvalidExtension { .. })
        ));
        assert!(matches!(
            policy.validate("a.pdf", "application/pdf", 10, ITEM),
            Err(PolicyViolation::InvalidContentType(_))
        ));
        assert!(matches!(
            policy.validate("noext", "image/png", 10, ITEM),
            Err(PolicyViolation::InvalidFilename(_))
        ));
    }
}
