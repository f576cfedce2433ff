//! Public object storage for product images.
//!
//! Images live in one public bucket under two resolutions:
//!
//! - `low-res/{image_id}.svg` - listing thumbnail
//! - `med-res/{image_id}/{n}.svg` - product gallery, numbered from 1
//!
//! There is no listing endpoint for public buckets, so the gallery is found by
//! probing numbered objects with `HEAD` until one is missing.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use tracing::instrument;
use url::Url;

use crate::backend::{BackendError, authorize};
use crate::config::BackendConfig;

/// Path of a listing thumbnail.
#[must_use]
pub fn low_res_path(image_id: &str) -> String {
    format!("low-res/{image_id}.svg")
}

/// Path of the `n`th gallery image (1-based).
#[must_use]
pub fn gallery_path(image_id: &str, n: u32) -> String {
    format!("med-res/{image_id}/{n}.svg")
}

/// Path of the cover image shown in cart and wishlist rows.
#[must_use]
pub fn cover_path(image_id: &str) -> String {
    gallery_path(image_id, 1)
}

/// Client for the storage API.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    base: Url,
    bucket: String,
    anon_key: String,
}

impl StorageClient {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(StorageClientInner {
                client,
                base: config.url.clone(),
                bucket: config.images_bucket.clone(),
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
        }
    }

    /// Public URL of an object in the images bucket.
    ///
    /// Falls back to string formatting if the base URL cannot carry a path,
    /// which config validation already rules out.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        let mut url = self.inner.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "object", "public", &self.inner.bucket])
                .extend(path.split('/'));
        } else {
            return format!(
                "{}/storage/v1/object/public/{}/{path}",
                self.inner.base.as_str().trim_end_matches('/'),
                self.inner.bucket
            );
        }
        url.into()
    }

    /// Thumbnail URL for a catalog card.
    #[must_use]
    pub fn thumbnail_url(&self, image_id: &str) -> String {
        self.public_url(&low_res_path(image_id))
    }

    /// Cover URL for cart and wishlist rows.
    #[must_use]
    pub fn cover_url(&self, image_id: &str) -> String {
        self.public_url(&cover_path(image_id))
    }

    /// Whether an object exists.
    ///
    /// A 400 or 404 means missing; the storage API answers 400 for unknown
    /// objects in public buckets.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is anything else.
    #[instrument(skip(self), fields(bucket = %self.inner.bucket))]
    pub async fn object_exists(&self, path: &str) -> Result<bool, BackendError> {
        let request = authorize(
            self.inner.client.head(self.public_url(path)),
            &self.inner.anon_key,
            None,
        );
        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(false),
            StatusCode::TOO_MANY_REQUESTS => Err(BackendError::RateLimited(1)),
            status => Err(BackendError::Api {
                status: status.as_u16(),
                message: "Unexpected status probing storage object".to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;
    use crate::test_support;

    fn storage(base: &str) -> StorageClient {
        let config = BackendConfig {
            url: Url::parse(base).unwrap(),
            anon_key: SecretString::from("anon"),
            images_bucket: "jewellery-images".to_string(),
            cache_ttl: Duration::from_secs(300),
        };
        StorageClient::new(reqwest::Client::new(), &config)
    }

    #[tokio::test]
    async fn test_object_exists_status_mapping() {
        let hits = Arc::new(AtomicUsize::new(0));
        let storage = storage(test_support::storage_stub(hits.clone()).await.as_str());

        assert!(storage.object_exists("med-res/12/1.svg").await.unwrap());
        assert!(!storage.object_exists("med-res/12/3.svg").await.unwrap());
        assert!(!storage.object_exists("med-res/404/1.svg").await.unwrap());
        assert!(matches!(
            storage.object_exists("med-res/429/1.svg").await,
            Err(BackendError::RateLimited(_))
        ));
        assert!(matches!(
            storage.object_exists("med-res/500/1.svg").await,
            Err(BackendError::Api { status: 500, .. })
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_image_paths() {
        assert_eq!(low_res_path("ring-07"), "low-res/ring-07.svg");
        assert_eq!(gallery_path("ring-07", 3), "med-res/ring-07/3.svg");
        assert_eq!(cover_path("ring-07"), "med-res/ring-07/1.svg");
    }

    #[test]
    fn test_public_url() {
        let storage = storage("https://abcd.supabase.co");
        assert_eq!(
            storage.thumbnail_url("ring-07"),
            "https://abcd.supabase.co/storage/v1/object/public/jewellery-images/low-res/ring-07.svg"
        );
        assert_eq!(
            storage.cover_url("42"),
            "https://abcd.supabase.co/storage/v1/object/public/jewellery-images/med-res/42/1.svg"
        );
    }

    #[test]
    fn test_public_url_encodes_segments() {
        let storage = storage("http://localhost:54321/");
        assert_eq!(
            storage.public_url("low-res/temple set.svg"),
            "http://localhost:54321/storage/v1/object/public/jewellery-images/low-res/temple%20set.svg"
        );
    }
}
