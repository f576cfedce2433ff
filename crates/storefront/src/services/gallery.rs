//! Product image gallery discovery.
//!
//! Gallery images are numbered objects (`med-res/{id}/1.svg`, `2.svg`, ...).
//! They are probed in order until one is missing.

use tracing::instrument;

use nalan_core::JewelleryId;

use crate::backend::storage::gallery_path;
use crate::backend::{BackendError, StorageClient};

/// Upper bound on probed gallery images.
pub const MAX_GALLERY_IMAGES: u32 = 20;

/// One gallery image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    /// Position in the gallery, starting at 1.
    pub number: u32,
    pub thumbnail: String,
    pub full: String,
    pub alt: String,
}

impl GalleryImage {
    #[must_use]
    pub fn new(storage: &StorageClient, id: JewelleryId, number: u32) -> Self {
        let url = storage.public_url(&gallery_path(&id.to_string(), number));
        Self {
            number,
            thumbnail: url.clone(),
            full: url,
            alt: format!("{id}'s {number} image"),
        }
    }
}

/// Probe the gallery of one product.
///
/// # Errors
///
/// Returns an error if a probe fails for any reason other than the object
/// being missing.
#[instrument(skip(storage), fields(product_id = %id))]
pub async fn probe(storage: &StorageClient, id: JewelleryId) -> Result<Vec<GalleryImage>, BackendError> {
    let mut images = Vec::new();
    for number in 1..=MAX_GALLERY_IMAGES {
        if !storage.object_exists(&gallery_path(&id.to_string(), number)).await? {
            break;
        }
        images.push(GalleryImage::new(storage, id, number));
    }
    tracing::debug!(count = images.len(), "Gallery probed");
    Ok(images)
}
