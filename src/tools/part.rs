//! Single-part tools: details, datasheet and product images.

use crate::error::{DbError, Result};
use crate::format::{self, PartEntry, PartImage};
use crate::services::{image_mime, ImageFetcher, PartsService};
use crate::types::LcscId;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Input for the part-level tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PartInput {
    /// Catalogue part number, e.g. "C25804" or "25804"
    pub lcsc: String,
}

impl PartInput {
    fn id(&self) -> Result<LcscId> {
        Ok(self.lcsc.parse::<LcscId>()?)
    }
}

/// Executes the get_part tool.
///
/// # Errors
///
/// Returns an error for a malformed part number or an unknown part.
pub fn execute_get_part(service: &Arc<PartsService>, input: PartInput) -> Result<PartEntry> {
    let rec = service.part(input.id()?)?;
    Ok(format::format_record(&rec, true))
}

/// Output for the get_datasheet_url tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct DatasheetOutput {
    pub lcsc: String,
    pub datasheet: String,
}

/// Executes the get_datasheet_url tool.
///
/// # Errors
///
/// Returns `DbError::NotFound` when the part is unknown or has no datasheet.
pub fn execute_get_datasheet_url(
    service: &Arc<PartsService>,
    input: PartInput,
) -> Result<DatasheetOutput> {
    let id = input.id()?;
    let rec = service.part(id)?;

    match rec.datasheet {
        Some(url) => Ok(DatasheetOutput {
            lcsc: id.to_string(),
            datasheet: url,
        }),
        None => Err(DbError::NotFound {
            what: "Datasheet",
            id: id.to_string(),
        }
        .into()),
    }
}

/// Output for the get_part_images tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ImagesOutput {
    pub lcsc: String,
    /// Medium resolution of the first photo
    pub preferred: PartImage,
    /// Every photo, each as its available sizes (smallest first)
    pub images: Vec<Vec<PartImage>>,
}

/// Lists the photo URLs of a part.
///
/// # Errors
///
/// Returns `DbError::NotFound` when the part is unknown or has no photos.
pub fn execute_get_part_images(
    service: &Arc<PartsService>,
    input: PartInput,
) -> Result<ImagesOutput> {
    let id = input.id()?;
    let rec = service.part(id)?;
    let images = format::image_urls(rec.extra.as_deref());

    let Some(preferred) = format::medium_image(&images).cloned() else {
        return Err(DbError::NotFound {
            what: "Image",
            id: id.to_string(),
        }
        .into());
    };

    Ok(ImagesOutput {
        lcsc: id.to_string(),
        preferred,
        images,
    })
}

/// Downloaded preferred photo plus the URL listing.
#[derive(Debug)]
pub struct PartPhoto {
    pub mime_type: &'static str,
    /// Base64 of the image body
    pub data: String,
    pub images: ImagesOutput,
}

/// Executes the get_part_images tool: downloads the preferred photo.
///
/// # Errors
///
/// Returns `DbError::NotFound` when the part has no photos, and a
/// `FetchError` when the photo type is unsupported or the download fails.
pub fn execute_get_part_photo(
    service: &Arc<PartsService>,
    fetcher: &dyn ImageFetcher,
    input: PartInput,
) -> Result<PartPhoto> {
    let images = execute_get_part_images(service, input)?;
    let mime_type = image_mime(&images.preferred.url)?;
    let body = fetcher.fetch(&images.preferred.url)?;

    Ok(PartPhoto {
        mime_type,
        data: BASE64_STANDARD.encode(body),
        images,
    })
}
