//! Core services over the read-only catalogue.

mod images;
mod parts;

pub use images::{image_mime, HttpImageFetcher, ImageFetcher};
pub use parts::{PartsService, SearchOptions, SearchPage};
