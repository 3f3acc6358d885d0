//! Lookup tools over the category and manufacturer tables.

use crate::db::{CatalogueCounts, Category, Manufacturer};
use crate::error::{DbError, Result};
use crate::security;
use crate::services::PartsService;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Input for the list_categories tool.
#[derive(Debug, Default, Clone, Deserialize, JsonSchema)]
pub struct ListCategoriesInput {
    /// Only categories whose name or subcategory contains this text
    pub filter: Option<String>,
}

/// Output for the list_categories tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct CategoriesOutput {
    pub categories: Vec<Category>,
    pub total_returned: usize,
}

/// Executes the list_categories tool.
///
/// # Errors
///
/// Returns an error for an over-long filter or a catalogue failure.
pub fn execute_list_categories(
    service: &Arc<PartsService>,
    input: ListCategoriesInput,
) -> Result<CategoriesOutput> {
    let filter = security::clean_text("filter", input.filter.as_deref())?;
    let categories = service.catalogue().categories(filter.as_deref())?;
    Ok(CategoriesOutput {
        total_returned: categories.len(),
        categories,
    })
}

/// Input for the get_category tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetCategoryInput {
    pub category_id: i64,
}

/// Executes the get_category tool.
///
/// # Errors
///
/// Returns `DbError::NotFound` for an unknown id.
pub fn execute_get_category(
    service: &Arc<PartsService>,
    input: GetCategoryInput,
) -> Result<Category> {
    service
        .catalogue()
        .category(input.category_id)?
        .ok_or_else(|| {
            DbError::NotFound {
                what: "Category",
                id: input.category_id.to_string(),
            }
            .into()
        })
}

/// Default page size for list_manufacturers.
const DEFAULT_MANUFACTURER_LIMIT: u32 = 100;

/// Largest page list_manufacturers returns.
const MAX_MANUFACTURER_LIMIT: u32 = 1000;

/// Input for the list_manufacturers tool.
#[derive(Debug, Default, Clone, Deserialize, JsonSchema)]
pub struct ListManufacturersInput {
    /// Only manufacturers whose name contains this text (case-insensitive)
    pub filter: Option<String>,
    /// Maximum manufacturers (default: 100, max: 1000)
    pub limit: Option<i64>,
}

/// Output for the list_manufacturers tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ManufacturersOutput {
    pub manufacturers: Vec<Manufacturer>,
    pub total_returned: usize,
}

/// Executes the list_manufacturers tool.
///
/// # Errors
///
/// Returns an error for an over-long filter or a catalogue failure.
pub fn execute_list_manufacturers(
    service: &Arc<PartsService>,
    input: ListManufacturersInput,
) -> Result<ManufacturersOutput> {
    let filter = security::clean_text("filter", input.filter.as_deref())?;
    let limit = input.limit.map_or(DEFAULT_MANUFACTURER_LIMIT, |n| {
        n.clamp(1, i64::from(MAX_MANUFACTURER_LIMIT)) as u32
    });

    let manufacturers = service
        .catalogue()
        .manufacturers(filter.as_deref(), limit)?;
    Ok(ManufacturersOutput {
        total_returned: manufacturers.len(),
        manufacturers,
    })
}

/// Input for the get_manufacturer tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetManufacturerInput {
    pub manufacturer_id: i64,
}

/// Executes the get_manufacturer tool.
///
/// # Errors
///
/// Returns `DbError::NotFound` for an unknown id.
pub fn execute_get_manufacturer(
    service: &Arc<PartsService>,
    input: GetManufacturerInput,
) -> Result<Manufacturer> {
    service
        .catalogue()
        .manufacturer(input.manufacturer_id)?
        .ok_or_else(|| {
            DbError::NotFound {
                what: "Manufacturer",
                id: input.manufacturer_id.to_string(),
            }
            .into()
        })
}

/// Output for the catalogue_stats tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct StatsOutput {
    /// Catalogue file in use
    pub catalogue: String,
    #[serde(flatten)]
    pub counts: CatalogueCounts,
}

/// Executes the catalogue_stats tool.
///
/// # Errors
///
/// Returns an error if the catalogue cannot be queried.
pub fn execute_catalogue_stats(service: &Arc<PartsService>) -> Result<StatsOutput> {
    let catalogue = service.catalogue();
    Ok(StatsOutput {
        catalogue: catalogue.path().display().to_string(),
        counts: catalogue.counts()?,
    })
}
