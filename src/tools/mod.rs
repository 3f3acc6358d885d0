//! MCP tool implementations.

mod catalogue;
mod part;
mod search;

// catalogue
pub use catalogue::{
    execute_catalogue_stats, execute_get_category, execute_get_manufacturer,
    execute_list_categories, execute_list_manufacturers, CategoriesOutput, GetCategoryInput,
    GetManufacturerInput, ListCategoriesInput, ListManufacturersInput, ManufacturersOutput,
    StatsOutput,
};

// part
pub use part::{
    execute_get_datasheet_url, execute_get_part, execute_get_part_images, execute_get_part_photo,
    DatasheetOutput, ImagesOutput, PartInput, PartPhoto,
};

// search
pub use search::{execute_search_parts, SearchOutput, SearchPartsInput};
