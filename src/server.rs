//! MCP server implementation using rmcp.

use crate::db::Catalogue;
use crate::services::{HttpImageFetcher, ImageFetcher, PartsService};
use crate::tools;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Maximum response size in bytes. Responses exceeding this are truncated
/// to prevent context window exhaustion in LLM consumers.
const MAX_RESPONSE_BYTES: usize = 256 * 1024; // 256KB

/// Truncates a JSON response string at a clean boundary before the limit,
/// appending a truncation notice. Works with both compact and pretty JSON.
fn truncate_response(mut json: String) -> String {
    if json.len() <= MAX_RESPONSE_BYTES {
        return json;
    }
    let original_len = json.len();
    // Find clean cut: last comma (JSON record boundary), then newline, then byte limit
    let search_region = &json[..json.floor_char_boundary(MAX_RESPONSE_BYTES)];
    let cut_point = search_region
        .rfind(',')
        .or_else(|| search_region.rfind('\n'))
        .unwrap_or(search_region.len());
    let safe_cut = json.floor_char_boundary(cut_point + 1);
    json.truncate(safe_cut);
    json.push_str(&format!(
        "...\n[TRUNCATED: response exceeded {} bytes, showing first {}. Use a smaller limit or include_attributes=false]",
        original_len, safe_cut
    ));
    json
}

/// Runs a blocking tool operation on the blocking pool and times it.
///
/// A panic or cancellation surfaces as `ErrorData::internal_error()`; the
/// operation's own outcome is passed through.
async fn run_blocking<T, E, F>(name: &'static str, f: F) -> Result<Result<T, E>, ErrorData>
where
    T: Send + 'static,
    E: std::fmt::Display + Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    let start = std::time::Instant::now();
    let result = tokio::task::spawn_blocking(f).await;
    let elapsed = start.elapsed();

    match result {
        Ok(Ok(output)) => {
            tracing::debug!(tool = name, ?elapsed, "tool ok");
            Ok(Ok(output))
        }
        Ok(Err(e)) => {
            tracing::warn!(tool = name, ?elapsed, "tool failed: {}", e);
            Ok(Err(e))
        }
        Err(e) => Err(ErrorData::internal_error(e.to_string(), None)),
    }
}

/// Serializes tool output as one truncated JSON text item.
fn json_content<T: Serialize>(output: &T) -> Result<Content, ErrorData> {
    let json = serde_json::to_string(output)
        .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
    Ok(Content::text(truncate_response(json)))
}

/// Runs a blocking tool operation and wraps the outcome as an MCP result.
///
/// Returns either:
/// - `CallToolResult::success()` with JSON content for success
/// - `CallToolResult::error()` with the error message for tool errors
/// - `ErrorData::internal_error()` for panics/JoinErrors
async fn run_tool<T, E, F>(name: &'static str, f: F) -> Result<CallToolResult, ErrorData>
where
    T: Serialize + Send + 'static,
    E: std::fmt::Display + Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    match run_blocking(name, f).await? {
        Ok(output) => Ok(CallToolResult::success(vec![json_content(&output)?])),
        Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
    }
}

/// MCP server for the JLCPCB parts catalogue.
///
/// Cloned per request by rmcp; the catalogue handle inside is shared.
#[derive(Clone)]
pub struct JlcpartsServer {
    parts: Arc<PartsService>,
    images: Arc<dyn ImageFetcher>,
    tool_router: ToolRouter<Self>,
}

impl JlcpartsServer {
    /// Creates a server around an already opened catalogue.
    pub fn new(parts: Arc<PartsService>) -> Self {
        Self {
            parts,
            images: Arc::new(HttpImageFetcher),
            tool_router: Self::tool_router(),
        }
    }

    /// Replaces the photo downloader used by get_part_images.
    #[must_use]
    pub fn with_image_fetcher(mut self, images: Arc<dyn ImageFetcher>) -> Self {
        self.images = images;
        self
    }

    /// Opens the catalogue at `path` and creates a server for it.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Database` if the catalogue is missing or has
    /// an unexpected schema.
    pub fn open(path: &Path) -> Result<Self, crate::ServerError> {
        let catalogue = Arc::new(Catalogue::open(path)?);
        Ok(Self::new(Arc::new(PartsService::new(catalogue))))
    }
}

// Tool implementations using rmcp macros
#[tool_router]
impl JlcpartsServer {
    /// Search the parts catalogue.
    #[tool(description = "Search JLCPCB assembly parts. All filters are combined with AND.\n\n\
        Examples: keyword='0603' min_stock=100 | category='Ferrite Bead' part_type='basic' | \
        category_id=46 manufacturer_pn='RC0603%' max_price=0.01\n\
        Results are ordered by stock (highest first) unless sort is set. Page with offset/limit \
        (limit 1-50, default 20); next_offset is returned when more results exist.\n\n\
        Tip: Use 'list_categories' to find category ids, 'get_part' for full details.")]
    async fn search_parts(
        &self,
        Parameters(input): Parameters<tools::SearchPartsInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let parts = Arc::clone(&self.parts);
        run_tool("search_parts", move || {
            tools::execute_search_parts(&parts, input)
        })
        .await
    }

    /// Get one part with all attributes.
    #[tool(description = "Get full details for one part, including price breaks and parametric attributes.\n\nExample: lcsc='C25804'")]
    async fn get_part(
        &self,
        Parameters(input): Parameters<tools::PartInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let parts = Arc::clone(&self.parts);
        run_tool("get_part", move || tools::execute_get_part(&parts, input)).await
    }

    /// Get the datasheet link of a part.
    #[tool(description = "Get the datasheet URL for a part.\n\nExample: lcsc='C25804'")]
    async fn get_datasheet_url(
        &self,
        Parameters(input): Parameters<tools::PartInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let parts = Arc::clone(&self.parts);
        run_tool("get_datasheet_url", move || {
            tools::execute_get_datasheet_url(&parts, input)
        })
        .await
    }

    /// Get the product photo of a part.
    #[tool(description = "Get the product photo of a part as an image (medium size), followed by every image URL as JSON.\n\nExample: lcsc='C25804'")]
    pub async fn get_part_images(
        &self,
        Parameters(input): Parameters<tools::PartInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let parts = Arc::clone(&self.parts);
        let images = Arc::clone(&self.images);
        let photo = run_blocking("get_part_images", move || {
            tools::execute_get_part_photo(&parts, images.as_ref(), input)
        })
        .await?;

        match photo {
            Ok(photo) => Ok(CallToolResult::success(vec![
                Content::image(photo.data, photo.mime_type),
                json_content(&photo.images)?,
            ])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }

    /// List part categories.
    #[tool(description = "List JLCPCB part categories with their ids.\n\nUse filter to narrow by category or subcategory name, e.g. filter='capacitor'.")]
    async fn list_categories(
        &self,
        Parameters(input): Parameters<tools::ListCategoriesInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let parts = Arc::clone(&self.parts);
        run_tool("list_categories", move || {
            tools::execute_list_categories(&parts, input)
        })
        .await
    }

    /// Look up one category.
    #[tool(description = "Get the category and subcategory name for a category id.")]
    async fn get_category(
        &self,
        Parameters(input): Parameters<tools::GetCategoryInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let parts = Arc::clone(&self.parts);
        run_tool("get_category", move || {
            tools::execute_get_category(&parts, input)
        })
        .await
    }

    /// List or search manufacturers.
    #[tool(description = "List manufacturers with their ids. Use filter for a case-insensitive partial name match.\n\nExample: filter='murata'")]
    async fn list_manufacturers(
        &self,
        Parameters(input): Parameters<tools::ListManufacturersInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let parts = Arc::clone(&self.parts);
        run_tool("list_manufacturers", move || {
            tools::execute_list_manufacturers(&parts, input)
        })
        .await
    }

    /// Look up one manufacturer.
    #[tool(description = "Get the manufacturer name for a manufacturer id.")]
    async fn get_manufacturer(
        &self,
        Parameters(input): Parameters<tools::GetManufacturerInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let parts = Arc::clone(&self.parts);
        run_tool("get_manufacturer", move || {
            tools::execute_get_manufacturer(&parts, input)
        })
        .await
    }

    /// Catalogue size.
    #[tool(description = "Get catalogue statistics: part, category and manufacturer counts.")]
    async fn catalogue_stats(&self) -> Result<CallToolResult, ErrorData> {
        let parts = Arc::clone(&self.parts);
        run_tool("catalogue_stats", move || {
            tools::execute_catalogue_stats(&parts)
        })
        .await
    }
}

// Implement ServerHandler trait
#[tool_handler]
impl ServerHandler for JlcpartsServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = "jlcparts-mcp: search the JLCPCB SMT assembly parts catalogue.\n\n\
             WORKFLOW:\n\
             1. list_categories / list_manufacturers -> find ids\n\
             2. search_parts -> find candidates (filters are AND-ed)\n\
             3. get_part / get_datasheet_url / get_part_images -> check details\n\n\
             TIPS:\n\
             - part_type='basic' avoids the extended-part loading fee\n\
             - Fields shown as 'unknown' have no data in the catalogue\n\
             - Prices are USD per piece at the given quantity tier"
            .to_string();

        ServerInfo {
            instructions: Some(instructions),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
