//! jlcparts-mcp: MCP server for the JLCPCB parts catalogue.
//!
//! Usage:
//!   jlcparts-mcp --mcp --db <path>     # Start MCP server
//!   jlcparts-mcp search <keyword>      # CLI search mode
//!   jlcparts-mcp part C25804           # Show one part

use clap::{Parser, Subcommand};
use jlcparts_mcp::server::JlcpartsServer;
use jlcparts_mcp::{PartType, SortOrder};
use rmcp::ServiceExt;
use serde::Serialize;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jlcparts-mcp")]
#[command(about = "MCP server for the JLCPCB assembly parts catalogue")]
#[command(version)]
struct Cli {
    /// Run as MCP server (stdin/stdout JSON-RPC)
    #[arg(long)]
    mcp: bool,

    /// Catalogue path (default: <data dir>/jlcparts/cache.sqlite3)
    #[arg(long, env = "JLCPCB_DB_PATH")]
    db: Option<PathBuf>,

    /// Print raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for parts
    Search {
        /// Substring of the part number or description
        keyword: Option<String>,

        /// Category or subcategory name
        #[arg(short, long)]
        category: Option<String>,

        /// Category id
        #[arg(long, conflicts_with = "category")]
        category_id: Option<i64>,

        /// Manufacturer id
        #[arg(long)]
        manufacturer_id: Option<i64>,

        /// Manufacturer part number LIKE pattern
        #[arg(long)]
        mfr: Option<String>,

        /// Exact package name
        #[arg(short, long)]
        package: Option<String>,

        /// basic, extended or any
        #[arg(short = 't', long)]
        part_type: Option<PartType>,

        /// Only preferred parts
        #[arg(long)]
        preferred: bool,

        /// Minimum stock
        #[arg(short = 's', long)]
        min_stock: Option<i64>,

        /// Maximum unit price in USD
        #[arg(long)]
        max_price: Option<f64>,

        /// stock, price or lcsc
        #[arg(long)]
        sort: Option<SortOrder>,

        /// Rows to skip
        #[arg(short, long, allow_negative_numbers = true)]
        offset: Option<i64>,

        /// Page size (1-50)
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Also count all matches
        #[arg(long)]
        total: bool,
    },

    /// Show one part
    Part {
        /// LCSC part number, e.g. C25804
        lcsc: String,
    },

    /// List categories
    Categories {
        /// Name filter
        filter: Option<String>,
    },

    /// List manufacturers
    Manufacturers {
        /// Name filter
        filter: Option<String>,

        /// Maximum rows
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Get catalogue statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Log to stderr only (stdout is JSON-RPC for MCP)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jlcparts_mcp=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    if cli.mcp {
        let db = jlcparts_mcp::resolve_db_path(cli.db)?;
        run_mcp_server(db).await
    } else if let Some(cmd) = cli.command {
        let db = jlcparts_mcp::resolve_db_path(cli.db)?;
        let color = !cli.no_color && std::io::stdout().is_terminal();
        run_cli(db, cmd, cli.json, color)
    } else {
        eprintln!("Use --mcp to start MCP server, or a subcommand for CLI mode.");
        eprintln!("Run with --help for more information.");
        std::process::exit(1);
    }
}

async fn run_mcp_server(db: PathBuf) -> anyhow::Result<()> {
    tracing::info!("Starting MCP server for catalogue: {}", db.display());

    let server = JlcpartsServer::open(&db)?;

    // Run the MCP server on stdin/stdout
    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}

/// Prints `value` as pretty JSON or through the given text formatter.
fn emit<T: Serialize>(
    value: &T,
    json: bool,
    color: bool,
    text: impl FnOnce(&mut std::io::StdoutLock<'static>, &T, bool) -> std::io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    } else {
        text(&mut out, value, color)?;
    }
    Ok(())
}

fn run_cli(db: PathBuf, cmd: Commands, json: bool, color: bool) -> anyhow::Result<()> {
    use jlcparts_mcp::fmt;
    use jlcparts_mcp::services::PartsService;
    use jlcparts_mcp::tools;
    use std::sync::Arc;

    let catalogue = Arc::new(jlcparts_mcp::db::Catalogue::open(&db)?);
    let parts = Arc::new(PartsService::new(catalogue));

    match cmd {
        Commands::Search {
            keyword,
            category,
            category_id,
            manufacturer_id,
            mfr,
            package,
            part_type,
            preferred,
            min_stock,
            max_price,
            sort,
            offset,
            limit,
            total,
        } => {
            let input = tools::SearchPartsInput {
                keyword,
                category_id,
                category,
                manufacturer_id,
                manufacturer_pn: mfr,
                package,
                part_type,
                preferred: preferred.then_some(true),
                min_stock,
                max_price,
                sort,
                offset,
                limit,
                include_total: Some(total),
                ..Default::default()
            };
            let result = tools::execute_search_parts(&parts, input)?;
            emit(&result, json, color, |w, v, c| fmt::fmt_search(w, v, c))?;
        }

        Commands::Part { lcsc } => {
            let result = tools::execute_get_part(&parts, tools::PartInput { lcsc })?;
            emit(&result, json, color, |w, v, c| fmt::fmt_part(w, v, c))?;
        }

        Commands::Categories { filter } => {
            let input = tools::ListCategoriesInput { filter };
            let result = tools::execute_list_categories(&parts, input)?;
            emit(&result, json, color, |w, v, c| fmt::fmt_categories(w, v, c))?;
        }

        Commands::Manufacturers { filter, limit } => {
            let input = tools::ListManufacturersInput { filter, limit };
            let result = tools::execute_list_manufacturers(&parts, input)?;
            emit(&result, json, color, |w, v, c| fmt::fmt_manufacturers(w, v, c))?;
        }

        Commands::Stats => {
            let result = tools::execute_catalogue_stats(&parts)?;
            emit(&result, json, color, |w, v, c| fmt::fmt_stats(w, v, c))?;
        }
    }

    Ok(())
}
