use std::{collections::HashMap, fs, path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use skyline_catalog::{
    catalog::CatalogTables,
    config::{self, AppConfig},
    models::{BrandSummary, Category, ProductCard, ProductFilter, ProductSort, SortOrder},
    services::{
        integrity::{
            backfill_category_ids, check_integrity, IntegrityReport, DEFAULT_CATEGORY_BACKFILL,
        },
        CatalogRoute, CatalogService, CatalogServices, NavigationService, NavigationView,
    },
};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize(cli.seed.clone())?;

    match cli.command {
        Commands::Brands => handle_brands(&context, cli.json).await?,
        Commands::Categories(args) => handle_categories(&context, args, cli.json).await?,
        Commands::Products(command) => handle_products(&context, command, cli.json).await?,
        Commands::Resolve(args) => handle_resolve(&context, args, cli.json).await?,
        Commands::Integrity => handle_integrity(&context, cli.json)?,
        Commands::Backfill(args) => handle_backfill(&context, args)?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "catalog-cli",
    about = "Browse and check the Skyline Marine catalog seed",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[arg(
        long,
        global = true,
        help = "Catalog seed JSON to load instead of the configured one"
    )]
    seed: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List brands with their category counts
    Brands,
    /// List categories, optionally for one brand
    Categories(CategoriesArgs),
    #[command(subcommand)]
    Products(ProductsCommands),
    /// Resolve a `/brands/...` path the way the site navigates it
    Resolve(ResolveArgs),
    /// Report duplicate slugs, dangling references and legacy products
    Integrity,
    /// Fill missing product category ids from a brand → category map
    Backfill(BackfillArgs),
}

#[derive(Args)]
struct CategoriesArgs {
    #[arg(long, help = "Only categories of this brand id, in display order")]
    brand_id: Option<String>,
}

#[derive(Subcommand)]
enum ProductsCommands {
    /// Filtered and sorted product list
    List(ProductListArgs),
    /// Newest products first
    Latest(LimitArgs),
    /// Highest enquiry count first
    MostEnquired(LimitArgs),
    /// Featured products
    Featured,
    /// Distinct legacy category labels
    Labels,
    /// Search name, description and category label
    Search(SearchArgs),
}

#[derive(Args)]
struct ProductListArgs {
    #[arg(long)]
    brand_id: Option<String>,
    #[arg(long)]
    category_id: Option<String>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long, value_enum)]
    sort_by: Option<ProductSortArg>,
    #[arg(long, value_enum)]
    sort_order: Option<SortOrderArg>,
}

impl From<ProductListArgs> for ProductFilter {
    fn from(args: ProductListArgs) -> Self {
        ProductFilter {
            brand_id: args.brand_id,
            category_id: args.category_id,
            search: args.search,
            sort_by: args.sort_by.map(Into::into),
            sort_order: args.sort_order.map(Into::into),
        }
    }
}

#[derive(Args)]
struct LimitArgs {
    #[arg(long, help = "Number of products (defaults to the configured listing size)")]
    limit: Option<usize>,
}

#[derive(Args)]
struct SearchArgs {
    query: String,
}

#[derive(Args)]
struct ResolveArgs {
    /// e.g. /brands/wartsila/32/furuno-far-2228
    path: String,
}

#[derive(Args)]
struct BackfillArgs {
    #[arg(long, help = "JSON object mapping brand id to category id (built-in map when omitted)")]
    mapping: Option<PathBuf>,
    #[arg(long, help = "Write the updated catalog here instead of stdout")]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProductSortArg {
    Name,
    Date,
    Popularity,
}

impl From<ProductSortArg> for ProductSort {
    fn from(value: ProductSortArg) -> Self {
        match value {
            ProductSortArg::Name => ProductSort::Name,
            ProductSortArg::Date => ProductSort::Date,
            ProductSortArg::Popularity => ProductSort::Popularity,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortOrderArg {
    Asc,
    Desc,
}

impl From<SortOrderArg> for SortOrder {
    fn from(value: SortOrderArg) -> Self {
        match value {
            SortOrderArg::Asc => SortOrder::Asc,
            SortOrderArg::Desc => SortOrder::Desc,
        }
    }
}

struct CliContext {
    config: AppConfig,
    tables: Arc<CatalogTables>,
    services: CatalogServices,
}

impl CliContext {
    fn initialize(seed: Option<PathBuf>) -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let tables = match seed {
            Some(path) => CatalogTables::from_path(&path),
            None => CatalogTables::load(config.catalog_seed_path.as_deref()),
        }
        .context("failed to load catalog seed")?;
        let tables = Arc::new(tables);
        let services = CatalogServices::in_memory(tables.clone(), config.store_latency());

        Ok(Self {
            config,
            tables,
            services,
        })
    }

    fn catalog(&self) -> &CatalogService {
        &self.services.catalog
    }

    fn navigation(&self) -> &NavigationService {
        &self.services.navigation
    }
}

async fn handle_brands(context: &CliContext, json: bool) -> Result<()> {
    let brands = context.catalog().list_brands().await?;
    if json {
        return print_json(&brands);
    }
    println!("{} brands", brands.len());
    brands.iter().for_each(render_brand);
    Ok(())
}

async fn handle_categories(context: &CliContext, args: CategoriesArgs, json: bool) -> Result<()> {
    let categories = context
        .catalog()
        .list_categories(args.brand_id.as_deref())
        .await?;
    if json {
        return print_json(&categories);
    }
    println!("{} categories", categories.len());
    categories.iter().for_each(render_category);
    Ok(())
}

async fn handle_products(
    context: &CliContext,
    command: ProductsCommands,
    json: bool,
) -> Result<()> {
    let catalog = context.catalog();
    let cards = match command {
        ProductsCommands::List(args) => {
            let filter = ProductFilter::from(args);
            debug!(?filter, "Listing products");
            catalog.list_products(&filter).await?
        }
        ProductsCommands::Latest(args) => {
            catalog
                .latest_products(context.config.listing_limit(args.limit))
                .await?
        }
        ProductsCommands::MostEnquired(args) => {
            catalog
                .most_enquired_products(context.config.listing_limit(args.limit))
                .await?
        }
        ProductsCommands::Featured => catalog.featured_products().await?,
        ProductsCommands::Search(args) => catalog.search_products(args.query.trim()).await?,
        ProductsCommands::Labels => {
            let labels = catalog.category_labels().await?;
            if json {
                return print_json(&labels);
            }
            labels.iter().for_each(|label| println!("- {}", label));
            return Ok(());
        }
    };

    if json {
        return print_json(&cards);
    }
    println!("{} products", cards.len());
    cards.iter().for_each(render_card);
    Ok(())
}

async fn handle_resolve(context: &CliContext, args: ResolveArgs, json: bool) -> Result<()> {
    let route = CatalogRoute::parse(&args.path)
        .ok_or_else(|| anyhow!("not a catalog path: {} (expected /brands/...)", args.path))?;
    let view = context.navigation().resolve(&route).await;
    if json {
        return print_json(&view);
    }

    match &view {
        NavigationView::Brands { brands, .. } => brands.iter().for_each(render_brand),
        NavigationView::Brand {
            brand, categories, ..
        } => {
            render_brand(brand);
            categories.iter().for_each(render_category);
        }
        NavigationView::Category {
            category, products, ..
        } => {
            println!("{} ({} products)", category.name, products.len());
            products.iter().for_each(render_card);
        }
        NavigationView::Product {
            product,
            category_name,
            related,
            ..
        } => {
            println!("{} [{}]", product.product.name, category_name);
            println!("  {}", product.product.description);
            for spec in &product.product.specifications {
                println!("  {}: {}", spec.key, spec.value);
            }
            if !related.is_empty() {
                println!("Related:");
                related.iter().for_each(render_card);
            }
        }
        NavigationView::NotFound { message, .. } => bail!("{}", message),
    }

    if let Some(trail) = breadcrumbs(&view) {
        println!("{}", trail);
    }
    Ok(())
}

fn handle_integrity(context: &CliContext, json: bool) -> Result<()> {
    let report = check_integrity(&context.tables);
    if json {
        return print_json(&report);
    }
    render_report(&report);
    Ok(())
}

fn handle_backfill(context: &CliContext, args: BackfillArgs) -> Result<()> {
    let mapping: HashMap<String, String> = match &args.mapping {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a brand → category map", path.display()))?
        }
        None => DEFAULT_CATEGORY_BACKFILL.clone(),
    };

    let mut tables = (*context.tables).clone();
    let updated = backfill_category_ids(&mut tables.products, &mapping);
    eprintln!("Added categoryId to {} products", updated.len());
    for id in &updated {
        eprintln!("  {}", id);
    }

    let document = serde_json::to_string_pretty(&tables)?;
    match &args.output {
        Some(path) => {
            fs::write(path, document)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Catalog written to {}", path.display());
        }
        None => println!("{}", document),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_brand(summary: &BrandSummary) {
    println!(
        "- {} ({}) • {} categories • {} products",
        summary.brand.name,
        summary.brand.slug,
        summary.category_count,
        summary.category_product_count
    );
}

fn render_category(category: &Category) {
    println!(
        "- {} ({}) • brand {} • order {}",
        category.name, category.slug, category.brand_id, category.order
    );
}

fn render_card(card: &ProductCard) {
    let price = card
        .price
        .map(|price| price.to_string())
        .unwrap_or_else(|| "on request".to_string());
    println!(
        "- {} ({}) • {} / {} • {} • {} enquiries",
        card.name, card.slug, card.brand_name, card.category_name, price, card.enquiry_count
    );
}

fn render_report(report: &IntegrityReport) {
    if report.is_clean() {
        println!("No integrity issues");
        return;
    }
    println!("{} integrity issues", report.issue_count());
    for dup in report
        .duplicate_brand_slugs
        .iter()
        .chain(&report.duplicate_category_slugs)
        .chain(&report.duplicate_product_slugs)
    {
        println!(
            "  duplicate slug {}{} shared by {}",
            dup.brand_id
                .as_deref()
                .map(|b| format!("{b}/"))
                .unwrap_or_default(),
            dup.slug,
            dup.ids.join(", ")
        );
    }
    for dangling in &report.categories_with_missing_brand {
        println!(
            "  category {} references missing brand {}",
            dangling.record_id, dangling.missing_id
        );
    }
    for dangling in &report.products_with_missing_brand {
        println!(
            "  product {} references missing brand {}",
            dangling.record_id, dangling.missing_id
        );
    }
    for dangling in &report.products_with_missing_category {
        println!(
            "  product {} references missing category {}",
            dangling.record_id, dangling.missing_id
        );
    }
    for id in &report.products_without_category_id {
        println!("  product {} has no categoryId", id);
    }
}

fn breadcrumbs(view: &NavigationView) -> Option<String> {
    let crumbs = match view {
        NavigationView::Brands { breadcrumbs, .. }
        | NavigationView::Brand { breadcrumbs, .. }
        | NavigationView::Category { breadcrumbs, .. }
        | NavigationView::Product { breadcrumbs, .. } => breadcrumbs,
        NavigationView::NotFound { .. } => return None,
    };
    Some(
        crumbs
            .iter()
            .map(|crumb| crumb.label.as_str())
            .collect::<Vec<_>>()
            .join(" › "),
    )
}
