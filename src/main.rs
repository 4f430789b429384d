// src/main.rs - Command line front end for the storefront

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use storefront::catalog::{
    query, star_fill, Availability, FetchOutcome, FilterState, ListingController,
    ListingSnapshot, ProductDetail, ProductFetcher, ReviewSort, Sort,
};
use storefront::config::{ConfigManager, StorefrontConfig};
use storefront::error::{Error, Result};
use storefront::{logging, ApplicationCore};

#[derive(Parser)]
#[command(
    name = "storefront",
    version = storefront::VERSION,
    about = "Browse a remote product catalog from the command line",
    long_about = None
)]
struct Cli {
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Catalog API base URL (overrides the configuration)
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true)]
    debug: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of products
    List {
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// Sort as `<field>-<asc|desc>`, e.g. `price-desc`
        #[arg(long)]
        sort: Option<Sort>,

        #[arg(short, long)]
        page: Option<u32>,

        /// Start from a URL query string such as `?search=phone&page=2`
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Show one product with its reviews
    Show {
        id: String,

        /// date-desc, date-asc, rating-desc or rating-asc
        #[arg(short, long, default_value_t = ReviewSort::default())]
        reviews: ReviewSort,
    },
    /// List the category filter options
    Categories,
    /// Validate configuration
    ValidateConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        tracing::error!(error = %error, "command failed");
        eprintln!("error: {}", error.user_message());
        for cause in &error.causes {
            eprintln!("  caused by: {}", cause);
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let manager = load_config(&cli)?;

    if let Commands::ValidateConfig = cli.command {
        return validate_config(&manager, cli.json);
    }

    let config = manager.validated_config()?;
    let _guard = logging::init(&config.logging)?;
    let core = ApplicationCore::new(config)?;

    match cli.command {
        Commands::List {
            search,
            category,
            sort,
            page,
            query,
        } => {
            let mut filters = query
                .as_deref()
                .map(|q| query::decode(&query::parse_query_string(q)))
                .unwrap_or_default();
            if let Some(search) = search {
                filters.search = search;
            }
            if let Some(category) = category {
                filters.category = category;
            }
            if sort.is_some() {
                filters.sort = sort;
            }
            if let Some(page) = page {
                filters.set_page(page);
            }
            list(&core, filters, cli.json).await
        }
        Commands::Show { id, reviews } => show(&core, &id, reviews, cli.json).await,
        Commands::Categories => {
            let categories = core.fetcher().fetch_categories().await;
            if cli.json {
                print_json(&categories)
            } else {
                for category in categories {
                    println!("{}", category);
                }
                Ok(())
            }
        }
        Commands::ValidateConfig => Ok(()),
    }
}

fn load_config(cli: &Cli) -> Result<ConfigManager> {
    let mut manager = ConfigManager::standard(cli.config.as_deref())?;

    let mut overrides = serde_json::Map::new();
    if let Some(base_url) = &cli.base_url {
        overrides.insert("api".to_string(), serde_json::json!({ "base_url": base_url }));
    }
    let level = if cli.debug {
        Some("debug")
    } else if cli.verbose {
        Some("info")
    } else {
        None
    };
    if let Some(level) = level {
        overrides.insert("logging".to_string(), serde_json::json!({ "level": level }));
    }

    if !overrides.is_empty() {
        manager.add_memory_layer("command_line", serde_json::Value::Object(overrides), 1000);
        manager.load()?;
    }
    Ok(manager)
}

async fn list(core: &ApplicationCore, filters: FilterState, json: bool) -> Result<()> {
    let listing = ListingController::with_filters(core.fetcher(), filters);
    let (outcome, _) = futures::join!(listing.load(), listing.load_categories());

    if outcome == FetchOutcome::Failed {
        if let Some(error) = listing.last_error() {
            return Err(error);
        }
    }

    let snapshot = listing.snapshot();
    if json {
        return print_json(&snapshot);
    }
    print_listing(&snapshot, &listing);
    Ok(())
}

fn print_listing(snapshot: &ListingSnapshot, listing: &ListingController) {
    if snapshot.items.is_empty() {
        println!("No products found.");
        return;
    }

    for product in &snapshot.items {
        let stock = match product.availability() {
            Availability::InStock(n) => format!("{} in stock", n),
            Availability::OutOfStock => "out of stock".to_string(),
        };
        println!(
            "{:>6}  {:<40}  {:>9.2}  {}  {}",
            product.id,
            truncate(&product.title, 40),
            product.price,
            stars(product.rating),
            stock
        );
    }

    println!();
    println!(
        "Page {} of {} ({} products)  query: ?{}",
        snapshot.filters.page(),
        snapshot.total_pages.max(1),
        snapshot.total_count,
        query::to_query_string(&listing.query())
    );
    if !snapshot.categories.is_empty() {
        println!("Categories: {}", snapshot.categories.join(", "));
    }
}

async fn show(core: &ApplicationCore, id: &str, order: ReviewSort, json: bool) -> Result<()> {
    let detail = core.detail();
    detail.load(id).await;

    if let Some(error) = detail.state().error() {
        return Err(error.clone());
    }
    let product = detail
        .detail()
        .ok_or_else(|| Error::not_found("product", id))?;
    let reviews = detail.sorted_reviews(order);

    if json {
        return print_json(&serde_json::json!({
            "product": product,
            "reviews": reviews,
            "metadata": detail.metadata(),
        }));
    }

    print_product(&product);
    println!();
    println!("Reviews ({}):", order.label());
    if reviews.is_empty() {
        println!("  No reviews yet.");
    }
    for review in reviews {
        println!(
            "  {} {} on {}",
            stars(review.rating),
            review.author,
            review.date.format("%Y-%m-%d")
        );
        if !review.text.is_empty() {
            println!("    {}", review.text);
        }
    }
    Ok(())
}

fn print_product(product: &ProductDetail) {
    let summary = &product.summary;
    println!("{} (#{})", summary.title, summary.id);
    println!("  Price:    {:.2}", summary.price);
    println!("  Rating:   {} {:.1}", stars(summary.rating), summary.rating);
    println!("  Category: {}", summary.category);
    if let Some(brand) = &product.brand {
        println!("  Brand:    {}", brand);
    }
    match summary.availability() {
        Availability::InStock(n) => println!("  Stock:    {} (add to cart available)", n),
        Availability::OutOfStock => println!("  Stock:    out of stock"),
    }
    if !product.tags.is_empty() {
        let tags: Vec<&str> = product.tags.iter().map(String::as_str).collect();
        println!("  Tags:     {}", tags.join(", "));
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
    if !summary.images.is_empty() {
        println!();
        for (index, image) in summary.images.iter().enumerate() {
            println!("  [{}] {}", index + 1, image);
        }
    }
}

fn validate_config(manager: &ConfigManager, json: bool) -> Result<()> {
    let config: StorefrontConfig = manager.config()?;
    let errors = config.validate();

    if json {
        print_json(&serde_json::json!({
            "valid": errors.is_empty(),
            "errors": errors,
            "layers": manager.get_metadata(),
        }))?;
    } else if errors.is_empty() {
        println!("Configuration is valid");
        println!("   Catalog: {}", config.api.base_url);
        println!("   Page size: {}", config.api.page_size);
        println!("   Version: {}", storefront::VERSION);
    } else {
        println!("Configuration has {} problem(s):", errors.len());
        for error in &errors {
            println!("   {}", error);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(manager
            .validated_config()
            .err()
            .unwrap_or_else(|| Error::config("Configuration is invalid")))
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn stars(rating: f64) -> String {
    star_fill(rating)
        .iter()
        .map(|filled| if *filled { '★' } else { '☆' })
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
