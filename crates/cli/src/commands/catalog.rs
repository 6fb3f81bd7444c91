use furnish_client::{SearchResults, Storefront, ViewScope};
use furnish_core::config::{AppConfig, LoadOptions};
use furnish_core::domain::product::ProductId;
use furnish_core::errors::FetchError;
use tokio::runtime::Runtime;
use tracing::info;

use crate::commands::render;
use crate::commands::{load_view, runtime, CommandResult, OutputFormat, EXIT_FAILURE};

struct Prepared {
    runtime: Runtime,
    storefront: Storefront,
}

fn prepare(
    command: &str,
    options: &LoadOptions,
    format: OutputFormat,
) -> Result<Prepared, CommandResult> {
    let config = AppConfig::load(options.clone())
        .map_err(|error| CommandResult::config_failure(command, &error, format))?;
    let storefront = Storefront::from_config(&config)
        .map_err(|error| CommandResult::fetch_failure(command, &error, format))?;
    let runtime = runtime().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime",
            format!("failed to initialize async runtime: {error}"),
            EXIT_FAILURE,
            format,
        )
    })?;

    info!(
        event_name = "cli.catalog.command_started",
        command,
        catalog_base_url = %config.catalog.base_url,
        "catalog command started"
    );
    Ok(Prepared { runtime, storefront })
}

pub fn list(options: &LoadOptions, format: OutputFormat) -> CommandResult {
    let Prepared { runtime, storefront } = match prepare("list", options, format) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let scope = ViewScope::new();
    match runtime.block_on(load_view(&scope, "home", storefront.home())) {
        Ok(cards) if format == OutputFormat::Json => CommandResult::json("list", &cards),
        Ok(cards) => {
            CommandResult::text(render::product_list("Furniture", &cards, render::NO_PRODUCTS))
        }
        Err(error) => CommandResult::fetch_failure("list", &error, format),
    }
}

pub fn show(options: &LoadOptions, id: &str, format: OutputFormat) -> CommandResult {
    let Prepared { runtime, storefront } = match prepare("show", options, format) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let id = ProductId::from(id);
    let scope = ViewScope::new();
    match runtime.block_on(load_view(&scope, "detail", storefront.detail(&id))) {
        Ok(card) if format == OutputFormat::Json => CommandResult::json("show", &card),
        Ok(card) => CommandResult::text(render::product_detail(&card)),
        Err(error) => CommandResult::fetch_failure("show", &error, format),
    }
}

pub fn deals(options: &LoadOptions, format: OutputFormat) -> CommandResult {
    let Prepared { runtime, storefront } = match prepare("deals", options, format) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let scope = ViewScope::new();
    match runtime.block_on(load_view(&scope, "deals", storefront.deals())) {
        Ok(cards) if format == OutputFormat::Json => CommandResult::json("deals", &cards),
        Ok(cards) => {
            CommandResult::text(render::product_list("Hot Deals", &cards, render::NO_DEALS))
        }
        Err(error) => CommandResult::fetch_failure("deals", &error, format),
    }
}

/// Runs one query through the debounced controller, as a single keystroke.
pub fn search(options: &LoadOptions, query: &str, format: OutputFormat) -> CommandResult {
    let Prepared { runtime, storefront } = match prepare("search", options, format) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let results = runtime.block_on(run_search(&storefront, query));
    if let Some(error) = &results.error {
        return CommandResult::fetch_failure("search", error, format);
    }

    match format {
        OutputFormat::Json => CommandResult::json("search", &results.products),
        OutputFormat::Text => CommandResult::text(render::search_results(&results)),
    }
}

pub(crate) async fn run_search(storefront: &Storefront, query: &str) -> SearchResults {
    let mut controller = storefront.search_controller();
    let mut updates = controller.subscribe();
    controller.input(query);

    if updates.changed().await.is_err() {
        return SearchResults {
            query: query.to_string(),
            error: Some(FetchError::Cancelled),
            ..SearchResults::default()
        };
    }
    let results = updates.borrow_and_update().clone();
    controller.close();
    results
}
