//! Interactive line session: one storefront, its selection stores, and the
//! view that is currently mounted.

use anyhow::Context;
use furnish_client::{SearchController, Storefront, ViewScope};
use furnish_core::config::{AppConfig, LoadOptions};
use furnish_core::domain::product::ProductId;
use furnish_core::errors::FetchError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::commands::render;
use crate::commands::{load_view, runtime, CommandResult, OutputFormat, EXIT_FAILURE};

pub const PROMPT: &str = "furnish> ";

pub const HELP: &str = "\
commands:
  list             all furniture
  show <id>        product detail
  deals            products on sale
  favorites        your favorites
  cart             your cart and order summary
  fav <id>         toggle favorite
  cart <id>        toggle cart membership
  saved            ids in favorites and cart
  search <text>    search by name
  reload           refetch the catalog
  help             this text
  quit             leave the session";

#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    Empty,
    List,
    Show(ProductId),
    Deals,
    Favorites,
    Cart,
    ToggleFavorite(ProductId),
    ToggleCart(ProductId),
    Saved,
    Search(String),
    Reload,
    Help,
    Quit,
    Unknown(String),
}

impl SessionCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let (verb, argument) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match (verb.to_ascii_lowercase().as_str(), argument) {
            ("", _) => Self::Empty,
            ("list" | "home", "") => Self::List,
            ("deals", "") => Self::Deals,
            ("favorites" | "favs", "") => Self::Favorites,
            ("cart", "") => Self::Cart,
            ("cart", id) => Self::ToggleCart(ProductId::from(id)),
            ("show", id) if !id.is_empty() => Self::Show(ProductId::from(id)),
            ("fav", id) if !id.is_empty() => Self::ToggleFavorite(ProductId::from(id)),
            ("saved", "") => Self::Saved,
            ("search", text) => Self::Search(text.to_string()),
            ("reload", "") => Self::Reload,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

pub struct Session {
    storefront: Storefront,
    view: ViewScope,
    search: SearchController,
}

impl Session {
    pub fn new(storefront: Storefront) -> Self {
        let search = storefront.search_controller();
        Self { storefront, view: ViewScope::new(), search }
    }

    /// Runs until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let Some(reply) = self.handle(&line).await else {
                break;
            };
            if !reply.is_empty() {
                output.write_all(reply.as_bytes()).await?;
                output.write_all(b"\n").await?;
            }
        }

        self.close();
        output.flush().await
    }

    /// Returns the reply for one input line, or `None` to end the session.
    pub async fn handle(&mut self, line: &str) -> Option<String> {
        let command = SessionCommand::parse(line);
        debug!(
            event_name = "cli.session.command",
            command = ?command,
            "session command received"
        );

        let reply = match command {
            SessionCommand::Empty => String::new(),
            SessionCommand::Quit => return None,
            SessionCommand::Help => HELP.to_string(),
            SessionCommand::Unknown(line) => format!("unknown command `{line}`; type `help`"),
            SessionCommand::ToggleFavorite(id) => {
                let selected = self.storefront.toggle_favorite(&id);
                let verb = if selected { "added to" } else { "removed from" };
                format!("{id} {verb} favorites")
            }
            SessionCommand::ToggleCart(id) => {
                let selected = self.storefront.toggle_cart(&id);
                let verb = if selected { "added to" } else { "removed from" };
                format!("{id} {verb} cart ({} in cart)", self.storefront.cart_count())
            }
            SessionCommand::Saved => render::saved(
                &self.storefront.favorites_store().selected_ids(),
                &self.storefront.cart_store().selected_ids(),
            ),
            SessionCommand::List => {
                self.mount();
                match load_view(&self.view, "home", self.storefront.home()).await {
                    Ok(cards) => render::product_list("Furniture", &cards, render::NO_PRODUCTS),
                    Err(error) => failure_banner(&error),
                }
            }
            SessionCommand::Deals => {
                self.mount();
                match load_view(&self.view, "deals", self.storefront.deals()).await {
                    Ok(cards) => render::product_list("Hot Deals", &cards, render::NO_DEALS),
                    Err(error) => failure_banner(&error),
                }
            }
            SessionCommand::Favorites => {
                self.mount();
                match load_view(&self.view, "favorites", self.storefront.favorites()).await {
                    Ok(cards) => {
                        render::product_list("Your Favorites", &cards, render::NO_FAVORITES)
                    }
                    Err(error) => failure_banner(&error),
                }
            }
            SessionCommand::Cart => {
                self.mount();
                match load_view(&self.view, "cart", self.storefront.cart()).await {
                    Ok(summary) => render::cart(&summary),
                    Err(error) => failure_banner(&error),
                }
            }
            SessionCommand::Show(id) => {
                self.mount();
                match load_view(&self.view, "detail", self.storefront.detail(&id)).await {
                    Ok(card) => render::product_detail(&card),
                    Err(error) => failure_banner(&error),
                }
            }
            SessionCommand::Search(text) => self.search_catalog(text).await,
            SessionCommand::Reload => match self.storefront.reload().await {
                Ok(snapshot) => format!("catalog reloaded ({} items)", snapshot.catalog.len()),
                Err(error) => failure_banner(&error),
            },
        };

        Some(reply)
    }

    /// Replaces the mounted view; anything the previous one started is dropped.
    fn mount(&mut self) {
        self.view = ViewScope::new();
    }

    async fn search_catalog(&mut self, text: String) -> String {
        let mut updates = self.search.subscribe();
        self.search.input(text);

        if updates.changed().await.is_err() {
            return failure_banner(&FetchError::Cancelled);
        }
        let results = self.search.latest();
        match &results.error {
            Some(error) => failure_banner(error),
            None => render::search_results(&results),
        }
    }

    pub fn close(&mut self) {
        self.view.close();
        self.search.close();
    }
}

fn failure_banner(error: &FetchError) -> String {
    if error.is_not_found() {
        return error.user_message().to_string();
    }
    format!("{}\n(type `reload` to retry)", error.user_message())
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let format = OutputFormat::Text;
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure("session", &error, format),
    };
    let storefront = match Storefront::from_config(&config) {
        Ok(storefront) => storefront,
        Err(error) => return CommandResult::fetch_failure("session", &error, format),
    };
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "session",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_FAILURE,
                format,
            );
        }
    };

    info!(
        event_name = "cli.session.started",
        catalog_base_url = %config.catalog.base_url,
        debounce_ms = config.search.debounce_ms,
        "interactive session started"
    );
    let outcome = runtime.block_on(async {
        let mut session = Session::new(storefront);
        session
            .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
            .context("session i/o failed")
    });
    info!(event_name = "cli.session.ended", "interactive session ended");

    match outcome {
        Ok(()) => CommandResult::text("Goodbye"),
        Err(error) => CommandResult::failure(
            "session",
            "io",
            format!("{error:#}"),
            EXIT_FAILURE,
            format,
        ),
    }
}
