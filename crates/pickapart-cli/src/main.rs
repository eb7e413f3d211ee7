use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pickapart_build::{BuildItem, SavedBuildId, UserId};
use pickapart_pricing::Currency;
use pickapart_sync::{BuildReconciler, FileCache, JsonFileStore, SyncOutcome};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod render;

use config::AppConfig;

type Reconciler = BuildReconciler<JsonFileStore, FileCache>;

fn cli() -> Command {
    Command::new("pickapart")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Edit, sync and save PC builds")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .default_value("pickapart.toml")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (missing means defaults)"),
        )
        .arg(
            Arg::new("cache-dir")
                .long("cache-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the session cache"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON file used as the build store"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .help("Signed-in user id; omit for an anonymous session"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .subcommand(
            Command::new("show")
                .about("Print the current build and its total")
                .arg(
                    Arg::new("currency")
                        .long("currency")
                        .help("Display currency code"),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Add a part to a category")
                .arg(Arg::new("category").required(true).help("Category key, e.g. memory"))
                .arg(Arg::new("id").long("id").required(true).help("Catalog id"))
                .arg(Arg::new("name").long("name").required(true).help("Part name"))
                .arg(Arg::new("price").long("price").required(true).help("Catalog price text, e.g. $54.99"))
                .arg(Arg::new("image").long("image").help("Image reference"))
                .arg(Arg::new("brand").long("brand").help("Manufacturer"))
                .arg(
                    Arg::new("qty")
                        .long("qty")
                        .default_value("1")
                        .value_parser(value_parser!(NonZeroU32))
                        .help("Units to add"),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove an item, or a whole category when --id is omitted")
                .arg(Arg::new("category").required(true).help("Category key"))
                .arg(Arg::new("id").long("id").help("Catalog id of the item to remove")),
        )
        .subcommand(Command::new("clear").about("Remove every part"))
        .subcommand(Command::new("sync").about("Reconcile the local build with the store"))
        .subcommand(
            Command::new("save")
                .about("Save the current build as a named snapshot")
                .arg(Arg::new("name").long("name").help("Snapshot name")),
        )
        .subcommand(Command::new("saved").about("List saved builds"))
        .subcommand(
            Command::new("view")
                .about("Show one saved build")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(SavedBuildId))
                        .help("Saved build id"),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a saved build")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(SavedBuildId))
                        .help("Saved build id"),
                ),
        )
        .subcommand(Command::new("logout").about("Forget the local build"))
}

fn init_tracing(config: &AppConfig, verbose: bool) {
    let fallback = if verbose { "debug" } else { config.log.filter.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry().with(filter);
    if config.log.json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn arg<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a String> {
    args.get_one::<String>(name)
        .with_context(|| format!("missing argument <{name}>"))
}

fn signed_in(user: Option<&UserId>, command: &str) -> anyhow::Result<UserId> {
    match user {
        Some(user) => Ok(user.clone()),
        None => bail!("`{command}` needs a signed-in user (pass --user)"),
    }
}

fn display_currency(config: &AppConfig, requested: Option<&String>) -> Currency {
    let code = requested.map_or(config.pricing.default_currency.as_str(), String::as_str);
    match config.pricing.table().get(code) {
        Ok(currency) => currency.clone(),
        Err(e) => {
            tracing::warn!(error = %e, "falling back to USD");
            Currency::usd()
        }
    }
}

/// Print the edited build and wait for its push, if any
async fn finish(outcome: SyncOutcome, currency: &Currency) {
    let (build, pushed) = outcome.settle().await;
    print!("{}", render::build_summary(&build, currency));
    if let Some(Err(e)) = pushed {
        tracing::debug!(error = %e, "push did not complete, build kept locally");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("pickapart.toml"));
    let mut config = AppConfig::load(&config_path)?;
    if let Some(dir) = matches.get_one::<PathBuf>("cache-dir") {
        config.paths.cache_dir = dir.clone();
    }
    if let Some(file) = matches.get_one::<PathBuf>("store") {
        config.paths.store_file = file.clone();
    }
    init_tracing(&config, matches.get_flag("verbose"));
    tracing::debug!(config = %config_path.display(), "configuration loaded");

    let store = Arc::new(JsonFileStore::new(&config.paths.store_file));
    let cache = Arc::new(FileCache::new(&config.paths.cache_dir, &config.sync.session_key));
    let reconciler: Reconciler = BuildReconciler::new(store, cache, config.sync.clone());

    let user = matches.get_one::<String>("user").map(UserId::new);
    let user = user.as_ref();
    let default_currency = display_currency(&config, None);

    match matches.subcommand() {
        Some(("show", args)) => {
            let currency = display_currency(&config, args.get_one::<String>("currency"));
            print!("{}", render::build_summary(&reconciler.current(), &currency));
        }
        Some(("add", args)) => {
            let mut item = BuildItem::new(arg(args, "id")?, arg(args, "name")?, arg(args, "price")?);
            if let Some(image) = args.get_one::<String>("image") {
                item = item.with_image(image);
            }
            if let Some(brand) = args.get_one::<String>("brand") {
                item = item.with_brand(brand);
            }
            let qty = args.get_one::<NonZeroU32>("qty").copied().unwrap_or(NonZeroU32::MIN);
            let category = arg(args, "category")?;

            finish(reconciler.add_part(user, category, item, qty), &default_currency).await;
        }
        Some(("remove", args)) => {
            let category = arg(args, "category")?;
            let outcome = match args.get_one::<String>("id") {
                Some(id) => reconciler.remove_part(user, category, id),
                None => reconciler.remove_category(user, category),
            };
            finish(outcome, &default_currency).await;
        }
        Some(("clear", _)) => finish(reconciler.clear_build(user), &default_currency).await,
        Some(("sync", _)) => {
            let user = signed_in(user, "sync")?;
            let outcome = reconciler.start_session(Some(&user)).await;
            println!("Using {:?} build", outcome.source);
            finish(outcome, &default_currency).await;
        }
        Some(("save", args)) => {
            let user = signed_in(user, "save")?;
            let name = args.get_one::<String>("name").map(String::as_str);
            let saved = reconciler.save_build(&user, name).await.context("save failed")?;
            println!("{}", render::saved_row(&saved, &default_currency));
        }
        Some(("saved", _)) => {
            let user = signed_in(user, "saved")?;
            let builds = reconciler.saved_builds(&user).await.context("listing saved builds failed")?;
            if builds.is_empty() {
                println!("(no saved builds)");
            }
            for saved in &builds {
                println!("{}", render::saved_row(saved, &default_currency));
            }
        }
        Some(("view", args)) => {
            let user = signed_in(user, "view")?;
            let id = *args.get_one::<SavedBuildId>("id").context("missing argument <id>")?;
            let saved = reconciler
                .view_saved(&user, id)
                .await
                .with_context(|| format!("cannot view saved build {id}"))?;
            println!("{}", render::saved_row(&saved, &default_currency));
            print!("{}", render::build_summary(saved.parts(), &default_currency));
        }
        Some(("delete", args)) => {
            let user = signed_in(user, "delete")?;
            let id = *args.get_one::<SavedBuildId>("id").context("missing argument <id>")?;
            reconciler
                .delete_saved(&user, id)
                .await
                .with_context(|| format!("cannot delete saved build {id}"))?;
            println!("Deleted {id}");
        }
        Some(("logout", _)) => {
            reconciler.end_session();
            println!("Local build cleared");
        }
        _ => bail!("no command given"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn add_parses_quantity() {
        let matches = cli()
            .try_get_matches_from([
                "pickapart", "add", "memory", "--id", "m1", "--name", "DDR5", "--price", "$54.99", "--qty", "2",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(args.get_one::<NonZeroU32>("qty").map(|q| q.get()), Some(2));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let result = cli().try_get_matches_from([
            "pickapart", "add", "memory", "--id", "m1", "--name", "DDR5", "--price", "$5", "--qty", "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_user_after_subcommand() {
        let matches = cli().try_get_matches_from(["pickapart", "sync", "--user", "alice"]).unwrap();
        assert_eq!(matches.get_one::<String>("user").map(String::as_str), Some("alice"));
    }

    #[test]
    fn unknown_currency_falls_back_to_usd() {
        let config = AppConfig::default();
        let currency = display_currency(&config, Some(&"XYZ".to_string()));
        assert_eq!(currency.code, "USD");
    }
}
