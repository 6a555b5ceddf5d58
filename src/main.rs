use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use unistore_lib::download::resolve_sources;
use unistore_lib::open_api::{self, OpenApi};
use unistore_lib::{AppConfig, DownloadChoice, MemoryCredentials, Store, StoreHub};

#[derive(Parser)]
#[command(name = "unistore", version, about = "Browse, search and download across app stores")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Categories {
        store: String,
    },
    List {
        store: String,
        category: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        user: Option<String>,
    },
    /// Searches one store, or every configured store when none is given
    Search {
        query: String,
        #[arg(long)]
        store: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Detail {
        store: String,
        id: String,
        version: String,
    },
    Comments {
        store: String,
        id: String,
        version: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Sources {
        store: String,
        id: String,
        version: String,
    },
    /// Prints an open platform token to export as UNISTORE_OPEN_TOKEN
    Login {
        account: String,
        password: String,
    },
}

fn parse_store(key: &str) -> Result<Store, String> {
    Store::from_key(key).ok_or_else(|| format!("Unknown store '{}' (community, shop, open)", key))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", text);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load_or_default(),
    };
    let credentials = Arc::new(MemoryCredentials::from_env().await);
    let hub = StoreHub::from_config(&config, credentials.clone());
    let fail = |e: unistore_lib::RepoError| e.user_message();

    match cli.command {
        Command::Categories { store } => {
            let categories = hub.get_categories(parse_store(&store)?).await.map_err(fail)?;
            print_json(&*categories)
        }
        Command::List {
            store,
            category,
            page,
            user,
        } => {
            let page = hub
                .list_apps(parse_store(&store)?, &category, page, user.as_deref())
                .await
                .map_err(fail)?;
            print_json(&page)
        }
        Command::Search { query, store, page } => match store {
            Some(store) => {
                let page = hub
                    .search_apps(parse_store(&store)?, &query, page, None)
                    .await
                    .map_err(fail)?;
                print_json(&page)
            }
            None => {
                for (store, result) in hub.search_everywhere(&query, page).await {
                    match result {
                        Ok(page) => {
                            println!("# {}", store.display_name());
                            print_json(&page)?;
                        }
                        Err(e) => log::warn!("{}: {}", store, e.user_message()),
                    }
                }
                Ok(())
            }
        },
        Command::Detail { store, id, version } => {
            let detail = hub
                .get_app_detail(parse_store(&store)?, &id, &version)
                .await
                .map_err(fail)?;
            print_json(&detail)
        }
        Command::Comments {
            store,
            id,
            version,
            page,
        } => {
            let comments = hub
                .get_comments(parse_store(&store)?, &id, &version, page)
                .await
                .map_err(fail)?;
            print_json(&comments)
        }
        Command::Sources { store, id, version } => {
            let sources = hub
                .get_download_sources(parse_store(&store)?, &id, &version)
                .await
                .map_err(fail)?;
            match resolve_sources(sources).map_err(fail)? {
                DownloadChoice::Start(source) => print_json(&vec![source]),
                DownloadChoice::Choose(sources) => print_json(&sources),
            }
        }
        Command::Login { account, password } => {
            let backend = config
                .backend(Store::Open)
                .ok_or_else(|| "Open platform is not configured".to_string())?;
            let executor = Arc::new(unistore_lib::executor::RequestExecutor::new(
                Arc::new(unistore_lib::http::ReqwestTransport::new(
                    &config.user_agent,
                    std::time::Duration::from_secs(config.timeout_secs),
                )),
                config.retry.policy(),
            ));
            let api = OpenApi::new(unistore_lib::backend::BackendClient::new(
                open_api::PROFILE,
                backend.base_url.clone(),
                executor,
                credentials,
            ));
            let result = api.login(&account, &password).await.map_err(fail)?;
            println!("{}", result.token);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
