use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use episode_finder::utils::logging::init_tracing;
use episode_finder::{
    format_episode_date, AppConfig, DatasetCache, FinderView, HttpEpisodeLoader, QueryController,
    EPISODES_KEY,
};

/// Search the published stream episode sheet
#[derive(Parser, Debug)]
#[command(name = "episode-finder", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sheet CSV URL (overrides the configuration)
    #[arg(long)]
    url: Option<String>,

    /// Search once for this query and exit; without it, read one query per line
    #[arg(short, long)]
    query: Option<String>,

    /// Print the finder state as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::default(),
    };
    if let Some(url) = &cli.url {
        config.source.url = url.clone();
    }
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.logging.level);
    info!("{} v{}", episode_finder::NAME, episode_finder::VERSION);

    let loader = HttpEpisodeLoader::new(&config.source)?;
    let cache =
        DatasetCache::new(config.cache.clone()).with_source(EPISODES_KEY, Arc::new(loader));

    let mut controller = QueryController::new();
    if !cli.json {
        print_view(&controller.view());
    }
    controller.apply_load_result(cache.fetch(EPISODES_KEY).await.map(|data| data.to_vec()));

    if let Some(query) = cli.query {
        controller.set_search_term(query);
        render(&controller, cli.json)?;
        if let Some(err) = controller.error() {
            anyhow::bail!("{err}");
        }
        return Ok(());
    }

    render(&controller, cli.json)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        if matches!(command, ":quit" | ":q") {
            break;
        }
        if command == ":refresh" {
            controller.begin_loading();
            let result = cache.refetch(EPISODES_KEY).await;
            controller.apply_load_result(result.map(|data| data.to_vec()));
        } else {
            controller.set_search_term(line.as_str());
        }
        render(&controller, cli.json)?;
    }

    Ok(())
}

fn render(controller: &QueryController, json: bool) -> Result<()> {
    let view = controller.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

fn print_view(view: &FinderView) {
    if view.is_loading {
        println!("Loading episodes...");
        return;
    }
    if view.error.is_some() {
        println!("Error loading episodes. Please try again.");
    }

    if view.search_results.is_empty() {
        println!("No episodes found.");
        return;
    }

    for episode in &view.search_results {
        println!("{}", episode.stream_title);
        println!("  {}", format_episode_date(&episode.date));
        println!("  Stream:  {}", episode.stream_link);
        println!("  Article: {}", episode.article_link);
    }
    let total = view.episodes.as_ref().map_or(0, Vec::len);
    println!("({} of {} episodes)", view.search_results.len(), total);
}
