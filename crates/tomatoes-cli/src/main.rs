//! tomatoes - Rotten Tomatoes movie data CLI.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use url::Url;

use crate::config::{API_KEY_ENV, AppConfig, resolve_config_path};
use tomatoes_api::rottentomatoes::{
    DvdList, ListParams, LocalRtApi, MovieList, ReviewParams, ReviewType, RtClient, RtMovie,
    SearchParams,
};

/// CLI argument parser.
#[derive(Debug, Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse movie and DVD lists.
    Lists(ListsCommand),
    /// Query a single movie.
    Movie(MovieCommand),
    /// Search movies by title.
    Search(SearchArgs),
    /// Manage the config file.
    Config(ConfigCommand),
}

/// Arguments for the `lists` subcommand.
#[derive(Debug, clap::Args)]
struct ListsCommand {
    /// Lists subcommand to run.
    #[command(subcommand)]
    command: ListsSubcommands,
}

/// Available lists subcommands.
#[derive(Debug, Subcommand)]
enum ListsSubcommands {
    /// Fetch a movie list.
    Movies(MovieListArgs),
    /// Fetch a DVD list.
    Dvds(DvdListArgs),
    /// Show the list directory.
    Directory(DirectoryArgs),
}

/// Paging and region options shared by list commands.
#[derive(Debug, clap::Args)]
struct ListOptions {
    /// Two-letter country code (e.g. "us").
    #[arg(long)]
    country: Option<String>,
    /// Number of results for limit-based lists (1-50).
    #[arg(long)]
    limit: Option<u32>,
    /// Page number for paged lists.
    #[arg(long)]
    page: Option<u32>,
    /// Results per page for paged lists (1-50).
    #[arg(long)]
    page_limit: Option<u32>,
}

impl ListOptions {
    /// Converts to API list params.
    fn to_params(&self) -> ListParams {
        let mut params = ListParams::new()
            .limit(self.limit.unwrap_or_default())
            .page(self.page.unwrap_or_default())
            .page_limit(self.page_limit.unwrap_or_default());
        if let Some(ref country) = self.country {
            params = params.country(country);
        }
        params
    }
}

/// Arguments for the `lists movies` subcommand.
#[derive(Debug, clap::Args)]
struct MovieListArgs {
    /// List name: box-office, in-theaters, opening, upcoming.
    list: MovieList,
    /// Paging and region options.
    #[command(flatten)]
    options: ListOptions,
}

/// Arguments for the `lists dvds` subcommand.
#[derive(Debug, clap::Args)]
struct DvdListArgs {
    /// List name: top-rentals, current-releases, new-releases, upcoming.
    list: DvdList,
    /// Paging and region options.
    #[command(flatten)]
    options: ListOptions,
}

/// Which list directory to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectoryKind {
    /// Top-level directory.
    All,
    /// Movie lists.
    Movies,
    /// DVD lists.
    Dvds,
}

/// Arguments for the `lists directory` subcommand.
#[derive(Debug, clap::Args)]
struct DirectoryArgs {
    /// Directory to show.
    #[arg(long, value_enum, default_value_t = DirectoryKind::All)]
    kind: DirectoryKind,
}

/// Arguments for the `movie` subcommand.
#[derive(Debug, clap::Args)]
struct MovieCommand {
    /// Movie subcommand to run.
    #[command(subcommand)]
    command: MovieSubcommands,
}

/// Available movie subcommands.
#[derive(Debug, Subcommand)]
enum MovieSubcommands {
    /// Show detailed movie information.
    Info(MovieIdArgs),
    /// Show the full cast.
    Cast(MovieIdArgs),
    /// Show trailers and clips.
    Clips(MovieIdArgs),
    /// Show similar movies.
    Similar(SimilarArgs),
    /// Show critic reviews.
    Reviews(ReviewsArgs),
    /// Look up a movie by an external ID.
    Alias(AliasArgs),
}

/// Movie ID argument.
#[derive(Debug, clap::Args)]
struct MovieIdArgs {
    /// Rotten Tomatoes movie ID.
    id: u64,
}

/// Arguments for the `movie similar` subcommand.
#[derive(Debug, clap::Args)]
struct SimilarArgs {
    /// Rotten Tomatoes movie ID.
    id: u64,
    /// Number of results (1-50).
    #[arg(long)]
    limit: Option<u32>,
}

/// Arguments for the `movie reviews` subcommand.
#[derive(Debug, clap::Args)]
struct ReviewsArgs {
    /// Rotten Tomatoes movie ID.
    id: u64,
    /// Review filter: all, top_critic, dvd.
    #[arg(long)]
    review_type: Option<ReviewType>,
    /// Page number.
    #[arg(long)]
    page: Option<u32>,
    /// Results per page (1-50).
    #[arg(long)]
    page_limit: Option<u32>,
    /// Two-letter country code.
    #[arg(long)]
    country: Option<String>,
}

/// Arguments for the `movie alias` subcommand.
#[derive(Debug, clap::Args)]
struct AliasArgs {
    /// External ID (e.g. "tt0435761").
    #[arg(long, required = true)]
    id: String,
    /// External ID type.
    #[arg(long = "type", default_value = "imdb")]
    id_type: String,
}

/// Arguments for the `search` subcommand.
#[derive(Debug, clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "Toy Story").
    query: String,
    /// Page number.
    #[arg(long)]
    page: Option<u32>,
    /// Results per page (1-50).
    #[arg(long)]
    page_limit: Option<u32>,
}

/// Arguments for the `config` subcommand.
#[derive(Debug, clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Debug, Subcommand)]
enum ConfigSubcommands {
    /// Write a config file with default settings.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config (secrets masked).
    Show,
}

/// Loads the config file for `dir`.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    AppConfig::load(&config_path).context("failed to load config")
}

/// Builds an `RtClient` from the config file and the `RT_API_KEY` environment variable.
///
/// # Errors
///
/// Returns an error if no API key is configured, a setting is invalid, or
/// the client fails to build.
#[instrument(skip_all)]
fn build_client(dir: Option<&PathBuf>) -> Result<RtClient> {
    let config = load_config(dir)?;
    let env_key = std::env::var(API_KEY_ENV).ok();
    let Some(api_key) = config.api_key(env_key.as_deref()) else {
        bail!("no API key configured: set {API_KEY_ENV} or api.key in config.toml");
    };

    let mut builder = RtClient::builder()
        .api_key(api_key)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .throttle(
            config.throttle.max_calls,
            Duration::from_millis(config.throttle.interval_ms),
        )
        .retry_delay(Duration::from_millis(config.retry.delay_ms))
        .retry_limit(config.retry.limit);

    if let Some(ref base_url) = config.api.base_url {
        let url =
            Url::parse(base_url).with_context(|| format!("invalid api.base_url: {base_url}"))?;
        builder = builder.base_url(url);
    }
    if let Some(secs) = config.http.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.http.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(ref host) = config.http.proxy_host {
        let port = config
            .http
            .proxy_port
            .context("http.proxy_port is required when http.proxy_host is set")?;
        builder = builder.proxy(host, port);
        if let (Some(user), Some(password)) = (&config.http.proxy_user, &config.http.proxy_password)
        {
            builder = builder.proxy_auth(user, password);
        }
    }

    builder.build().context("failed to build Rotten Tomatoes client")
}

/// Formats an optional value, `-` when absent.
fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| String::from("-"), |v| v.to_string())
}

/// Logs a movie table.
fn log_movies(movies: &[RtMovie]) {
    tracing::info!("ID\t\tYear\tScore\tTitle");
    for movie in movies {
        tracing::info!(
            "{}\t{}\t{}\t{}",
            movie.id,
            or_dash(movie.year),
            or_dash(movie.ratings.tomatometer()),
            movie.title,
        );
    }
    tracing::info!("Total: {} movies", movies.len());
}

/// Runs the `lists movies` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_lists_movies(args: &MovieListArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_client(dir)?;
    let movies = client
        .movie_list(args.list, &args.options.to_params())
        .await
        .with_context(|| format!("failed to fetch movie list {}", args.list))?;
    log_movies(&movies);
    Ok(())
}

/// Runs the `lists dvds` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_lists_dvds(args: &DvdListArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_client(dir)?;
    let movies = client
        .dvd_list(args.list, &args.options.to_params())
        .await
        .with_context(|| format!("failed to fetch DVD list {}", args.list))?;
    log_movies(&movies);
    Ok(())
}

/// Runs the `lists directory` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_lists_directory(args: &DirectoryArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_client(dir)?;
    let links = match args.kind {
        DirectoryKind::All => client.lists_directory().await,
        DirectoryKind::Movies => client.movie_lists_directory().await,
        DirectoryKind::Dvds => client.dvd_lists_directory().await,
    }
    .context("failed to fetch list directory")?;

    for (name, link) in &links {
        tracing::info!("{name}\t{link}");
    }
    Ok(())
}

/// Runs the `movie info` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_movie_info(args: &MovieIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_client(dir)?;
    let movie = client
        .movie_info(args.id)
        .await
        .with_context(|| format!("failed to fetch movie {}", args.id))?;

    tracing::info!("ID: {}", movie.id);
    tracing::info!("Title: {}", movie.title);
    tracing::info!("Year: {}", or_dash(movie.year));
    tracing::info!("Rating: {}", movie.mpaa_rating.as_deref().unwrap_or("-"));
    tracing::info!("Runtime: {} min", or_dash(movie.runtime));
    tracing::info!("Genres: {}", movie.genres.join(", "));
    tracing::info!("Studio: {}", movie.studio.as_deref().unwrap_or("-"));
    tracing::info!("In theaters: {}", or_dash(movie.theater_release()));
    tracing::info!("On DVD: {}", or_dash(movie.dvd_release()));
    tracing::info!(
        "Tomatometer: {} ({})",
        or_dash(movie.ratings.tomatometer()),
        movie.ratings.critics_rating.as_deref().unwrap_or("-"),
    );
    tracing::info!("Audience: {}", or_dash(movie.ratings.audience_score));
    tracing::info!("IMDb: {}", or_dash(movie.imdb_id()));
    let directors: Vec<&str> = movie
        .abridged_directors
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    tracing::info!("Directed by: {}", directors.join(", "));
    if let Some(ref consensus) = movie.critics_consensus {
        tracing::info!("Consensus: {consensus}");
    }
    Ok(())
}

/// Runs the `movie cast` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_movie_cast(args: &MovieIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_client(dir)?;
    let cast = client
        .movie_cast(args.id)
        .await
        .with_context(|| format!("failed to fetch cast of movie {}", args.id))?;

    for member in &cast {
        tracing::info!("{}\t{}", member.name, member.characters.join(" / "));
    }
    tracing::info!("Total: {} cast members", cast.len());
    Ok(())
}

/// Runs the `movie clips` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_movie_clips(args: &MovieIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_client(dir)?;
    let clips = client
        .movie_clips(args.id)
        .await
        .with_context(|| format!("failed to fetch clips of movie {}", args.id))?;

    for clip in &clips {
        tracing::info!(
            "{}s\t{}\t{}",
            or_dash(clip.duration),
            clip.title,
            clip.links.get("alternate").map_or("-", String::as_str),
        );
    }
    tracing::info!("Total: {} clips", clips.len());
    Ok(())
}

/// Runs the `movie similar` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_movie_similar(args: &SimilarArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_client(dir)?;
    let movies = client
        .movie_similar(args.id, args.limit.unwrap_or_default())
        .await
        .with_context(|| format!("failed to fetch movies similar to {}", args.id))?;
    log_movies(&movies);
    Ok(())
}

/// Runs the `movie reviews` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_movie_reviews(args: &ReviewsArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_client(dir)?;

    let mut params = ReviewParams::new()
        .page(args.page.unwrap_or_default())
        .page_limit(args.page_limit.unwrap_or_default());
    if let Some(review_type) = args.review_type {
        params = params.review_type(review_type);
    }
    if let Some(ref country) = args.country {
        params = params.country(country);
    }

    let reviews = client
        .movie_reviews(args.id, &params)
        .await
        .with_context(|| format!("failed to fetch reviews of movie {}", args.id))?;

    for review in &reviews {
        tracing::info!(
            "[{}] {} ({}): {}",
            if review.is_fresh() { "fresh" } else { "rotten" },
            review.critic,
            review.publication.as_deref().unwrap_or("-"),
            review.quote.as_deref().unwrap_or(""),
        );
    }
    tracing::info!("Total: {} reviews", reviews.len());
    Ok(())
}

/// Runs the `movie alias` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_movie_alias(args: &AliasArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_client(dir)?;
    let movie = client
        .movie_alias(&args.id, &args.id_type)
        .await
        .with_context(|| format!("failed to look up {} ID {}", args.id_type, args.id))?;
    log_movies(std::slice::from_ref(&movie));
    Ok(())
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_client(dir)?;
    let params = SearchParams::new(&args.query)
        .page(args.page.unwrap_or_default())
        .page_limit(args.page_limit.unwrap_or_default());
    let movies = client
        .search_movies(&params)
        .await
        .with_context(|| format!("search for {:?} failed", args.query))?;
    log_movies(&movies);
    Ok(())
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the file already exists (without `--force`) or
/// cannot be written.
fn run_config_init(force: bool, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    AppConfig::default()
        .save(&config_path)
        .context("failed to write config")?;
    tracing::info!("Wrote {}", config_path.display());
    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or serialized.
fn run_config_show(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let rendered =
        toml::to_string_pretty(&config.redacted()).context("failed to serialize config")?;
    for line in rendered.lines() {
        tracing::info!("{line}");
    }
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    match cli.command {
        Commands::Lists(lists) => match lists.command {
            ListsSubcommands::Movies(args) => run_lists_movies(&args, dir).await,
            ListsSubcommands::Dvds(args) => run_lists_dvds(&args, dir).await,
            ListsSubcommands::Directory(args) => run_lists_directory(&args, dir).await,
        },
        Commands::Movie(movie) => match movie.command {
            MovieSubcommands::Info(args) => run_movie_info(&args, dir).await,
            MovieSubcommands::Cast(args) => run_movie_cast(&args, dir).await,
            MovieSubcommands::Clips(args) => run_movie_clips(&args, dir).await,
            MovieSubcommands::Similar(args) => run_movie_similar(&args, dir).await,
            MovieSubcommands::Reviews(args) => run_movie_reviews(&args, dir).await,
            MovieSubcommands::Alias(args) => run_movie_alias(&args, dir).await,
        },
        Commands::Search(args) => run_search(&args, dir).await,
        Commands::Config(cfg) => match cfg.command {
            ConfigSubcommands::Init { force } => run_config_init(force, dir),
            ConfigSubcommands::Show => run_config_show(dir),
        },
    }
}
