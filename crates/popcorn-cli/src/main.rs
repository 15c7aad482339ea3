use clap::{ArgAction, Parser, Subcommand};
use commands::{browse, config, details, search, watched};
use popcorn_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "usePopcorn - search movies and keep track of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies by title
    Search {
        /// Title (or part of one) to search for
        query: String,
    },
    /// Show full details for one movie
    Details {
        /// IMDb identifier, e.g. tt0816692
        imdb_id: String,
    },
    /// Manage the watched list
    Watched {
        #[command(subcommand)]
        cmd: WatchedCommands,
    },
    /// Configure the OMDb API key and settings
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Interactive search and watched-list view
    #[command(long_about = "Open the interactive view. Type to search; Tab switches focus to the list, \
        Up/Down move, Right or Space open details, Escape closes them, 1-9 and 0 rate, 'a' adds to the \
        watched list, 'x' removes a watched entry, Enter returns to the search box. Ctrl-C quits.")]
    Browse,
}

#[derive(Subcommand)]
pub enum WatchedCommands {
    /// List watched movies
    List,
    /// Show averages over the watched list
    Summary,
    /// Fetch a movie's details and add it with your rating
    Add {
        imdb_id: String,

        /// Your rating, 1-10
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: u8,
    },
    /// Remove a movie from the watched list
    Remove { imdb_id: String },
    /// Remove every entry from the watched list
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Store the OMDb API key
    #[command(long_about = "Store the OMDb API key in the credentials file. Get a key at https://www.omdbapi.com/apikey.aspx. \
        The OMDB_API_KEY environment variable takes precedence over the stored key.")]
    SetApiKey {
        /// API key (if not provided, will prompt)
        #[arg(long)]
        key: Option<String>,
    },
    /// Remove the stored OMDb API key
    ClearApiKey,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The browse view owns the terminal, so its logs go to a file
    let log_file = PathManager::default().browse_log_file();
    let log_target = match cli.command {
        Commands::Browse => logging::LogTarget::File(&log_file),
        _ => logging::LogTarget::Stderr,
    };
    logging::init_logging(cli.verbose, cli.quiet, log_target).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run_search(&query, &output).await,
        Commands::Details { imdb_id } => details::run_details(&imdb_id, &output).await,
        Commands::Watched { cmd } => watched::run_watched(cmd, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output),
        Commands::Browse => browse::run_browse().await,
    }
}
