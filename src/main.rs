//! Crackwatch CLI - search crackwatch.com from the terminal.
//!
//! This is the binary entry point. See the `crackwatch` library for the
//! protocol client.

use anyhow::Result;
use clap::{Parser, Subcommand};
use crackwatch::{
    Config, CrackStatus, CrackwatchClient, GameRecord, OrderType, ReleaseStatus, SearchQuery,
    SearchResults, SortOrder, StudioType,
};
use mimalloc::MiMalloc;

/// Global allocator configured per M-MIMALLOC-APPS guideline.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// CLI
#[derive(Parser)]
#[command(name = "crackwatch")]
#[command(version)]
#[command(about = "Look up game crack status on crackwatch.com")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search games by title
    Search {
        /// Search term (multiple words are joined with spaces)
        #[arg(required = true)]
        term: Vec<String>,
        /// Page number, starting at 1
        #[arg(long, short, default_value_t = 1)]
        page: u32,
        /// Crack status filter: all, cracked, uncracked
        #[arg(long, default_value = "all")]
        cracked: CrackStatus,
        /// Release status filter: all, released, unreleased
        #[arg(long, default_value = "all")]
        released: ReleaseStatus,
        /// Studio filter: all, aaa, indie
        #[arg(long, default_value = "all")]
        studio: StudioType,
        /// Sort key (title, releaseDate, crackDate, protection, group, nfo,
        /// price, ratings, comments, followers)
        #[arg(long, default_value = "title")]
        order: OrderType,
        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
        /// Print the decoded result set as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            term,
            page,
            cracked,
            released,
            studio,
            order,
            desc,
            json,
        } => {
            let term = term.join(" ");
            let sort = if desc {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };

            let outcome = match page.checked_sub(1) {
                Some(page_index) => match SearchQuery::new(term) {
                    Ok(query) => {
                        let query = query
                            .with_page(page_index)
                            .with_crack_status(cracked)
                            .with_release_status(released)
                            .with_studio_type(studio)
                            .with_order(order, sort);
                        CrackwatchClient::new(Config::load()?)
                            .search_query(&query)
                            .await
                    }
                    Err(e) => Err(e.into()),
                },
                None => Err(crackwatch::ValidationError::InvalidPage.into()),
            };

            match outcome {
                Ok(results) if json => println!("{}", serde_json::to_string_pretty(&results)?),
                Ok(results) if results.is_empty() => {
                    println!("No games found which matched your query!");
                }
                Ok(results) => println!("{}", render_results(&results, page)),
                Err(e) => {
                    eprintln!("A problem occurred : {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Config => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Log to stderr, or to `CRACKWATCH_LOG_FILE` when set.
fn init_logging() -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp_secs();

    if let Ok(path) = std::env::var("CRACKWATCH_LOG_FILE") {
        let log_file = std::fs::File::create(&path)
            .map_err(|e| anyhow::anyhow!("Failed to create log file at {path}: {e}"))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}

/// Render one page as a header, one line per game, and a page footer.
fn render_results(results: &SearchResults, page: u32) -> String {
    let mut lines = vec!["Game Name | Release Date | DRM | Cracked By | Date Cracked".to_string()];
    lines.extend(results.games.iter().map(render_game));
    lines.push(format!("Page {}/{}", page, results.page_count()));
    lines.join("\n")
}

fn render_game(game: &GameRecord) -> String {
    let Some(crack_date) = game.crack_date else {
        let people = if game.followers == 1 { "person" } else { "people" };
        return format!(
            "🛑{:?} has {} {} waiting for a crack!",
            game.name,
            format_thousands(game.followers),
            people
        );
    };

    let release = game
        .release_date
        .map_or_else(|| "Unknown".to_string(), |d| d.format("%Y-%m-%d").to_string());
    format!(
        "🟢{} | {} | {} | {} | {}",
        game.name,
        release,
        game.canonical_drm(),
        game.cracked_by_label(),
        crack_date.format("%Y-%m-%d")
    )
}

/// Group digits in threes with commas (12345 -> "12,345").
fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_render_uncracked_game() {
        let game = GameRecord {
            name: "Waiting Game".to_string(),
            followers: 1,
            ..GameRecord::default()
        };
        assert_eq!(
            render_game(&game),
            "🛑\"Waiting Game\" has 1 person waiting for a crack!"
        );
    }

    #[test]
    fn test_render_cracked_game() {
        let game = GameRecord {
            name: "Sekiro".to_string(),
            release_date: NaiveDate::from_ymd_opt(2019, 3, 22),
            drm: vec!["Steam".to_string(), "n/a".to_string()],
            cracked_by: vec!["CODEX".to_string(), "CPY".to_string()],
            crack_date: NaiveDate::from_ymd_opt(2019, 3, 29),
            followers: 10,
        };
        assert_eq!(
            render_game(&game),
            "🟢Sekiro | 2019-03-22 | Steam | CODEX+CPY | 2019-03-29"
        );
    }

    #[test]
    fn test_render_footer_counts_pages() {
        let results = SearchResults {
            total_count: 61,
            games: Vec::new(),
        };
        assert!(render_results(&results, 2).ends_with("Page 2/3"));
    }

    #[test]
    fn test_cli_parses_filters() {
        let cli = Cli::try_parse_from([
            "crackwatch", "search", "red", "dead", "--page", "2", "--cracked", "uncracked",
            "--order", "crackDate", "--desc",
        ])
        .expect("arguments should parse");
        match cli.command {
            Commands::Search {
                term,
                page,
                cracked,
                order,
                desc,
                ..
            } => {
                assert_eq!(term, vec!["red", "dead"]);
                assert_eq!(page, 2);
                assert_eq!(cracked, CrackStatus::Uncracked);
                assert_eq!(order, OrderType::CrackDate);
                assert!(desc);
            }
            Commands::Config => panic!("expected search command"),
        }
    }
}
