use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitescore_core::crawl::{CrawlOptions, CrawlOutcome, crawl_site};
use sitescore_core::data::Database;
use sitescore_core::report::{
    ReportFormat, gather_site_report, generate_json_report, generate_text_report,
    generate_website_list, save_report,
};
use sitescore_scanner::{HostMatch, HttpFetcher, ProgressCallback};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::commands::DEFAULT_DB_PATH;

/// Route logs to stderr so stdout only carries progress and results.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Accept `example.com`, `example.com/`, or a full `http(s)://` URL and return the bare
/// lowercase domain (with port, if any). A leading `www.` is dropped, matching how discovered
/// links are classified.
pub fn parse_domain_arg(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let domain = if input.contains("://") {
        let url = Url::parse(input).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?;
        match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    } else {
        let domain = input.trim_end_matches('/');
        let url = Url::parse(&format!("http://{}", domain)).ok()?;
        if url.host_str().is_none() || url.path() != "/" {
            return None;
        }
        domain.to_ascii_lowercase()
    };

    Some(domain.strip_prefix("www.").map(str::to_string).unwrap_or(domain))
}

/// Expand `~` in a database path, falling back to the default location.
pub fn resolve_db_path(path: Option<&String>) -> PathBuf {
    let raw = path.map(String::as_str).unwrap_or(DEFAULT_DB_PATH);
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Open the database, creating its directory first if needed.
pub fn open_database(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Database::new(path).with_context(|| format!("Failed to open database {}", path.display()))
}

pub fn crawl_options_from_args(args: &ArgMatches) -> CrawlOptions {
    CrawlOptions {
        use_https: args.get_flag("https"),
        host_match: if args.get_flag("strict-hosts") {
            HostMatch::Strict
        } else {
            HostMatch::Loose
        },
    }
}

pub fn describe_outcome(outcome: &CrawlOutcome) -> String {
    match outcome {
        CrawlOutcome::AlreadyCrawled(website) => format!(
            "{} {} was already crawled (website #{}, {} pages); nothing to do",
            "→".blue(),
            website.domain.bright_white(),
            website.id,
            website.pages_count
        ),
        CrawlOutcome::RootUnavailable { url, reason } => format!(
            "{} Skipped {}: root page unavailable ({})",
            "⚠".yellow().bold(),
            url,
            reason
        ),
        CrawlOutcome::UntitledRoot { url } => format!(
            "{} Skipped {}: root page has no title",
            "⚠".yellow().bold(),
            url
        ),
        CrawlOutcome::Completed { website, summary } => format!(
            "{} Crawl complete: {} pages stored for {} ({} skipped, html5: {})",
            "✓".green().bold(),
            website.pages_count.to_string().cyan(),
            website.domain.bright_white(),
            summary.skipped_count,
            if website.is_html5 { "yes" } else { "no" }
        ),
    }
}

fn print_prompt(msg: &str) -> Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_lowercase())
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    let config_dir = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(crate::commands::DEFAULT_CONFIG_DIR);
    let force = args.get_flag("force");
    let expanded_config_dir = shellexpand::tilde(config_dir);
    let config_dir = Path::new(expanded_config_dir.as_ref());
    let db_loc = config_dir.join("sitescore.db");

    if Database::exists(&db_loc) {
        let overwrite = force || {
            println!("{}", "⚠ WARNING".yellow().bold());
            println!(
                "Database already exists at: {}",
                db_loc.display().to_string().bright_white()
            );
            let response = print_prompt("Would you like to overwrite it? [y/N]:")?;
            response == "y" || response == "yes"
        };

        if !overwrite {
            println!("{} Keeping existing database", "→".blue());
            return Ok(());
        }
        Database::drop(&db_loc)
            .with_context(|| format!("Failed to remove {}", db_loc.display()))?;
        println!("{} Existing database removed", "✓".green().bold());
    }

    open_database(&db_loc)?;
    println!(
        "{} Database initialized: {}",
        "✓".green().bold(),
        db_loc.display().to_string().bright_white()
    );
    Ok(())
}

pub async fn handle_crawl(args: &ArgMatches) -> Result<()> {
    let raw_domain = args
        .get_one::<String>("DOMAIN")
        .ok_or_else(|| anyhow!("A domain to crawl is required, e.g. `sitescore example.com`"))?;
    let domain =
        parse_domain_arg(raw_domain).ok_or_else(|| anyhow!("Invalid domain '{}'", raw_domain))?;

    let db_path = resolve_db_path(args.get_one::<String>("db"));
    let db = open_database(&db_path)?;

    let options = crawl_options_from_args(args);
    let timeout = args.get_one::<u64>("timeout").copied().unwrap_or(10);
    let retries = args.get_one::<u32>("retries").copied().unwrap_or(2);
    let fetcher = HttpFetcher::with_timeout(timeout)?.with_max_retries(retries);
    debug!("Request timeout {}s, {} retries", timeout, retries);

    println!("\n🕷️  Crawling {}", domain);
    println!("Database: {}", db_path.display());
    println!(
        "Hosts: {}\n",
        match options.host_match {
            HostMatch::Loose => "loose (prefix match)",
            HostMatch::Strict => "strict (exact host)",
        }
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Fetching root page...");

    let spinner_clone = spinner.clone();
    let progress_callback: ProgressCallback = Arc::new(move |pages: usize, url: String| {
        spinner_clone.suspend(|| println!("{}", url));
        spinner_clone.set_message(format!("Crawling... {} pages stored", pages));
    });

    let outcome = crawl_site(&db, &fetcher, &domain, &options, Some(progress_callback)).await;
    spinner.finish_and_clear();

    let outcome = outcome.with_context(|| format!("Crawl of {} failed", domain))?;
    println!("\n{}", describe_outcome(&outcome));
    Ok(())
}

pub fn handle_report(args: &ArgMatches) -> Result<()> {
    let raw_domain = args
        .get_one::<String>("DOMAIN")
        .ok_or_else(|| anyhow!("A domain is required"))?;
    let domain =
        parse_domain_arg(raw_domain).ok_or_else(|| anyhow!("Invalid domain '{}'", raw_domain))?;
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    let db = open_database(&resolve_db_path(args.get_one::<String>("db")))?;
    let Some(report) = gather_site_report(&db, &domain)? else {
        bail!("No crawl recorded for {}", domain);
    };

    let content = match format {
        ReportFormat::Text => generate_text_report(&report),
        ReportFormat::Json => generate_json_report(&report)?,
    };

    match args.get_one::<PathBuf>("output") {
        Some(path) => {
            save_report(&content, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", content),
    }
    Ok(())
}

pub fn handle_list(args: &ArgMatches) -> Result<()> {
    let db = open_database(&resolve_db_path(args.get_one::<String>("db")))?;
    let websites = db.list_websites()?;

    if websites.is_empty() {
        println!("No websites crawled yet.");
    } else {
        print!("{}", generate_website_list(&websites));
    }
    Ok(())
}
