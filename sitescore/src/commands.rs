use crate::CLAP_STYLING;
use clap::{Arg, arg, command};

pub const DEFAULT_CONFIG_DIR: &str = "~/.config/sitescore/";
pub const DEFAULT_DB_PATH: &str = "~/.config/sitescore/sitescore.db";

/// Options shared by `sitescore <DOMAIN>` and `sitescore crawl <DOMAIN>`.
fn crawl_arguments() -> Vec<Arg> {
    vec![
        arg!(--"https")
            .required(false)
            .help("Start from https://<DOMAIN> instead of http://<DOMAIN>")
            .action(clap::ArgAction::SetTrue),
        arg!(--"strict-hosts")
            .required(false)
            .help("Only follow links whose host is exactly DOMAIN (or www.DOMAIN)")
            .action(clap::ArgAction::SetTrue),
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("10"),
        arg!(--"retries" <COUNT>)
            .required(false)
            .help("Extra attempts after a connection failure or timeout")
            .value_parser(clap::value_parser!(u32))
            .default_value("2"),
    ]
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitescore")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitescore")
        .about("Crawl a domain breadth-first and score every page it links to")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-v --"verbose" "Show debug logging on stderr")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(--"db" <PATH>)
                .required(false)
                .help("Location of the sitescore database")
                .default_value(DEFAULT_DB_PATH)
                .global(true),
        )
        .arg(
            arg!([DOMAIN])
                .required(false)
                .help("Domain to crawl, e.g. example.com (same as `sitescore crawl <DOMAIN>`)"),
        )
        .args(crawl_arguments())
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the sitescore database on your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Directory to store the sitescore database in")
                        .default_value(DEFAULT_CONFIG_DIR),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrite any existing database at the specified location.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl every internal page of a domain, store it and score it. A domain \
                that was crawled before is left untouched.",
                )
                .arg(arg!(<DOMAIN>).help("Domain to crawl, e.g. example.com"))
                .args(crawl_arguments()),
        )
        .subcommand(
            command!("report")
                .about("Show the stored pages of a crawled domain, best score first")
                .arg(arg!(<DOMAIN>).help("A previously crawled domain"))
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(command!("list").about("List all crawled websites"))
}
