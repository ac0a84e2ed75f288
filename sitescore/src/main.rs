use sitescore::commands::command_argument_builder;
use sitescore::handlers::{
    handle_crawl, handle_init, handle_list, handle_report, init_tracing,
};

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let result = match matches.subcommand() {
        Some(("init", primary_command)) => handle_init(primary_command),
        Some(("crawl", primary_command)) => handle_crawl(primary_command).await,
        Some(("report", primary_command)) => handle_report(primary_command),
        Some(("list", primary_command)) => handle_list(primary_command),
        None if matches.contains_id("DOMAIN") => handle_crawl(&matches).await,
        None => {
            let _ = command_argument_builder().print_help();
            return;
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}
