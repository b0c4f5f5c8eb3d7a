use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

use trellis::config::load_config;
use trellis::routing::RouteTable;

#[derive(Parser)]
#[command(name = "trellis-routes")]
#[command(about = "Inspect the route table of a trellis application", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "trellis.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes in match order
    List,
    /// Show which route a URL path matches and the data it extracts
    Match {
        /// URL path, e.g. /home/index/3
        url: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let table = RouteTable::from_config(&config.routes)?;

    let output = match cli.command {
        Commands::List => list(&table),
        Commands::Match { url } => match table.match_url(&url) {
            Some(route_data) => json!({ "matched": true, "route_data": route_data }),
            None => json!({ "matched": false, "url": url }),
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn list(table: &RouteTable) -> Value {
    let routes: Vec<Value> = table
        .routes()
        .iter()
        .map(|route| {
            json!({
                "name": route.name(),
                "pattern": route.pattern(),
                "is_static": route.is_static(),
                "defaults": route.defaults(),
                "constraints": route.constraints(),
                "regex": route.compiled().map(|c| c.regex().as_str()),
            })
        })
        .collect();
    Value::Array(routes)
}
