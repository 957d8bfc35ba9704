use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "runtime-probe")]
#[command(about = "Query the debug server of a running service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:6060")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// Dump Prometheus metrics, optionally only lines containing a filter
    Metrics {
        #[arg(short, long)]
        filter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{base}/healthz")).send().await?;
            if !check_status(&res) {
                std::process::exit(1);
            }
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Metrics { filter } => {
            let res = client.get(format!("{base}/metrics")).send().await?;
            if !check_status(&res) {
                std::process::exit(1);
            }
            let text = res.text().await?;
            for line in text.lines() {
                if filter.as_deref().map_or(true, |f| line.contains(f)) {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

fn check_status(res: &reqwest::Response) -> bool {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: debug server returned status {status}");
    }
    status.is_success()
}
