use clap::{Parser, Subcommand};
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::redirect::Policy;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "arkr-cli")]
#[command(about = "Query a running ARK resolver", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show where an identifier redirects
    Resolve { identifier: String },
    /// Show the authority record for a NAAN
    Info { naan: String },
    /// List registered NAANs
    List {
        /// Request text/plain instead of JSON
        #[arg(long)]
        plain: bool,
    },
    /// Show how the resolver parses an identifier
    Diag { identifier: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder().redirect(Policy::none()).build()?;
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Resolve { identifier } => {
            let res = client.get(format!("{}/{}", base, identifier)).send().await?;
            let status = res.status();
            let location = res
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            match location {
                Some(location) => println!("{} {}", status.as_u16(), location),
                None => {
                    eprintln!("Error: resolver returned status {}", status);
                    if let Ok(text) = res.text().await {
                        eprintln!("Response: {}", text);
                    }
                }
            }
        }
        Commands::Info { naan } => {
            let res = client.get(format!("{}/ark:/{}?info", base, naan)).send().await?;
            print_json(res).await?;
        }
        Commands::List { plain } => {
            let accept = if plain { "text/plain" } else { "application/json" };
            let res = client.get(format!("{}/", base)).header(ACCEPT, accept).send().await?;
            if plain {
                println!("{}", res.text().await?);
            } else {
                print_json(res).await?;
            }
        }
        Commands::Diag { identifier } => {
            let res = client.get(format!("{}/diag/{}", base, identifier)).send().await?;
            print_json(res).await?;
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: resolver returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
