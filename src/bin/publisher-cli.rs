use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use edge_stream_publisher::config::load_config;
use edge_stream_publisher::digest::{generate_digest, DigestAlgorithm};
use edge_stream_publisher::http::X_REQUEST_ID;

#[derive(Parser)]
#[command(name = "publisher-cli")]
#[command(about = "Tooling for the edge stream publisher", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an auth event to a running publisher
    Send {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,

        /// Stream API key, sent in the variable header
        #[arg(short = 'k', long, env = "PMUSER_MM_APIKEY")]
        api_key: Option<String>,

        /// Header the publisher reads the API key from
        #[arg(long, default_value = "pmuser-mm-apikey")]
        api_key_header: String,

        #[arg(long)]
        user_id: String,

        #[arg(long, default_value = "sms")]
        auth_type: String,

        #[arg(long, default_value = "/")]
        url_path: String,

        /// Extra string fields as key=value
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Print the hex digest of a string
    Digest {
        #[arg(short, long, default_value = "SHA-256")]
        algorithm: DigestAlgorithm,

        input: String,
    },
    /// Load and validate a configuration file
    CheckConfig { path: PathBuf },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Send {
            url,
            api_key,
            api_key_header,
            user_id,
            auth_type,
            url_path,
            fields,
        } => {
            let mut body = Map::new();
            for (key, value) in fields {
                body.insert(key, Value::String(value));
            }
            body.insert("user_id".into(), Value::String(user_id));
            body.insert("auth_type".into(), Value::String(auth_type));
            body.insert("url_path".into(), Value::String(url_path));

            let mut request = reqwest::Client::new().post(&url).json(&body);
            if let Some(key) = api_key {
                request = request.header(api_key_header, key);
            }
            print_response(request.send().await?).await?;
        }
        Commands::Digest { algorithm, input } => {
            println!("{}", generate_digest(algorithm, &input));
        }
        Commands::CheckConfig { path } => match load_config(&path) {
            Ok(config) => {
                println!("{} is valid", path.display());
                println!("{}", toml::to_string_pretty(&config)?);
            }
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let request_id = res
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    println!("Status: {} (request {})", status, request_id);

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
