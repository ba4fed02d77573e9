use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Client CLI for the algod gateway", long_about = None)]
struct Cli {
    /// Gateway URL. Bare hosts get http:// for IPs and localhost, https:// otherwise.
    #[arg(long, default_value = "localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway and node health
    Health,
    /// Create a new account
    CreateAccount,
    /// Check an account balance
    Balance {
        #[arg(long)]
        address: String,
        #[arg(long)]
        mnemonic: String,
    },
    /// Transfer funds
    Transfer {
        #[arg(long = "from")]
        from_address: String,
        #[arg(long)]
        from_mnemonic: String,
        #[arg(long)]
        to: String,
        /// Amount in microAlgos
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Generate a node API token file
    GenToken {
        #[arg(long, default_value_t = 64)]
        length: usize,
        #[arg(long, default_value = "generated/algod.token")]
        output: PathBuf,
    },
}

fn normalize_url(api_url: &str) -> String {
    let trimmed = api_url.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }

    let host = trimmed.split(':').next().unwrap_or_default();
    let is_local = host == "localhost" || host.chars().all(|c| c.is_ascii_digit() || c == '.');
    let scheme = if is_local { "http" } else { "https" };
    format!("{scheme}://{trimmed}")
}

fn generate_token(length: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn write_token(path: &Path, token: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, token)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = normalize_url(&cli.api_url);
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{base}/health")).send().await?;
            print_response(res).await?;
        }
        Commands::CreateAccount => {
            let res = client
                .post(format!("{base}/api/account/new"))
                .json(&json!({}))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Balance { address, mnemonic } => {
            let res = client
                .post(format!("{base}/api/account/balance"))
                .json(&json!({ "address": address, "mnemonic": mnemonic }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Transfer {
            from_address,
            from_mnemonic,
            to,
            amount,
            note,
        } => {
            let res = client
                .post(format!("{base}/api/transfer"))
                .json(&json!({
                    "from": from_address,
                    "mnemonic": from_mnemonic,
                    "to": to,
                    "amount": amount,
                    "note": note,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::GenToken { length, output } => {
            let token = generate_token(length);
            write_token(&output, &token)?;
            println!("API token written to {}", output.display());
            println!("Token: {token}");
            println!("Keep this token secure: it grants access to the node API.");
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: gateway returned status {status}");
        eprintln!("Response: {text}");
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}
