use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;
use tripcode::Hasher;

#[derive(Parser)]
#[command(name = "tripcode", about = "Compute imageboard tripcodes")]
struct Cli {
    /// 16 character salt for secure (!!) tripcodes
    #[arg(long, env = "TRIPCODE_SECURE_SALT", hide_env_values = true)]
    salt: Option<String>,

    /// Fixed tripcode for a trip, as TRIP=CODE (repeatable)
    #[arg(long = "special", value_name = "TRIP=CODE")]
    special: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a trip and an optional secure trip
    Hash {
        trip: String,
        #[arg(default_value = "")]
        secure: String,
    },

    /// Parse name#trip#secure fields and print name and tripcode
    Sign {
        #[arg(required = true)]
        fields: Vec<String>,
    },
}

fn parse_special(entries: &[String]) -> Result<HashMap<String, String>> {
    entries
        .iter()
        .map(|e| {
            e.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("special tripcode {:?} is not TRIP=CODE", e))
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let hasher = Hasher::new().context("setting up tripcode hasher")?;
    if let Some(salt) = &cli.salt {
        hasher
            .configure_secure_salt(salt)
            .context("configuring secure salt")?;
    }
    hasher.set_special_tripcodes(parse_special(&cli.special)?);

    match cli.command {
        Commands::Hash { trip, secure } => {
            println!("{}", hasher.hash(&trip, &secure)?);
        }
        Commands::Sign { fields } => {
            for field in fields {
                let sig = hasher.sign(&field)?;
                println!("{}\t{}", sig.name, sig.trip.unwrap_or_default());
            }
        }
    }
    Ok(())
}
