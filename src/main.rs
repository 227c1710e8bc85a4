use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use thor_sponsor::delegation::{sign_delegation, DelegationRequest};
use thor_sponsor::{Address, Credential, PrototypeContract, SponsorConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thor-sponsor")]
#[command(about = "Offline tools for VeChainThor gas sponsorship", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate fresh private keys
    Keygen {
        /// Number of keys to generate
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },

    /// Co-sign an unsigned transaction as gas payer (VIP-191)
    Cosign {
        /// Unsigned transaction RLP (0x-hex)
        #[arg(long)]
        raw: String,

        /// Address the transaction claims to originate from
        #[arg(long)]
        origin: String,

        /// Gas payer private key (0x-hex)
        #[arg(long)]
        key: String,
    },

    /// Build a Prototype contract clause
    Clause {
        #[command(subcommand)]
        kind: ClauseCommand,
    },
}

#[derive(Subcommand)]
enum ClauseCommand {
    /// addUser(sponsor, user)
    GrantUser {
        #[arg(long)]
        sponsor: String,

        #[arg(long)]
        user: String,
    },

    /// setCreditPlan(sponsor, credit, recoveryRate)
    SetCreditPlan {
        #[arg(long)]
        sponsor: String,

        /// Credit in wei, 0x-hex or decimal
        #[arg(long)]
        credit: String,

        /// Recovery rate in wei per second, 0x-hex or decimal
        #[arg(long, default_value = "0")]
        recovery_rate: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_address(label: &str, s: &str) -> Result<Address> {
    s.parse().with_context(|| format!("invalid {} address {}", label, s))
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen { count } => {
            println!("\n{}", "🔐 Generated keys".cyan().bold());
            println!("{}", "═".repeat(50).cyan());
            for _ in 0..count {
                let credential = Credential::generate();
                println!("{}: {}", "Private Key".bright_white(), credential.secret_hex().yellow());
                println!("{}: {}", "Address".bright_white(), credential.address().to_checksum().green());
                println!("{}", "─".repeat(50).bright_black());
            }
            println!("{}", "Keep private keys secret.".yellow());
        }

        Commands::Cosign { raw, origin, key } => {
            let credential = Credential::from_hex(key.trim()).context("invalid gas payer key")?;
            let request = DelegationRequest {
                raw: raw.trim().to_string(),
                origin: origin.trim().to_string(),
            };
            let response = sign_delegation(&request, &credential).context("delegation refused")?;

            eprintln!(
                "{}",
                format!("✅ Co-signed as {}", credential.address().to_checksum()).green()
            );
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Clause { kind } => {
            let (config, validation) = SponsorConfig::from_env();
            validation.print_summary();
            validation.into_result()?;
            let contract = PrototypeContract::load(&config)?;

            let clause = match kind {
                ClauseCommand::GrantUser { sponsor, user } => {
                    let sponsor = parse_address("sponsor", &sponsor)?;
                    let user = parse_address("user", &user)?;
                    contract.grant_user_clause(&sponsor, &user)?
                }
                ClauseCommand::SetCreditPlan {
                    sponsor,
                    credit,
                    recovery_rate,
                } => {
                    let sponsor = parse_address("sponsor", &sponsor)?;
                    contract.set_credit_plan_clause(&sponsor, &credit, &recovery_rate)?
                }
            };

            eprintln!(
                "{}",
                format!("Gas limit for this call: {}", config.admin_gas).bright_black()
            );
            println!("{}", serde_json::to_string_pretty(&clause)?);
        }
    }

    Ok(())
}
