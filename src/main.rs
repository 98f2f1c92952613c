// paych - inspect a payment channel store

use clap::{Parser, Subcommand};
use paych::identity::Address;
use paych::paych::find_by_accounts;
use paych::storage::ChannelStore;
use paych::{ChannelInfo, ManagerConfig};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "paych", about = "Inspect payment channel records")]
struct Cli {
    /// Path to the channel database
    #[arg(long, default_value = "./paych-db")]
    db: PathBuf,

    /// Namespace of the channel records, if not the default one
    #[arg(long)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every channel record
    List,
    /// Show one channel record with its vouchers
    Info {
        /// Channel address
        channel: Address,
    },
    /// Find the channel between a payer and a payee
    Lookup {
        /// Payer address
        from: Address,
        /// Payee address
        to: Address,
    },
}

fn print_summary(info: &ChannelInfo) {
    println!(
        "{}  from={} to={} next_lane={} next_nonce={} vouchers={}",
        info.unique_addr(),
        info.from(),
        info.to(),
        info.next_lane(),
        info.next_nonce(),
        info.vouchers().len()
    );
}

fn print_detail(info: &ChannelInfo) {
    print_summary(info);
    println!(
        "  largest voucher amount: {}",
        info.largest_voucher_amount()
    );
    for entry in info.vouchers() {
        let v = &entry.voucher;
        println!(
            "  lane={} nonce={} amount={} signed={} proof={}",
            v.lane(),
            v.nonce(),
            v.amount(),
            v.signature().is_some(),
            entry.proof.as_deref().map(hex::encode).unwrap_or_else(|| "-".to_string())
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ManagerConfig::default();
    if let Some(namespace) = &cli.namespace {
        config = config.with_store_namespace(namespace);
    }
    config.validate()?;

    let store = ChannelStore::open(&cli.db, &config.store_namespace)?;
    tracing::debug!(db = %cli.db.display(), channels = store.len(), "opened channel store");

    match cli.command {
        Command::List => {
            for info in store.list()? {
                print_summary(&info);
            }
        }
        Command::Info { channel } => {
            print_detail(&store.get(&channel)?);
        }
        Command::Lookup { from, to } => match find_by_accounts(&store, &from, &to)? {
            Some(info) => print_detail(&info),
            None => println!("no payment channel from {} to {}", from, to),
        },
    }

    Ok(())
}
