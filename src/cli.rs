use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "onchain-activity", version, about = "Wallet activity aggregation service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Override bind address, e.g. 0.0.0.0:8080
        #[arg(long)]
        addr: Option<String>,
    },
    /// Build the activity report for one address and print it as JSON
    Activity {
        address: String,
        #[arg(long)]
        pretty: bool,
    },
}
