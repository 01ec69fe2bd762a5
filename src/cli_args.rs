use std::net::SocketAddr;

use clap::Parser;

#[derive(Parser)]
#[command(author, about, version)]
pub struct CliArgs {
    /// Connection string of the database holding the books collection.
    #[clap(long, env = "DATABASE_URI", hide_env_values = true)]
    pub database_uri: String,
    /// Path to the configuration file. Defaults are used if omitted.
    #[clap(long, env = "CONFIG_FILE")]
    pub config_file: Option<String>,
    /// Address to listen on. Overrides the configuration file.
    #[clap(long, env = "SOCKET_ADDRESS")]
    pub socket_address: Option<SocketAddr>,
}
