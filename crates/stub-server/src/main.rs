//! Stub server binary.
//!
//! ```bash
//! stub-server schema.json
//! stub-server --config stub.toml --port 8080 --prefix /v1
//! stub-server schema.json --call
//! ```

use clap::Parser;
use schema_stub::Driver;
use std::net::IpAddr;
use std::path::PathBuf;
use stub_server::{init_logging, serve, ServerConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stub-server")]
#[command(about = "Serve stub responses for every link of an API schema", long_about = None)]
#[command(version)]
struct Args {
    /// Schema file (JSON Hyper-Schema, OpenAPI 2 or OpenAPI 3)
    schema: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    host: Option<IpAddr>,

    /// Only stub paths under this prefix (e.g. /v1)
    #[arg(long)]
    prefix: Option<String>,

    /// Run the application for stubbed routes too (call-through)
    #[arg(long)]
    call: bool,

    /// Schema format: hyper_schema, open_api_2 or open_api_3
    #[arg(long)]
    driver: Option<Driver>,

    /// Emit JSON formatted logs
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(schema) = self.schema {
            config.stub.schema_path = Some(schema);
        }
        if let Some(port) = self.port {
            config.http.port = port;
        }
        if let Some(host) = self.host {
            config.http.host = host;
        }
        if let Some(prefix) = self.prefix {
            config.stub.prefix = Some(prefix);
        }
        if self.call {
            config.stub.call = true;
        }
        if let Some(driver) = self.driver {
            config.stub.driver = Some(driver);
        }
        if self.json_logs {
            config.logging.json = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    config.apply_env()?;
    args.apply(&mut config);
    config.validate()?;

    init_logging(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting stub server");

    serve(config).await
}
