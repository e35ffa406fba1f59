use crate::router_api::router_client::DEFAULT_ROUTER_ADDRESS;
use clap::Parser;
use std::path::PathBuf;

/// Speak a router's signal strength whenever it changes, to help place the router.
///
/// Copy the `_TclRequestVerificationKey` header from any `/jrd/webapi` request
/// in your browser's developer tools while logged into the router admin page.
#[derive(Parser, Debug, Clone)]
#[command(name = "router-signal-announcer", version)]
pub struct Cli {
    /// Value of the _TclRequestVerificationKey header
    pub request_key: String,

    /// The LAN IP of your router
    #[arg(default_value = DEFAULT_ROUTER_ADDRESS)]
    pub router_ip_address: String,

    /// ID value used with JSON-RPC API calls
    #[arg(default_value_t = 1, allow_negative_numbers = true)]
    pub jrd_id: i64,

    /// TOML settings for logging, intervals and the speech command.
    /// A missing file is created from an example and the program exits.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
