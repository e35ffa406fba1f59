pub mod models;
pub mod router_client;
