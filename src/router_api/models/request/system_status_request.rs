use serde::Serialize;

pub const JSON_RPC_VERSION: &str = "2.0";
pub const GET_SYSTEM_STATUS: &str = "GetSystemStatus";

/// JSON-RPC call asking the router for its system status, signal strength included.
///
/// Field order is the wire order: `id`, `jsonrpc`, `method`, `params`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SystemStatusRequest {
    pub id: String,
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: EmptyParams,
}

/// Serializes as `{}`.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct EmptyParams {}

impl SystemStatusRequest {
    pub fn new(jrd_id: i64) -> Self {
        Self {
            id: jrd_id.to_string(),
            jsonrpc: JSON_RPC_VERSION,
            method: GET_SYSTEM_STATUS,
            params: EmptyParams::default(),
        }
    }
}
