pub mod request;
pub mod response;

pub mod signal_strength;
