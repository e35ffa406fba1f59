pub mod system_status_response;
