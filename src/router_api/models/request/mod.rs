pub mod system_status_request;
