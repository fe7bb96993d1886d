pub mod get_client_ip;
pub mod tracking_id;
pub mod valid_uuid;
