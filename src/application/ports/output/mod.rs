pub mod location_directory_port;
pub mod push_delivery_port;
