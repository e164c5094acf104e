pub mod emergency_push;
pub mod verify_image;
