pub mod directory;
pub mod notifications;
