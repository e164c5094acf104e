pub mod application_settings;

pub use application_settings::{
    DirectoryBackend, DirectoryConfig, FanoutConfig, PushConfig, ServerConfig, Settings, SettingsError,
};
