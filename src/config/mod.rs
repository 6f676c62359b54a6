//! User configuration (`config.toml` in the Password Hero home directory).

pub mod settings;

pub use settings::Settings;
