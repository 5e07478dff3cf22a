//! Project configuration loaded from `.locker.toml`.

pub mod settings;

pub use settings::Settings;
