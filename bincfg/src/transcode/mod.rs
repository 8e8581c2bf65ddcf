//! Output encoders for formats that need their own value mapping.

pub mod toml;
pub mod yaml;
