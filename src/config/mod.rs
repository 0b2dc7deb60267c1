//! Configuration: types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{
    create_template_config, ensure_default_config_exists, load_config_from_default_xml,
    load_config_from_xml_env, load_config_from_xml_path,
};

/// Defaults shared across submodules. The original deployment dropped images
/// into a `temp/` folder next to the site checkout and published them under
/// `assets/post/`.
pub const WATCH_DIR_DEFAULT: &str = "./temp";
pub const DEST_DIR_DEFAULT: &str = "./assets/post";
