//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable giving the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "JOYCAR_SW_ROOT";

/// Get the software root directory.
///
/// This is the directory the `params` and `sessions` directories live under.
/// It is taken from the `JOYCAR_SW_ROOT` environment variable if set,
/// otherwise the current working directory is used so that the executables
/// can be run from a checkout without any setup.
pub fn get_sw_root() -> PathBuf {
    match env::var(SW_ROOT_ENV_VAR) {
        Ok(root) => PathBuf::from(root),
        Err(_) => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
