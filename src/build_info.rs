//! Compile-time build metadata exposed to CLI surfaces.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("PARLEY_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("PARLEY_BUILD_TIMESTAMP");

/// Help trailer block that surfaces build metadata in `parley --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("PARLEY_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("PARLEY_BUILD_TIMESTAMP")
);

/// Render concise startup metadata shown in the interactive banner.
pub fn startup_metadata_line() -> String {
    format!("v{VERSION} ({GIT_COMMIT}, built {BUILD_TIMESTAMP})")
}
