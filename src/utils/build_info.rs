/// Facts about the binary captured by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub tree: &'static str,
    pub built_at: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

impl BuildInfo {
    /// One line for `version` output, e.g. `0.1.0 (a1b2c3d, clean, release)`.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}, {}, {})",
            self.version, self.commit, self.tree, self.profile
        )
    }
}

pub fn current() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("FINHABIT_BUILD_HASH").unwrap_or("unknown"),
        tree: option_env!("FINHABIT_BUILD_STATUS").unwrap_or("unknown"),
        built_at: option_env!("FINHABIT_BUILD_TIMESTAMP").unwrap_or("unknown"),
        profile: option_env!("FINHABIT_BUILD_PROFILE").unwrap_or("unknown"),
        rustc: option_env!("FINHABIT_BUILD_RUSTC").unwrap_or("unknown"),
    }
}
