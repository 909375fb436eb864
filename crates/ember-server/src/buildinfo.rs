//! 构建信息，通过编译期环境变量 `EMBER_GIT_COMMIT` / `EMBER_BUILT_AT` 注入

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const COMMIT: &str = match option_env!("EMBER_GIT_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};

pub const BUILT_AT: &str = match option_env!("EMBER_BUILT_AT") {
    Some(built_at) => built_at,
    None => "unknown",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub built_at: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            version: VERSION,
            commit: COMMIT,
            built_at: BUILT_AT,
        }
    }
}
