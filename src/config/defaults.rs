//! Default configuration values

/// Default target channel on the owner's account
pub const DEFAULT_CHANNEL: &str = "main";

/// Default conda executable
pub const DEFAULT_CONDA: &str = "conda";

/// Default anaconda client executable used for uploads
pub const DEFAULT_ANACONDA: &str = "anaconda";

/// Recipe metadata descriptor file name
pub const META_FILE: &str = "meta.yaml";

/// Build script expected in every buildable recipe on this platform
#[cfg(windows)]
pub const BUILD_SCRIPT: &str = "bld.bat";

/// Build script expected in every buildable recipe on this platform
#[cfg(not(windows))]
pub const BUILD_SCRIPT: &str = "build.sh";

/// Environment variable holding the publishing token
pub const TOKEN_ENV: &str = "BINSTAR_TOKEN";

/// Environment variable the anaconda client reads its token from
pub const ANACONDA_TOKEN_ENV: &str = "ANACONDA_API_TOKEN";

/// Upper bound on resolver passes; a safety net, not the termination signal
pub const MAX_RESOLVE_PASSES: usize = 10_000;

/// Maximum time spent retrying a registry read (in seconds)
pub const REGISTRY_RETRY_MAX_ELAPSED: u64 = 60;

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;

/// Conda platform subdirectory for the running host
pub fn host_subdir() -> String {
    let os = match std::env::consts::OS {
        "macos" => "osx",
        "windows" => "win",
        other => other,
    };
    let arch = match std::env::consts::ARCH {
        "x86_64" => "64",
        "x86" => "32",
        "aarch64" if os == "linux" => "aarch64",
        "aarch64" => "arm64",
        other => other,
    };
    format!("{os}-{arch}")
}
