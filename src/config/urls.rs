//! Registry URLs

/// anaconda.org REST API base URL
pub const ANACONDA_API: &str = "https://api.anaconda.org";
