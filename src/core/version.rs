//! Recipe version substitution
//!
//! Rewrites the `version:` line of a `meta.yaml` from a Python-style
//! `__version__ = '...'` declaration, optionally suffixed with the current git
//! branch.

/// Extract the value of `__version__` from a version file
pub fn parse_version_declaration(content: &str) -> Option<String> {
    let re = regex::Regex::new(r#"(?m)^\s*__version__\s*=\s*['"]([^'"]+)['"]"#).ok()?;
    re.captures(content).map(|caps| caps[1].to_string())
}

/// Append the branch name unless git reports a detached `HEAD`
pub fn versioned(version: &str, branch: Option<&str>) -> String {
    match branch {
        Some(branch) if !branch.is_empty() && branch != "HEAD" => {
            format!("{version}.{}", sanitize_branch(branch))
        }
        _ => version.to_string(),
    }
}

// conda versions may not contain '-' or '/'
fn sanitize_branch(branch: &str) -> String {
    branch
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' { c } else { '_' })
        .collect()
}

/// Replace every `version:` line, keeping its indentation
///
/// Returns `None` when the recipe has no `version:` line.
pub fn substitute_version(meta: &str, version: &str) -> Option<String> {
    let mut replaced = false;
    let mut out = String::with_capacity(meta.len());

    for line in meta.split_inclusive('\n') {
        if line.trim_start().starts_with("version:") {
            let indent = &line[..line.len() - line.trim_start().len()];
            out.push_str(&format!("{indent}version: '{version}'\n"));
            replaced = true;
        } else {
            out.push_str(line);
        }
    }

    replaced.then_some(out)
}
