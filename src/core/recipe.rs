//! Recipe metadata and artifact identity
//!
//! A [`BuildUnit`] is one buildable recipe as seen by the resolver and the
//! orchestrator. [`RecipeMeta`] is the subset of `meta.yaml` needed to build one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// One buildable package recipe, immutable for the duration of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildUnit {
    /// Package name, unique within a run
    pub name: String,
    /// Package version
    pub version: String,
    /// Build number
    pub build_number: u64,
    /// Explicit build string, if the recipe overrides the default
    pub build_string: Option<String>,
    /// Names this unit requires to be built first (constraints stripped)
    pub declared_dependencies: BTreeSet<String>,
    /// Recipe directory
    pub recipe_dir: PathBuf,
}

impl BuildUnit {
    /// Create a unit with no recipe directory, mostly useful for tests and fakes
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            build_number: 0,
            build_string: None,
            declared_dependencies: BTreeSet::new(),
            recipe_dir: PathBuf::from(name),
        }
    }

    /// Builder-style helper for declaring dependencies
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared_dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Create a unit from parsed recipe metadata
    pub fn from_meta(meta: RecipeMeta, recipe_dir: PathBuf) -> Self {
        let declared_dependencies = meta
            .requirements
            .build
            .iter()
            .chain(meta.requirements.run.iter())
            .filter_map(|spec| dependency_name(spec))
            .collect();

        Self {
            name: meta.package.name,
            version: meta.package.version,
            build_number: meta.build.number,
            build_string: meta.build.string,
            declared_dependencies,
            recipe_dir,
        }
    }

    /// Build string used in the artifact file name
    pub fn build_string(&self) -> String {
        self.build_string
            .clone()
            .unwrap_or_else(|| self.build_number.to_string())
    }

    /// Distribution name: `<name>-<version>-<build_string>`
    pub fn dist(&self) -> String {
        format!("{}-{}-{}", self.name, self.version, self.build_string())
    }
}

/// Strip the version constraint from a requirement spec (`numpy >=1.8` -> `numpy`)
pub fn dependency_name(spec: &str) -> Option<String> {
    spec.split_whitespace().next().map(str::to_string)
}

/// `meta.yaml` contents relevant to ordering and artifact naming
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeMeta {
    /// `package:` section
    pub package: PackageSection,

    /// `build:` section
    #[serde(default)]
    pub build: BuildSection,

    /// `requirements:` section
    #[serde(default)]
    pub requirements: RequirementsSection,
}

impl RecipeMeta {
    /// Parse from YAML string
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml_ng::Error> {
        serde_yaml_ng::from_str(content)
    }
}

/// `package:` section
#[derive(Debug, Clone, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,
    /// Package version, kept as written: an unquoted `1.10` stays `1.10`
    pub version: String,
}

/// `build:` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSection {
    /// Build number
    #[serde(default)]
    pub number: u64,
    /// Build string override
    pub string: Option<String>,
}

/// `requirements:` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequirementsSection {
    /// Build-time requirements
    #[serde(default, deserialize_with = "null_as_empty")]
    pub build: Vec<String>,
    /// Run-time requirements
    #[serde(default, deserialize_with = "null_as_empty")]
    pub run: Vec<String>,
}

// `build:` with no entries parses as null
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A built (or buildable) distribution of a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Package name
    pub name: String,
    /// Package version
    pub version: String,
    /// Registry basename: `<subdir>/<dist>.tar.bz2`
    pub basename: String,
    /// Local package file, set once the artifact has been built
    pub path: Option<PathBuf>,
}

impl Artifact {
    /// Derive the artifact identity of a unit for a platform subdir
    pub fn for_unit(unit: &BuildUnit, subdir: &str) -> Self {
        Self {
            name: unit.name.clone(),
            version: unit.version.clone(),
            basename: format!("{subdir}/{}.tar.bz2", unit.dist()),
            path: None,
        }
    }

    /// Attach the local package file
    #[must_use]
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    /// File name without the subdir prefix
    pub fn file_name(&self) -> &str {
        self.basename
            .rsplit_once('/')
            .map_or(self.basename.as_str(), |(_, file)| file)
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.basename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: &str = r"
package:
  name: foo
  version: 1.2.0

build:
  number: 3

requirements:
  build:
    - python
    - bar >=1.0
  run:
    - python
    - baz 2.*
";

    #[test]
    fn test_parse_meta_and_strip_constraints() {
        let meta = RecipeMeta::from_yaml(META).unwrap();
        let unit = BuildUnit::from_meta(meta, PathBuf::from("recipes/foo"));

        assert_eq!(unit.name, "foo");
        assert_eq!(unit.version, "1.2.0");
        assert_eq!(unit.build_number, 3);
        let deps: Vec<&str> = unit.declared_dependencies.iter().map(String::as_str).collect();
        assert_eq!(deps, vec!["bar", "baz", "python"]);
    }

    #[test]
    fn test_numeric_version_and_empty_requirements() {
        let meta = RecipeMeta::from_yaml(
            "package:\n  name: n\n  version: 2\nrequirements:\n  build:\n",
        )
        .unwrap();
        let unit = BuildUnit::from_meta(meta, PathBuf::from("n"));
        assert_eq!(unit.version, "2");
        assert_eq!(unit.build_number, 0);
        assert!(unit.declared_dependencies.is_empty());
    }

    #[test]
    fn test_unquoted_float_version_keeps_source_text() {
        for (written, expected) in [("1.0", "1.0"), ("1.10", "1.10"), ("0.20", "0.20")] {
            let meta = RecipeMeta::from_yaml(&format!(
                "package:\n  name: foo\n  version: {written}\n"
            ))
            .unwrap();
            let unit = BuildUnit::from_meta(meta, PathBuf::from("foo"));

            assert_eq!(unit.version, expected);
            assert_eq!(
                Artifact::for_unit(&unit, "linux-64").basename,
                format!("linux-64/foo-{expected}-0.tar.bz2")
            );
        }
    }

    #[test]
    fn test_artifact_basename() {
        let unit = BuildUnit::new("foo", "1.0");
        let artifact = Artifact::for_unit(&unit, "linux-64");
        assert_eq!(artifact.basename, "linux-64/foo-1.0-0.tar.bz2");
        assert_eq!(artifact.file_name(), "foo-1.0-0.tar.bz2");
        assert!(artifact.path.is_none());
    }

    #[test]
    fn test_build_string_override() {
        let mut unit = BuildUnit::new("foo", "1.0");
        unit.build_string = Some("py27_1".to_string());
        assert_eq!(unit.dist(), "foo-1.0-py27_1");
    }

    #[test]
    fn test_dependency_name() {
        assert_eq!(dependency_name("numpy >=1.8"), Some("numpy".to_string()));
        assert_eq!(dependency_name("numpy"), Some("numpy".to_string()));
        assert_eq!(dependency_name("   "), None);
    }
}
