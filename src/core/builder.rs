//! Build orchestration logic
//!
//! Drives one run: resolve the build order, classify each unit against the
//! registry, build what is missing, then upload or link what is not yet on
//! the target channel.
//!
//! Per unit, in build order:
//!
//! - not published anywhere: build, then upload to the channel
//! - published, not on the channel: link the existing artifact
//! - published and on the channel: nothing
//!
//! Without a [`PublishCapability`] the build half still runs and the publish
//! half is skipped entirely.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::core::capability::PublishCapability;
use crate::core::graph::DependencyGraph;
use crate::core::publication::PublicationState;
use crate::core::recipe::{Artifact, BuildUnit};
use crate::error::{BuildError, OrchestratorError, PublishError};
use crate::registry::Registry;

/// Produces a package file for a unit
#[async_trait]
pub trait PackageBuilder: Send + Sync {
    /// Build the unit and return the local package file
    async fn build(&self, unit: &BuildUnit) -> Result<PathBuf, BuildError>;
}

/// What to do when a build fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the whole run at the first failed build
    #[default]
    Abort,
    /// Keep going, but never build anything that depends on a failed unit
    SkipDependents,
}

/// Run settings
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Account that owns the published artifacts
    pub owner: String,
    /// Target channel
    pub channel: String,
    /// Platform subdir used in artifact names
    pub subdir: String,
    /// Whether uploads and links are allowed
    pub capability: PublishCapability,
    /// Build failure handling
    pub failure_policy: FailurePolicy,
}

/// Build half of a unit's outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BuildAction {
    /// Built in this run
    Built,
    /// Already published, not rebuilt
    Skipped,
    /// Build failed
    Failed { error: String },
    /// Not attempted because a dependency failed
    Blocked,
}

/// Publish half of a unit's outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PublishAction {
    /// Fresh artifact uploaded to the channel
    Uploaded,
    /// Existing artifact added to the channel
    Linked,
    /// Already on the channel
    NoOp,
    /// No publishing capability in this run
    Disabled,
    /// Nothing to publish because nothing was built
    NotAttempted,
    /// Upload or link failed
    Failed { error: String },
}

/// Outcome of one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    /// Unit name
    pub name: String,
    /// Registry basename of its artifact
    pub basename: String,
    /// Build outcome
    pub build: BuildAction,
    /// Publish outcome
    pub publish: PublishAction,
}

/// Outcome of a whole run, in build order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Per-unit outcomes
    pub units: Vec<UnitReport>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&UnitReport) -> bool) -> usize {
        self.units.iter().filter(|u| pred(u)).count()
    }

    /// Units built in this run
    pub fn built(&self) -> usize {
        self.count(|u| u.build == BuildAction::Built)
    }

    /// Units skipped because they were already published
    pub fn skipped(&self) -> usize {
        self.count(|u| u.build == BuildAction::Skipped)
    }

    /// Units uploaded in this run
    pub fn uploaded(&self) -> usize {
        self.count(|u| u.publish == PublishAction::Uploaded)
    }

    /// Units linked in this run
    pub fn linked(&self) -> usize {
        self.count(|u| u.publish == PublishAction::Linked)
    }

    /// Names of units whose build failed
    pub fn failed_builds(&self) -> Vec<String> {
        self.units
            .iter()
            .filter(|u| matches!(u.build, BuildAction::Failed { .. }))
            .map(|u| u.name.clone())
            .collect()
    }

    /// Names of units whose publish step failed
    pub fn failed_publishes(&self) -> Vec<String> {
        self.units
            .iter()
            .filter(|u| matches!(u.publish, PublishAction::Failed { .. }))
            .map(|u| u.name.clone())
            .collect()
    }

    /// Turn any recorded failure into an error; build failures take precedence
    pub fn ensure_success(&self) -> Result<(), OrchestratorError> {
        let failed = self.failed_builds();
        if !failed.is_empty() {
            return Err(OrchestratorError::BuildsFailed { units: failed });
        }
        let failed = self.failed_publishes();
        if !failed.is_empty() {
            return Err(OrchestratorError::PublishFailed { units: failed });
        }
        Ok(())
    }
}

/// Progress callback: (index, total, finished unit)
pub type ProgressCallback = Box<dyn Fn(usize, usize, &UnitReport) + Send + Sync>;

/// A unit queued for processing, with its pre-build classification
#[derive(Debug, Clone)]
pub struct PlannedUnit {
    /// The unit
    pub unit: BuildUnit,
    /// Its artifact identity
    pub artifact: Artifact,
    /// Whether the artifact already exists under the owner
    pub published: bool,
}

/// Build orchestrator
pub struct BuildOrchestrator<'a, B: PackageBuilder + ?Sized, R: Registry + ?Sized> {
    builder: &'a B,
    registry: &'a R,
    config: OrchestratorConfig,
    progress: Option<ProgressCallback>,
}

impl<'a, B: PackageBuilder + ?Sized, R: Registry + ?Sized> BuildOrchestrator<'a, B, R> {
    /// Create a new build orchestrator
    pub fn new(builder: &'a B, registry: &'a R, config: OrchestratorConfig) -> Self {
        Self {
            builder,
            registry,
            config,
            progress: None,
        }
    }

    /// Report each finished unit to a callback
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Get the run settings
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Resolve and classify without building anything
    pub async fn plan(
        &self,
        units: &[BuildUnit],
    ) -> Result<(DependencyGraph, Vec<PlannedUnit>), OrchestratorError> {
        let graph = DependencyGraph::build_graph(units)?;
        let order = graph.topological_sort()?;

        let by_name: HashMap<&str, &BuildUnit> =
            units.iter().map(|u| (u.name.as_str(), u)).collect();
        let state = PublicationState::new(self.registry, &self.config.owner);

        let mut planned = Vec::with_capacity(order.len());
        for name in &order {
            let unit = by_name[name.as_str()];
            let artifact = Artifact::for_unit(unit, &self.config.subdir);
            let published = state.is_published(&artifact).await.map_err(|source| {
                OrchestratorError::Classify {
                    unit: name.clone(),
                    source,
                }
            })?;
            planned.push(PlannedUnit {
                unit: unit.clone(),
                artifact,
                published,
            });
        }

        tracing::info!(
            "Resolved dependencies, will be built in the following order:\n\t{}",
            planned
                .iter()
                .map(|p| format!("{} (will be built: {})", p.unit.dist(), !p.published))
                .collect::<Vec<_>>()
                .join("\n\t")
        );

        Ok((graph, planned))
    }

    /// Run the full build-then-publish loop
    ///
    /// Returns `Err` only for failures that stop the run: an unorderable graph,
    /// an unreachable registry, or a build failure under [`FailurePolicy::Abort`].
    /// Everything else is recorded in the report.
    pub async fn run(&self, units: &[BuildUnit]) -> Result<RunReport, OrchestratorError> {
        let (graph, planned) = self.plan(units).await?;

        if !self.config.capability.can_publish() {
            tracing::warn!("No publishing token: build will continue, but no uploads will take place");
        }

        let mut state = PublicationState::new(self.registry, &self.config.owner);
        let mut blocked: HashSet<String> = HashSet::new();
        let mut report = RunReport::default();
        let total = planned.len();

        for (index, PlannedUnit { unit, artifact, published }) in planned.into_iter().enumerate() {
            let outcome = if blocked.contains(&unit.name) {
                tracing::warn!("Skipping {}: a dependency failed to build", unit.name);
                UnitReport {
                    name: unit.name.clone(),
                    basename: artifact.basename.clone(),
                    build: BuildAction::Blocked,
                    publish: PublishAction::NotAttempted,
                }
            } else {
                self.process(&graph, &mut state, &mut blocked, &unit, artifact, published)
                    .await?
            };

            if let Some(progress) = &self.progress {
                progress(index + 1, total, &outcome);
            }
            report.units.push(outcome);
        }

        Ok(report)
    }

    async fn process(
        &self,
        graph: &DependencyGraph,
        state: &mut PublicationState<'_, R>,
        blocked: &mut HashSet<String>,
        unit: &BuildUnit,
        artifact: Artifact,
        published: bool,
    ) -> Result<UnitReport, OrchestratorError> {
        let (artifact, build) = if published {
            tracing::info!("{} already exists under {}, not building", artifact, self.config.owner);
            (artifact, BuildAction::Skipped)
        } else {
            tracing::info!("Building {}", unit.dist());
            match self.builder.build(unit).await {
                Ok(path) => (artifact.with_path(path), BuildAction::Built),
                Err(e) => {
                    tracing::error!("{e}");
                    if self.config.failure_policy == FailurePolicy::Abort {
                        return Err(OrchestratorError::Build(e));
                    }
                    blocked.extend(graph.dependents_of(&unit.name));
                    return Ok(UnitReport {
                        name: unit.name.clone(),
                        basename: artifact.basename,
                        build: BuildAction::Failed {
                            error: e.to_string(),
                        },
                        publish: PublishAction::NotAttempted,
                    });
                }
            }
        };

        let publish = if self.config.capability.can_publish() {
            match self.publish(state, &artifact, build == BuildAction::Built).await {
                Ok(action) => action,
                Err(e) => {
                    tracing::error!("{e}");
                    PublishAction::Failed {
                        error: e.to_string(),
                    }
                }
            }
        } else {
            PublishAction::Disabled
        };

        Ok(UnitReport {
            name: unit.name.clone(),
            basename: artifact.basename,
            build,
            publish,
        })
    }

    async fn publish(
        &self,
        state: &mut PublicationState<'_, R>,
        artifact: &Artifact,
        built: bool,
    ) -> Result<PublishAction, PublishError> {
        let owner = &self.config.owner;
        let channel = &self.config.channel;

        if built {
            tracing::info!("Uploading {} to the {channel} channel", artifact.name);
            self.registry
                .upload(artifact, owner, std::slice::from_ref(channel))
                .await?;
            state.record_on_channel(artifact, channel);
            return Ok(PublishAction::Uploaded);
        }

        let on_channel = state.is_on_channel(artifact, channel).await.map_err(|e| {
            PublishError::ChannelQuery {
                channel: channel.clone(),
                error: e.to_string(),
            }
        })?;
        if on_channel {
            tracing::info!("Nothing to be done for {} - it is already on {channel}", artifact.name);
            Ok(PublishAction::NoOp)
        } else {
            tracing::info!("Adding existing {} to the {channel} channel", artifact.name);
            self.registry.link(owner, artifact, channel).await?;
            state.record_on_channel(artifact, channel);
            Ok(PublishAction::Linked)
        }
    }
}
