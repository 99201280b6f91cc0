//! Pipeline execution implementation.

use crate::core::similarity::{
    AppendOutcome, Cluster, ClusterParams, ClusterResult, ImageSimilarity, SimilarityBuilder,
    StrategyKind,
};
use crate::events::{
    null_sender, AppendEvent, AppendProgress, ClusterEvent, Event, EventSender, PipelineEvent,
    PipelinePhase, PipelineSummary,
};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{info, warn};

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Clusters, largest first
    pub clusters: ClusterResult,
    /// Paths handed to the pipeline
    pub total_images: usize,
    /// Images that made it into the fingerprint table
    pub indexed_images: usize,
    /// Images that could not be decoded
    pub skipped: Vec<PathBuf>,
    /// Errors encountered (non-fatal)
    pub errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Clusters with more than one member
    pub fn groups(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter().filter(|c| !c.is_singleton())
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Strategy used to fingerprint and cluster
    pub strategy: StrategyKind,
    /// Depth/threshold overrides for the strategy
    pub params: ClusterParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Perceptual,
            params: ClusterParams::default(),
        }
    }
}

/// Builder for pipeline configuration
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the similarity strategy
    pub fn strategy(mut self, strategy: StrategyKind) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the neighbor depth
    pub fn depth(mut self, depth: usize) -> Self {
        self.config.params.depth = Some(depth);
        self
    }

    /// Set the distance threshold; negative means the strategy default
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.params.threshold = Some(threshold);
        self
    }

    /// Replace depth and threshold at once
    pub fn params(mut self, params: ClusterParams) -> Self {
        self.config.params = params;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        let strategy = SimilarityBuilder::new(self.config.strategy)
            .params(self.config.params)
            .build();

        Pipeline {
            config: self.config,
            strategy,
        }
    }
}

/// Appends a list of images in parallel, then clusters them
pub struct Pipeline {
    config: PipelineConfig,
    strategy: Box<dyn ImageSimilarity>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&mut self, paths: &[PathBuf]) -> PipelineResult {
        self.run_with_events(paths, &null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// Each run starts from an empty table.
    pub fn run_with_events(&mut self, paths: &[PathBuf], events: &EventSender) -> PipelineResult {
        let start_time = Instant::now();
        let total_images = paths.len();
        self.strategy.clear();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Appending
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Appending,
        }));
        events.send(Event::Append(AppendEvent::Started { total_images }));

        let completed = AtomicUsize::new(0);
        let indexed = AtomicUsize::new(0);
        let skipped = Mutex::new(Vec::new());
        let errors = Mutex::new(Vec::new());
        let strategy: &dyn ImageSimilarity = self.strategy.as_ref();

        paths.par_iter().for_each(|path| {
            match strategy.append_image(path) {
                Ok(AppendOutcome::Indexed) => {
                    indexed.fetch_add(1, Ordering::SeqCst);
                }
                Ok(AppendOutcome::Skipped) => {
                    events.send(Event::Append(AppendEvent::Skipped {
                        path: path.clone(),
                        reason: "image could not be decoded".to_string(),
                    }));
                    lock(&skipped).push(path.clone());
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to append image");
                    events.send(Event::Append(AppendEvent::Failed {
                        path: path.clone(),
                        message: e.to_string(),
                    }));
                    lock(&errors).push(e.to_string());
                }
            }

            let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
            events.send(Event::Append(AppendEvent::Progress(AppendProgress {
                completed: current,
                total: total_images,
                current_path: path.clone(),
            })));
        });

        let skipped = skipped.into_inner().unwrap_or_else(|e| e.into_inner());
        let errors = errors.into_inner().unwrap_or_else(|e| e.into_inner());
        let indexed_images = indexed.load(Ordering::SeqCst);

        events.send(Event::Append(AppendEvent::Completed {
            indexed: indexed_images,
            skipped: skipped.len(),
            failed: errors.len(),
        }));

        // Phase 2: Clustering
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Clustering,
        }));

        let kind = self.strategy.kind();
        events.send(Event::Cluster(ClusterEvent::Started {
            strategy: kind,
            total_images: self.strategy.len(),
        }));

        let clusters = {
            let mut progress = events.progress_for(kind);
            self.strategy.cluster(&mut progress)
        };

        events.send(Event::Cluster(ClusterEvent::Completed {
            total_clusters: clusters.len(),
            largest_cluster: clusters.first().map_or(0, Cluster::len),
        }));

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            strategy = %kind,
            images = total_images,
            indexed = indexed_images,
            clusters = clusters.len(),
            duration_ms,
            "pipeline finished"
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_images,
                indexed_images,
                clusters: clusters.len(),
                duration_ms,
            },
        }));

        PipelineResult {
            clusters,
            total_images,
            indexed_images,
            skipped,
            errors,
            duration_ms,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
