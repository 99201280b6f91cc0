//! Event type definitions for progress reporting.

use crate::core::similarity::StrategyKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while fingerprinting and clustering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Fingerprinting (append) phase events
    Append(AppendEvent),
    /// Clustering phase events
    Cluster(ClusterEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while images are appended to a strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppendEvent {
    /// Appending has started
    Started { total_images: usize },
    /// Progress update during appending
    Progress(AppendProgress),
    /// An image could not be decoded and was left out
    Skipped { path: PathBuf, reason: String },
    /// An image could not be read; the error was surfaced
    Failed { path: PathBuf, message: String },
    /// Appending completed
    Completed {
        indexed: usize,
        skipped: usize,
        failed: usize,
    },
}

/// Progress information during appending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendProgress {
    /// Number of images handled so far
    pub completed: usize,
    /// Total number of images to append
    pub total: usize,
    /// Image just handled
    pub current_path: PathBuf,
}

/// Events during the clustering sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClusterEvent {
    /// Clustering has started
    Started {
        strategy: StrategyKind,
        total_images: usize,
    },
    /// Emitted after each source image
    Progress(ClusterProgress),
    /// Clustering completed
    Completed {
        total_clusters: usize,
        largest_cluster: usize,
    },
}

/// Progress information during clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterProgress {
    /// Strategy doing the work
    pub strategy: StrategyKind,
    /// Source images processed so far
    pub processed: usize,
    /// Images in the fingerprint table
    pub total: usize,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Appending,
    Clustering,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Paths handed to the pipeline
    pub total_images: usize,
    /// Images that made it into the fingerprint table
    pub indexed_images: usize,
    /// Number of clusters produced
    pub clusters: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Appending => write!(f, "Appending"),
            PipelinePhase::Clustering => write!(f, "Clustering"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Cluster(ClusterEvent::Progress(ClusterProgress {
            strategy: StrategyKind::Perceptual,
            processed: 10,
            total: 50,
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Cluster(ClusterEvent::Progress(p)) => {
                assert_eq!(p.processed, 10);
                assert_eq!(p.total, 50);
                assert_eq!(p.strategy, StrategyKind::Perceptual);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn pipeline_summary_is_serializable() {
        let summary = PipelineSummary {
            total_images: 1000,
            indexed_images: 990,
            clusters: 420,
            duration_ms: 5000,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("990"));
    }

    #[test]
    fn phase_display() {
        assert_eq!(PipelinePhase::Appending.to_string(), "Appending");
        assert_eq!(PipelinePhase::Clustering.to_string(), "Clustering");
    }
}
