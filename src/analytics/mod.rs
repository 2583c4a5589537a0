//! Privacy-preserving visit and project-view analytics
//!
//! Client addresses are hashed with a deployment secret before anything is
//! written, so stored records never contain a raw IP. Snapshots are computed
//! on request from the stored records.

pub mod aggregator;
pub mod error;
pub mod hasher;
pub mod ip_extractor;
pub mod models;
pub mod recorder;
pub mod reporter;
pub mod retention;

pub use aggregator::{AnalyticsAggregator, RawSnapshot};
pub use error::{AnalyticsError, AnalyticsResult};
pub use hasher::IdentifierHasher;
pub use ip_extractor::extract_client_ip;
pub use models::{ProjectViewRecord, VisitRecord};
pub use recorder::{should_track, ProjectViewRecorder, VisitRecorder};
pub use reporter::{build_snapshot, AnalyticsSnapshot};
