pub mod collections;
pub mod dashboard;
pub mod dedup;
pub mod enrichment;
pub mod fallback;
pub mod generator;

pub use collections::GenreCollections;
pub use dashboard::DashboardService;
pub use enrichment::{EnrichmentPipeline, QualityFilter};
pub use generator::RecommendationGenerator;
