/// Enrichment pipeline
///
/// Resolves each generated suggestion through the metadata provider,
/// optionally layers on a secondary-ratings lookup, applies the shelf's
/// quality gate, and attaches the recommendation reason. Every failure
/// is per item: a suggestion the provider cannot match contributes zero
/// records, and a ratings miss leaves the record without secondary data
/// instead of dropping it.
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    models::{MovieRecord, Suggestion},
    providers::{MetadataProvider, RatingsProvider},
    services::{fallback, generator::MAX_SUGGESTIONS},
};

/// Optional gate applied to enriched records before they reach a shelf
///
/// Both checks use the field they name and nothing else: a record
/// missing the ratings-provider score or the release date is dropped,
/// not defaulted, even when the metadata-provider average would pass.
#[derive(Debug, Clone, Default)]
pub struct QualityFilter {
    /// Strict bar: the secondary score must be greater than this value
    pub min_secondary_score: Option<f64>,
    /// Release date must fall within this many days before now
    pub max_release_age_days: Option<i64>,
}

impl QualityFilter {
    /// Gate for the top-releases shelf: secondary score above 7.0 and a
    /// release within the last six months
    pub fn top_releases() -> Self {
        Self {
            min_secondary_score: Some(7.0),
            max_release_age_days: Some(6 * 30),
        }
    }

    pub fn passes(&self, record: &MovieRecord) -> bool {
        if let Some(bar) = self.min_secondary_score {
            match record.secondary_score() {
                Some(score) if score > bar => {}
                _ => return false,
            }
        }

        if let Some(max_age) = self.max_release_age_days {
            let cutoff = Utc::now().date_naive() - Duration::days(max_age);
            match record.release_date {
                Some(date) if date >= cutoff => {}
                _ => return false,
            }
        }

        true
    }
}

pub struct EnrichmentPipeline {
    metadata: Arc<dyn MetadataProvider>,
    ratings: Arc<dyn RatingsProvider>,
}

impl EnrichmentPipeline {
    pub fn new(metadata: Arc<dyn MetadataProvider>, ratings: Arc<dyn RatingsProvider>) -> Self {
        Self { metadata, ratings }
    }

    /// Enriches a suggestion batch into movie records
    ///
    /// Suggestions resolve concurrently, one task each, and the output
    /// is collected in original suggestion order so downstream dedup and
    /// backfill stay deterministic.
    pub async fn enrich(
        &self,
        suggestions: &[Suggestion],
        filter: Option<&QualityFilter>,
    ) -> Vec<MovieRecord> {
        let mut tasks = Vec::new();

        for suggestion in suggestions.iter().take(MAX_SUGGESTIONS).cloned() {
            let metadata = Arc::clone(&self.metadata);
            let ratings = Arc::clone(&self.ratings);
            tasks.push(tokio::spawn(async move {
                resolve_one(metadata, ratings, suggestion).await
            }));
        }

        let mut enriched = Vec::new();
        for task in tasks {
            match task.await {
                Ok(Some(record)) => {
                    if filter.map_or(true, |f| f.passes(&record)) {
                        enriched.push(record);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Enrichment task join error");
                }
            }
        }

        tracing::info!(
            input = suggestions.len().min(MAX_SUGGESTIONS),
            enriched = enriched.len(),
            "Suggestion batch enriched"
        );

        enriched
    }

    /// `enrich`, then top up from the curated backfill list when the
    /// filtered set falls below the minimum shelf size
    pub async fn enrich_with_backfill(
        &self,
        suggestions: &[Suggestion],
        filter: Option<&QualityFilter>,
    ) -> Vec<MovieRecord> {
        let mut enriched = self.enrich(suggestions, filter).await;

        if enriched.len() < fallback::MIN_SHELF_SIZE {
            tracing::info!(
                enriched = enriched.len(),
                "Shelf below minimum size, adding backfill records"
            );

            for candidate in fallback::recent_backfill_movies() {
                if enriched.len() >= fallback::BACKFILL_TARGET {
                    break;
                }
                if !enriched.iter().any(|m| m.id == candidate.id) {
                    enriched.push(candidate);
                }
            }
        }

        enriched
    }
}

/// Resolves one suggestion: search, detail lookup, optional ratings merge
async fn resolve_one(
    metadata: Arc<dyn MetadataProvider>,
    ratings: Arc<dyn RatingsProvider>,
    suggestion: Suggestion,
) -> Option<MovieRecord> {
    let matches = metadata
        .search_by_title(&suggestion.title, suggestion.year_number())
        .await;

    let Some(first) = matches.into_iter().next() else {
        tracing::debug!(title = %suggestion.title, "No metadata match, skipping suggestion");
        return None;
    };

    // The search result lacks the cross-reference id; the detail lookup
    // carries it. Fall back to the search record if details are down.
    let mut record = match metadata.details_by_id(first.id).await {
        Some(detailed) => detailed,
        None => first,
    };

    if let Some(imdb_id) = record.imdb_id.clone() {
        record.secondary_ratings = ratings.by_external_id(&imdb_id).await;
    }

    record.recommendation_reason = Some(suggestion.reason.clone());

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RatingEntry, SecondaryRatings};
    use crate::providers::{MockMetadataProvider, MockRatingsProvider};
    use mockall::predicate::eq;

    fn suggestion(title: &str) -> Suggestion {
        Suggestion {
            title: title.to_string(),
            year: "2024".to_string(),
            reason: format!("{} is great", title),
            genre: "Drama".to_string(),
        }
    }

    fn search_hit(id: u64, title: &str) -> MovieRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "poster_path": "/poster.jpg",
            "release_date": "2024-06-01",
            "vote_average": 7.5,
            "vote_count": 1000
        }))
        .unwrap()
    }

    fn detail_hit(id: u64, title: &str) -> MovieRecord {
        let mut record = search_hit(id, title);
        record.imdb_id = Some(format!("tt{:07}", id));
        record
    }

    fn bundle(rating: &str) -> SecondaryRatings {
        SecondaryRatings {
            imdb_rating: rating.to_string(),
            ratings: vec![RatingEntry {
                source: "Internet Movie Database".to_string(),
                value: format!("{}/10", rating),
            }],
            awards: String::new(),
            genre: "Drama".to_string(),
            runtime: "120 min".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unmatched_suggestion_shrinks_output_by_one() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_search_by_title()
            .with(eq("Known Movie"), eq(Some(2024)))
            .returning(|_, _| vec![search_hit(10, "Known Movie")]);
        metadata
            .expect_search_by_title()
            .with(eq("Ghost Movie"), eq(Some(2024)))
            .returning(|_, _| Vec::new());
        metadata
            .expect_details_by_id()
            .returning(|id| Some(detail_hit(id, "Known Movie")));

        let mut ratings = MockRatingsProvider::new();
        ratings.expect_by_external_id().returning(|_| None);

        let pipeline = EnrichmentPipeline::new(Arc::new(metadata), Arc::new(ratings));
        let input = vec![suggestion("Known Movie"), suggestion("Ghost Movie")];
        let output = pipeline.enrich(&input, None).await;

        assert_eq!(output.len(), input.len() - 1);
        assert_eq!(output[0].title, "Known Movie");
    }

    #[tokio::test]
    async fn test_ratings_outage_keeps_all_records() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_search_by_title()
            .returning(|title, _| vec![search_hit(title.len() as u64, title)]);
        metadata
            .expect_details_by_id()
            .returning(|id| Some(detail_hit(id, "Matched")));

        // Simulated provider outage: every lookup fails
        let mut ratings = MockRatingsProvider::new();
        ratings.expect_by_external_id().returning(|_| None);

        let pipeline = EnrichmentPipeline::new(Arc::new(metadata), Arc::new(ratings));
        let input: Vec<Suggestion> = (0..12)
            .map(|i| suggestion(&format!("Movie {:02}", i)))
            .collect();
        let output = pipeline.enrich(&input, None).await;

        assert_eq!(output.len(), 12);
        assert!(output.iter().all(|m| m.secondary_ratings.is_none()));
    }

    #[tokio::test]
    async fn test_output_preserves_suggestion_order() {
        let mut metadata = MockMetadataProvider::new();
        metadata.expect_search_by_title().returning(|title, _| {
            let id = title.strip_prefix("Movie ").unwrap().parse::<u64>().unwrap();
            vec![search_hit(id, title)]
        });
        metadata
            .expect_details_by_id()
            .returning(|id| Some(detail_hit(id, &format!("Movie {}", id))));

        let mut ratings = MockRatingsProvider::new();
        ratings.expect_by_external_id().returning(|_| None);

        let pipeline = EnrichmentPipeline::new(Arc::new(metadata), Arc::new(ratings));
        let input: Vec<Suggestion> = (0..8).map(|i| suggestion(&format!("Movie {}", i))).collect();
        let output = pipeline.enrich(&input, None).await;

        let ids: Vec<u64> = output.iter().map(|m| m.id).collect();
        assert_eq!(ids, (0..8).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_quality_gate_excludes_exact_threshold() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_search_by_title()
            .returning(|title, _| match title {
                "At Bar" => vec![search_hit(1, title)],
                _ => vec![search_hit(2, title)],
            });
        metadata
            .expect_details_by_id()
            .returning(|id| Some(detail_hit(id, if id == 1 { "At Bar" } else { "Above Bar" })));

        let mut ratings = MockRatingsProvider::new();
        ratings
            .expect_by_external_id()
            .with(eq("tt0000001"))
            .returning(|_| Some(bundle("7.0")));
        ratings
            .expect_by_external_id()
            .with(eq("tt0000002"))
            .returning(|_| Some(bundle("7.1")));

        let pipeline = EnrichmentPipeline::new(Arc::new(metadata), Arc::new(ratings));
        let filter = QualityFilter {
            min_secondary_score: Some(7.0),
            max_release_age_days: None,
        };
        let output = pipeline
            .enrich(&[suggestion("At Bar"), suggestion("Above Bar")], Some(&filter))
            .await;

        // Strictly greater than: exactly 7.0 is out
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].title, "Above Bar");
    }

    #[tokio::test]
    async fn test_quality_gate_drops_records_missing_the_field() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_search_by_title()
            .returning(|title, _| vec![search_hit(5, title)]);
        metadata
            .expect_details_by_id()
            .returning(|id| Some(detail_hit(id, "High Metadata Average")));

        // No secondary score obtainable, even though vote_average would pass
        let mut ratings = MockRatingsProvider::new();
        ratings.expect_by_external_id().returning(|_| None);

        let pipeline = EnrichmentPipeline::new(Arc::new(metadata), Arc::new(ratings));
        let filter = QualityFilter {
            min_secondary_score: Some(7.0),
            max_release_age_days: None,
        };
        let output = pipeline
            .enrich(&[suggestion("High Metadata Average")], Some(&filter))
            .await;

        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_date_window_drops_old_and_undated_records() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_search_by_title()
            .returning(|title, _| match title {
                "Recent" => {
                    let mut r = search_hit(1, title);
                    r.release_date = Some(Utc::now().date_naive() - Duration::days(30));
                    vec![r]
                }
                "Old" => {
                    let mut r = search_hit(2, title);
                    r.release_date = chrono::NaiveDate::from_ymd_opt(2019, 1, 1);
                    vec![r]
                }
                _ => {
                    let mut r = search_hit(3, title);
                    r.release_date = None;
                    vec![r]
                }
            });
        // Details mirror the search result, keeping each record's date
        metadata.expect_details_by_id().returning(|_| None);

        let mut ratings = MockRatingsProvider::new();
        ratings.expect_by_external_id().returning(|_| None);

        let pipeline = EnrichmentPipeline::new(Arc::new(metadata), Arc::new(ratings));
        let filter = QualityFilter {
            min_secondary_score: None,
            max_release_age_days: Some(180),
        };
        let output = pipeline
            .enrich(
                &[suggestion("Recent"), suggestion("Old"), suggestion("Undated")],
                Some(&filter),
            )
            .await;

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].title, "Recent");
    }

    #[tokio::test]
    async fn test_backfill_tops_up_a_short_shelf() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_search_by_title()
            .returning(|title, _| vec![search_hit(7, title)]);
        metadata
            .expect_details_by_id()
            .returning(|id| Some(detail_hit(id, "Only Match")));

        let mut ratings = MockRatingsProvider::new();
        ratings
            .expect_by_external_id()
            .returning(|_| Some(bundle("8.0")));

        let pipeline = EnrichmentPipeline::new(Arc::new(metadata), Arc::new(ratings));
        let output = pipeline
            .enrich_with_backfill(&[suggestion("Only Match")], None)
            .await;

        assert_eq!(output.len(), fallback::BACKFILL_TARGET);
        assert_eq!(output[0].title, "Only Match");
        let ids: std::collections::HashSet<u64> = output.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), output.len());
    }

    #[tokio::test]
    async fn test_reason_attached_from_suggestion() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_search_by_title()
            .returning(|title, _| vec![search_hit(9, title)]);
        metadata
            .expect_details_by_id()
            .returning(|id| Some(detail_hit(id, "Reasoned")));

        let mut ratings = MockRatingsProvider::new();
        ratings
            .expect_by_external_id()
            .returning(|_| Some(bundle("8.1")));

        let pipeline = EnrichmentPipeline::new(Arc::new(metadata), Arc::new(ratings));
        let output = pipeline.enrich(&[suggestion("Reasoned")], None).await;

        assert_eq!(
            output[0].recommendation_reason.as_deref(),
            Some("Reasoned is great")
        );
        assert_eq!(output[0].secondary_ratings.as_ref().unwrap().imdb_rating, "8.1");
    }
}
