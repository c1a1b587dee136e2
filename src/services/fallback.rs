/// Static fallback data
///
/// Curated, known-good records used whenever an upstream source is
/// unavailable or the enriched set comes up short. Ids live outside the
/// ranges the metadata provider hands out for current releases, so they
/// never collide with fetched records during dedup.
use crate::models::{MovieRecord, RatingEntry, SecondaryRatings, Suggestion};

/// Minimum records a recommendation-backed shelf may hold before backfill kicks in
pub const MIN_SHELF_SIZE: usize = 4;

/// Backfill tops the shelf up to this many records, never beyond
pub const BACKFILL_TARGET: usize = 6;

fn record(
    id: u64,
    title: &str,
    overview: &str,
    poster_path: &str,
    release_date: &str,
    vote_average: f64,
    vote_count: u64,
    reason: &str,
) -> MovieRecord {
    MovieRecord {
        id,
        title: title.to_string(),
        overview: overview.to_string(),
        poster_path: Some(poster_path.to_string()),
        release_date: chrono::NaiveDate::parse_from_str(release_date, "%Y-%m-%d").ok(),
        vote_average,
        vote_count,
        imdb_id: None,
        secondary_ratings: None,
        recommendation_reason: Some(reason.to_string()),
    }
}

fn with_ratings(mut movie: MovieRecord, rating: &str, awards: &str, genre: &str, runtime: &str) -> MovieRecord {
    movie.secondary_ratings = Some(SecondaryRatings {
        imdb_rating: rating.to_string(),
        ratings: vec![RatingEntry {
            source: "Internet Movie Database".to_string(),
            value: format!("{}/10", rating),
        }],
        awards: awards.to_string(),
        genre: genre.to_string(),
        runtime: runtime.to_string(),
    });
    movie
}

/// Suggestions returned when the generator cannot produce a usable batch
pub fn fallback_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion {
            title: "Dune: Part Two".to_string(),
            year: "2024".to_string(),
            reason: "Spectacular sci-fi epic with stunning visuals and powerful performances"
                .to_string(),
            genre: "Sci-Fi".to_string(),
        },
        Suggestion {
            title: "Poor Things".to_string(),
            year: "2024".to_string(),
            reason: "Academy Award-winning dark comedy with Emma Stone's transformative performance"
                .to_string(),
            genre: "Comedy".to_string(),
        },
        Suggestion {
            title: "The Zone of Interest".to_string(),
            year: "2024".to_string(),
            reason: "Haunting Holocaust drama with innovative sound design and powerful storytelling"
                .to_string(),
            genre: "Drama".to_string(),
        },
    ]
}

/// Verified recent releases with good ratings, used to top up a shelf
/// that filtered down below the minimum size
pub fn recent_backfill_movies() -> Vec<MovieRecord> {
    vec![
        with_ratings(
            record(
                100_101,
                "Dune: Part Two",
                "Paul Atreides unites with Chani and the Fremen while seeking revenge against the conspirators who destroyed his family.",
                "/1pdfLvkbY9ohJlCjQH2CZjjYVvJ.jpg",
                "2024-03-01",
                8.5,
                4200,
                "Epic sci-fi sequel with stunning visuals and powerful performances",
            ),
            "8.5",
            "Won 1 Oscar",
            "Action, Adventure, Drama",
            "166 min",
        ),
        with_ratings(
            record(
                100_102,
                "Oppenheimer",
                "The story of J. Robert Oppenheimer's role in the development of the atomic bomb during World War II.",
                "/8Gxv8gSFCU0XGDykEGv7zR1n2ua.jpg",
                "2024-07-21",
                8.3,
                3800,
                "Christopher Nolan's masterful biographical drama about the atomic bomb creator",
            ),
            "8.3",
            "Won 7 Oscars",
            "Biography, Drama, History",
            "180 min",
        ),
        with_ratings(
            record(
                100_103,
                "Guardians of the Galaxy Vol. 3",
                "Peter Quill, still reeling from the loss of Gamora, must rally his team around him to defend the universe.",
                "/r2J02Z2OpNTctfOSN1Ydgii51I3.jpg",
                "2024-05-05",
                8.0,
                3200,
                "Emotional and action-packed conclusion to the Guardians trilogy",
            ),
            "7.9",
            "Nominated for 2 Oscars",
            "Action, Adventure, Comedy",
            "150 min",
        ),
        with_ratings(
            record(
                100_104,
                "Spider-Man: Across the Spider-Verse",
                "Miles Morales catapults across the Multiverse, where he encounters a team of Spider-People.",
                "/8Vt6mWEReuy4Of61Lnj5Xj704m8.jpg",
                "2024-06-02",
                8.7,
                4100,
                "Groundbreaking animated sequel with innovative visuals and storytelling",
            ),
            "8.7",
            "Won 1 Oscar",
            "Animation, Action, Adventure",
            "140 min",
        ),
        with_ratings(
            record(
                100_105,
                "The Batman",
                "When a sadistic serial killer begins murdering key political figures in Gotham, Batman is forced to investigate the city's hidden corruption.",
                "/b0PlSFdDwbyK0cf5RxwDpaOJQvQ.jpg",
                "2024-03-04",
                7.8,
                2900,
                "Dark and gripping take on the Batman mythos with Robert Pattinson",
            ),
            "7.8",
            "Nominated for 3 Oscars",
            "Action, Crime, Drama",
            "176 min",
        ),
    ]
}

/// Full fallback shelf served when every upstream source is down
pub fn fallback_recommendations() -> Vec<MovieRecord> {
    vec![
        record(
            100_001,
            "Dune: Part Two",
            "Paul Atreides unites with Chani and the Fremen while seeking revenge against the conspirators who destroyed his family.",
            "/d5NXSklXo0qyIYkgV94XAgMIckC.jpg",
            "2024-03-01",
            8.1,
            2500,
            "Spectacular sci-fi epic with stunning visuals and powerful performances",
        ),
        record(
            100_002,
            "Poor Things",
            "The incredible tale about the fantastical evolution of Bella Baxter, a young woman brought back to life by the brilliant and unorthodox scientist Dr. Godwin Baxter.",
            "/kCGlIMHnOm8JPXq3rXM6c5wMxcT.jpg",
            "2024-01-26",
            7.9,
            1800,
            "Academy Award-winning dark comedy with Emma Stone's transformative performance",
        ),
        record(
            100_003,
            "The Zone of Interest",
            "The commandant of Auschwitz, Rudolf Höss, and his wife Hedwig, strive to build a dream life for their family in a house and garden next to the camp.",
            "/hUu9zyZmDqx8BFJHjldNVsVPe6.jpg",
            "2024-02-02",
            7.8,
            1200,
            "Haunting Holocaust drama with innovative sound design and powerful storytelling",
        ),
        record(
            100_004,
            "Killers of the Flower Moon",
            "When oil is discovered in 1920s Oklahoma under Osage Nation land, the Osage people are murdered one by one.",
            "/dB6Krk806zeqd0nPYBSqGKqDmCS.jpg",
            "2024-01-12",
            7.7,
            2100,
            "Martin Scorsese's epic crime drama with powerful performances",
        ),
        record(
            100_005,
            "The Holdovers",
            "A cranky history teacher at a remote prep school is forced to remain on campus during Christmas break to babysit the handful of students with nowhere to go.",
            "/wD2kUCX1Bb6oeIb2uz7kbdfLP6k.jpg",
            "2024-01-19",
            7.6,
            1500,
            "Heartwarming holiday comedy with Paul Giamatti's standout performance",
        ),
        record(
            100_006,
            "American Fiction",
            "A novelist who's fed up with the establishment profiting from Black entertainment uses a pen name to write a book that propels him into the heart of the hypocrisy he claims to disdain.",
            "/5a4JdoFwll5DRtKMe7JLuGQ9yJm.jpg",
            "2024-02-09",
            7.5,
            900,
            "Sharp satire on race and publishing with Jeffrey Wright's brilliant performance",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fallback_sets_have_distinct_ids() {
        let mut seen = HashSet::new();
        for movie in recent_backfill_movies()
            .iter()
            .chain(fallback_recommendations().iter())
        {
            assert!(seen.insert(movie.id), "duplicate fallback id {}", movie.id);
        }
    }

    #[test]
    fn test_backfill_movies_carry_passing_ratings() {
        for movie in recent_backfill_movies() {
            let score = movie.secondary_score().unwrap();
            assert!(score > 7.0, "{} scored {}", movie.title, score);
            assert!(movie.poster_path.is_some());
        }
    }

    #[test]
    fn test_fallback_recommendations_fill_a_shelf() {
        assert!(fallback_recommendations().len() >= BACKFILL_TARGET);
        assert!(fallback_suggestions().len() >= 3);
    }
}
