/// Genre-based mood collections
///
/// Curated pools backing the mood playlists ("Feeling Sad", "Action
/// Night", ...). Selections are shuffled with a seed derived from the
/// calendar day and the mood key, so a playlist looks fresh each day but
/// stays stable across a session and reproducible in tests. One
/// assembly pass deduplicates across all playlists, borrowing from the
/// drama overflow pool when a playlist comes up short.
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::cache::{top_releases_window, Cache, CacheKey};
use crate::models::{GenreMovie, MoodPlaylist};
use crate::services::dedup::{self, ShelfPlan};

/// Movies shown per playlist
pub const PLAYLIST_SIZE: usize = 4;

/// Pool oversample factor so dedup can still fill later playlists
const OVERSAMPLE: usize = 2;

/// Seed for the per-day shuffle of one mood pool
pub fn day_seed(day: NaiveDate, key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    day.hash(&mut hasher);
    key.hash(&mut hasher);
    hasher.finish()
}

fn placeholder_poster(title: &str, genre: &str) -> String {
    let color = match genre {
        "Comedy" => "4CAF50",
        "Action" => "F44336",
        "Romance" => "E91E63",
        "Horror" => "424242",
        "Drama" => "2196F3",
        "Family" => "FF9800",
        _ => "607D8B",
    };

    let short: String = title.chars().take(20).collect();
    let encoded: String = short
        .chars()
        .map(|c| if c == ' ' { '+' } else { c })
        .collect();
    format!(
        "https://via.placeholder.com/300x450/{}/FFFFFF?text={}",
        color, encoded
    )
}

fn gm(id: u64, title: &str, overview: &str, date: &str, rating: f64, genre: &str) -> GenreMovie {
    GenreMovie {
        id,
        title: title.to_string(),
        overview: overview.to_string(),
        poster_path: placeholder_poster(title, genre),
        release_date: date.to_string(),
        vote_average: rating,
        genre_primary: genre.to_string(),
    }
}

fn feel_good_movies() -> Vec<GenreMovie> {
    vec![
        gm(1001, "The Secret Life of Walter Mitty", "A daydreamer escapes his anonymous life by disappearing into a world of fantasies.", "2013-12-25", 7.3, "Comedy"),
        gm(1002, "La La Land", "A jazz pianist falls for an aspiring actress in Los Angeles.", "2016-12-09", 8.0, "Romance"),
        gm(1003, "The Grand Budapest Hotel", "A writer encounters the owner of an aging high-class hotel.", "2014-03-28", 8.1, "Comedy"),
        gm(1004, "Paddington", "A young Peruvian bear travels to London in search of a home.", "2014-11-28", 7.2, "Family"),
        gm(1005, "About Time", "A young man discovers he can travel back in time to improve moments in his life.", "2013-09-04", 7.8, "Romance"),
        gm(1006, "The Pursuit of Happyness", "A struggling salesman takes custody of his son as he's poised to begin a life-changing professional career.", "2006-12-15", 8.0, "Drama"),
        gm(1007, "Chef", "A head chef quits his restaurant job and buys a food truck in an effort to reclaim his creative promise.", "2014-05-09", 7.3, "Comedy"),
        gm(1008, "Julie & Julia", "Julia Child's story of her start in the cooking profession is intertwined with blogger Julie Powell's challenge.", "2009-08-07", 7.0, "Drama"),
        gm(1009, "Forrest Gump", "The presidencies of Kennedy and Johnson are shown through the perspective of an Alabama man with an IQ of 75.", "1994-07-06", 8.8, "Drama"),
        gm(1010, "Good Will Hunting", "Will Hunting, a janitor at M.I.T., has a gift for mathematics but needs help from a psychologist.", "1997-12-05", 8.3, "Drama"),
        gm(1011, "The Intern", "A 70-year-old widower becomes a senior intern at an online fashion website.", "2015-09-25", 7.1, "Comedy"),
        gm(1012, "Little Miss Sunshine", "A family determined to get their young daughter into the finals of a beauty pageant take a cross-country trip.", "2006-07-26", 7.8, "Comedy"),
    ]
}

fn action_movies() -> Vec<GenreMovie> {
    vec![
        gm(2001, "John Wick: Chapter 4", "With the price on his head ever increasing, John Wick uncovers a path to defeating The High Table.", "2023-03-24", 7.7, "Action"),
        gm(2002, "Top Gun: Maverick", "After thirty years, Maverick is still pushing the envelope as a top naval aviator.", "2022-05-27", 8.3, "Action"),
        gm(2003, "Mad Max: Fury Road", "In a post-apocalyptic wasteland, Max teams up with a mysterious woman to flee from a tyrannical warlord.", "2015-05-15", 8.1, "Action"),
        gm(2004, "Mission: Impossible - Dead Reckoning", "Ethan Hunt and his IMF team embark on their most dangerous mission yet.", "2023-07-12", 7.7, "Action"),
        gm(2005, "The Dark Knight", "When the menace known as the Joker wreaks havoc on Gotham, Batman must accept one of the greatest psychological tests.", "2008-07-18", 9.0, "Action"),
        gm(2006, "Gladiator", "A former Roman General sets out to exact vengeance against the corrupt emperor who murdered his family.", "2000-05-05", 8.5, "Action"),
        gm(2007, "The Matrix", "A computer hacker learns from mysterious rebels about the true nature of his reality.", "1999-03-31", 8.7, "Action"),
        gm(2008, "Spider-Man: No Way Home", "With Spider-Man's identity revealed, Peter asks Doctor Strange for help.", "2021-12-17", 8.4, "Action"),
        gm(2009, "Avengers: Endgame", "After the devastating events of Infinity War, the universe is in ruins.", "2019-04-26", 8.4, "Action"),
        gm(2010, "Casino Royale", "James Bond earns his 00 status and is assigned to his first mission as Bond.", "2006-11-17", 8.0, "Action"),
        gm(2011, "Fast Five", "Dom and his crew find themselves on the wrong side of the law once again.", "2011-04-29", 7.3, "Action"),
        gm(2012, "The Bourne Identity", "A man is picked up by a fishing boat with no memory of who he is.", "2002-06-14", 7.9, "Action"),
    ]
}

fn romance_movies() -> Vec<GenreMovie> {
    vec![
        gm(3001, "Anyone But You", "After an amazing first date, Bea and Ben's fiery attraction turns ice cold.", "2023-12-22", 6.1, "Romance"),
        gm(3002, "The Notebook", "A poor yet passionate young man falls in love with a rich young woman.", "2004-06-25", 7.8, "Romance"),
        gm(3003, "Pride and Prejudice", "Sparks fly when spirited Elizabeth Bennet meets single, rich, and proud Mr. Darcy.", "2005-09-16", 8.1, "Romance"),
        gm(3004, "Titanic", "A seventeen-year-old aristocrat falls in love with a kind but poor artist aboard the luxurious, ill-fated R.M.S. Titanic.", "1997-12-19", 7.9, "Romance"),
        gm(3005, "Casablanca", "A cynical American expatriate struggles to decide whether or not he should help his former lover escape Casablanca.", "1942-11-26", 8.5, "Romance"),
        gm(3006, "When Harry Met Sally", "Harry and Sally have known each other for years, and are very good friends, but they fear sex would ruin the friendship.", "1989-07-21", 7.7, "Romance"),
        gm(3007, "Roman Holiday", "A bored and sheltered princess escapes her guardians and falls in love with an American newsman in Rome.", "1953-09-02", 8.0, "Romance"),
        gm(3008, "Sleepless in Seattle", "A recently widowed man's son calls a radio talk-show in an attempt to find his father a partner.", "1993-06-25", 6.7, "Romance"),
        gm(3009, "The Princess Bride", "A bedridden boy's grandfather reads him the story of a farmboy-turned-pirate who encounters numerous obstacles.", "1987-10-09", 8.0, "Romance"),
        gm(3010, "You've Got Mail", "Two business rivals hate each other at the office but fall in love over the internet.", "1998-12-18", 6.3, "Romance"),
        gm(3011, "10 Things I Hate About You", "A pretty, popular teenager can't go out on a date until her ill-tempered older sister does.", "1999-03-31", 7.3, "Romance"),
        gm(3012, "Love Actually", "Follows the lives of eight very different couples in dealing with their love lives in various loosely interrelated tales.", "2003-11-07", 7.6, "Romance"),
    ]
}

fn horror_movies() -> Vec<GenreMovie> {
    vec![
        gm(4001, "Scream VI", "Following the latest Ghostface killings, the four survivors leave Woodsboro behind.", "2023-03-10", 6.5, "Horror"),
        gm(4002, "The Exorcist", "When a teenage girl is possessed by a mysterious entity, her mother seeks the help of two priests.", "1973-12-26", 8.0, "Horror"),
        gm(4003, "Halloween", "Fifteen years after murdering his sister, Michael Myers escapes from a mental hospital.", "1978-10-25", 7.7, "Horror"),
        gm(4004, "A Nightmare on Elm Street", "Teenager Nancy Thompson must uncover the dark truth concealed by her parents.", "1984-11-16", 7.5, "Horror"),
        gm(4005, "Get Out", "A young African-American visits his white girlfriend's parents for the weekend.", "2017-02-24", 7.7, "Horror"),
        gm(4006, "Hereditary", "A grieving family is haunted by tragedy and disturbing secrets.", "2018-06-08", 7.3, "Horror"),
        gm(4007, "The Conjuring", "Paranormal investigators Ed and Lorraine Warren work to help a family terrorized by a dark presence.", "2013-07-19", 7.5, "Horror"),
        gm(4008, "It", "Seven young outcasts in Derry, Maine, are about to face their worst nightmare.", "2017-09-08", 7.3, "Horror"),
        gm(4009, "The Shining", "A family heads to an isolated hotel for the winter where a sinister presence influences the father.", "1980-05-23", 8.4, "Horror"),
        gm(4010, "Psycho", "A Phoenix secretary embezzles forty thousand dollars from her employer's client.", "1960-09-08", 8.5, "Horror"),
        gm(4011, "The Babadook", "A single mother and her child fall into a deep well of paranoia when an eerie children's book turns up at their home.", "2014-05-22", 6.8, "Horror"),
        gm(4012, "Midsommar", "A couple travels to Sweden to visit a rural hometown's fabled mid-summer festival.", "2019-07-03", 7.1, "Horror"),
    ]
}

fn comedy_movies() -> Vec<GenreMovie> {
    vec![
        gm(5001, "Barbie", "Barbie and Ken are having the time of their lives in the colorful world of Barbie Land.", "2023-07-21", 7.0, "Comedy"),
        gm(5002, "Superbad", "Two co-dependent high school seniors are forced to deal with separation anxiety.", "2007-08-17", 7.6, "Comedy"),
        gm(5003, "The Hangover", "Three buddies wake up from a bachelor party in Las Vegas, with no memory of the previous night.", "2009-06-05", 7.7, "Comedy"),
        gm(5004, "Anchorman", "Ron Burgundy is San Diego's top-rated newsman in the male-dominated broadcasting.", "2004-07-09", 6.9, "Comedy"),
        gm(5005, "Step Brothers", "Two aimless middle-aged losers still living at home are forced against their will to become roommates.", "2008-07-25", 6.9, "Comedy"),
        gm(5006, "Dumb and Dumber", "Lloyd and Harry are two men whose stupidity is really indescribable.", "1994-12-16", 7.3, "Comedy"),
        gm(5007, "Groundhog Day", "A weatherman finds himself living the same day over and over again.", "1993-02-12", 8.0, "Comedy"),
        gm(5008, "Bridesmaids", "Competition between the maid of honor and a bridesmaid threatens to upend the life of an out-of-work pastry chef.", "2011-05-13", 6.8, "Comedy"),
        gm(5009, "Tropic Thunder", "A group of self-absorbed actors set out to make the most expensive war film ever.", "2008-08-13", 6.9, "Comedy"),
        gm(5010, "Zoolander", "At the end of his career, a clueless fashion model is brainwashed to kill the Prime Minister of Malaysia.", "2001-09-28", 6.5, "Comedy"),
        gm(5011, "Mean Girls", "Cady Heron is a hit with The Plastics, the A-list girl clique at her new school.", "2004-04-30", 7.2, "Comedy"),
        gm(5012, "Napoleon Dynamite", "A listless and alienated teenager decides to help his new friend win the class presidency.", "2004-06-11", 6.9, "Comedy"),
    ]
}

/// Mood keys in playlist priority order, with aliases and display copy
const MOODS: &[(&str, &[&str], &str, &str, &str)] = &[
    (
        "feeling-sad",
        &["feeling-sad", "feelgood", "uplifting"],
        "Feeling Sad",
        "A curated list of uplifting movies to brighten your mood",
        "Feel-good, Comedy, Drama",
    ),
    (
        "action-night",
        &["action-night", "action", "thriller"],
        "Action Night",
        "High-octane thrillers and action-packed adventures",
        "Action, Thriller, Adventure",
    ),
    (
        "romance-evening",
        &["romance-evening", "romance", "romantic"],
        "Romance Evening",
        "Heartwarming love stories and romantic comedies",
        "Romance, Comedy, Drama",
    ),
    (
        "horror-marathon",
        &["horror-marathon", "horror", "scary"],
        "Horror Marathon",
        "Spine-chilling horror films for the brave",
        "Horror, Thriller, Mystery",
    ),
    (
        "laugh-therapy",
        &["laugh-therapy", "comedy", "funny"],
        "Laugh Therapy",
        "Comedy classics guaranteed to make you laugh",
        "Comedy, Satire, Feel-good",
    ),
];

struct CollectionsInner {
    cache: Cache,
    /// Bumped by `refresh_playlist` to vary the shuffle within a day
    generations: HashMap<String, u64>,
}

pub struct GenreCollections {
    inner: Mutex<CollectionsInner>,
}

impl Default for GenreCollections {
    fn default() -> Self {
        Self::new()
    }
}

impl GenreCollections {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CollectionsInner {
                cache: Cache::new(),
                generations: HashMap::new(),
            }),
        }
    }

    /// Resolves a mood key or alias to its canonical pool
    fn resolve(mood: &str) -> (&'static str, Vec<GenreMovie>) {
        let key = mood.to_lowercase();
        let canonical = MOODS
            .iter()
            .find(|(_, aliases, ..)| aliases.contains(&key.as_str()))
            .map(|(canonical, ..)| *canonical)
            // Feel-good doubles as the default pool
            .unwrap_or("feeling-sad");

        let pool = match canonical {
            "action-night" => action_movies(),
            "romance-evening" => romance_movies(),
            "horror-marathon" => horror_movies(),
            "laugh-therapy" => comedy_movies(),
            _ => feel_good_movies(),
        };

        (canonical, pool)
    }

    /// Today's shuffled ordering of a mood pool, cached for the day
    fn shuffled_pool(&self, canonical: &str, pool: Vec<GenreMovie>) -> Vec<GenreMovie> {
        let mut inner = self.inner.lock().expect("collections lock poisoned");
        let cache_key = CacheKey::GenrePool(canonical.to_string());

        if let Ok(Some(cached)) = inner.cache.get::<Vec<GenreMovie>>(&cache_key, top_releases_window()) {
            return cached;
        }

        let generation = inner.generations.get(canonical).copied().unwrap_or(0);
        let seed = day_seed(Utc::now().date_naive(), canonical).wrapping_add(generation);

        let mut shuffled = pool;
        let mut rng = StdRng::seed_from_u64(seed);
        shuffled.shuffle(&mut rng);

        inner.cache.put(&cache_key, &shuffled);
        shuffled
    }

    /// Movies for a mood key (aliases accepted), at most `count`
    pub fn movies_for_mood(&self, mood: &str, count: usize) -> Vec<GenreMovie> {
        let (canonical, pool) = Self::resolve(mood);
        let mut movies = self.shuffled_pool(canonical, pool);
        movies.truncate(count);
        movies
    }

    /// All five mood playlists, deduplicated across each other in one pass
    ///
    /// Pools are oversampled 2x and filled in fixed priority order; a
    /// playlist that cannot reach its size borrows from the drama
    /// overflow pool.
    pub fn all_mood_playlists(&self) -> Vec<MoodPlaylist> {
        let plans: Vec<ShelfPlan<GenreMovie>> = MOODS
            .iter()
            .map(|(canonical, ..)| ShelfPlan {
                label: canonical.to_string(),
                target: PLAYLIST_SIZE,
                pool: self.movies_for_mood(canonical, PLAYLIST_SIZE * OVERSAMPLE),
            })
            .collect();

        let overflow: Vec<GenreMovie> = feel_good_movies()
            .into_iter()
            .filter(|m| m.genre_primary == "Drama")
            .collect();

        let (shelves, _) = dedup::fill_shelves(&plans, Some(&overflow));

        MOODS
            .iter()
            .zip(shelves)
            .map(|((_, keys, title, description, genre), movies)| MoodPlaylist {
                title: title.to_string(),
                description: description.to_string(),
                movie_count: "12 movies".to_string(),
                genre: genre.to_string(),
                genre_keys: keys.iter().map(|k| k.to_string()).collect(),
                movies,
            })
            .collect()
    }

    /// Re-rolls one playlist's selection without waiting for the next day
    pub fn refresh_playlist(&self, title: &str) -> Option<MoodPlaylist> {
        let canonical = MOODS
            .iter()
            .find(|(_, _, t, ..)| *t == title)
            .map(|(canonical, ..)| *canonical)?;

        {
            let mut inner = self.inner.lock().expect("collections lock poisoned");
            *inner.generations.entry(canonical.to_string()).or_insert(0) += 1;
            let cache_key = CacheKey::GenrePool(canonical.to_string());
            // Invalidate by overwriting with an already-stale stamp
            inner.cache.put_stamped(
                &cache_key,
                &Vec::<GenreMovie>::new(),
                Utc::now() - chrono::Duration::days(2),
            );
        }

        self.all_mood_playlists()
            .into_iter()
            .find(|p| p.title == title)
    }
}
