use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A fixed classification tag attachable to films, many-to-many
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    /// Blank on inbound payloads that reference a genre by id only
    #[serde(default)]
    pub name: String,
}

/// A fixed age-rating classification attached to a film
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MpaRating {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// A film in the catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    /// Assigned by the store on creation; immutable afterwards
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub release_date: NaiveDate,
    /// Duration in minutes
    pub duration: i32,
    pub mpa: MpaRating,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl Film {
    /// Replaces the genre list with a deduplicated copy in canonical order
    /// (ascending genre identifier).
    pub fn set_genres(&mut self, genres: Vec<Genre>) {
        let mut by_id: BTreeMap<i64, Genre> = BTreeMap::new();
        for genre in genres {
            by_id.entry(genre.id).or_insert(genre);
        }
        self.genres = by_id.into_values().collect();
    }

    /// Value equality over every field except the assigned identifier.
    /// Used for duplicate detection on add.
    pub fn same_record(&self, other: &Film) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.release_date == other.release_date
            && self.duration == other.duration
            && self.mpa == other.mpa
            && self.genres == other.genres
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(id: i64) -> Genre {
        Genre {
            id,
            name: format!("genre-{id}"),
        }
    }

    fn sample_film() -> Film {
        Film {
            id: None,
            name: "Arrival of a Train".to_string(),
            description: String::new(),
            release_date: NaiveDate::from_ymd_opt(1896, 1, 6).unwrap(),
            duration: 1,
            mpa: MpaRating {
                id: 1,
                name: "G".to_string(),
            },
            genres: Vec::new(),
        }
    }

    #[test]
    fn test_set_genres_sorts_ascending_by_id() {
        let mut film = sample_film();
        film.set_genres(vec![genre(4), genre(1), genre(2)]);
        let ids: Vec<i64> = film.genres.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn test_set_genres_drops_duplicates() {
        let mut film = sample_film();
        film.set_genres(vec![genre(2), genre(2), genre(1), genre(2)]);
        let ids: Vec<i64> = film.genres.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_film_deserializes_mpa_reference_without_name() {
        let film: Film = serde_json::from_str(
            r#"{
                "name": "Arrival of a Train",
                "description": "Fifty seconds of railway",
                "releaseDate": "1896-01-06",
                "duration": 1,
                "mpa": {"id": 1},
                "genres": [{"id": 2}]
            }"#,
        )
        .unwrap();
        assert_eq!(film.mpa.id, 1);
        assert_eq!(film.mpa.name, "");
        assert_eq!(film.genres.len(), 1);
    }

    #[test]
    fn test_film_serializes_release_date_in_camel_case() {
        let json = serde_json::to_value(sample_film()).unwrap();
        assert!(json.get("releaseDate").is_some());
        assert!(json.get("release_date").is_none());
    }
}
