use std::cmp::Reverse;

use crate::error::{AppError, AppResult};
use crate::models::Film;

/// Orders films by descending like count and keeps the first `count`.
///
/// The like-count lookup is passed in by the caller, which gathers live
/// counts immediately before ranking. The sort is stable: films with equal
/// counts keep the relative order of the input listing. `count` of `None`,
/// or one exceeding the list length, returns the full ranking.
pub fn top_liked<F>(films: Vec<Film>, like_count: F, count: Option<i64>) -> AppResult<Vec<Film>>
where
    F: Fn(i64) -> usize,
{
    if let Some(count) = count {
        if count < 0 {
            return Err(AppError::InvalidArgument(
                "count must not be negative".to_string(),
            ));
        }
    }

    let mut ranked = films;
    ranked.sort_by_key(|film| Reverse(film.id.map_or(0, &like_count)));

    if let Some(count) = count {
        let count = count as usize;
        if count < ranked.len() {
            ranked.truncate(count);
        }
    }

    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::MpaRating;

    fn film(id: i64, name: &str) -> Film {
        Film {
            id: Some(id),
            name: name.to_string(),
            description: String::new(),
            release_date: NaiveDate::from_ymd_opt(1999, 3, 31).unwrap(),
            duration: 100,
            mpa: MpaRating {
                id: 1,
                name: "G".to_string(),
            },
            genres: Vec::new(),
        }
    }

    fn names(films: &[Film]) -> Vec<&str> {
        films.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_orders_by_descending_like_count() {
        let films = vec![film(1, "a"), film(2, "b"), film(3, "c")];
        let counts: HashMap<i64, usize> = [(1, 1), (2, 5), (3, 3)].into();

        let ranked = top_liked(films, |id| counts[&id], None).unwrap();
        assert_eq!(names(&ranked), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_tie_break_preserves_input_order_not_name() {
        // "zulu" precedes "alpha" in the input, so it must stay first among
        // the tied films even though it sorts last alphabetically.
        let films = vec![film(2, "zulu"), film(1, "alpha"), film(3, "mike")];
        let counts: HashMap<i64, usize> = [(2, 3), (1, 3), (3, 1)].into();

        let ranked = top_liked(films, |id| counts[&id], Some(2)).unwrap();
        assert_eq!(names(&ranked), vec!["zulu", "alpha"]);
    }

    #[test]
    fn test_count_exceeding_length_returns_full_list() {
        let films = vec![film(1, "a"), film(2, "b")];
        let ranked = top_liked(films, |_| 0, Some(10)).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_count_zero_returns_empty_list() {
        let films = vec![film(1, "a"), film(2, "b")];
        let ranked = top_liked(films, |_| 0, Some(0)).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_negative_count_rejected() {
        let err = top_liked(vec![film(1, "a")], |_| 0, Some(-1)).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }
}
