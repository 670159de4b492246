use chrono::{NaiveDate, Utc};

use crate::error::{AppError, AppResult};
use crate::models::{Film, User};

/// Earliest admissible film release date (the first public film screening).
pub const EARLIEST_RELEASE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1895, 12, 28) {
    Some(date) => date,
    None => panic!("invalid earliest release date"),
};

/// Maximum film description length in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 200;

/// Checks a user's fields, reporting the first violated rule.
pub fn user(user: &User) -> AppResult<()> {
    if user.login.is_empty() {
        return Err(AppError::Validation("login must not be empty".to_string()));
    }
    if user.login.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(
            "login must not contain whitespace".to_string(),
        ));
    }
    if user.email.is_empty() {
        return Err(AppError::Validation("email must not be empty".to_string()));
    }
    if !user.email.contains('@') {
        return Err(AppError::Validation("email format is invalid".to_string()));
    }
    if user.birthday > Utc::now().date_naive() {
        return Err(AppError::Validation(
            "birthday must not be in the future".to_string(),
        ));
    }

    Ok(())
}

/// Checks a film's fields, reporting the first violated rule.
pub fn film(film: &Film) -> AppResult<()> {
    if film.name.is_empty() {
        return Err(AppError::Validation(
            "film name must not be empty".to_string(),
        ));
    }
    if film.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(AppError::Validation(format!(
            "film description must not be longer than {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    if film.release_date < EARLIEST_RELEASE_DATE {
        return Err(AppError::Validation(format!(
            "release date must not be earlier than {EARLIEST_RELEASE_DATE}"
        )));
    }
    if film.duration < 0 {
        return Err(AppError::Validation(
            "film duration must not be negative".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;
    use crate::models::MpaRating;

    fn valid_user() -> User {
        User {
            id: None,
            email: "ada@example.com".to_string(),
            login: "ada".to_string(),
            name: "Ada".to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 3, 14).unwrap(),
        }
    }

    fn valid_film() -> Film {
        Film {
            id: None,
            name: "Arrival of a Train".to_string(),
            description: "Fifty seconds of railway".to_string(),
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
    fn test_valid_user_passes() {
        assert!(user(&valid_user()).is_ok());
    }

    #[test]
    fn test_empty_login_rejected() {
        let mut candidate = valid_user();
        candidate.login = String::new();
        assert!(matches!(user(&candidate), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_login_with_whitespace_rejected() {
        for login in ["ada lovelace", "ada\tlovelace", " ada"] {
            let mut candidate = valid_user();
            candidate.login = login.to_string();
            assert!(matches!(user(&candidate), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_email_without_at_rejected() {
        let mut candidate = valid_user();
        candidate.email = "ada.example.com".to_string();
        assert!(matches!(user(&candidate), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_future_birthday_rejected_today_accepted() {
        let today = Utc::now().date_naive();

        let mut candidate = valid_user();
        candidate.birthday = today;
        assert!(user(&candidate).is_ok());

        candidate.birthday = today.checked_add_days(Days::new(1)).unwrap();
        assert!(matches!(user(&candidate), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_valid_film_passes() {
        assert!(film(&valid_film()).is_ok());
    }

    #[test]
    fn test_empty_film_name_rejected() {
        let mut candidate = valid_film();
        candidate.name = String::new();
        assert!(matches!(film(&candidate), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_description_boundary() {
        let mut candidate = valid_film();
        candidate.description = "x".repeat(MAX_DESCRIPTION_LENGTH);
        assert!(film(&candidate).is_ok());

        candidate.description = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(matches!(film(&candidate), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_release_date_threshold() {
        let mut candidate = valid_film();

        candidate.release_date = EARLIEST_RELEASE_DATE.checked_sub_days(Days::new(1)).unwrap();
        assert!(matches!(film(&candidate), Err(AppError::Validation(_))));

        candidate.release_date = EARLIEST_RELEASE_DATE;
        assert!(film(&candidate).is_ok());

        candidate.release_date = EARLIEST_RELEASE_DATE.checked_add_days(Days::new(1)).unwrap();
        assert!(film(&candidate).is_ok());
    }

    #[test]
    fn test_negative_duration_rejected_zero_accepted() {
        let mut candidate = valid_film();
        candidate.duration = 0;
        assert!(film(&candidate).is_ok());

        candidate.duration = -1;
        assert!(matches!(film(&candidate), Err(AppError::Validation(_))));
    }
}
