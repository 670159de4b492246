use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered user of the catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Assigned by the store on creation; immutable afterwards
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    pub login: String,
    /// Display name; falls back to the login when blank
    #[serde(default)]
    pub name: String,
    pub birthday: NaiveDate,
}

impl User {
    /// Value equality over every field except the assigned identifier.
    /// Used for duplicate detection on add.
    pub fn same_record(&self, other: &User) -> bool {
        self.email == other.email
            && self.login == other.login
            && self.name == other.name
            && self.birthday == other.birthday
    }
}
