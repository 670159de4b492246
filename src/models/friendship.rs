use serde::{Deserialize, Serialize};

/// Status of a directed friendship edge.
///
/// An edge starts out `Pending` and is promoted to `Confirmed` together with
/// its reverse edge once the target user sends a request back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum FriendshipStatus {
    Pending,
    Confirmed,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "PENDING",
            FriendshipStatus::Confirmed => "CONFIRMED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(FriendshipStatus::Pending),
            "CONFIRMED" => Some(FriendshipStatus::Confirmed),
            _ => None,
        }
    }
}

/// A directed relationship record: owner → target with a status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipEntry {
    pub user_id: i64,
    pub status: FriendshipStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [FriendshipStatus::Pending, FriendshipStatus::Confirmed] {
            assert_eq!(FriendshipStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(FriendshipStatus::from_str("REJECTED"), None);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&FriendshipStatus::Confirmed).unwrap();
        assert_eq!(json, "\"CONFIRMED\"");
    }
}
