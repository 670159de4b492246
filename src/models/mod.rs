pub mod film;
pub mod friendship;
pub mod user;

pub use film::{Film, Genre, MpaRating};
pub use friendship::{FriendshipEntry, FriendshipStatus};
pub use user::User;
