mod ids;
mod meditation;
mod user;

pub use ids::{CategoryId, MeditationId, UserId};
pub use meditation::{format_length, parse_length, Category, Meditation};
pub use user::User;
