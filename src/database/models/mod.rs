pub mod genre;
pub mod movie;
pub mod user;

pub use genre::Genre;
pub use movie::{Movie, MoviePage, MovieWithGenres, Pagination};
pub use user::{PublicUser, User};
