pub mod auth_service;
pub mod movie_service;
