//! Route handlers for the REST API.

pub mod avatars;
pub mod enrich;
pub mod guide;
pub mod health;
pub mod videos;
