//! External services and on-disk caches.

pub mod cache;
pub mod cep;
