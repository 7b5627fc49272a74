mod media_repository;
#[cfg(test)]
mod memory;

pub use media_repository::{MediaRepository, PgMediaRepository};
#[cfg(test)]
pub use memory::InMemoryMediaRepository;
