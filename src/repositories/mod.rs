#[cfg(test)]
pub mod fake_places_repo;
pub mod google_places_repo;
pub mod places_provider;
