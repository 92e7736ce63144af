//! Startup seeding orchestration.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{PasswordHasher, UserRepository};
use crate::domain::{
    ExampleDataSeedOutcome, ExampleDataSeeder, ExampleDataSeedingError, SeedingResult,
};

/// Apply the example users on startup when `enabled`.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use user_service::example_data::seed_example_data_on_startup;
/// use user_service::outbound::persistence::MemoryUserRepository;
/// use user_service::outbound::security::BcryptPasswordHasher;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repository = Arc::new(MemoryUserRepository::new(Arc::new(mockable::DefaultClock)));
/// let hasher = Arc::new(BcryptPasswordHasher::new(4));
/// let outcome = seed_example_data_on_startup(false, repository, hasher).await?;
/// assert!(outcome.is_none());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`ExampleDataSeedingError`] when hashing or persistence fails.
pub async fn seed_example_data_on_startup(
    enabled: bool,
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
) -> Result<Option<ExampleDataSeedOutcome>, ExampleDataSeedingError> {
    if !enabled {
        info!(reason = "disabled", "example data seeding skipped");
        return Ok(None);
    }

    let outcome = ExampleDataSeeder::new(repository, hasher).seed().await?;
    match outcome.result {
        SeedingResult::Applied => {
            info!(user_count = outcome.user_count, "example users inserted");
        }
        SeedingResult::AlreadySeeded => {
            info!("users collection not empty; example data skipped");
        }
    }
    Ok(Some(outcome))
}
