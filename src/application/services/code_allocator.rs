//! Short code allocation.
//!
//! Allocation is two-phase: the allocator checks that a code is free, and the
//! caller writes the link afterwards. Nothing is locked in between, so the
//! store's unique constraint remains the final arbiter; a write that loses the
//! race surfaces as [`AllocationError::AliasConflict`].

use std::sync::Arc;

use serde_json::json;

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{
    AliasViolation, CodeGenerator, RandomCodeGenerator, validate_alias,
};

/// Upper bound on generate-and-check rounds for a single allocation.
pub const MAX_GENERATION_ATTEMPTS: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("invalid alias: {0}")]
    InvalidAlias(#[from] AliasViolation),

    #[error("alias `{0}` is already taken")]
    AliasConflict(String),

    #[error("no free short code found after {0} attempts")]
    Exhausted(usize),

    #[error(transparent)]
    Storage(#[from] AppError),
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::InvalidAlias(violation) => AppError::bad_request(
                "Invalid custom alias",
                json!({ "reason": violation.to_string() }),
            ),
            AllocationError::AliasConflict(code) => AppError::conflict(
                "Custom alias already exists",
                json!({ "short_code": code }),
            ),
            AllocationError::Exhausted(attempts) => AppError::internal(
                "Failed to generate unique short code",
                json!({ "attempts": attempts }),
            ),
            AllocationError::Storage(e) => e,
        }
    }
}

/// Picks a short code that is free at the time of the check.
pub struct CodeAllocator<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    generator: Arc<dyn CodeGenerator>,
    max_attempts: usize,
}

impl<L: LinkRepository + ?Sized> CodeAllocator<L> {
    pub fn new(repository: Arc<L>) -> Self {
        Self::with_generator(repository, Arc::new(RandomCodeGenerator))
    }

    pub fn with_generator(repository: Arc<L>, generator: Arc<dyn CodeGenerator>) -> Self {
        Self {
            repository,
            generator,
            max_attempts: MAX_GENERATION_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Allocates a code for a new link.
    ///
    /// See [`Self::allocate_for`].
    pub async fn allocate(&self, requested_alias: Option<&str>) -> Result<String, AllocationError> {
        self.allocate_for(requested_alias, None).await
    }

    /// Allocates a code, treating `current_code` as already owned by the caller.
    ///
    /// - With an alias: the alias is validated before any lookup, then
    ///   checked for existence. An alias equal to `current_code` is returned
    ///   as is without touching the store.
    /// - Without an alias: random codes are drawn until one is free, at most
    ///   `max_attempts` times.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::InvalidAlias`] if the alias breaks the format rules
    /// - [`AllocationError::AliasConflict`] if the alias is taken
    /// - [`AllocationError::Exhausted`] if every generated candidate collided
    /// - [`AllocationError::Storage`] if the existence check fails
    pub async fn allocate_for(
        &self,
        requested_alias: Option<&str>,
        current_code: Option<&str>,
    ) -> Result<String, AllocationError> {
        match requested_alias {
            Some(alias) => self.claim_alias(alias, current_code).await,
            None => self.generate_unique().await,
        }
    }

    async fn claim_alias(
        &self,
        alias: &str,
        current_code: Option<&str>,
    ) -> Result<String, AllocationError> {
        validate_alias(alias)?;

        if current_code == Some(alias) {
            return Ok(alias.to_string());
        }

        if self.repository.exists_by_code(alias).await? {
            return Err(AllocationError::AliasConflict(alias.to_string()));
        }

        Ok(alias.to_string())
    }

    async fn generate_unique(&self) -> Result<String, AllocationError> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generator.generate()?;

            if !self.repository.exists_by_code(&candidate).await? {
                return Ok(candidate);
            }

            tracing::debug!(attempt, code = %candidate, "Generated short code collided");
        }

        tracing::warn!(
            attempts = self.max_attempts,
            "Short code generation exhausted"
        );
        Err(AllocationError::Exhausted(self.max_attempts))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::SequenceGenerator;
    use super::*;
    use crate::domain::repositories::MockLinkRepository;

    fn allocator(repo: MockLinkRepository, codes: &[&str]) -> CodeAllocator<MockLinkRepository> {
        CodeAllocator::with_generator(Arc::new(repo), Arc::new(SequenceGenerator::new(codes)))
    }

    #[tokio::test]
    async fn test_free_alias_is_returned() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code()
            .withf(|code| code == "my-link")
            .times(1)
            .returning(|_| Ok(false));

        let result = allocator(repo, &[]).allocate(Some("my-link")).await;

        assert_eq!(result.unwrap(), "my-link");
    }

    #[tokio::test]
    async fn test_taken_alias_conflicts() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code()
            .times(1)
            .returning(|_| Ok(true));

        let result = allocator(repo, &[]).allocate(Some("taken")).await;

        assert!(matches!(result, Err(AllocationError::AliasConflict(code)) if code == "taken"));
    }

    #[tokio::test]
    async fn test_invalid_alias_never_touches_store() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code().times(0);

        let alloc = allocator(repo, &[]);

        assert!(matches!(
            alloc.allocate(Some("ab")).await,
            Err(AllocationError::InvalidAlias(AliasViolation::Length))
        ));
        assert!(matches!(
            alloc.allocate(Some("bad alias!")).await,
            Err(AllocationError::InvalidAlias(AliasViolation::Charset))
        ));
    }

    #[tokio::test]
    async fn test_own_current_code_is_not_a_conflict() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code().times(0);

        let result = allocator(repo, &[])
            .allocate_for(Some("mine"), Some("mine"))
            .await;

        assert_eq!(result.unwrap(), "mine");
    }

    #[tokio::test]
    async fn test_other_code_during_update_is_checked() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code()
            .withf(|code| code == "other")
            .times(1)
            .returning(|_| Ok(true));

        let result = allocator(repo, &[])
            .allocate_for(Some("other"), Some("mine"))
            .await;

        assert!(matches!(result, Err(AllocationError::AliasConflict(_))));
    }

    #[tokio::test]
    async fn test_generated_code_retries_on_collision() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code()
            .times(3)
            .returning(|code| Ok(code != "free0003"));

        let result = allocator(repo, &["used0001", "used0002", "free0003"])
            .allocate(None)
            .await;

        assert_eq!(result.unwrap(), "free0003");
    }

    #[tokio::test]
    async fn test_generation_exhaustion_is_distinct() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code()
            .times(4)
            .returning(|_| Ok(true));

        let result = allocator(repo, &["always00"])
            .with_max_attempts(4)
            .allocate(None)
            .await;

        assert!(matches!(result, Err(AllocationError::Exhausted(4))));
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let result = allocator(repo, &[]).allocate(Some("valid")).await;

        assert!(matches!(
            result,
            Err(AllocationError::Storage(AppError::Internal { .. }))
        ));
    }

    #[tokio::test]
    async fn test_random_generator_produces_eight_chars() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code().times(1).returning(|_| Ok(false));

        let code = CodeAllocator::new(Arc::new(repo)).allocate(None).await.unwrap();

        assert_eq!(code.len(), 8);
    }

    #[test]
    fn test_error_mapping() {
        let err: AppError = AllocationError::InvalidAlias(AliasViolation::Length).into();
        assert!(matches!(err, AppError::Validation { .. }));

        let err: AppError = AllocationError::AliasConflict("x".into()).into();
        assert!(matches!(err, AppError::Conflict { .. }));

        let err: AppError = AllocationError::Exhausted(16).into();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
