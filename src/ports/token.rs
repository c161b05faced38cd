use crate::domain::MemberId;

/// Issues and verifies the bearer tokens handed out on login
#[mockall::automock]
pub trait TokenPort: Send + Sync {
    fn issue(&self, member_id: MemberId) -> Result<String, Error>;
    /// Resolve a bearer token back to the member it was issued for
    fn verify(&self, token: &str) -> Result<MemberId, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
