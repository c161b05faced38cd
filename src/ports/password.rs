/// One-way password hashing
#[mockall::automock]
pub trait PasswordPort: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, Error>;
    /// Check a plaintext password against a stored hash
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stored hash could not be parsed
    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
