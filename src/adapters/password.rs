//! Password hashing with Argon2

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::ports::password::{Error, PasswordPort};

/// Argon2id with the crate's default parameters
#[derive(Clone, Copy, Debug, Default)]
pub struct Argon2Password;

impl PasswordPort for Argon2Password {
    fn hash(&self, password: &str) -> Result<String, Error> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| Error::Adapter(Box::new(err)))
    }

    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, Error> {
        let parsed =
            PasswordHash::new(password_hash).map_err(|err| Error::MalformedHash(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[test]
    fn test_hash_verify() {
        let hasher = Argon2Password;
        let hash = hasher.hash("asdfasdf@1").unwrap();

        assert_that!(hash.as_str()).is_not_equal_to("asdfasdf@1");
        assert_that!(hasher.verify("asdfasdf@1", &hash)).is_ok().is_true();
        assert_that!(hasher.verify("asdfasdf@2", &hash)).is_ok().is_false();
    }

    #[test]
    fn test_salted() {
        let hasher = Argon2Password;
        let first = hasher.hash("asdfasdf@1").unwrap();
        let second = hasher.hash("asdfasdf@1").unwrap();
        assert_that!(first).is_not_equal_to(second);
    }

    #[test]
    fn test_malformed_hash() {
        let hasher = Argon2Password;
        assert_that!(hasher.verify("asdfasdf@1", "not a hash"))
            .is_err()
            .matches(|err| matches!(err, Error::MalformedHash(_)));
    }
}
