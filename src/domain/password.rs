use rand::{
    seq::{IndexedRandom, SliceRandom},
    Rng,
};

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*";

/// Randomly generated credential issued during password recovery
///
/// Always `LENGTH` characters long, with at least one lowercase letter, one uppercase letter,
/// one digit and one symbol, and no whitespace.
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryPassword(String);

impl TemporaryPassword {
    pub const LENGTH: usize = 10;

    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let classes = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS];

        // One of each class first, the rest from the full alphabet
        let mut chars: Vec<u8> = classes
            .iter()
            .filter_map(|class| class.choose(rng).copied())
            .collect();
        let alphabet: Vec<u8> = classes.concat();
        let missing = Self::LENGTH - chars.len();
        chars.extend((0..missing).filter_map(|_| alphabet.choose(rng).copied()));
        chars.shuffle(rng);

        Self(chars.into_iter().map(char::from).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for TemporaryPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TemporaryPassword([REDACTED])")
    }
}

#[cfg(test)]
pub(crate) fn satisfies_policy(password: &str) -> bool {
    password.chars().count() == TemporaryPassword::LENGTH
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric() && c != '_')
        && !password.chars().any(char::is_whitespace)
}
