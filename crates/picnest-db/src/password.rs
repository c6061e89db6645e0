use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::error::{Result, StoreError};

/// Hash with Argon2id defaults. The result is what `NewUser::password`
/// expects.
pub fn hash_password(plain: &str) -> Result<String> {
    hash_password_with(&Argon2::default(), plain)
}

pub fn hash_password_with(argon2: &Argon2<'_>, plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| StoreError::validation("user.password", e.to_string()))?;
    Ok(hash.to_string())
}

/// Parameters are read from the stored hash, so this verifies hashes made
/// by either function above.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}
