use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id with the server pepper as the keyed secret. An empty pepper gives
/// the stock parameters.
fn argon2(pepper: &str) -> anyhow::Result<Argon2<'_>> {
    if pepper.is_empty() {
        return Ok(Argon2::default());
    }
    Argon2::new_with_secret(
        pepper.as_bytes(),
        Algorithm::Argon2id,
        Version::V0x13,
        Params::default(),
    )
    .map_err(|e| {
        error!(error = %e, "argon2 init error");
        anyhow::anyhow!(e.to_string())
    })
}

pub fn hash_password(plain: &str, pepper: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2(pepper)?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str, pepper: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(argon2(pepper)?
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password, "").expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash, "").expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password, "").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash, "").expect("verify should not error"));
    }

    #[test]
    fn pepper_is_required_to_verify() {
        let hash = hash_password("s3cret", "pepper").expect("hashing should succeed");
        assert!(verify_password("s3cret", &hash, "pepper").expect("verify"));
        assert!(!verify_password("s3cret", &hash, "").expect("verify"));
        assert!(!verify_password("s3cret", &hash, "other").expect("verify"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("same", "").expect("hash a");
        let b = hash_password("same", "").expect("hash b");
        assert_ne!(a, b);
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash", "").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
