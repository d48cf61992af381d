use restaurant_accounts::credentials::{CredentialError, hash_password, verify_password};

#[test]
fn test_hash_is_not_plaintext_and_verifies() {
    let hash = hash_password("secret123").unwrap();
    assert_ne!(hash, "secret123");
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "secret123").unwrap());
}

#[test]
fn test_same_password_hashes_differently() {
    let first = hash_password("secret123").unwrap();
    let second = hash_password("secret123").unwrap();
    assert_ne!(first, second);
    assert!(verify_password(&second, "secret123").unwrap());
}

#[test]
fn test_mismatch_is_false_not_error() {
    let hash = hash_password("secret123").unwrap();
    assert!(!verify_password(&hash, "secret124").unwrap());
    assert!(!verify_password(&hash, "").unwrap());
}

#[test]
fn test_malformed_hash_is_an_error() {
    let result = verify_password("not-a-phc-string", "secret123");
    assert!(matches!(result, Err(CredentialError::MalformedHash(_))));
}
