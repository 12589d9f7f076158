use chrono::NaiveDateTime;
use rand::Rng;
use sha2::{Digest, Sha256};

use bankseed_core::{
    NewUser, RESERVED_ADMIN_EMAIL, RESERVED_ADMIN_NAME, RESERVED_ADMIN_PASSWORD, Role, UserStatus,
};

use crate::random::pick;

const SALT_BYTES: usize = 16;

pub const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Emma", "Noah", "Olivia", "Liam", "Ava", "Sophia", "Mason", "Isabella",
    "Jacob", "Mia", "Muhammad", "Charlotte", "Ethan", "Amelia", "Joshua", "Harper", "Oliver",
    "Evelyn",
];

pub const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Jones", "Brown", "Davis", "Miller", "Wilson", "Moore",
    "Taylor", "Anderson", "Thomas", "Jackson", "White", "Harris", "Martin", "Thompson", "Garcia",
    "Martinez", "Robinson", "Clark", "Rodriguez", "Lewis", "Lee", "Walker", "Hall", "Allen",
    "Young", "Hernandez", "King", "Wright", "Lopez", "Hill", "Scott", "Green", "Adams", "Baker",
    "Gonzalez", "Nelson", "Carter",
];

pub const EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "aol.com",
    "icloud.com",
];

/// Hex-encoded random salt.
pub fn make_salt<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0_u8; SALT_BYTES];
    rng.fill(&mut bytes[..]);
    hex::encode(bytes)
}

/// SHA-256 of `secret` followed by `salt`, hex-encoded.
///
/// The consuming application verifies logins with the same scheme, so the
/// output must stay stable for identical inputs.
pub fn hash_credential(secret: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_credential(secret: &str, stored_hash: &str, salt: &str) -> bool {
    hash_credential(secret, salt).eq_ignore_ascii_case(stored_hash)
}

/// Uniform `(first, last)` pair from the name pools.
pub fn make_name<R: Rng + ?Sized>(rng: &mut R) -> (&'static str, &'static str) {
    let first = pick(rng, FIRST_NAMES).copied().unwrap_or("James");
    let last = pick(rng, LAST_NAMES).copied().unwrap_or("Smith");
    (first, last)
}

/// `first.last<n>@domain` with `n` in `[1, 999]`. Collisions stay possible.
pub fn make_email<R: Rng + ?Sized>(rng: &mut R, first: &str, last: &str) -> String {
    let suffix = rng.random_range(1..=999);
    let domain = pick(rng, EMAIL_DOMAINS).copied().unwrap_or("gmail.com");
    format!(
        "{}.{}{suffix}@{domain}",
        first.to_lowercase(),
        last.to_lowercase()
    )
}

/// Row for the pre-existing administrator, used when bootstrapping a store.
pub fn reserved_admin<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime) -> NewUser {
    let salt = make_salt(rng);
    NewUser {
        name: RESERVED_ADMIN_NAME.to_string(),
        email: RESERVED_ADMIN_EMAIL.to_string(),
        password_hash: hash_credential(RESERVED_ADMIN_PASSWORD, &salt),
        salt,
        role: Role::Admin,
        status: UserStatus::Active,
        created_at: now,
    }
}
