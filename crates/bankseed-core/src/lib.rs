//! Core contracts for bankseed.
//!
//! This crate defines the row identifiers, domain enums and insertable records
//! shared by the storage sinks, the generators and the CLI.

pub mod error;
pub mod ids;
pub mod records;
pub mod types;

pub use error::{Error, Result};
pub use ids::{AccountId, LoanId, TransactionId, UserId};
pub use records::{NewAccount, NewLoan, NewTransaction, NewUser};
pub use types::{AccountType, LoanStatus, LoanType, Role, TransactionType, UserStatus};

/// Email of the pre-existing administrator that bulk deletion never removes.
pub const RESERVED_ADMIN_EMAIL: &str = "admin@jababanking.com";

/// Display name used when the reserved administrator is seeded.
pub const RESERVED_ADMIN_NAME: &str = "Admin User";

/// Password assigned to the reserved administrator when it is seeded.
pub const RESERVED_ADMIN_PASSWORD: &str = "admin123";

/// Password shared by every synthesized user.
pub const TEST_USER_PASSWORD: &str = "password123";
