use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{AccountId, UserId};
use crate::types::{AccountType, LoanStatus, LoanType, Role, TransactionType, UserStatus};

/// User row ready to be inserted; the sink assigns the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub user_id: UserId,
    /// 9-digit numeric string, unique across accounts.
    pub account_number: String,
    pub account_type: AccountType,
    pub balance: f64,
    pub created_at: NaiveDateTime,
}

/// Transaction row. A `None` endpoint is money entering or leaving the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub from_account: Option<AccountId>,
    pub to_account: Option<AccountId>,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub description: String,
    pub timestamp: NaiveDateTime,
}

impl NewTransaction {
    /// Checks that the endpoints match the transaction type.
    pub fn validate(&self) -> Result<()> {
        let ty = self.transaction_type;
        if self.from_account.is_some() != ty.has_source() {
            return Err(Error::InvalidRecord(format!(
                "{ty} transaction has unexpected source {:?}",
                self.from_account
            )));
        }
        if self.to_account.is_some() != ty.has_destination() {
            return Err(Error::InvalidRecord(format!(
                "{ty} transaction has unexpected destination {:?}",
                self.to_account
            )));
        }
        if let (Some(from), Some(to)) = (self.from_account, self.to_account)
            && from == to
        {
            return Err(Error::InvalidRecord(format!(
                "transfer from account {from} to itself"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub user_id: UserId,
    pub amount: f64,
    pub loan_type: LoanType,
    pub requested_at: NaiveDateTime,
    pub status: LoanStatus,
    /// Present only for rejected loans.
    pub admin_comment: Option<String>,
}
