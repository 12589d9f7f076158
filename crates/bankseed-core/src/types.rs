use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares a closed enum together with the exact spelling the store uses.
macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

stored_enum!(
    /// Role of a user in the banking application.
    Role {
        Admin => "admin",
        Employee => "employee",
        Customer => "customer",
    }
);

stored_enum!(
    /// Lifecycle status of a user.
    UserStatus {
        Active => "active",
        Inactive => "inactive",
        Locked => "locked",
    }
);

stored_enum!(
    AccountType {
        Checking => "checking",
        Savings => "savings",
    }
);

stored_enum!(
    /// Direction of money movement; decides which account references are set.
    TransactionType {
        Deposit => "deposit",
        Withdrawal => "withdrawal",
        Transfer => "transfer",
    }
);

stored_enum!(
    LoanType {
        Personal => "Personal",
        Home => "Home",
        Auto => "Auto",
        Education => "Education",
        Business => "Business",
    }
);

stored_enum!(
    LoanStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

impl LoanType {
    /// Half-open `[min, max)` range requested amounts are drawn from.
    pub fn amount_range(self) -> (f64, f64) {
        match self {
            LoanType::Personal => (1_000.0, 25_000.0),
            LoanType::Home => (50_000.0, 500_000.0),
            LoanType::Auto => (5_000.0, 50_000.0),
            LoanType::Education => (5_000.0, 100_000.0),
            LoanType::Business => (10_000.0, 250_000.0),
        }
    }
}

impl TransactionType {
    /// Whether the transaction debits an account inside the system.
    pub fn has_source(self) -> bool {
        matches!(self, TransactionType::Withdrawal | TransactionType::Transfer)
    }

    /// Whether the transaction credits an account inside the system.
    pub fn has_destination(self) -> bool {
        matches!(self, TransactionType::Deposit | TransactionType::Transfer)
    }
}
