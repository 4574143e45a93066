pub mod balance;

pub use balance::{Balance, BalancePreference};
