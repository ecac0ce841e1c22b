pub mod account;

pub use account::{AccountRequest, CommitId, ConfigFile, ModelError, ACCOUNT_NAME_MAX_LEN};
