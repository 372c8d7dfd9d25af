//! Token ownership and single-flight refresh.

mod token;

pub use token::{InMemoryTokenStore, TokenExchanger, TokenManager, TokenPair, TokenStore};
