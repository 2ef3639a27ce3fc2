//! External service integrations.

pub mod quote_client {
    pub use crate::quote_client::*;
}
