//! Server Module
//!
//! TCP transport for the cache: one task per connection, each speaking the
//! line protocol in [`crate::protocol`] against a shared [`KvStore`].
//!
//! [`KvStore`]: crate::cache::KvStore

pub mod connection;
pub mod handlers;
pub mod listener;

pub use connection::handle_connection;
pub use handlers::AppState;
pub use listener::serve;
