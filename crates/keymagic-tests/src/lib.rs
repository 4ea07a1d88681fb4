//! Integration test infrastructure for keymagic.
//!
//! Tests run the real HTTP client against a [`wiremock`] server standing in
//! for an EDD Software Licensing store, with settings kept in a temporary
//! [`keymagic_settings::FileStore`].
//!
//! # Usage
//!
//! ```ignore
//! use keymagic_tests::{EddServer, TestSite, fixtures};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let server = EddServer::start().await;
//!     server.on("check_license", fixtures::check("valid")).await;
//!     let site = TestSite::new(&server).await.unwrap();
//! }
//! ```

pub mod fixtures;
pub mod helpers;

pub use helpers::*;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,keymagic_licensing=debug")),
        )
        .with_test_writer()
        .try_init();
}
