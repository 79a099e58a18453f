//! # plantbio_core
//!
//! Client-side authentication for the Plantbio teaching portal: the session
//! store, the route guard and the role-filtered route table.

pub mod auth;
pub mod models;
pub mod routing;
pub mod session;
pub mod storage;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
