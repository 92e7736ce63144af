//! Cache-control policies shared by HTTP handlers.

/// Responses computed per request that must never be reused.
pub const NO_STORE: &str = "no-store";

/// Header tuple for [`NO_STORE`] responses.
pub const fn no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", NO_STORE)
}
