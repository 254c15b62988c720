//! The cookie hook.
//!
//! Warden reads exactly one cookie (the remember-me token) and may remove
//! it. [`CookieJar`] is the narrow view of the app's cookie handling that
//! makes this possible without depending on any HTTP framework.

use std::collections::HashMap;

/// Read and remove access to the visitor's cookies.
///
/// Implement this over your framework's request/response cookie types.
/// `remove` must cause the cookie to be cleared on the client when the
/// response is sent (typically an expired `Set-Cookie`).
pub trait CookieJar {
    /// Returns the value of cookie `name` exactly as it arrived on the
    /// wire, if the visitor sent it.
    ///
    /// The value must still be percent-encoded. Codecs decode it
    /// themselves, so a jar that hands out already-decoded values makes
    /// any secret containing a literal `%XX` decode twice and fail to
    /// match.
    fn get(&self, name: &str) -> Option<&str>;

    /// Clears cookie `name`.
    fn remove(&mut self, name: &str);
}

/// A plain name → value map. Removing a cookie drops the entry.
impl CookieJar for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<&str> {
        HashMap::get(self, name).map(String::as_str)
    }

    fn remove(&mut self, name: &str) {
        HashMap::remove(self, name);
    }
}
