pub const ACCESS_DENIED_REPLY: &str = "⛔️ You don't have access.";

/// Single-identity gate applied before every handler. An unset authorized id
/// denies everyone.
pub fn is_authorized(authorized_user: Option<u64>, sender: u64) -> bool {
    authorized_user == Some(sender)
}
