pub mod command;
pub mod save_file;
pub mod status_text;

/// Format a token as `i:j#serial`, the label used everywhere a token is
/// listed.
pub fn format_token(token: &game_core::Token) -> String {
    format!("{}:{}#{}", token.i, token.j, token.serial)
}

/// Format a world hash as `0x` followed by exactly 16 lowercase hex digits.
pub fn format_snapshot_hash(hash: u64) -> String {
    format!("0x{hash:016x}")
}
