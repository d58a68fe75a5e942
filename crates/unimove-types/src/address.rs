//! Address normalization shared by every chain backend.
//!
//! Sui and IOTA both use 32-byte Move addresses and accept the same textual
//! forms:
//! - Short form: "0x2"
//! - Full form: "0x0000000000000000000000000000000000000000000000000000000000000002"
//! - Without prefix: "2"
//!
//! Struct tags keep the short form (what `AccountAddress::to_hex_literal`
//! prints); RPC payloads and derived addresses use the full form.

use move_core_types::account_address::AccountAddress;

/// Length in bytes of a Move address.
pub const ADDRESS_LENGTH: usize = AccountAddress::LENGTH;

fn strip_hex_prefix(addr: &str) -> &str {
    addr.strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr)
}

/// Normalize an address to lowercase, 0x-prefixed, 64 hex characters.
///
/// Does not validate the digits; use [`normalize_address_checked`] for
/// untrusted input.
///
/// ```
/// use unimove_types::address::normalize_address;
///
/// assert_eq!(
///     normalize_address("0x2"),
///     "0x0000000000000000000000000000000000000000000000000000000000000002"
/// );
/// ```
pub fn normalize_address(addr: &str) -> String {
    let hex = strip_hex_prefix(addr.trim()).to_lowercase();
    if hex.len() < 64 {
        format!("0x{:0>64}", hex)
    } else {
        format!("0x{}", &hex[hex.len() - 64..])
    }
}

/// Normalize an address, returning `None` unless it is valid hex of at most
/// 32 bytes.
pub fn normalize_address_checked(addr: &str) -> Option<String> {
    parse_address(addr).map(|a| address_to_string(&a))
}

/// Minimal-digit form ("0x2"), used for struct tags and display.
///
/// ```
/// use unimove_types::address::normalize_address_short;
///
/// assert_eq!(normalize_address_short("0x000abc"), "0xabc");
/// assert_eq!(normalize_address_short("0x0"), "0x0");
/// ```
pub fn normalize_address_short(addr: &str) -> String {
    let hex = strip_hex_prefix(addr.trim()).to_lowercase();
    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{}", trimmed)
    }
}

/// Whether `addr` is a syntactically valid address in any accepted form.
pub fn is_valid_address(addr: &str) -> bool {
    parse_address(addr).is_some()
}

/// Parse an address in short, full or unprefixed form.
pub fn parse_address(addr: &str) -> Option<AccountAddress> {
    let hex = strip_hex_prefix(addr.trim());
    if hex.is_empty() || hex.len() > 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    AccountAddress::from_hex_literal(&format!("0x{}", hex)).ok()
}

/// Full-form string of an address.
pub fn address_to_string(addr: &AccountAddress) -> String {
    format!("0x{}", hex::encode(addr.as_ref()))
}

/// Build an address from a 32-byte digest.
pub fn address_from_digest(digest: [u8; ADDRESS_LENGTH]) -> AccountAddress {
    AccountAddress::new(digest)
}
