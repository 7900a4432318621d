use regex::Regex;
use std::sync::OnceLock;

/// `<number> <street>, <city>, <ST> [zip]`. Unicode classes are off so `\d`
/// and `\s` only match ASCII digits and whitespace.
const ADDRESS_PATTERN: &str =
    r"(?-u)^\d+\s+[A-Za-z0-9\s.-]+,\s*[A-Za-z\s]+,\s*[A-Z]{2}\s*(\d{5})?$";

fn address_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(ADDRESS_PATTERN).expect("address pattern compiles"))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address cannot be empty")]
    Empty,
    #[error("address must include street, city, and state")]
    MissingComponents,
    #[error("invalid address format")]
    Malformed,
}

/// Syntactic pre-filter run before any network call. It does not check that
/// the address exists.
pub fn validate_address(address: &str) -> Result<(), AddressError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(AddressError::Empty);
    }

    if address.split(',').count() < 3 {
        return Err(AddressError::MissingComponents);
    }

    if !address_regex().is_match(trimmed) {
        return Err(AddressError::Malformed);
    }

    Ok(())
}
