//! Device aliases.
//!
//! Maps device addresses to human-readable names so records are easier to
//! tell apart in output.

use crate::mac_address::MacAddress;
use std::collections::HashMap;

/// Device address (normalized, upper case) to display name.
pub type AliasMap = HashMap<String, String>;

/// A parsed alias mapping a device address to a human-readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub address: MacAddress,
    pub name: String,
}

/// Parse an alias from a string in the format "MAC=NAME".
///
/// # Example
/// ```
/// use ruuvitag_decoder::alias::parse_alias;
///
/// let alias = parse_alias("aa:bb:cc:dd:ee:ff=Kitchen").unwrap();
/// assert_eq!(alias.address.to_string(), "AA:BB:CC:DD:EE:FF");
/// assert_eq!(alias.name, "Kitchen");
/// ```
pub fn parse_alias(src: &str) -> Result<Alias, String> {
    let (address, name) = src
        .split_once('=')
        .ok_or("invalid alias: expected format MAC=NAME")?;
    let address = address.parse::<MacAddress>().map_err(|e| e.to_string())?;

    Ok(Alias {
        address,
        name: name.to_string(),
    })
}

pub fn to_map(aliases: &[Alias]) -> AliasMap {
    aliases
        .iter()
        .map(|a| (a.address.to_string(), a.name.clone()))
        .collect()
}

/// Name to show for device `id`: its alias, or the id itself.
pub fn resolve_name<'a>(id: &'a str, aliases: &'a AliasMap) -> &'a str {
    aliases.get(id).map(String::as_str).unwrap_or(id)
}
