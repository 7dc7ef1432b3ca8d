//! Item text parsing and price lookup
//!
//! The game copies items to the clipboard as plain text sections separated by
//! `--------` lines. The header section names the rarity, then the item name
//! and, for most rarities, the base type.

use std::sync::Arc;

use pricelens_core::{PortError, PriceLookup, PriceQuote};
use tracing::trace;

use crate::ninja::NinjaDatabase;

const RARITY_PREFIX: &str = "Rarity: ";
const SECTION_SEPARATOR: &str = "--------";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    pub rarity: String,
    pub name: String,
    pub base_type: Option<String>,
}

/// Parse the header of copied item text. `None` when the text is not item
/// data.
pub fn parse_item(text: &str) -> Option<ParsedItem> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .skip_while(|line| !line.starts_with(RARITY_PREFIX));

    let rarity = lines.next()?.strip_prefix(RARITY_PREFIX)?.trim().to_string();
    let mut header = lines.take_while(|line| *line != SECTION_SEPARATOR).filter(|l| !l.is_empty());

    let name = header.next()?;
    let name = name.strip_prefix("Superior ").unwrap_or(name).to_string();
    let base_type = header.next().map(str::to_string);

    Some(ParsedItem {
        rarity,
        name,
        base_type,
    })
}

/// Prices items by exact name, falling back to the base type
pub struct NameLookup {
    prices: Arc<NinjaDatabase>,
}

impl NameLookup {
    pub fn new(prices: Arc<NinjaDatabase>) -> Self {
        Self { prices }
    }
}

impl PriceLookup for NameLookup {
    fn process(&self, text: &str) -> Result<Option<PriceQuote>, PortError> {
        let Some(item) = parse_item(text) else {
            trace!("Clipboard text is not item data");
            return Ok(None);
        };

        let candidates = std::iter::once(&item.name).chain(item.base_type.as_ref());
        for name in candidates {
            if let Some((price, divine_rate)) = self.prices.price_of(name) {
                return Ok(Some(PriceQuote {
                    item_name: name.clone(),
                    chaos_value: price.chaos_value,
                    divine_rate,
                    listings: price.listings,
                }));
            }
        }

        trace!(name = %item.name, rarity = %item.rarity, "No price for item");
        Ok(None)
    }
}
