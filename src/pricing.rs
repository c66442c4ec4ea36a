//! Price normalization
//!
//! Turns a [`PricedItem`] into export entries and owns the store rounding
//! rule. Every consumer that needs a shelf price goes through
//! [`round_price`].

use crate::{ExportEntry, Finish, PricedItem, Rarity};
use rust_decimal::{Decimal, RoundingStrategy};

/// Prices below this are rounded to the nearest half unit, above to whole units
const TIER_BOUNDARY: Decimal = Decimal::from_parts(1000, 0, 0, false, 2);

/// Half-unit rounding step
const HALF_STEP: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

const MIN_RARE: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
const MIN_UNCOMMON: Decimal = Decimal::from_parts(25, 0, 0, false, 2);
const MIN_DEFAULT: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Finishes that produce export entries, in output order
const EXPORTED_FINISHES: [Finish; 2] = [Finish::Normal, Finish::Foil];

/// Price floor for a rarity
pub fn minimum_price(rarity: Option<&Rarity>) -> Decimal {
    match rarity {
        Some(Rarity::Rare) | Some(Rarity::Mythic) => MIN_RARE,
        Some(Rarity::Uncommon) => MIN_UNCOMMON,
        _ => MIN_DEFAULT,
    }
}

/// Round a quoted price to a shelf price
///
/// The quote is first raised to the rarity floor. Below 10.00 it is rounded
/// half-up to the nearest 0.50 and raised to the floor again; from 10.00 up it
/// is rounded half-up to a whole unit.
pub fn round_price(price: Decimal, rarity: Option<&Rarity>) -> Decimal {
    let minimum = minimum_price(rarity);
    let candidate = price.max(minimum);

    if candidate < TIER_BOUNDARY {
        let steps = (candidate / HALF_STEP)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        (steps * HALF_STEP).max(minimum)
    } else {
        candidate.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Flatten one item into export entries
///
/// Emits one entry per quoted finish (normal, then foil). Items with neither
/// quote yield nothing. The etched quote stays on the item.
pub fn flatten(item: &PricedItem) -> Vec<ExportEntry> {
    let description = match item.variant_label() {
        Some(variant) => format!("{} ({variant})", item.name),
        None => item.name.clone(),
    };

    EXPORTED_FINISHES
        .iter()
        .filter_map(|&finish| {
            let quote = item.prices.get(finish)?;
            Some(ExportEntry {
                code: composite_code(&item.set_code, &item.collector_number, finish),
                description: description.clone(),
                price: round_price(quote, item.rarity.as_ref()),
                rarity: item.rarity.clone(),
                artist: item.artist.clone(),
                finish,
            })
        })
        .collect()
}

/// Flatten a batch of items preserving item order
pub fn flatten_all<'a, I>(items: I) -> Vec<ExportEntry>
where
    I: IntoIterator<Item = &'a PricedItem>,
{
    items.into_iter().flat_map(flatten).collect()
}

/// `"{SET} {number}"` with the finish marker appended
pub fn composite_code(set_code: &str, collector_number: &str, finish: Finish) -> String {
    format!(
        "{} {}{}",
        set_code.to_uppercase(),
        collector_number,
        finish.code_marker()
    )
}
