//! Property checks for the store rounding rule over a sweep of quotes

use card_pricer::pricing::{flatten, minimum_price, round_price};
use card_pricer::{Finish, PriceQuotes, PricedItem, Rarity};
use rust_decimal::Decimal;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// 0.00 to 30.00 in cent steps
fn quote_sweep() -> impl Iterator<Item = Decimal> {
    (0..=3000).map(|cents| Decimal::new(cents, 2))
}

fn rarities() -> Vec<Option<Rarity>> {
    vec![
        None,
        Some(Rarity::Common),
        Some(Rarity::Uncommon),
        Some(Rarity::Rare),
        Some(Rarity::Mythic),
        Some(Rarity::Special),
        Some(Rarity::Bonus),
    ]
}

#[test]
fn test_rounded_prices_land_on_tier_steps() {
    let half = d("0.50");
    let ten = d("10");

    for rarity in rarities() {
        let floor = minimum_price(rarity.as_ref());
        for quote in quote_sweep() {
            let price = round_price(quote, rarity.as_ref());
            if price < ten {
                assert!(
                    (price % half).is_zero() || price == floor,
                    "{quote} -> {price} not on a 0.50 step ({rarity:?})"
                );
            } else {
                assert!(price.fract().is_zero(), "{quote} -> {price} not whole");
            }
        }
    }
}

#[test]
fn test_rounding_is_monotonic() {
    for rarity in rarities() {
        let mut previous = Decimal::ZERO;
        for quote in quote_sweep() {
            let price = round_price(quote, rarity.as_ref());
            assert!(
                price >= previous,
                "{quote} -> {price} dropped below {previous} ({rarity:?})"
            );
            previous = price;
        }
    }
}

#[test]
fn test_rounding_stays_within_half_step() {
    // Above the floor the shelf price is within half a rounding step of the quote
    for quote in quote_sweep().filter(|q| *q >= d("0.50")) {
        let price = round_price(quote, Some(&Rarity::Rare));
        let step = if quote < d("10") { d("0.25") } else { d("0.50") };
        assert!((price - quote).abs() <= step, "{quote} -> {price}");
    }
}

#[test]
fn test_flatten_prices_every_finish_with_same_rule() {
    let item = PricedItem {
        set_code: "MKM".to_string(),
        collector_number: "185".to_string(),
        name: "Alquist Proft, Master Sleuth".to_string(),
        rarity: Some(Rarity::Mythic),
        artist: Some("Mark Zug".to_string()),
        frame_effects: vec!["extendedart".to_string()],
        prices: PriceQuotes {
            normal: Some(d("4.74")),
            foil: Some(d("10.50")),
            etched: Some(d("30.00")),
        },
    };

    let entries = flatten(&item);
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].code, "MKM 185");
    assert_eq!(entries[0].finish, Finish::Normal);
    assert_eq!(entries[0].price, d("4.50"));

    assert_eq!(entries[1].code, "MKM 185f");
    assert_eq!(entries[1].finish, Finish::Foil);
    assert_eq!(entries[1].price, d("11"));

    for entry in &entries {
        assert_eq!(
            entry.description,
            "Alquist Proft, Master Sleuth (Extended Art)"
        );
        assert_eq!(entry.rarity, Some(Rarity::Mythic));
    }
}
