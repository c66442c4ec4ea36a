//! Unit tests for Scryfall response parsing

use card_pricer::fetcher::scryfall_parser::{
    clean_collector_number, error_details, RawCard, SearchPage,
};
use card_pricer::fetcher::FetcherError;
use card_pricer::Rarity;
use rust_decimal::Decimal;
use std::str::FromStr;

const SEARCH_PAGE: &str = r#"{
    "object": "list",
    "total_cards": 3,
    "has_more": true,
    "next_page": "https://api.scryfall.com/cards/search?page=2&q=set%3Amkm",
    "data": [
        {
            "object": "card",
            "name": "Alquist Proft, Master Sleuth",
            "set": "mkm",
            "collector_number": "185",
            "rarity": "mythic",
            "artist": "Mark Zug",
            "prices": { "usd": "1.49", "usd_foil": "2.10", "usd_etched": null, "eur": "1.20" }
        },
        {
            "object": "card",
            "name": "Cryptic Coat",
            "set": "mkm",
            "collector_number": "50★",
            "rarity": "rare",
            "frame_effects": ["showcase"],
            "prices": { "usd": null, "usd_foil": "12.99" }
        },
        {
            "object": "card",
            "name": "Plains",
            "set": "mkm",
            "collector_number": "272",
            "rarity": "common",
            "artist": "",
            "prices": {}
        }
    ]
}"#;

#[test]
fn test_search_page_parses_in_order() {
    let page: SearchPage = serde_json::from_str(SEARCH_PAGE).unwrap();
    assert!(page.has_more);
    assert_eq!(page.total_cards, Some(3));
    assert!(page.next_page.as_deref().unwrap().contains("page=2"));

    let items = page.into_items().unwrap();
    let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Alquist Proft, Master Sleuth", "Cryptic Coat", "Plains"]
    );
}

#[test]
fn test_card_fields_are_normalized() {
    let page: SearchPage = serde_json::from_str(SEARCH_PAGE).unwrap();
    let items = page.into_items().unwrap();

    let alquist = &items[0];
    assert_eq!(alquist.set_code, "MKM");
    assert_eq!(alquist.rarity, Some(Rarity::Mythic));
    assert_eq!(alquist.artist.as_deref(), Some("Mark Zug"));
    assert_eq!(alquist.prices.normal, Some(Decimal::from_str("1.49").unwrap()));
    assert_eq!(alquist.prices.foil, Some(Decimal::from_str("2.10").unwrap()));
    assert_eq!(alquist.prices.etched, None);

    let coat = &items[1];
    assert_eq!(coat.collector_number, "50");
    assert_eq!(coat.frame_effects, vec!["showcase".to_string()]);
    assert_eq!(coat.prices.normal, None);
    assert_eq!(coat.variant_label().as_deref(), Some("Showcase"));

    let plains = &items[2];
    assert!(plains.artist.is_none());
    assert!(plains.prices.is_empty());
}

#[test]
fn test_card_without_prices_block() {
    let card: RawCard = serde_json::from_str(
        r#"{ "name": "Token", "set": "tmkm", "collector_number": "1" }"#,
    )
    .unwrap();
    let item = card.into_item().unwrap();
    assert!(item.prices.is_empty());
    assert!(item.rarity.is_none());
}

#[test]
fn test_unknown_rarity_is_kept() {
    let card: RawCard = serde_json::from_str(
        r#"{ "name": "Oddity", "set": "unk", "collector_number": "7", "rarity": "timeshifted" }"#,
    )
    .unwrap();
    let item = card.into_item().unwrap();
    assert_eq!(item.rarity, Some(Rarity::Other("timeshifted".to_string())));
}

#[test]
fn test_invalid_price_is_rejected() {
    let card: RawCard = serde_json::from_str(
        r#"{ "name": "Broken", "set": "mkm", "collector_number": "1", "prices": { "usd": "n/a" } }"#,
    )
    .unwrap();
    match card.into_item() {
        Err(FetcherError::RemoteUnavailable(msg)) => assert!(msg.contains("Broken"), "{msg}"),
        other => panic!("expected invalid price error, got {other:?}"),
    }
}

#[test]
fn test_clean_collector_number() {
    assert_eq!(clean_collector_number("123"), "123");
    assert_eq!(clean_collector_number("123★"), "123");
    assert_eq!(clean_collector_number("A-45"), "A45");
    assert_eq!(clean_collector_number("12s"), "12s");
    assert_eq!(clean_collector_number("†"), "");
}

#[test]
fn test_error_details() {
    let body = r#"{"object":"error","code":"bad_request","status":400,"details":"Unknown query"}"#;
    assert_eq!(error_details(body).as_deref(), Some("Unknown query"));
    assert_eq!(error_details("<html>"), None);
}
