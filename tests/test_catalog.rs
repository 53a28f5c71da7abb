//! Offline catalog integration tests against in-memory sample data.

mod common;

use std::io::Write;

use mtgsearch_sdk::models::Rarity;
use mtgsearch_sdk::{CardApi, LocalCatalog, SearchError, SearchRequest};

fn request(query: &str) -> SearchRequest {
    SearchRequest {
        query: query.to_string(),
        page: 1,
        colors: Vec::new(),
        types: Vec::new(),
        rarity: None,
    }
}

fn names(page: &mtgsearch_sdk::models::ResultPage) -> Vec<&str> {
    page.items.iter().map(|c| c.name.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn one_card_row_per_name() {
    let catalog = common::setup_catalog();
    assert_eq!(catalog.card_count().unwrap(), 9);
}

#[test]
fn from_json_file_loads_entries() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    let json = serde_json::to_string(&common::catalog_entries()).unwrap();
    tmp.write_all(json.as_bytes()).unwrap();
    tmp.flush().unwrap();

    let catalog = LocalCatalog::from_json_file(tmp.path()).unwrap();
    assert_eq!(catalog.card_count().unwrap(), 9);
}

#[test]
fn from_json_file_missing_is_not_found() {
    let err = LocalCatalog::from_json_file("/nonexistent/catalog.json")
        .err()
        .unwrap();
    assert!(matches!(err, SearchError::NotFound(_)));
}

#[test]
fn invalid_entry_is_rejected() {
    let mut entries = common::catalog_entries();
    entries[0].card.has_multiple_faces = true;
    entries[0].card.faces = None;
    assert!(LocalCatalog::from_entries(&entries).is_err());
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

#[test]
fn exact_name_match_ranks_first() {
    let catalog = common::setup_catalog();
    let page = catalog.search(&request("shock")).unwrap();
    assert_eq!(names(&page), vec!["Shock", "Aftershock"]);
    assert_eq!(page.total_count, 2);
}

#[test]
fn quoted_query_is_bound_not_spliced() {
    let mut entries = common::catalog_entries();
    entries.push(common::entry(
        common::card("saga-mh2", "Urza's Saga", "Enchantment Land — Urza's Saga", &[], Rarity::Rare),
        "mh2",
        "2021-06-18",
    ));
    entries.push(common::entry(
        common::card("return-saga", "Return to Urza's Saga", "Sorcery", &["U"], Rarity::Common),
        "mh2",
        "2021-06-18",
    ));
    let catalog = LocalCatalog::from_entries(&entries).unwrap();

    let page = catalog.search(&request("urza's saga")).unwrap();
    assert_eq!(names(&page), vec!["Urza's Saga", "Return to Urza's Saga"]);

    let page = catalog.search(&request("shock') OR ('1'='1")).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 0);
}

#[test]
fn text_search_is_case_insensitive_and_name_ordered() {
    let catalog = common::setup_catalog();
    let page = catalog.search(&request("LIGHTNING")).unwrap();
    assert_eq!(
        names(&page),
        vec!["Chain Lightning", "Lightning Bolt", "Lightning Helix"]
    );
    assert!(!page.has_more);
    assert_eq!(page.page, 1);
    assert!(page.message.is_none());
}

#[test]
fn search_row_is_most_recent_printing() {
    let catalog = common::setup_catalog();
    let page = catalog.search(&request("lightning bolt")).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, "bolt-2xm");
    assert_eq!(page.items[0].set_name, "Double Masters");
}

#[test]
fn color_filter_without_text() {
    let catalog = common::setup_catalog();
    let mut req = request("");
    req.colors = vec!["R".to_string()];
    let page = catalog.search(&req).unwrap();
    assert_eq!(
        names(&page),
        vec![
            "Aftershock",
            "Chain Lightning",
            "Fable of the Mirror-Breaker // Reflection of Kiki-Jiki",
            "Lightning Bolt",
            "Lightning Helix",
            "Shock",
        ]
    );
    assert!(page.items.iter().all(|c| c.colors.contains("R")));
}

#[test]
fn multiple_colors_must_all_match() {
    let catalog = common::setup_catalog();
    let mut req = request("");
    req.colors = vec!["R".to_string(), "W".to_string()];
    let page = catalog.search(&req).unwrap();
    assert_eq!(names(&page), vec!["Lightning Helix"]);
}

#[test]
fn colorless_filter_matches_cards_without_colors() {
    let catalog = common::setup_catalog();
    let mut req = request("");
    req.colors = vec!["C".to_string()];
    let page = catalog.search(&req).unwrap();
    assert_eq!(names(&page), vec!["Sol Ring"]);
}

#[test]
fn type_and_rarity_filters() {
    let catalog = common::setup_catalog();

    let mut req = request("");
    req.types = vec!["Creature".to_string()];
    let page = catalog.search(&req).unwrap();
    assert_eq!(
        names(&page),
        vec![
            "Fable of the Mirror-Breaker // Reflection of Kiki-Jiki",
            "Llanowar Elves",
        ]
    );

    req.rarity = Some(Rarity::Common);
    let page = catalog.search(&req).unwrap();
    assert_eq!(names(&page), vec!["Llanowar Elves"]);
}

#[test]
fn no_match_returns_empty_page_with_message() {
    let catalog = common::setup_catalog();
    let page = catalog.search(&request("Kiki's Nonexistent Card")).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 0);
    assert!(!page.has_more);
    assert!(page.message.is_some());
}

#[test]
fn page_past_results_is_empty() {
    let catalog = common::setup_catalog();
    let mut req = request("lightning");
    req.page = 2;
    let page = catalog.search(&req).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 3);
    assert_eq!(page.page, 2);
}

// ---------------------------------------------------------------------------
// printings
// ---------------------------------------------------------------------------

#[test]
fn printings_are_newest_first() {
    let catalog = common::setup_catalog();
    let list = catalog.printings("lightning bolt").unwrap();
    let sets: Vec<&str> = list.items.iter().map(|p| p.set_code.as_str()).collect();
    assert_eq!(sets, vec!["2xm", "a25", "m10"]);
    assert_eq!(list.total_count, 3);
    assert_eq!(list.card_name, "lightning bolt");
    assert_eq!(list.items[2].rarity, Rarity::Common);
}

#[test]
fn double_faced_printing_carries_both_images() {
    let catalog = common::setup_catalog();
    let list = catalog
        .printings("Fable of the Mirror-Breaker // Reflection of Kiki-Jiki")
        .unwrap();
    assert_eq!(list.items.len(), 1);
    let p = &list.items[0];
    assert_eq!(
        p.image_uris.as_ref().and_then(|i| i.best()),
        Some("https://img.example/normal/fable-front.jpg")
    );
    assert!(p.back_image_uris.is_some());
    assert_eq!(p.display_label(), "Kamigawa: Neon Dynasty (NEO) #1");
}

#[test]
fn printings_for_unknown_card_is_empty() {
    let catalog = common::setup_catalog();
    let list = catalog.printings("Black Lotus").unwrap();
    assert!(list.items.is_empty());
    assert_eq!(list.total_count, 0);
}

// ---------------------------------------------------------------------------
// filter_options
// ---------------------------------------------------------------------------

#[test]
fn filter_options_reflect_catalog() {
    let catalog = common::setup_catalog();
    let options = catalog.filter_options().unwrap();

    assert_eq!(options.colors.len(), 6);
    assert!(options.has_color("C"));
    assert_eq!(
        options.types,
        vec!["Artifact", "Creature", "Enchantment", "Instant", "Sorcery"]
    );
    let rarities: Vec<Rarity> = options.rarities.iter().map(|r| r.value).collect();
    assert_eq!(rarities, vec![Rarity::Common, Rarity::Uncommon, Rarity::Rare]);
    assert_eq!(options.rarities[2].label, "Rare");
}
