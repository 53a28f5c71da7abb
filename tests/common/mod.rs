//! Shared test fixtures for the card search SDK integration tests.
//!
//! Provides sample cards and printings, a scripted [`CardApi`] double with
//! call counters and per-query gates, and `setup_catalog()` which loads the
//! sample entries into an offline DuckDB catalog.
//! `init_tracing()` routes log output to the test harness.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use mtgsearch_sdk::models::{
    CardRecord, ColorOption, Face, Faces, FilterOptions, ImageUris, Prices, Printing,
    PrintingList, Rarity, RarityOption, ResultPage,
};
use mtgsearch_sdk::{CardApi, CatalogEntry, LocalCatalog, Result, SearchError, SearchRequest};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness. `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Sample data
// ---------------------------------------------------------------------------

pub fn images(slug: &str) -> ImageUris {
    ImageUris {
        small: Some(format!("https://img.example/small/{slug}.jpg")),
        normal: Some(format!("https://img.example/normal/{slug}.jpg")),
        large: Some(format!("https://img.example/large/{slug}.jpg")),
    }
}

pub fn prices(usd: &str) -> Prices {
    Prices {
        usd: Some(usd.to_string()),
        usd_foil: None,
        eur: None,
        eur_foil: None,
    }
}

fn colors(symbols: &[&str]) -> BTreeSet<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

/// A single-faced card.
pub fn card(id: &str, name: &str, type_line: &str, color_symbols: &[&str], rarity: Rarity) -> CardRecord {
    CardRecord {
        id: id.to_string(),
        name: name.to_string(),
        type_line: type_line.to_string(),
        mana_cost: Some("{R}".to_string()),
        oracle_text: Some(format!("{name} rules text.")),
        power: None,
        toughness: None,
        colors: colors(color_symbols),
        rarity,
        set_name: "Masters 25".to_string(),
        image_uris: Some(images(id)),
        prices: Some(prices("1.50")),
        scryfall_uri: Some(format!("https://scryfall.example/card/{id}")),
        has_multiple_faces: false,
        faces: None,
    }
}

pub fn lightning_bolt() -> CardRecord {
    CardRecord {
        mana_cost: Some("{R}".to_string()),
        oracle_text: Some("Lightning Bolt deals 3 damage to any target.".to_string()),
        ..card("bolt-a25", "Lightning Bolt", "Instant", &["R"], Rarity::Uncommon)
    }
}

/// A transform card with both faces present.
pub fn fable() -> CardRecord {
    CardRecord {
        id: "fable-neo".to_string(),
        name: "Fable of the Mirror-Breaker // Reflection of Kiki-Jiki".to_string(),
        type_line: "Enchantment — Saga // Enchantment Creature — Goblin Shaman".to_string(),
        mana_cost: None,
        oracle_text: None,
        power: None,
        toughness: None,
        colors: colors(&["R"]),
        rarity: Rarity::Rare,
        set_name: "Kamigawa: Neon Dynasty".to_string(),
        image_uris: None,
        prices: Some(prices("20.00")),
        scryfall_uri: Some("https://scryfall.example/card/fable-neo".to_string()),
        has_multiple_faces: true,
        faces: Some(Faces {
            front: Face {
                name: "Fable of the Mirror-Breaker".to_string(),
                mana_cost: Some("{2}{R}".to_string()),
                type_line: Some("Enchantment — Saga".to_string()),
                oracle_text: Some("(As this Saga enters and after your draw step, add a lore counter.)".to_string()),
                power: None,
                toughness: None,
                image_uris: Some(images("fable-front")),
            },
            back: Some(Face {
                name: "Reflection of Kiki-Jiki".to_string(),
                mana_cost: Some(String::new()),
                type_line: Some("Enchantment Creature — Goblin Shaman".to_string()),
                oracle_text: Some("{1}, {T}: Create a token that's a copy of another target nonlegendary creature you control.".to_string()),
                power: Some("2".to_string()),
                toughness: Some("2".to_string()),
                image_uris: Some(images("fable-back")),
            }),
        }),
    }
}

/// A multi-faced card whose back face is absent.
pub fn meld_half() -> CardRecord {
    CardRecord {
        has_multiple_faces: true,
        faces: Some(Faces {
            front: Face {
                name: "Bruna, the Fading Light".to_string(),
                mana_cost: Some("{5}{W}{W}".to_string()),
                type_line: Some("Legendary Creature — Angel Horror".to_string()),
                oracle_text: Some("Flying, vigilance".to_string()),
                power: Some("5".to_string()),
                toughness: Some("7".to_string()),
                image_uris: None,
            },
            back: None,
        }),
        ..card("bruna-emn", "Bruna, the Fading Light", "Legendary Creature — Angel Horror", &["W"], Rarity::Rare)
    }
}

pub fn sample_cards() -> Vec<CardRecord> {
    vec![
        lightning_bolt(),
        card("helix-rav", "Lightning Helix", "Instant", &["R", "W"], Rarity::Uncommon),
        card("chain-lgn", "Chain Lightning", "Sorcery", &["R"], Rarity::Common),
        card("counterspell-mh2", "Counterspell", "Instant", &["U"], Rarity::Uncommon),
        card("elves-dom", "Llanowar Elves", "Creature — Elf Druid", &["G"], Rarity::Common),
        card("sol-ring-c21", "Sol Ring", "Artifact", &[], Rarity::Uncommon),
        fable(),
    ]
}

pub fn printing(id: &str, name: &str, set_name: &str, set_code: &str, released_at: &str) -> Printing {
    Printing {
        id: id.to_string(),
        name: name.to_string(),
        set_name: set_name.to_string(),
        set_code: set_code.to_string(),
        collector_number: "171".to_string(),
        released_at: released_at.to_string(),
        rarity: Rarity::Special,
        artist: Some("Greg Rutkowski".to_string()),
        flavor_text: None,
        image_uris: Some(images(id)),
        back_image_uris: None,
        prices: Some(prices("42.00")),
        scryfall_uri: Some(format!("https://scryfall.example/card/{id}")),
    }
}

// ---------------------------------------------------------------------------
// ScriptedApi
// ---------------------------------------------------------------------------

struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

/// In-memory [`CardApi`] with call counters, failure switches and gates that
/// hold a search for a given query until the test releases it.
pub struct ScriptedApi {
    pub page_size: usize,
    cards: Vec<CardRecord>,
    printings: Vec<Printing>,
    search_calls: AtomicUsize,
    printing_calls: AtomicUsize,
    filter_calls: AtomicUsize,
    fail_search: AtomicBool,
    fail_printings: AtomicBool,
    fail_filters: AtomicBool,
    gates: Mutex<HashMap<String, Arc<Gate>>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::with_page_size(2)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            cards: sample_cards(),
            printings: vec![
                printing("fable-eld", "Fable of the Mirror-Breaker // Reflection of Kiki-Jiki", "Throne of Eldraine", "eld", "2019-10-04"),
                printing("fable-neo", "Fable of the Mirror-Breaker // Reflection of Kiki-Jiki", "Kamigawa: Neon Dynasty", "neo", "2022-02-18"),
                printing("fable-promo", "Fable of the Mirror-Breaker // Reflection of Kiki-Jiki", "Judge Gift Cards 2024", "p24", "2024-01-01"),
            ],
            search_calls: AtomicUsize::new(0),
            printing_calls: AtomicUsize::new(0),
            filter_calls: AtomicUsize::new(0),
            fail_search: AtomicBool::new(false),
            fail_printings: AtomicBool::new(false),
            fail_filters: AtomicBool::new(false),
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn printing_calls(&self) -> usize {
        self.printing_calls.load(Ordering::SeqCst)
    }

    pub fn filter_calls(&self) -> usize {
        self.filter_calls.load(Ordering::SeqCst)
    }

    pub fn fail_search(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    pub fn fail_printings(&self, fail: bool) {
        self.fail_printings.store(fail, Ordering::SeqCst);
    }

    pub fn fail_filters(&self, fail: bool) {
        self.fail_filters.store(fail, Ordering::SeqCst);
    }

    /// Block searches for `query` until [`release`](Self::release).
    pub fn hold(&self, query: &str) {
        self.gates.lock().unwrap().insert(
            query.to_string(),
            Arc::new(Gate {
                open: Mutex::new(false),
                cv: Condvar::new(),
            }),
        );
    }

    pub fn release(&self, query: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(query) {
            *gate.open.lock().unwrap() = true;
            gate.cv.notify_all();
        }
    }

    fn wait_gate(&self, query: &str) {
        let gate = self.gates.lock().unwrap().get(query).cloned();
        if let Some(gate) = gate {
            let mut open = gate.open.lock().unwrap();
            while !*open {
                open = gate.cv.wait(open).unwrap();
            }
        }
    }
}

impl CardApi for ScriptedApi {
    fn search(&self, request: &SearchRequest) -> Result<ResultPage> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate(&request.query);
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(SearchError::Transport {
                endpoint: "search",
                status: Some(502),
                message: "bad gateway".to_string(),
            });
        }

        let needle = request.query.to_lowercase();
        let mut matches: Vec<CardRecord> = self
            .cards
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .filter(|c| request.colors.iter().all(|col| c.colors.contains(col)))
            .filter(|c| request.types.iter().all(|t| c.type_line.contains(t.as_str())))
            .filter(|c| request.rarity.map(|r| c.rarity == r).unwrap_or(true))
            .cloned()
            .collect();
        matches.sort_by_key(|c| (c.name.to_lowercase() != needle, c.name.clone()));

        let total = matches.len();
        let start = (request.page as usize - 1) * self.page_size;
        let items: Vec<CardRecord> = matches.into_iter().skip(start).take(self.page_size).collect();
        Ok(ResultPage {
            items,
            total_count: total,
            has_more: (request.page as usize) * self.page_size < total,
            page: request.page,
            message: None,
        })
    }

    fn printings(&self, card_name: &str) -> Result<PrintingList> {
        self.printing_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_printings.load(Ordering::SeqCst) {
            return Err(SearchError::Transport {
                endpoint: "printings",
                status: None,
                message: "connection refused".to_string(),
            });
        }
        let mut list = PrintingList {
            items: self
                .printings
                .iter()
                .filter(|p| p.name == card_name)
                .cloned()
                .collect(),
            total_count: 0,
            card_name: card_name.to_string(),
        };
        list.total_count = list.items.len();
        list.sort_newest_first();
        Ok(list)
    }

    fn filter_options(&self) -> Result<FilterOptions> {
        self.filter_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_filters.load(Ordering::SeqCst) {
            return Err(SearchError::Transport {
                endpoint: "filter-options",
                status: Some(503),
                message: "unavailable".to_string(),
            });
        }
        Ok(FilterOptions {
            colors: vec![ColorOption {
                value: "R".to_string(),
                label: "Red".to_string(),
                symbol: "R".to_string(),
            }],
            types: vec!["Instant".to_string(), "Creature".to_string()],
            rarities: vec![RarityOption {
                value: Rarity::Rare,
                label: "Rare".to_string(),
            }],
        })
    }
}

/// Poll `cond` until it holds, failing the test after two seconds.
pub async fn wait_until<F: Fn() -> bool>(cond: F) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

// ---------------------------------------------------------------------------
// Offline catalog
// ---------------------------------------------------------------------------

pub fn entry(card: CardRecord, set_code: &str, released_at: &str) -> CatalogEntry {
    CatalogEntry {
        card,
        set_code: set_code.to_string(),
        collector_number: "1".to_string(),
        released_at: released_at.to_string(),
        artist: Some("Christopher Moeller".to_string()),
        flavor_text: None,
    }
}

pub fn catalog_entries() -> Vec<CatalogEntry> {
    let bolt_m10 = CardRecord {
        id: "bolt-m10".to_string(),
        set_name: "Magic 2010".to_string(),
        rarity: Rarity::Common,
        ..lightning_bolt()
    };
    let bolt_2xm = CardRecord {
        id: "bolt-2xm".to_string(),
        set_name: "Double Masters".to_string(),
        ..lightning_bolt()
    };
    vec![
        entry(bolt_m10, "m10", "2009-07-17"),
        entry(lightning_bolt(), "a25", "2018-03-16"),
        entry(bolt_2xm, "2xm", "2020-08-07"),
        entry(card("helix-rav", "Lightning Helix", "Instant", &["R", "W"], Rarity::Uncommon), "rav", "2005-10-07"),
        entry(card("chain-lgn", "Chain Lightning", "Sorcery", &["R"], Rarity::Common), "lgn", "1994-06-01"),
        entry(card("shock-m19", "Shock", "Instant", &["R"], Rarity::Common), "m19", "2018-07-13"),
        entry(card("aftershock-hou", "Aftershock", "Sorcery", &["R"], Rarity::Common), "hou", "2017-07-14"),
        entry(card("counterspell-mh2", "Counterspell", "Instant", &["U"], Rarity::Uncommon), "mh2", "2021-06-18"),
        entry(card("elves-dom", "Llanowar Elves", "Creature — Elf Druid", &["G"], Rarity::Common), "dom", "2018-04-27"),
        entry(card("sol-ring-c21", "Sol Ring", "Artifact", &[], Rarity::Uncommon), "c21", "2021-04-23"),
        entry(fable(), "neo", "2022-02-18"),
    ]
}

/// Load the sample entries into an offline catalog.
pub fn setup_catalog() -> LocalCatalog {
    init_tracing();
    LocalCatalog::from_entries(&catalog_entries()).unwrap()
}
