//! Offline card catalog served from an in-memory DuckDB database.
//!
//! [`LocalCatalog`] implements [`CardApi`] over a set of catalog entries
//! (bulk-data style: one object per printing). Entries are written to NDJSON
//! temp files and loaded into two tables:
//!
//! - `cards`: one row per card name, taken from its most recent printing
//! - `printings`: one row per printing
//!
//! Both keep the searchable columns alongside a `payload` column with the
//! full record as JSON.

use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::client::{CardApi, SearchRequest};
use crate::config;
use crate::connection::Connection;
use crate::error::{Result, SearchError};
use crate::models::{
    CardRecord, ColorOption, FilterOptions, PrintingList, Printing, Rarity, RarityOption,
    ResultPage,
};
use crate::sql_builder::SqlBuilder;

const CARD_COLUMNS: &str = "{'id': 'VARCHAR', 'name': 'VARCHAR', 'type_line': 'VARCHAR', \
     'colors': 'VARCHAR', 'rarity': 'VARCHAR', 'released_at': 'VARCHAR', 'payload': 'VARCHAR'}";
const PRINTING_COLUMNS: &str =
    "{'id': 'VARCHAR', 'name': 'VARCHAR', 'released_at': 'VARCHAR', 'payload': 'VARCHAR'}";

/// Symbol used by the color filter for colorless cards.
const COLORLESS: &str = "C";

// ---------------------------------------------------------------------------
// CatalogEntry
// ---------------------------------------------------------------------------

/// A card as it appears in one printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub card: CardRecord,
    pub set_code: String,
    pub collector_number: String,
    /// Release date as `YYYY-MM-DD`.
    pub released_at: String,
    pub artist: Option<String>,
    pub flavor_text: Option<String>,
}

impl CatalogEntry {
    /// The printing view of this entry.
    pub fn to_printing(&self) -> Printing {
        let back_image_uris = self
            .card
            .faces
            .as_ref()
            .and_then(|f| f.back.as_ref())
            .and_then(|b| b.image_uris.clone());
        let image_uris = self.card.image_uris.clone().or_else(|| {
            self.card
                .faces
                .as_ref()
                .and_then(|f| f.front.image_uris.clone())
        });
        Printing {
            id: self.card.id.clone(),
            name: self.card.name.clone(),
            set_name: self.card.set_name.clone(),
            set_code: self.set_code.clone(),
            collector_number: self.collector_number.clone(),
            released_at: self.released_at.clone(),
            rarity: self.card.rarity,
            artist: self.artist.clone(),
            flavor_text: self.flavor_text.clone(),
            image_uris,
            back_image_uris,
            prices: self.card.prices.clone(),
            scryfall_uri: self.card.scryfall_uri.clone(),
        }
    }
}

#[derive(Serialize)]
struct CardRow<'a> {
    id: &'a str,
    name: &'a str,
    type_line: &'a str,
    colors: String,
    rarity: &'static str,
    released_at: &'a str,
    payload: String,
}

#[derive(Serialize)]
struct PrintingRow<'a> {
    id: &'a str,
    name: &'a str,
    released_at: &'a str,
    payload: String,
}

#[derive(Deserialize)]
struct PayloadRow {
    payload: String,
}

// ---------------------------------------------------------------------------
// LocalCatalog
// ---------------------------------------------------------------------------

pub struct LocalCatalog {
    conn: Mutex<Connection>,
}

impl LocalCatalog {
    /// Build a catalog from in-memory entries.
    pub fn from_entries(entries: &[CatalogEntry]) -> Result<Self> {
        for entry in entries {
            entry.card.validate()?;
        }
        let conn = Connection::new()?;

        // Most recent printing per name is the canonical search row.
        let mut canonical: HashMap<&str, &CatalogEntry> = HashMap::new();
        for entry in entries {
            canonical
                .entry(entry.card.name.as_str())
                .and_modify(|current| {
                    if entry.released_at > current.released_at {
                        *current = entry;
                    }
                })
                .or_insert(entry);
        }
        let mut cards: Vec<&CatalogEntry> = canonical.into_values().collect();
        cards.sort_by(|a, b| a.card.name.cmp(&b.card.name));

        let mut card_rows = Vec::with_capacity(cards.len());
        for e in &cards {
            card_rows.push(CardRow {
                id: &e.card.id,
                name: &e.card.name,
                type_line: &e.card.type_line,
                colors: e.card.colors.iter().cloned().collect::<Vec<_>>().join(","),
                rarity: e.card.rarity.as_str(),
                released_at: &e.released_at,
                payload: serde_json::to_string(&e.card)?,
            });
        }
        load_rows(&conn, "cards", CARD_COLUMNS, &card_rows)?;

        let printings: Vec<Printing> = entries.iter().map(CatalogEntry::to_printing).collect();
        let mut printing_rows = Vec::with_capacity(printings.len());
        for p in &printings {
            printing_rows.push(PrintingRow {
                id: &p.id,
                name: &p.name,
                released_at: &p.released_at,
                payload: serde_json::to_string(p)?,
            });
        }
        load_rows(&conn, "printings", PRINTING_COLUMNS, &printing_rows)?;

        info!(
            cards = card_rows.len(),
            printings = printing_rows.len(),
            "local catalog loaded"
        );
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Build a catalog from a JSON array of entries (bulk-data file).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SearchError::NotFound(format!(
                "Catalog file {} does not exist",
                path.display()
            )));
        }
        let reader = BufReader::new(fs::File::open(path)?);
        let entries: Vec<CatalogEntry> = serde_json::from_reader(reader)?;
        Self::from_entries(&entries)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of distinct card names in the catalog.
    pub fn card_count(&self) -> Result<usize> {
        let conn = self.conn();
        let cnt = conn
            .execute_scalar("SELECT COUNT(*) FROM cards", &[])?
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        Ok(cnt as usize)
    }
}

/// Write `rows` as NDJSON to a temp file and load it as `table`.
fn load_rows<T: Serialize>(conn: &Connection, table: &str, columns: &str, rows: &[T]) -> Result<()> {
    let mut tmp = NamedTempFile::new()?;
    for row in rows {
        serde_json::to_writer(&mut tmp, row)?;
        tmp.write_all(b"\n")?;
    }
    tmp.flush()?;
    let path = tmp.path().to_string_lossy().to_string();
    conn.register_table_from_ndjson(table, &path, columns)
}

/// Apply the text, color, type and rarity conditions of `request`.
fn apply_filters(qb: &mut SqlBuilder, request: &SearchRequest) {
    if !request.query.is_empty() {
        qb.where_clause("contains(LOWER(name), LOWER(?))", &[request.query.as_str()]);
    }
    for color in &request.colors {
        if color == COLORLESS {
            qb.where_clause("colors = ''", &[]);
        } else {
            qb.where_clause(
                "list_contains(string_split(colors, ','), CAST(? AS VARCHAR))",
                &[color.as_str()],
            );
        }
    }
    for type_name in &request.types {
        qb.where_clause("contains(LOWER(type_line), LOWER(?))", &[type_name.as_str()]);
    }
    if let Some(rarity) = request.rarity {
        qb.where_eq("rarity", rarity.as_str());
    }
}

fn decode_payloads<T: serde::de::DeserializeOwned>(rows: Vec<PayloadRow>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|r| serde_json::from_str(&r.payload).map_err(SearchError::from))
        .collect()
}

impl CardApi for LocalCatalog {
    fn search(&self, request: &SearchRequest) -> Result<ResultPage> {
        let page = request.page.max(1);
        let conn = self.conn();

        let mut count_qb = SqlBuilder::new("cards");
        count_qb.select(&["COUNT(*) AS cnt"]);
        apply_filters(&mut count_qb, request);
        let (sql, params) = count_qb.build();
        let total = conn
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize;

        let mut qb = SqlBuilder::new("cards");
        qb.select(&["payload"]);
        apply_filters(&mut qb, request);
        if !request.query.is_empty() {
            // Exact name match first.
            qb.order_by_param("(LOWER(name) = LOWER(?)) DESC", &[request.query.as_str()]);
        }
        qb.order_by(&["name ASC"]);
        qb.limit(config::PAGE_SIZE);
        qb.offset((page as usize - 1) * config::PAGE_SIZE);
        let (sql, params) = qb.build();
        let items: Vec<CardRecord> = decode_payloads(conn.execute_into(&sql, &params)?)?;

        let has_more = (page as usize) * config::PAGE_SIZE < total;
        let message = if total == 0 {
            Some("No cards found matching your search".to_string())
        } else {
            None
        };
        Ok(ResultPage {
            items,
            total_count: total,
            has_more,
            page,
            message,
        })
    }

    fn printings(&self, card_name: &str) -> Result<PrintingList> {
        let conn = self.conn();
        let (sql, params) = SqlBuilder::new("printings")
            .select(&["payload"])
            .where_clause("LOWER(name) = LOWER(?)", &[card_name])
            .order_by(&["released_at DESC", "id ASC"])
            .build();
        let items: Vec<Printing> = decode_payloads(conn.execute_into(&sql, &params)?)?;
        Ok(PrintingList {
            total_count: items.len(),
            items,
            card_name: card_name.to_string(),
        })
    }

    fn filter_options(&self) -> Result<FilterOptions> {
        let conn = self.conn();

        let colors = config::COLORS
            .iter()
            .map(|(symbol, label)| ColorOption {
                value: symbol.to_string(),
                label: label.to_string(),
                symbol: symbol.to_string(),
            })
            .collect();

        let mut types = Vec::new();
        for type_name in config::CARD_TYPES {
            let (sql, params) = SqlBuilder::new("cards")
                .select(&["COUNT(*) AS cnt"])
                .where_clause("contains(LOWER(type_line), LOWER(?))", &[*type_name])
                .build();
            let present = conn
                .execute_scalar(&sql, &params)?
                .and_then(|v| v.as_u64())
                .unwrap_or(0)
                > 0;
            if present {
                types.push(type_name.to_string());
            }
        }

        let rows = conn.execute("SELECT DISTINCT rarity FROM cards", &[])?;
        let mut rarities: Vec<Rarity> = rows
            .iter()
            .filter_map(|r| r.get("rarity").and_then(|v| v.as_str()))
            .filter_map(|s| s.parse::<Rarity>().ok())
            .collect();
        rarities.sort();
        let rarities = rarities
            .into_iter()
            .map(|value| RarityOption {
                value,
                label: capitalize(value.as_str()),
            })
            .collect();

        Ok(FilterOptions {
            colors,
            types,
            rarities,
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
