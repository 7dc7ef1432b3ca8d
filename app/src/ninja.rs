//! poe.ninja price database
//!
//! Downloads currency and item overviews for one league, flattens them into a
//! name → price table and keeps that table in memory and as JSON on disk. The
//! on-disk copy lets price checks work before the first refresh of a session
//! has finished.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pricelens_core::{PortError, PriceDatabase, RefreshParams, RefreshSummary};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const BASE_URL: &str = "https://poe.ninja/api/data";
const USER_AGENT: &str = concat!("pricelens/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Overview types served by `currencyoverview`
const CURRENCY_TYPES: &[&str] = &["Currency", "Fragment"];

/// Overview types served by `itemoverview`
const ITEM_TYPES: &[&str] = &[
    "DivinationCard",
    "Essence",
    "Fossil",
    "Resonator",
    "Oil",
    "Scarab",
    "Incubator",
    "DeliriumOrb",
    "Invitation",
    "UniqueWeapon",
    "UniqueArmour",
    "UniqueAccessory",
    "UniqueFlask",
    "UniqueJewel",
    "UniqueMap",
    "Map",
    "SkillGem",
];

const CHAOS_ORB: &str = "Chaos Orb";
const DIVINE_ORB: &str = "Divine Orb";

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct CurrencyOverview {
    #[serde(default)]
    pub lines: Vec<CurrencyLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CurrencyLine {
    pub currency_type_name: String,
    pub chaos_equivalent: f64,
    #[serde(default)]
    pub receive: Option<CurrencySample>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrencySample {
    #[serde(default, alias = "listingCount")]
    pub listing_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemOverview {
    #[serde(default)]
    pub lines: Vec<ItemLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemLine {
    pub name: String,
    pub chaos_value: f64,
    #[serde(default)]
    pub listing_count: Option<u32>,
    /// Only set for items whose price depends on linked sockets
    #[serde(default)]
    pub links: Option<u8>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CachedPrice {
    pub chaos_value: f64,
    pub listings: Option<u32>,
}

/// Flattened price table for one league
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCache {
    pub league: String,
    pub fetched_at: DateTime<Utc>,
    pub divine_rate: Option<f64>,
    /// Keyed by lowercase item name
    pub items: HashMap<String, CachedPrice>,
}

impl PriceCache {
    pub fn get(&self, name: &str) -> Option<CachedPrice> {
        self.items.get(&name.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

pub(crate) fn build_cache(
    league: &str,
    currency: Vec<CurrencyOverview>,
    items: Vec<ItemOverview>,
    fetched_at: DateTime<Utc>,
) -> PriceCache {
    let mut table = HashMap::new();
    table.insert(
        CHAOS_ORB.to_lowercase(),
        CachedPrice {
            chaos_value: 1.0,
            listings: None,
        },
    );

    for line in currency.into_iter().flat_map(|o| o.lines) {
        let listings = line.receive.and_then(|r| r.listing_count);
        table.insert(
            line.currency_type_name.to_lowercase(),
            CachedPrice {
                chaos_value: line.chaos_equivalent,
                listings,
            },
        );
    }

    for line in items.into_iter().flat_map(|o| o.lines) {
        // Linked variants share the item name; keep the unlinked price
        if line.links.is_some_and(|links| links > 0) {
            continue;
        }
        table
            .entry(line.name.to_lowercase())
            .or_insert(CachedPrice {
                chaos_value: line.chaos_value,
                listings: line.listing_count,
            });
    }

    let divine_rate = table
        .get(&DIVINE_ORB.to_lowercase())
        .map(|p| p.chaos_value)
        .filter(|&rate| rate > 0.0);

    PriceCache {
        league: league.to_string(),
        fetched_at,
        divine_rate,
        items: table,
    }
}

fn cache_file(dir: &Path, league: &str) -> PathBuf {
    let safe: String = league
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    dir.join(format!("prices-{safe}.json"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Database
// ─────────────────────────────────────────────────────────────────────────────

/// Resets the updating flag when a refresh ends, however it ends
struct UpdatingGuard<'a>(&'a AtomicBool);

impl Drop for UpdatingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct NinjaDatabase {
    client: reqwest::Client,
    cache_dir: PathBuf,
    updating: AtomicBool,
    cache: RwLock<Option<PriceCache>>,
}

impl NinjaDatabase {
    pub fn new(cache_dir: PathBuf) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PortError::Network(e.to_string()))?;
        Ok(Self {
            client,
            cache_dir,
            updating: AtomicBool::new(false),
            cache: RwLock::new(None),
        })
    }

    /// Load the last downloaded table for `league`, if there is one
    pub fn load_cached(&self, league: &str) {
        let path = cache_file(&self.cache_dir, league);
        let cache = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No cached prices");
                return;
            }
        };
        match serde_json::from_str::<PriceCache>(&cache) {
            Ok(cache) => {
                info!(league, items = cache.len(), fetched_at = %cache.fetched_at, "Loaded cached prices");
                self.replace(cache);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Ignoring unreadable price cache"),
        }
    }

    pub fn price_of(&self, name: &str) -> Option<(CachedPrice, Option<f64>)> {
        let guard = self.cache.read().ok()?;
        let cache = guard.as_ref()?;
        cache.get(name).map(|price| (price, cache.divine_rate))
    }

    pub(crate) fn replace(&self, cache: PriceCache) {
        match self.cache.write() {
            Ok(mut slot) => *slot = Some(cache),
            Err(_) => warn!("Price cache lock poisoned, keeping previous prices"),
        }
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        league: &str,
        kind: &str,
    ) -> Result<T, PortError> {
        let url = format!("{BASE_URL}/{endpoint}");
        debug!(kind, "Fetching overview");
        let response = self
            .client
            .get(&url)
            .query(&[("league", league), ("type", kind)])
            .send()
            .await
            .map_err(|e| PortError::Network(format!("{kind}: {e}")))?
            .error_for_status()
            .map_err(|e| PortError::Network(format!("{kind}: {e}")))?;
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::InvalidData(format!("{kind}: {e}")))
    }

    async fn write_cache(&self, cache: &PriceCache) -> Result<(), PortError> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let json = serde_json::to_string(cache).map_err(|e| PortError::InvalidData(e.to_string()))?;
        tokio::fs::write(cache_file(&self.cache_dir, &cache.league), json).await?;
        Ok(())
    }
}

#[async_trait]
impl PriceDatabase for NinjaDatabase {
    fn is_updating(&self) -> bool {
        self.updating.load(Ordering::SeqCst)
    }

    async fn refresh(&self, params: RefreshParams) -> Result<RefreshSummary, PortError> {
        if self.updating.swap(true, Ordering::SeqCst) {
            return Err(PortError::Other("a refresh is already running".to_string()));
        }
        let _guard = UpdatingGuard(&self.updating);

        let mut currency = Vec::with_capacity(CURRENCY_TYPES.len());
        for kind in CURRENCY_TYPES {
            currency.push(self.fetch("currencyoverview", &params.league, kind).await?);
        }
        let mut items = Vec::with_capacity(ITEM_TYPES.len());
        for kind in ITEM_TYPES {
            items.push(self.fetch("itemoverview", &params.league, kind).await?);
        }

        let cache = build_cache(&params.league, currency, items, Utc::now());
        let summary = RefreshSummary { items: cache.len() };
        if let Err(e) = self.write_cache(&cache).await {
            warn!(error = %e, "Failed to write price cache");
        }
        self.replace(cache);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency_json() -> &'static str {
        r#"{"lines":[
            {"currencyTypeName":"Divine Orb","chaosEquivalent":210.5,"receive":{"listing_count":800}},
            {"currencyTypeName":"Orb of Alchemy","chaosEquivalent":0.25}
        ]}"#
    }

    fn items_json() -> &'static str {
        r#"{"lines":[
            {"name":"Headhunter","chaosValue":9000.0,"listingCount":42},
            {"name":"Tabula Rasa","chaosValue":80.0,"links":6},
            {"name":"Tabula Rasa","chaosValue":12.0}
        ]}"#
    }

    fn sample_cache() -> PriceCache {
        let currency: CurrencyOverview = serde_json::from_str(currency_json()).unwrap();
        let items: ItemOverview = serde_json::from_str(items_json()).unwrap();
        build_cache("Standard", vec![currency], vec![items], Utc::now())
    }

    #[test]
    fn test_build_cache_flattens_overviews() {
        let cache = sample_cache();
        assert_eq!(cache.divine_rate, Some(210.5));
        assert_eq!(cache.get("chaos orb").map(|p| p.chaos_value), Some(1.0));
        assert_eq!(cache.get("Divine Orb").and_then(|p| p.listings), Some(800));
        assert_eq!(
            cache.get("HEADHUNTER"),
            Some(CachedPrice {
                chaos_value: 9000.0,
                listings: Some(42)
            })
        );
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_linked_variants_are_skipped() {
        let cache = sample_cache();
        assert_eq!(cache.get("Tabula Rasa").map(|p| p.chaos_value), Some(12.0));
    }

    #[test]
    fn test_cache_file_name_is_filesystem_safe() {
        let path = cache_file(Path::new("/tmp"), "Hardcore Settlers");
        assert_eq!(path, PathBuf::from("/tmp/prices-hardcore_settlers.json"));
    }

    #[tokio::test]
    async fn test_cache_survives_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = NinjaDatabase::new(dir.path().to_path_buf()).unwrap();
        db.write_cache(&sample_cache()).await.unwrap();

        let fresh = NinjaDatabase::new(dir.path().to_path_buf()).unwrap();
        assert!(fresh.price_of("Headhunter").is_none());
        fresh.load_cached("Standard");
        let (price, divine_rate) = fresh.price_of("Headhunter").expect("cached");
        assert_eq!(price.chaos_value, 9000.0);
        assert_eq!(divine_rate, Some(210.5));
    }

    #[test]
    fn test_corrupt_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(cache_file(dir.path(), "Standard"), "{not json").unwrap();
        let db = NinjaDatabase::new(dir.path().to_path_buf()).unwrap();
        db.load_cached("Standard");
        assert!(db.price_of("Chaos Orb").is_none());
        assert!(!db.is_updating());
    }
}
