use crate::core::racer::Racer;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Maximum number of entries kept per track
pub const MAX_SCORES: usize = 10;

/// ScoreEntry stores one finisher's result in the high-score table of a track.
/// * `ticks` - Number of turns needed to finish
/// * `time` - Formatted race time, e.g. "01:12.0"
/// * `avg_speed` - (km/h) Average speed
/// * `top_speed` - (km/h) Top speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScoreRecord", into = "ScoreRecord")]
pub struct ScoreEntry {
    pub driver: String,
    pub ticks: u32,
    pub time: String,
    pub avg_speed: f64,
    pub top_speed: f64,
}

// entries are persisted as compact arrays
#[derive(Serialize, Deserialize)]
struct ScoreRecord(String, u32, String, f64, f64);

impl From<ScoreRecord> for ScoreEntry {
    fn from(r: ScoreRecord) -> Self {
        ScoreEntry {
            driver: r.0,
            ticks: r.1,
            time: r.2,
            avg_speed: r.3,
            top_speed: r.4,
        }
    }
}

impl From<ScoreEntry> for ScoreRecord {
    fn from(e: ScoreEntry) -> Self {
        ScoreRecord(e.driver, e.ticks, e.time, e.avg_speed, e.top_speed)
    }
}

impl ScoreEntry {
    pub fn from_racer(racer: &Racer) -> ScoreEntry {
        ScoreEntry {
            driver: racer.driver.to_owned(),
            ticks: racer.ticks(),
            time: racer.total_time(),
            avg_speed: racer.avg_speed(),
            top_speed: racer.top_speed(),
        }
    }
}

/// High-score tables keyed by track name.
pub type ScoreTables = BTreeMap<String, Vec<ScoreEntry>>;

/// ScoreStore is the persistent backend of the ledger. It is read fully on open and rewritten
/// fully on every update.
pub trait ScoreStore {
    fn open(&mut self) -> anyhow::Result<ScoreTables>;
    fn persist(&mut self, tables: &ScoreTables) -> anyhow::Result<()>;
}

/// JSON file backend. A missing file counts as an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    pub path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> JsonFileStore {
        JsonFileStore { path: path.into() }
    }
}

impl ScoreStore for JsonFileStore {
    fn open(&mut self) -> anyhow::Result<ScoreTables> {
        if !self.path.exists() {
            return Ok(ScoreTables::new());
        }

        let fh = std::fs::File::open(&self.path)
            .context(format!("Failed to open score file {}!", self.path.display()))?;
        let tables: ScoreTables = serde_json::from_reader(std::io::BufReader::new(fh))
            .context(format!("Failed to parse score file {}!", self.path.display()))?;
        Ok(tables)
    }

    fn persist(&mut self, tables: &ScoreTables) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .context(format!("Failed to create directory {}!", dir.display()))?;
            }
        }

        let content = serde_json::to_string_pretty(tables)?;
        std::fs::write(&self.path, content)
            .context(format!("Failed to write score file {}!", self.path.display()))?;
        Ok(())
    }
}

/// In-memory backend, used when nothing should be written to disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub tables: ScoreTables,
}

impl ScoreStore for MemoryStore {
    fn open(&mut self) -> anyhow::Result<ScoreTables> {
        Ok(self.tables.clone())
    }

    fn persist(&mut self, tables: &ScoreTables) -> anyhow::Result<()> {
        self.tables = tables.clone();
        Ok(())
    }
}

/// ScoreLedger keeps the best results per track. The store is opened lazily on first use. If
/// opening fails, the ledger stays unavailable and all operations become no-ops.
#[derive(Debug)]
pub struct ScoreLedger<S: ScoreStore> {
    store: S,
    tables: Option<ScoreTables>,
    unavailable: bool,
}

impl<S: ScoreStore> ScoreLedger<S> {
    pub fn new(store: S) -> ScoreLedger<S> {
        ScoreLedger {
            store,
            tables: None,
            unavailable: false,
        }
    }

    fn ensure_open(&mut self) -> bool {
        if self.unavailable {
            return false;
        }
        if self.tables.is_none() {
            match self.store.open() {
                Ok(tables) => {
                    log::debug!("Opened score store with {} track(s)", tables.len());
                    self.tables = Some(tables);
                }
                Err(e) => {
                    log::warn!("High scores are unavailable: {:#}", e);
                    self.unavailable = true;
                    return false;
                }
            }
        }
        true
    }

    fn persist(&mut self) {
        if let Some(tables) = &self.tables {
            if let Err(e) = self.store.persist(tables) {
                log::warn!("Could not persist high scores: {:#}", e);
            }
        }
    }

    /// The method checks if the backing store could be opened (opening it if necessary).
    pub fn is_available(&mut self) -> bool {
        self.ensure_open()
    }

    /// The method adds every ranked racer to the track's table, keeps the table sorted by ticks
    /// and cut to [`MAX_SCORES`] entries. Returns the number of added results.
    pub fn record_results(&mut self, racers: &[Racer], track_name: &str) -> usize {
        let finishers: Vec<ScoreEntry> = racers
            .iter()
            .filter(|racer| racer.ranking > 0)
            .map(ScoreEntry::from_racer)
            .collect();

        if finishers.is_empty() || !self.ensure_open() {
            return 0;
        }

        let no_added = finishers.len();

        if let Some(tables) = self.tables.as_mut() {
            let table = tables.entry(track_name.to_owned()).or_insert_with(Vec::new);
            table.extend(finishers);
            // stable sort keeps older entries first for equal ticks
            table.sort_by_key(|entry| entry.ticks);
            table.truncate(MAX_SCORES);
        }

        log::info!("Recorded {} result(s) for {}", no_added, track_name);
        self.persist();
        no_added
    }

    /// The method removes the table of the track.
    pub fn clear(&mut self, track_name: &str) {
        if !self.ensure_open() {
            return;
        }

        let removed = self
            .tables
            .as_mut()
            .and_then(|tables| tables.remove(track_name))
            .is_some();

        if removed {
            log::info!("Cleared high scores for {}", track_name);
            self.persist();
        }
    }

    /// The method returns the best results of the track, `None` if there are none (or the store
    /// is unavailable).
    pub fn best(&mut self, track_name: &str) -> Option<&[ScoreEntry]> {
        if !self.ensure_open() {
            return None;
        }

        self.tables
            .as_ref()?
            .get(track_name)
            .filter(|table| !table.is_empty())
            .map(|table| table.as_slice())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
