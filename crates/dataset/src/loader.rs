//! Facility dataset loader.
//!
//! Reads a delimited file of facility rows, tolerates the column-name drift
//! seen across data exports, and derives category and knowledge text per row.
//!
//! Loading never fails the caller: a missing or unparseable file produces an
//! empty [`Dataset`] whose [`DataStatus`] carries the reason, so the map can
//! still render (empty, with a warning) and chat keeps working.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use baymed_core::facility::UNKNOWN_NAME;
use baymed_core::{Category, DataError, FacilityRecord};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

const LATITUDE_COLUMNS: &[&str] = &["lat", "latitude", "纬度", "y"];
const LONGITUDE_COLUMNS: &[&str] = &["lon", "lng", "long", "longitude", "经度", "x"];
const TYPE_COLUMNS: &[&str] = &["类型", "type", "category", "机构类型", "医院类型"];
const NAME_COLUMNS: &[&str] = &["name", "名称"];
const ALT_NAME_COLUMNS: &[&str] = &["医院名称", "机构名称", "name_en", "english_name"];
const ADDRESS_COLUMNS: &[&str] = &["address", "地址", "详细地址", "addr", "adress"];
const KNOWLEDGE_COLUMNS: &[&str] = &["knowledge_text", "knowledge", "kb_text", "知识库", "知识库文本"];

const POLICY_TOKENS: &[&str] = &["港澳", "药械通", "医疗券", "Policy"];
const TIER_A_TOKENS: &[&str] = &["三甲", "TierA"];

/// Whether the source could be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DataStatus {
    Loaded,
    Unavailable { reason: String },
}

impl DataStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, DataStatus::Loaded)
    }
}

/// The immutable, normalized facility set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub records: Vec<FacilityRecord>,
    pub status: DataStatus,
}

impl Dataset {
    /// Read `path`, converting any failure into an empty, unavailable dataset.
    pub fn read(path: &Path) -> Self {
        match read_records(path) {
            Ok(records) => {
                info!(path = %path.display(), count = records.len(), "Facility dataset loaded");
                Self {
                    records,
                    status: DataStatus::Loaded,
                }
            }
            Err(e) => {
                warn!(error = %e, "Facility dataset unavailable, continuing with an empty map");
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            status: DataStatus::Unavailable {
                reason: reason.into(),
            },
        }
    }

    /// All knowledge lines joined, one record per line.
    pub fn knowledge_base(&self) -> String {
        knowledge_base(&self.records)
    }
}

/// Memoizing loader: the file is read at most once per loader.
pub struct DatasetLoader {
    path: PathBuf,
    cache: OnceLock<Arc<Dataset>>,
}

impl DatasetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load (first call) or return the cached dataset (every later call).
    pub fn load(&self) -> Arc<Dataset> {
        self.cache
            .get_or_init(|| Arc::new(Dataset::read(&self.path)))
            .clone()
    }
}

/// Join knowledge text of `records`, one per line.
pub fn knowledge_base(records: &[FacilityRecord]) -> String {
    records
        .iter()
        .map(|r| r.knowledge_text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Category from a raw type string. Policy tokens win over Tier-A tokens.
pub fn categorize(raw_type: Option<&str>) -> Category {
    let Some(raw) = raw_type else {
        return Category::Other;
    };
    if POLICY_TOKENS.iter().any(|t| raw.contains(t)) {
        Category::PolicyDesignated
    } else if TIER_A_TOKENS.iter().any(|t| raw.contains(t)) {
        Category::TierAOnly
    } else {
        Category::Other
    }
}

fn read_records(path: &Path) -> Result<Vec<FacilityRecord>, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| DataError::ReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    parse_records(file, delimiter_for(path)).map_err(|reason| DataError::Malformed {
        path: path.to_path_buf(),
        reason,
    })
}

fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}

/// Parse delimited text into normalized records.
pub(crate) fn parse_records<R: Read>(reader: R, delimiter: u8) -> Result<Vec<FacilityRecord>, String> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| format!("failed to read header row: {e}"))?
        .clone();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err("no header row".into());
    }

    let columns = ColumnMap::resolve(&headers);
    debug!(?columns, "Resolved dataset columns");

    let mut records = Vec::new();
    for (line, row) in rdr.records().enumerate() {
        let row = row.map_err(|e| format!("row {}: {e}", line + 2))?;
        records.push(columns.normalize(&row));
    }

    Ok(records)
}

/// Positions of the columns we care about, after alias resolution.
#[derive(Debug, Default)]
struct ColumnMap {
    latitude: Option<usize>,
    longitude: Option<usize>,
    raw_type: Option<usize>,
    name: Option<usize>,
    alt_name: Option<usize>,
    address: Option<usize>,
    knowledge: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Self {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();

        let find = |aliases: &[&str]| {
            aliases.iter().find_map(|alias| {
                let alias = alias.to_lowercase();
                normalized.iter().position(|h| *h == alias)
            })
        };

        Self {
            latitude: find(LATITUDE_COLUMNS),
            longitude: find(LONGITUDE_COLUMNS),
            raw_type: find(TYPE_COLUMNS),
            name: find(NAME_COLUMNS),
            alt_name: find(ALT_NAME_COLUMNS),
            address: find(ADDRESS_COLUMNS),
            knowledge: find(KNOWLEDGE_COLUMNS),
        }
    }

    fn normalize(&self, row: &StringRecord) -> FacilityRecord {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let coordinate = |idx: Option<usize>| {
            cell(idx)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };

        let raw_type = cell(self.raw_type);
        let category = categorize(raw_type.as_deref());
        let name = cell(self.name)
            .or_else(|| cell(self.alt_name))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let address = cell(self.address);
        let knowledge_text = cell(self.knowledge).unwrap_or_else(|| {
            format!(
                "{name}（{}）地址：{}",
                category.label(),
                address.as_deref().unwrap_or("未知")
            )
        });

        FacilityRecord {
            name,
            latitude: coordinate(self.latitude),
            longitude: coordinate(self.longitude),
            category,
            raw_type,
            address,
            knowledge_text,
        }
    }
}
