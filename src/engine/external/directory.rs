use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use log::{debug, info};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::spatial;
use crate::engine::pressure::PressureSample;
use crate::engine::store::{ConfigLabel, ParameterRecord, RunStats, Store};
use crate::error::{EcmcError, Result};

const PARAMETERS_FILE: &str = "parameters.json";
const STATS_FILE: &str = "stats.json";
const COUNT_FILE: &str = "count.json";
const SERIES: [&str; 3] = ["pressure", "pressure_x", "pressure_y"];
const INITIAL_CONFIG_FILE: &str = "config-init.csv";

/// One disk in a configuration file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PositionRow {
    x: f64,
    y: f64,
}

/// Run store laid out as a directory mirroring the hierarchical key space:
///
/// ```text
/// <root>/parameters.json      Nx, Ny, N, eta, L, sigma, slant, shape
/// <root>/config-init.csv      x,y per disk
/// <root>/config-<k>.csv
/// <root>/count.json           latest snapshot index
/// <root>/pressure.csv         one value per interval (also _x, _y)
/// <root>/stats.json           start_time, end_time, collisions, EPH
/// ```
pub struct DirectoryStore {
    root: PathBuf,
    stats: Map<String, Value>,
}

impl DirectoryStore {
    /// Creates the store directory, discarding files left by a previous run.
    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        for entry in fs::read_dir(&root)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if is_store_file(name) {
                fs::remove_file(&path)?;
            }
        }
        info!("Writing run store to {}", root.display());

        Ok(Self {
            root,
            stats: Map::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let file = File::create(self.path(name))?;
        serde_json::to_writer_pretty(file, value)?;
        Ok(())
    }

    fn flush_stats(&self) -> Result<()> {
        self.write_json(STATS_FILE, &self.stats)
    }
}

fn is_store_file(name: &str) -> bool {
    if name == PARAMETERS_FILE || name == STATS_FILE || name == COUNT_FILE {
        return true;
    }
    if SERIES.iter().any(|s| name == format!("{s}.csv")) {
        return true;
    }
    name.starts_with("config-") && name.ends_with(".csv")
}

impl Store for DirectoryStore {
    fn name(&self) -> &str {
        "directory"
    }

    fn begin(&mut self, parameters: &ParameterRecord, start_time: &str) -> Result<()> {
        self.write_json(PARAMETERS_FILE, parameters)?;

        for series in SERIES {
            let mut wtr = csv::Writer::from_path(self.path(&format!("{series}.csv")))?;
            wtr.write_record([series])?;
            wtr.flush()?;
        }

        self.stats
            .insert("start_time".into(), Value::String(start_time.to_string()));
        self.flush_stats()
    }

    fn write_configuration(
        &mut self,
        label: ConfigLabel,
        positions: &[Point2<f64>],
        collisions: u64,
    ) -> Result<()> {
        let name = label.name();
        let mut wtr = csv::Writer::from_path(self.path(&format!("{name}.csv")))?;
        for p in positions {
            wtr.serialize(PositionRow { x: p.x, y: p.y })?;
        }
        wtr.flush()?;

        self.write_json(COUNT_FILE, &label.count())?;
        self.stats.insert("collisions".into(), Value::from(collisions));
        self.flush_stats()?;
        debug!("Stored {} ({} disks)", name, positions.len());
        Ok(())
    }

    fn append_pressure(&mut self, sample: &PressureSample) -> Result<()> {
        let values = [sample.pressure, sample.pressure_x, sample.pressure_y];
        for (series, value) in SERIES.iter().zip(values) {
            let file = OpenOptions::new()
                .append(true)
                .open(self.path(&format!("{series}.csv")))?;
            let mut wtr = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            wtr.serialize(value)?;
            wtr.flush()?;
        }
        Ok(())
    }

    fn finish(&mut self, stats: &RunStats) -> Result<()> {
        self.stats = match serde_json::to_value(stats)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.flush_stats()
    }
}

/// Reads one stored pressure series (`pressure`, `pressure_x` or `pressure_y`).
pub fn read_series(root: impl AsRef<Path>, series: &str) -> Result<Vec<f64>> {
    let mut rdr = csv::Reader::from_path(root.as_ref().join(format!("{series}.csv")))?;
    let mut values = Vec::new();
    for record in rdr.deserialize() {
        values.push(record?);
    }
    Ok(values)
}

/// Loads a starting configuration of `n` disks.
///
/// `path` is either a run store directory (its `config-init.csv` is used) or a
/// position CSV with an `x,y` header. A path that does not exist yields `None`,
/// meaning the caller should generate a configuration. Positions are wrapped
/// into the centred box.
pub fn read_configuration(
    path: &Path,
    n: usize,
    box_size: &[f64; 2],
) -> Result<Option<Vec<Point2<f64>>>> {
    if !path.exists() {
        return Ok(None);
    }
    let file = if path.is_dir() {
        path.join(INITIAL_CONFIG_FILE)
    } else {
        path.to_path_buf()
    };
    let malformed = |reason: String| EcmcError::MalformedInput {
        path: file.clone(),
        reason,
    };

    let mut rdr = csv::Reader::from_path(&file).map_err(|e| malformed(e.to_string()))?;
    let mut positions = Vec::with_capacity(n);
    for (line, record) in rdr.deserialize::<PositionRow>().enumerate() {
        let row = record.map_err(|e| malformed(e.to_string()))?;
        if !row.x.is_finite() || !row.y.is_finite() {
            return Err(malformed(format!("non-finite position on row {}", line + 1)));
        }
        let mut p = Point2::new(row.x, row.y);
        spatial::wrap_point(&mut p, box_size);
        positions.push(p);
    }

    if positions.len() != n {
        return Err(malformed(format!(
            "expected {} disks, found {}",
            n,
            positions.len()
        )));
    }
    info!("Read initial configuration from {}", file.display());
    Ok(Some(positions))
}
