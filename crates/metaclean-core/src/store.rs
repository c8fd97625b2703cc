//! Persistence of batch results.
//!
//! [`BatchProcessor`](crate::BatchProcessor) never touches the filesystem
//! beyond reading images. This module is what a caller uses afterwards:
//!
//! - [`IndexStore`] loads and saves the index file inside the root directory.
//! - [`OutcomeWriter`] overwrites images with their stripped bytes and records
//!   extracted locations, either as one `<image>.json` per file or as a single
//!   tab-separated [`LocationTable`].
//!
//! A location is always persisted before its image is overwritten, since the
//! stripped image no longer carries it. Writes are best effort per file: an
//! image that was not overwritten is listed in [`WriteReport::unwritten`] and
//! should be dropped from the index so the next run retries it.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{IndexConfig, LocationConfig, SidecarFormat};
use crate::error::{MetacleanError, Result};
use crate::index::{normalize_path, FileIndex};
use crate::types::{Coordinate, ProcessingOutcome};

/// Reads and writes the index file of one root directory.
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(root: &Path, config: &IndexConfig) -> Self {
        Self {
            path: root.join(&config.file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the index. A missing file is an empty index.
    pub fn load(&self) -> Result<FileIndex> {
        match std::fs::read(&self.path) {
            Ok(data) => Ok(FileIndex::deserialize(&data)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileIndex::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the index file with `index`.
    pub fn save(&self, index: &FileIndex) -> Result<()> {
        write_atomic(&self.path, &index.serialize())?;
        Ok(())
    }
}

/// Write to a sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path).inspect_err(|_| {
        let _ = std::fs::remove_file(&tmp);
    })
}

/// A write that failed while persisting outcomes.
#[derive(Debug)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub error: MetacleanError,
}

/// What [`OutcomeWriter::write`] did.
#[derive(Debug, Default)]
pub struct WriteReport {
    pub images_written: usize,
    pub locations_written: usize,
    pub failures: Vec<WriteFailure>,
    /// Successful outcomes whose image was left untouched
    pub unwritten: Vec<PathBuf>,
}

impl WriteReport {
    /// Drop every unwritten image from `index` so it is processed again.
    pub fn forget_unwritten(&self, index: &mut FileIndex) {
        for path in &self.unwritten {
            index.remove(path);
        }
    }

    fn skip(&mut self, path: &Path) {
        self.unwritten.push(path.to_path_buf());
    }
}

/// Persists successful outcomes: stripped images and their locations.
pub struct OutcomeWriter {
    table_path: PathBuf,
    sidecar: SidecarFormat,
}

impl OutcomeWriter {
    pub fn new(root: &Path, config: &LocationConfig) -> Self {
        Self {
            table_path: root.join(&config.table_file_name),
            sidecar: config.sidecar,
        }
    }

    /// Write every [`ProcessingOutcome::Success`]; failures are ignored.
    ///
    /// In table mode all rows are merged before any image is touched. If the
    /// merge fails, located images are left as they are.
    pub fn write(&self, outcomes: &[ProcessingOutcome]) -> WriteReport {
        let mut report = WriteReport::default();

        let table_saved = match self.sidecar {
            SidecarFormat::Json => true,
            SidecarFormat::Table => self.save_table_rows(outcomes, &mut report),
        };

        for outcome in outcomes {
            let ProcessingOutcome::Success {
                path,
                stripped,
                location,
                ..
            } = outcome
            else {
                continue;
            };

            if let Some(location) = location {
                let saved = match self.sidecar {
                    SidecarFormat::Json => match write_json_sidecar(path, location) {
                        Ok(_) => {
                            report.locations_written += 1;
                            true
                        }
                        Err(error) => {
                            report.failures.push(WriteFailure {
                                path: path.clone(),
                                error,
                            });
                            false
                        }
                    },
                    SidecarFormat::Table => table_saved,
                };
                if !saved {
                    report.skip(path);
                    continue;
                }
            }

            match std::fs::write(path, stripped) {
                Ok(()) => report.images_written += 1,
                Err(e) => {
                    report.failures.push(WriteFailure {
                        path: path.clone(),
                        error: e.into(),
                    });
                    report.skip(path);
                }
            }
        }

        report
    }

    /// Merge every extracted location into the table file.
    fn save_table_rows(&self, outcomes: &[ProcessingOutcome], report: &mut WriteReport) -> bool {
        let rows: Vec<(&Path, Coordinate)> = outcomes
            .iter()
            .filter_map(|o| o.location().map(|location| (o.path(), location)))
            .collect();
        if rows.is_empty() {
            return true;
        }

        let count = rows.len();
        match self.merge_into_table(rows) {
            Ok(()) => {
                report.locations_written += count;
                true
            }
            Err(error) => {
                report.failures.push(WriteFailure {
                    path: self.table_path.clone(),
                    error,
                });
                false
            }
        }
    }

    fn merge_into_table(&self, rows: Vec<(&Path, Coordinate)>) -> Result<()> {
        let mut table = match std::fs::read_to_string(&self.table_path) {
            Ok(text) => LocationTable::parse(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => LocationTable::default(),
            Err(e) => return Err(e.into()),
        };
        for (path, location) in rows {
            table.insert(path, location);
        }
        write_atomic(&self.table_path, table.render().as_bytes())?;
        Ok(())
    }
}

/// Path of the JSON sidecar for an image: the full file name plus `.json`.
///
/// Keeping the image extension stops `a.jpg` and `a.png` from sharing a
/// sidecar.
fn sidecar_path(image: &Path) -> PathBuf {
    let mut name: OsString = image.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Write `{"latitude": .., "longitude": ..}` next to `image`.
pub fn write_json_sidecar(image: &Path, location: &Coordinate) -> Result<PathBuf> {
    let path = sidecar_path(image);
    let json = serde_json::to_string_pretty(location)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

/// Consolidated `path\tlatitude\tlongitude` table, one row per image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationTable {
    rows: BTreeMap<PathBuf, Coordinate>,
}

impl LocationTable {
    /// Parse the table text. Blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut table = Self::default();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let malformed = || MetacleanError::MalformedLocationRow { line: i + 1 };

            let mut fields = line.split('\t');
            let (Some(path), Some(lat), Some(lon), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed());
            };
            let latitude = lat.trim().parse::<f64>().map_err(|_| malformed())?;
            let longitude = lon.trim().parse::<f64>().map_err(|_| malformed())?;
            table.insert(Path::new(path), Coordinate::new(latitude, longitude));
        }
        Ok(table)
    }

    /// Render sorted by path, coordinates with six decimals.
    pub fn render(&self) -> String {
        self.rows
            .iter()
            .map(|(path, c)| {
                format!(
                    "{}\t{:.6}\t{:.6}\n",
                    path.to_string_lossy(),
                    c.latitude,
                    c.longitude
                )
            })
            .collect()
    }

    pub fn insert(&mut self, path: &Path, location: Coordinate) {
        self.rows.insert(normalize_path(path), location);
    }
}
