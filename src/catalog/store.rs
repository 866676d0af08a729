//! Append-only keyed JSON-line stores.
//!
//! A [`CatalogStore`] is two log files: a data log of JSON values, one per
//! line, and an index log of `[key, offset]` lines pointing into it. An
//! append writes the data line first, then the index line; the index line
//! is the commit point, so a torn write leaves at worst an orphaned data
//! record that no index entry references. On open the index is replayed
//! into memory and a torn final line is cut off. Committed records are
//! immutable; refreshing a catalog means truncating and refilling it.

use std::collections::{HashMap, VecDeque};
use std::fs::{self, File, OpenOptions};
use std::hash::Hash;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CatalogError;

/// Records memoized per store. Keeps hot recipe-graph nodes in memory
/// without loading whole catalogs.
const MEMO_CAPACITY: usize = 256;

/// Append-only store of `K -> V` records on disk.
///
/// Lookups go through a small in-memory memo, so `get` works on a shared
/// reference and hands out [`Arc`]s that strategy graphs can hold on to.
pub struct CatalogStore<K, V> {
    index_path: PathBuf,
    data_path: PathBuf,
    index: HashMap<K, u64>,
    index_file: File,
    data_file: File,
    data_len: u64,
    reader: Mutex<ReadState<K, V>>,
}

struct ReadState<K, V> {
    file: File,
    memo: Memo<K, V>,
}

impl<K, V> CatalogStore<K, V>
where
    K: Eq + Hash + Clone + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    /// Open (or create) the store `{prefix}index.json` / `{prefix}data.json`
    /// under `dir`, replaying the index log.
    pub fn open(dir: &Path, prefix: &str) -> Result<Self, CatalogError> {
        fs::create_dir_all(dir)?;
        let index_path = dir.join(index_name(prefix));
        let data_path = dir.join(data_name(prefix));

        let data_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&data_path)?;
        let data_len = data_file.metadata()?.len();

        let index = replay_index(&index_path, data_len)?;

        let index_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&index_path)?;
        let reader = File::open(&data_path)?;

        debug!(
            index = %index_path.display(),
            records = index.len(),
            "opened catalog store"
        );

        Ok(Self {
            index_path,
            data_path,
            index,
            index_file,
            data_file,
            data_len,
            reader: Mutex::new(ReadState {
                file: reader,
                memo: Memo::new(MEMO_CAPACITY),
            }),
        })
    }

    /// Append one record. Keys are write-once.
    pub fn add(&mut self, key: K, value: &V) -> Result<(), CatalogError> {
        if self.index.contains_key(&key) {
            return Err(CatalogError::DuplicateKey {
                key: display_key(&key),
            });
        }

        let offset = self.data_len;
        let mut line = serde_json::to_string(value)?;
        line.push('\n');
        // The data line lands before the index line, so a crash between
        // the two leaves only an orphaned record.
        self.data_file.write_all(line.as_bytes())?;
        self.data_len += line.len() as u64;

        let mut entry = serde_json::to_string(&(&key, offset))?;
        entry.push('\n');
        self.index_file.write_all(entry.as_bytes())?;

        self.index.insert(key, offset);
        Ok(())
    }

    /// Fetch one record, reading through the memo.
    pub fn get(&self, key: &K) -> Result<Option<Arc<V>>, CatalogError> {
        let Some(&offset) = self.index.get(key) else {
            return Ok(None);
        };

        let mut state = self.reader.lock();
        if let Some(hit) = state.memo.get(key) {
            return Ok(Some(hit));
        }

        state.file.seek(SeekFrom::Start(offset))?;
        let mut line = String::new();
        let read = BufReader::new(&state.file).read_line(&mut line)?;
        if read == 0 {
            return Err(CatalogError::CorruptIndex {
                file: self.data_path.display().to_string(),
                offset,
            });
        }

        let value: V = serde_json::from_str(line.trim_end())?;
        let value = Arc::new(value);
        state.memo.insert(key.clone(), Arc::clone(&value));
        Ok(Some(value))
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.index.keys()
    }

    /// Stream every committed record in insertion order. Orphaned data
    /// lines that never got an index entry are skipped over.
    pub fn scan(&self) -> Result<Scan<K, V>, CatalogError> {
        let mut entries: Vec<(K, u64)> = self
            .index
            .iter()
            .map(|(key, &offset)| (key.clone(), offset))
            .collect();
        entries.sort_unstable_by_key(|&(_, offset)| offset);

        Ok(Scan {
            entries: entries.into_iter(),
            reader: BufReader::new(File::open(&self.data_path)?),
            position: 0,
            data_path: self.data_path.clone(),
            _value: PhantomData,
        })
    }

    /// Drop every record. The files stay open for refilling.
    pub fn truncate(&mut self) -> Result<(), CatalogError> {
        // Uncommit first: an index without data lies, data without index
        // is just an orphan.
        self.index_file.set_len(0)?;
        self.data_file.set_len(0)?;
        self.data_len = 0;
        self.index.clear();
        self.reader.lock().memo.clear();
        Ok(())
    }

    /// Remove the store's files without opening it.
    pub fn wipe(dir: &Path, prefix: &str) -> Result<(), CatalogError> {
        for name in [index_name(prefix), data_name(prefix)] {
            match fs::remove_file(dir.join(name)) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Time since the last committed append, or `None` when the store has
    /// never been written. The index file is written last on every append,
    /// so its mtime is the freshness marker.
    #[must_use]
    pub fn last_write_age(dir: &Path, prefix: &str) -> Option<Duration> {
        let meta = fs::metadata(dir.join(index_name(prefix))).ok()?;
        meta.modified().ok()?.elapsed().ok()
    }
}

fn index_name(prefix: &str) -> String {
    format!("{prefix}index.json")
}

fn data_name(prefix: &str) -> String {
    format!("{prefix}data.json")
}

fn display_key<K: Serialize>(key: &K) -> String {
    serde_json::to_string(key).unwrap_or_else(|_| "<unprintable>".into())
}

/// Replay the index log. Every valid line must parse as `[key, offset]`,
/// point inside the data log and end with a newline; the first line that
/// fails is a torn tail and the file is truncated back to the last good
/// prefix.
fn replay_index<K>(path: &Path, data_len: u64) -> Result<HashMap<K, u64>, CatalogError>
where
    K: Eq + Hash + DeserializeOwned,
{
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(err) => return Err(err.into()),
    };

    let mut index = HashMap::new();
    let mut valid = 0usize;
    for line in text.split_inclusive('\n') {
        if !line.ends_with('\n') {
            break;
        }
        match serde_json::from_str::<(K, u64)>(line.trim_end()) {
            Ok((key, offset)) if offset < data_len => {
                index.insert(key, offset);
                valid += line.len();
            }
            _ => break,
        }
    }

    if valid < text.len() {
        warn!(
            file = %path.display(),
            keep_bytes = valid,
            drop_bytes = text.len() - valid,
            "index log has a torn tail, truncating"
        );
        OpenOptions::new().write(true).open(path)?.set_len(valid as u64)?;
    }

    Ok(index)
}

/// Iterator over committed records, cheapest when consumed in full.
pub struct Scan<K, V> {
    entries: std::vec::IntoIter<(K, u64)>,
    reader: BufReader<File>,
    position: u64,
    data_path: PathBuf,
    _value: PhantomData<V>,
}

impl<K, V> Scan<K, V>
where
    V: DeserializeOwned,
{
    fn read_at(&mut self, key: K, offset: u64) -> Result<(K, V), CatalogError> {
        if offset != self.position {
            self.reader.seek(SeekFrom::Start(offset))?;
        }
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Err(CatalogError::CorruptIndex {
                file: self.data_path.display().to_string(),
                offset,
            });
        }
        self.position = offset + read as u64;
        let value: V = serde_json::from_str(line.trim_end())?;
        Ok((key, value))
    }
}

impl<K, V> Iterator for Scan<K, V>
where
    V: DeserializeOwned,
{
    type Item = Result<(K, V), CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, offset) = self.entries.next()?;
        Some(self.read_at(key, offset))
    }
}

/// Fixed-capacity LRU of recently read records.
struct Memo<K, V> {
    capacity: usize,
    map: HashMap<K, Arc<V>>,
    recency: VecDeque<K>,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
        }
    }

    fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let hit = self.map.get(key).cloned()?;
        self.touch(key);
        Some(hit)
    }

    fn insert(&mut self, key: K, value: Arc<V>) {
        if self.map.insert(key.clone(), value).is_some() {
            self.touch(&key);
            return;
        }
        self.recency.push_back(key);
        while self.map.len() > self.capacity {
            let Some(evicted) = self.recency.pop_front() else {
                break;
            };
            self.map.remove(&evicted);
        }
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(pos);
            self.recency.push_back(key.clone());
        }
    }

    fn clear(&mut self) {
        self.map.clear();
        self.recency.clear();
    }
}
