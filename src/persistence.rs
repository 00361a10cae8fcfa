// File: src/persistence.rs
use crate::catalogue::{RecipeSource, ReviewStore, ViewCounter};
use crate::core::types::{RecipeRow, Review};
use crate::error::{EngineError, Result};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Writes through a temp file in the target's directory, then renames it over
/// `path`. Readers never observe a half-written file.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> Result<()>,
{
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| EngineError::Io(e.error))?;
    Ok(())
}

/// Opens `path` for reading, mapping a missing file to `None`.
fn open_if_exists(path: &Path) -> Result<Option<BufReader<File>>> {
    match File::open(path) {
        Ok(file) => Ok(Some(BufReader::new(file))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Reviews persisted as a JSON object mapping recipe name to a list of reviews.
///
/// The whole map is mirrored in memory and rewritten on every append.
pub struct JsonReviewStore {
    path: PathBuf,
    reviews: Mutex<BTreeMap<String, Vec<Review>>>,
}

impl JsonReviewStore {
    /// Loads the file at `path`; a missing file starts an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let reviews: BTreeMap<String, Vec<Review>> = match open_if_exists(&path)? {
            Some(reader) => serde_json::from_reader(reader)?,
            None => {
                info!(path = %path.display(), "no review file yet, starting empty");
                BTreeMap::new()
            }
        };
        debug!(recipes = reviews.len(), "loaded reviews");
        Ok(Self { path, reviews: Mutex::new(reviews) })
    }

    fn save(&self, reviews: &BTreeMap<String, Vec<Review>>) -> Result<()> {
        write_atomically(&self.path, |writer| {
            serde_json::to_writer_pretty(writer, reviews)?;
            Ok(())
        })
    }
}

impl ReviewStore for JsonReviewStore {
    fn load_all(&self) -> Result<Vec<(String, Vec<Review>)>> {
        Ok(self
            .reviews
            .lock()
            .iter()
            .map(|(name, reviews)| (name.clone(), reviews.clone()))
            .collect())
    }

    fn append(&self, recipe_name: &str, review: &Review) -> Result<()> {
        let mut reviews = self.reviews.lock();
        reviews.entry(recipe_name.to_string()).or_default().push(review.clone());
        if let Err(e) = self.save(&reviews) {
            // Keep memory in line with what is on disk.
            if let Some(list) = reviews.get_mut(recipe_name) {
                list.pop();
                if list.is_empty() {
                    reviews.remove(recipe_name);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn reviews_for(&self, recipe_name: &str) -> Result<Vec<Review>> {
        Ok(self.reviews.lock().get(recipe_name).cloned().unwrap_or_default())
    }

    fn reviewed_recipes(&self) -> Result<Vec<String>> {
        Ok(self
            .reviews
            .lock()
            .iter()
            .filter(|(_, reviews)| !reviews.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }
}

/// Recipe rows read from a JSON array file on every call.
pub struct JsonRecipeFile {
    path: PathBuf,
    // Serializes read-modify-write cycles in `add_recipe`.
    write_lock: Mutex<()>,
}

impl JsonRecipeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    fn read_rows(&self) -> Result<Vec<RecipeRow>> {
        match open_if_exists(&self.path)? {
            Some(reader) => Ok(serde_json::from_reader(reader)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replaces the file contents with `rows`.
    pub fn write(&self, rows: &[RecipeRow]) -> Result<()> {
        write_atomically(&self.path, |writer| {
            serde_json::to_writer_pretty(writer, rows)?;
            Ok(())
        })
    }
}

impl RecipeSource for JsonRecipeFile {
    fn recipes(&self) -> Result<Vec<RecipeRow>> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no recipe file, catalogue is empty");
        }
        self.read_rows()
    }

    fn add_recipe(&self, row: &RecipeRow) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut rows = self.read_rows()?;
        rows.push(row.clone());
        self.write(&rows)
    }
}

/// View counters kept in memory and snapshotted with bincode after each change.
pub struct FileViewCounter {
    path: PathBuf,
    counts: Mutex<HashMap<String, u64>>,
}

impl FileViewCounter {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let counts: HashMap<String, u64> = match open_if_exists(&path)? {
            Some(reader) => bincode::deserialize_from(reader)?,
            None => HashMap::new(),
        };
        debug!(recipes = counts.len(), "loaded view counters");
        Ok(Self { path, counts: Mutex::new(counts) })
    }
}

impl ViewCounter for FileViewCounter {
    fn increment(&self, recipe_name: &str) -> Result<u64> {
        let mut counts = self.counts.lock();
        let count = {
            let entry = counts.entry(recipe_name.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };
        if let Err(e) = write_atomically(&self.path, |writer| {
            bincode::serialize_into(writer, &*counts)?;
            Ok(())
        }) {
            if let Some(entry) = counts.get_mut(recipe_name) {
                *entry -= 1;
                if *entry == 0 {
                    counts.remove(recipe_name);
                }
            }
            return Err(e);
        }
        Ok(count)
    }

    fn counts(&self) -> Result<Vec<(String, u64)>> {
        Ok(self.counts.lock().iter().map(|(n, c)| (n.clone(), *c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn review(user: &str, rating: f64) -> Review {
        Review { username: user.into(), rating, comment: "ok".into(), timestamp: 1.5 }
    }

    #[test]
    fn reviews_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reviews.json");

        let store = JsonReviewStore::open(&path).unwrap();
        assert!(store.load_all().unwrap().is_empty());
        store.append("Bannock", &review("ana", 5.0)).unwrap();
        store.append("Bannock", &review("bo", 3.0)).unwrap();
        drop(store);

        let reopened = JsonReviewStore::open(&path).unwrap();
        let reviews = reopened.reviews_for("Bannock").unwrap();
        assert_eq!(reviews, vec![review("ana", 5.0), review("bo", 3.0)]);
    }

    #[test]
    fn review_file_is_a_name_keyed_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reviews.json");
        let json = r#"{"Wild Rice": [
            {"username": "u", "rating": 4, "comment": "", "timestamp": 1700000000.25}
        ]}"#;
        fs::write(&path, json).unwrap();

        let store = JsonReviewStore::open(&path).unwrap();
        let reviews = store.reviews_for("Wild Rice").unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 4.0);
        assert_eq!(store.reviewed_recipes().unwrap(), vec!["Wild Rice".to_string()]);
    }

    #[test]
    fn corrupt_review_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reviews.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonReviewStore::open(&path), Err(EngineError::Json(_))));
    }

    #[test]
    fn recipe_file_round_trips_and_tolerates_absence() {
        let dir = tempdir().unwrap();
        let file = JsonRecipeFile::new(dir.path().join("recipes.json"));
        assert!(file.recipes().unwrap().is_empty());

        let rows = vec![RecipeRow::new("Bannock", "flour\nwater\nlard")];
        file.write(&rows).unwrap();
        assert_eq!(file.recipes().unwrap(), rows);
    }

    #[test]
    fn added_recipes_are_appended_to_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        let file = JsonRecipeFile::new(&path);
        file.add_recipe(&RecipeRow::new("Bannock", "flour")).unwrap();
        file.add_recipe(&RecipeRow::new("Pemmican", "bison")).unwrap();

        let reopened = JsonRecipeFile::new(&path);
        let names: Vec<String> = reopened.recipes().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Bannock", "Pemmican"]);
    }

    #[test]
    fn view_counts_are_snapshotted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("views.bin");

        let views = FileViewCounter::open(&path).unwrap();
        views.increment("Bannock").unwrap();
        views.increment("Bannock").unwrap();
        views.increment("Pemmican").unwrap();
        drop(views);

        let reopened = FileViewCounter::open(&path).unwrap();
        let mut counts = reopened.counts().unwrap();
        counts.sort();
        assert_eq!(
            counts,
            vec![("Bannock".to_string(), 2), ("Pemmican".to_string(), 1)]
        );
        assert_eq!(reopened.increment("Bannock").unwrap(), 3);
    }
}
