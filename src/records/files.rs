use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RecordError;

/// `strftime` layout of exported timestamps and generated file names.
pub const TIMESTAMP_FORMAT: &str = "%y-%m-%d-%H-%M";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A file name made of the current timestamp and `file_ending`, placed in
/// `output_dir` when one is given.
pub fn generate_datetime_filename(output_dir: Option<&Path>, file_ending: &str) -> PathBuf {
    let name = format!("{}{file_ending}", timestamp_now());
    match output_dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Creates every missing parent directory of `path`.
pub fn ensure_parent_dirs(path: &Path) -> Result<(), RecordError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))
        }
        _ => Ok(()),
    }
}

/// Files directly inside `dir` whose name ends with `extension`, sorted by path.
pub fn read_files_from_directory(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, RecordError> {
    if !dir.is_dir() {
        return Err(RecordError::NotADirectory(dir.display().to_string()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| io_error(dir, source))? {
        let path = entry.map_err(|source| io_error(dir, source))?.path();
        let matches = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name.ends_with(extension));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn read_text(path: &Path) -> Result<String, RecordError> {
    fs::read_to_string(path).map_err(|source| io_error(path, source))
}

/// Parses a record, as YAML for `.yaml`/`.yml` files and as JSON otherwise.
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T, RecordError> {
    let data = read_text(path)?;
    let is_yaml = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(&data).map_err(|source| RecordError::Yaml {
            path: path.display().to_string(),
            source,
        })
    } else {
        serde_json::from_str(&data).map_err(|source| RecordError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Writes `value` as indented JSON, creating parent directories first.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RecordError> {
    ensure_parent_dirs(path)?;
    let payload = serde_json::to_vec_pretty(value).map_err(|source| RecordError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, payload).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> RecordError {
    RecordError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn lists_matching_files_sorted() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in ["b.json", "a.json", "notes.txt"] {
            fs::write(dir.path().join(name), "{}").expect("write");
        }
        fs::create_dir(dir.path().join("nested.json")).expect("mkdir");

        let files = read_files_from_directory(dir.path(), ".json").expect("list");
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|s| s.to_str()))
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = read_files_from_directory(&dir.path().join("absent"), ".json").unwrap_err();
        assert!(matches!(err, RecordError::NotADirectory(_)));
    }

    #[test]
    fn write_creates_parents_and_reads_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("deep/er/record.json");
        let mut value = BTreeMap::new();
        value.insert("conv_len".to_string(), 3);

        write_json(&path, &value).expect("write");
        let back: BTreeMap<String, i32> = read_record(&path).expect("read");
        assert_eq!(back, value);
        assert!(read_text(&path).expect("text").contains("\n  \"conv_len\": 3"));
    }

    #[test]
    fn yaml_is_chosen_by_extension() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("record.yml");
        fs::write(&path, "conv_len: 5\n").expect("write");
        let back: BTreeMap<String, i32> = read_record(&path).expect("read");
        assert_eq!(back.get("conv_len"), Some(&5));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ nope").expect("write");
        let err = read_record::<BTreeMap<String, i32>>(&path).unwrap_err();
        assert!(matches!(err, RecordError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn datetime_filename_uses_timestamp_layout() {
        let path = generate_datetime_filename(Some(Path::new("out")), ".json");
        let name = path.file_name().and_then(|s| s.to_str()).expect("name");
        assert!(path.starts_with("out"));
        assert!(name.ends_with(".json"));
        assert_eq!(name.len(), "24-01-01-00-00.json".len());
    }
}
