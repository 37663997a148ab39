use std::path::PathBuf;

pub fn default_source_path() -> PathBuf {
    if let Ok(path) = std::env::var("GETUSAGE_SOURCE") {
        return PathBuf::from(path);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".getusage").join("usage");
    }
    PathBuf::from("usage")
}
