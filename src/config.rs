use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::ReportError;
use crate::registry::{Category, Registry};

pub const CONFIG_ENV: &str = "UNDERPANTS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "underpants.toml";

const DATA_DIR: &str = "/admin/consult/data";
const DEFAULT_SORT_CATEGORY: &str = "food-warnings";

/// Everything a run needs to know about where data lives. Built once, never mutated.
#[derive(Clone, Debug)]
pub struct Config {
    pub registry: Registry,
    pub roster_path: PathBuf,
    /// Roster placeholders that do not name a working consultant.
    pub excluded_names: BTreeSet<String>,
    /// File the configuration was read from, if any.
    pub source: Option<PathBuf>,
}

/// On-disk form; any field left out keeps its built-in value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    categories: Option<Vec<Category>>,
    default_category: Option<String>,
    roster_path: Option<PathBuf>,
    excluded_names: Option<Vec<String>>,
}

fn builtin_categories() -> Vec<Category> {
    let data = Path::new(DATA_DIR);
    vec![
        Category { name: "food-warnings".to_string(), short_name: "food".to_string(), flag: 'f', path: data.join("food-warnings") },
        Category { name: "printer-warnings".to_string(), short_name: "print".to_string(), flag: 'p', path: data.join("printer-warnings") },
    ]
}

fn builtin_excluded() -> BTreeSet<String> {
    ["FREE", "HOLIDAY", "CLOSED"].into_iter().map(|s| s.to_string()).collect()
}

impl Config {
    pub fn builtin() -> Result<Self, ReportError> {
        Ok(Self {
            registry: Registry::new(builtin_categories(), DEFAULT_SORT_CATEGORY.to_string())?,
            roster_path: Path::new(DATA_DIR).join("sched").join("sched.consultnicks"),
            excluded_names: builtin_excluded(),
            source: None,
        })
    }
}

/// Picks the config file: explicit flag, then environment, then `underpants.toml`.
/// The bool says whether the file must exist.
pub fn resolve_path(explicit: Option<&Path>, env: Option<PathBuf>) -> (PathBuf, bool) {
    if let Some(p) = explicit { return (p.to_path_buf(), true); }
    if let Some(p) = env && !p.as_os_str().is_empty() { return (p, true); }
    (PathBuf::from(DEFAULT_CONFIG_FILE), false)
}

pub fn load(explicit: Option<&Path>) -> Result<Config, ReportError> {
    let (path, required) = resolve_path(explicit, std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    match std::fs::read_to_string(&path) {
        Ok(text) => from_toml(&text, &path),
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Config::builtin(),
        Err(e) => Err(ReportError::from_io(&path, e)),
    }
}

/// Parses `text` as the contents of `path`; relative paths inside resolve against its directory.
pub fn from_toml(text: &str, path: &Path) -> Result<Config, ReportError> {
    let file: FileConfig = toml::from_str(text)
        .map_err(|e| ReportError::Config(format!("{}: {}", path.display(), e)))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    apply_config(file, base, path)
}

fn apply_config(file: FileConfig, base: &Path, source: &Path) -> Result<Config, ReportError> {
    let mut categories = file.categories.unwrap_or_else(builtin_categories);
    for c in &mut categories {
        if c.path.is_relative() { c.path = base.join(&c.path); }
    }
    let default_category = match file.default_category {
        Some(d) => d,
        None if categories.iter().any(|c| c.name == DEFAULT_SORT_CATEGORY) => DEFAULT_SORT_CATEGORY.to_string(),
        None => categories.first().map(|c| c.name.clone()).unwrap_or_default(),
    };
    let roster_path = match file.roster_path {
        Some(p) if p.is_relative() => base.join(p),
        Some(p) => p,
        None => Path::new(DATA_DIR).join("sched").join("sched.consultnicks"),
    };
    let excluded_names = file.excluded_names.map(|v| v.into_iter().collect()).unwrap_or_else(builtin_excluded);
    Ok(Config {
        registry: Registry::new(categories, default_category)?,
        roster_path,
        excluded_names,
        source: Some(source.to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matches_consult_layout() {
        let cfg = Config::builtin().unwrap();
        let shorts: Vec<&str> = cfg.registry.iter().map(|c| c.short_name.as_str()).collect();
        assert_eq!(shorts, ["food", "print"]);
        assert_eq!(cfg.registry.default_category().name, "food-warnings");
        assert_eq!(cfg.roster_path, PathBuf::from("/admin/consult/data/sched/sched.consultnicks"));
        assert!(cfg.excluded_names.contains("HOLIDAY"));
        assert!(cfg.source.is_none());
    }

    #[test]
    fn file_overrides_and_resolves_relative_paths() {
        let text = r#"
            roster_path = "sched/nicks"
            excluded_names = ["OFF"]

            [[categories]]
            name = "printer-warnings"
            short_name = "print"
            flag = "p"
            path = "printer"

            [[categories]]
            name = "noise-warnings"
            short_name = "noise"
            flag = "n"
            path = "/var/noise"
        "#;
        let cfg = from_toml(text, Path::new("/etc/underpants/underpants.toml")).unwrap();
        let cats: Vec<&Category> = cfg.registry.iter().collect();
        assert_eq!(cats[0].path, PathBuf::from("/etc/underpants/printer"));
        assert_eq!(cats[1].path, PathBuf::from("/var/noise"));
        // food-warnings is gone, so the first declared category leads.
        assert_eq!(cfg.registry.default_category().name, "printer-warnings");
        assert_eq!(cfg.roster_path, PathBuf::from("/etc/underpants/sched/nicks"));
        assert_eq!(cfg.excluded_names.len(), 1);
    }

    #[test]
    fn bad_default_is_a_config_error() {
        let err = from_toml("default_category = \"nope\"", Path::new("u.toml")).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(from_toml("colour = 1", Path::new("u.toml")), Err(ReportError::Config(_))));
    }

    #[test]
    fn explicit_path_wins_over_env() {
        let (p, required) = resolve_path(Some(Path::new("a.toml")), Some(PathBuf::from("b.toml")));
        assert_eq!((p, required), (PathBuf::from("a.toml"), true));
        let (p, required) = resolve_path(None, Some(PathBuf::from("b.toml")));
        assert_eq!((p, required), (PathBuf::from("b.toml"), true));
        let (p, required) = resolve_path(None, None);
        assert_eq!((p, required), (PathBuf::from(DEFAULT_CONFIG_FILE), false));
    }

    #[test]
    fn named_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(load(Some(&missing)), Err(ReportError::NotFound { .. })));
    }
}
