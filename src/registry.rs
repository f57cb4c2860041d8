use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::ReportError;

/// Short flags the CLI already uses for its own options.
pub const RESERVED_FLAGS: [char; 6] = ['a', 'h', 'V', 'v', 'q', 'o'];

/// One countable kind of warning and the log file it is read from.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub name: String,
    pub short_name: String,
    pub flag: char,
    pub path: PathBuf,
}

impl Category {
    /// Clap arg id of this category's sort selector, e.g. `sort-food`.
    pub fn sort_arg_id(&self) -> String { format!("sort-{}", self.short_name) }
}

/// Validated, declaration-ordered set of categories plus the default sort column.
#[derive(Clone, Debug)]
pub struct Registry {
    categories: Vec<Category>,
    default_category: String,
}

impl Registry {
    pub fn new(categories: Vec<Category>, default_category: String) -> Result<Self, ReportError> {
        if categories.is_empty() {
            return Err(ReportError::Config("no warning categories configured".to_string()));
        }
        let mut names = HashSet::new();
        let mut shorts = HashSet::new();
        let mut flags = HashSet::new();
        for c in &categories {
            if !names.insert(c.name.as_str()) {
                return Err(ReportError::Config(format!("duplicate category name {:?}", c.name)));
            }
            if c.short_name.is_empty() || !shorts.insert(c.short_name.as_str()) {
                return Err(ReportError::Config(format!("category {:?} needs a unique short name", c.name)));
            }
            if !c.flag.is_ascii_alphanumeric() || RESERVED_FLAGS.contains(&c.flag) {
                return Err(ReportError::Config(format!("category {:?} cannot use flag -{}", c.name, c.flag)));
            }
            if !flags.insert(c.flag) {
                return Err(ReportError::Config(format!("flag -{} is used by more than one category", c.flag)));
            }
        }
        if !names.contains(default_category.as_str()) {
            return Err(ReportError::Config(format!("default category {:?} is not a configured category", default_category)));
        }
        Ok(Self { categories, default_category })
    }

    /// Categories in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> { self.categories.iter() }

    pub fn len(&self) -> usize { self.categories.len() }

    pub fn get(&self, name: &str) -> Option<&Category> { self.categories.iter().find(|c| c.name == name) }

    pub fn default_category(&self) -> &Category {
        // Registry::new guarantees the default is registered.
        self.get(&self.default_category).unwrap_or(&self.categories[0])
    }
}
