use crate::error::ReportError;
use crate::registry::{Category, Registry};

/// Column order for the leaderboard; the first column is the sort key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortOrder {
    columns: Vec<String>,
}

impl SortOrder {
    pub fn lead(&self) -> &str { &self.columns[0] }

    pub fn columns(&self) -> &[String] { &self.columns }

    /// Categories in column order. Every column is a registry key by construction.
    pub fn categories<'a>(&'a self, registry: &'a Registry) -> impl Iterator<Item = &'a Category> + 'a {
        self.columns().iter().filter_map(move |name| registry.get(name))
    }
}

/// Builds the column order: the selected category (or the default) first,
/// then the rest in registry declaration order.
pub fn sort_order(registry: &Registry, selected: &[&str]) -> Result<SortOrder, ReportError> {
    let lead = match selected {
        [] => registry.default_category(),
        [one] => registry
            .get(one)
            .ok_or_else(|| ReportError::InvalidArguments(format!("unknown sort category {:?}", one)))?,
        many => {
            return Err(ReportError::InvalidArguments(format!(
                "sort flags are mutually exclusive, got {}",
                many.join(", ")
            )));
        }
    };
    let mut columns = vec![lead.name.clone()];
    columns.extend(registry.iter().filter(|c| c.name != lead.name).map(|c| c.name.clone()));
    Ok(SortOrder { columns })
}
