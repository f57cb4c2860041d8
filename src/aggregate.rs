use std::collections::{BTreeMap, HashMap};

use crate::error::ReportError;
use crate::registry::Registry;

/// Warning counts for one issuer, keyed by category name. Absent categories count 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IssuerRecord {
    pub counts: BTreeMap<String, u64>,
}

impl IssuerRecord {
    pub fn count(&self, category: &str) -> u64 { self.counts.get(category).copied().unwrap_or(0) }
}

/// All issuers seen in any category, in issuer-name order.
pub type Tally = BTreeMap<String, IssuerRecord>;

/// Merges per-category counts into one record per issuer.
pub fn merge<I>(per_category: I) -> Tally
where
    I: IntoIterator<Item = (String, HashMap<String, u64>)>,
{
    let mut tally = Tally::new();
    for (category, counts) in per_category {
        for (issuer, n) in counts {
            tally.entry(issuer).or_default().counts.insert(category.clone(), n);
        }
    }
    tally
}

/// Counts every registered category's log in declaration order and merges the results.
pub fn collect(registry: &Registry) -> Result<Tally, ReportError> {
    let mut per_category = Vec::with_capacity(registry.len());
    for c in registry.iter() {
        let counts = crate::counter::count_warnings(&c.path)?;
        log::info!("{}: {} issuers", c.name, counts.len());
        per_category.push((c.name.clone(), counts));
    }
    Ok(merge(per_category))
}
