//! Region pre-filter.

use crate::models::{Table, ALL_REGIONS, REGION_COLUMN};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Region selection applied before aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegionSelector {
    /// Keep every row.
    #[default]
    All,
    /// Keep rows whose region equals this value exactly.
    Only(String),
}

impl FromStr for RegionSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_REGIONS {
            Ok(RegionSelector::All)
        } else {
            Ok(RegionSelector::Only(s.to_string()))
        }
    }
}

impl fmt::Display for RegionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionSelector::All => write!(f, "{}", ALL_REGIONS),
            RegionSelector::Only(region) => write!(f, "{}", region),
        }
    }
}

/// Return the rows of `table` that fall in the selected region.
///
/// A table without a REGION column is returned unchanged. A selector that
/// matches nothing yields an empty table, not an error.
pub fn filter_by_region(table: &Table, selector: &RegionSelector) -> Table {
    let region = match selector {
        RegionSelector::All => return table.clone(),
        RegionSelector::Only(region) => region,
    };

    let Some(idx) = table.position(REGION_COLUMN) else {
        return table.clone();
    };

    let rows = table
        .rows
        .iter()
        .filter(|row| row[idx].as_text().is_some_and(|value| value == region.as_str()))
        .cloned()
        .collect();

    table.with_rows(rows)
}

/// Selector choices: `All Regions` followed by the sorted distinct regions.
pub fn region_choices(table: &Table) -> Vec<String> {
    let mut choices = vec![ALL_REGIONS.to_string()];

    if let Some(idx) = table.position(REGION_COLUMN) {
        let regions: BTreeSet<String> = table
            .rows
            .iter()
            .filter_map(|row| row[idx].as_text().map(|v| v.into_owned()))
            .collect();
        choices.extend(regions);
    }

    choices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn regional_table() -> Table {
        Table::new(
            vec!["GENCO/ERD".to_string(), "REGION".to_string()],
            vec![
                vec![text("G1"), text("North")],
                vec![text("G2"), text("South")],
                vec![text("G3"), text("North")],
                vec![text("G4"), CellValue::Null],
                vec![text("G5"), text("north")],
            ],
        )
    }

    #[test]
    fn test_selector_from_str() {
        assert_eq!("All Regions".parse::<RegionSelector>().unwrap(), RegionSelector::All);
        assert_eq!(
            "North".parse::<RegionSelector>().unwrap(),
            RegionSelector::Only("North".to_string())
        );
    }

    #[test]
    fn test_all_regions_returns_input() {
        let table = regional_table();
        assert_eq!(filter_by_region(&table, &RegionSelector::All), table);
    }

    #[test]
    fn test_filter_preserves_order_and_case() {
        let table = regional_table();
        let filtered = filter_by_region(&table, &RegionSelector::Only("North".to_string()));

        let orgs: Vec<String> = filtered.rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(orgs, vec!["G1", "G3"]);
        // Input untouched
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        let table = regional_table();
        let filtered = filter_by_region(&table, &RegionSelector::Only("East".to_string()));
        assert!(filtered.is_empty());
        assert_eq!(filtered.columns, table.columns);
    }

    #[test]
    fn test_filter_without_region_column() {
        let table = Table::new(vec!["GENCO/ERD".to_string()], vec![vec![text("G1")]]);
        let filtered = filter_by_region(&table, &RegionSelector::Only("North".to_string()));
        assert_eq!(filtered, table);
    }

    #[test]
    fn test_region_choices() {
        assert_eq!(
            region_choices(&regional_table()),
            vec!["All Regions", "North", "South", "north"]
        );

        let no_region = Table::new(vec!["GENCO/ERD".to_string()], vec![]);
        assert_eq!(region_choices(&no_region), vec!["All Regions"]);
    }
}
