//! Required-column validation.
//!
//! The check is all-or-nothing: either every required column is present
//! or the table is rejected with the full list of what is missing.

use crate::error::MissingColumns;
use crate::models::{
    Table, AMOUNT_COLUMN, BENEFICIARY_COLUMN, FUND_COLUMN, ORGANIZATION_COLUMN, REGION_COLUMN,
    REQUIRED_COLUMNS,
};

/// Check that `table` carries every column in `required`.
///
/// Names must match exactly; there is no aliasing or case folding.
pub fn check(table: &Table, required: &[&str]) -> Result<(), MissingColumns> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| table.position(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingColumns {
            missing,
            found: table.column_names(),
        })
    }
}

/// Check the fixed required-column contract.
pub fn validate(table: &Table) -> Result<(), MissingColumns> {
    check(table, &REQUIRED_COLUMNS)
}

/// Positions of the semantic fields within a validated table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub organization: usize,
    pub beneficiary: usize,
    pub fund_type: usize,
    pub amount: usize,
    #[allow(dead_code)] // Optional field, resolved for callers that filter by position
    pub region: Option<usize>,
}

impl ColumnMap {
    /// Validate `table` and resolve the position of each field.
    pub fn resolve(table: &Table) -> Result<Self, MissingColumns> {
        validate(table)?;

        let position = |name: &str| table.position(name).ok_or_else(|| MissingColumns {
            missing: vec![name.to_string()],
            found: table.column_names(),
        });

        Ok(Self {
            organization: position(ORGANIZATION_COLUMN)?,
            beneficiary: position(BENEFICIARY_COLUMN)?,
            fund_type: position(FUND_COLUMN)?,
            amount: position(AMOUNT_COLUMN)?,
            region: table.position(REGION_COLUMN),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(headers: &[&str]) -> Table {
        Table::new(headers.iter().map(|h| h.to_string()).collect(), vec![])
    }

    #[test]
    fn test_validate_all_present() {
        let table = table_with(&["GENCO/ERD", "BENEFICIARIES", "FUND", "AMOUNT"]);
        assert!(validate(&table).is_ok());
    }

    #[test]
    fn test_region_not_required() {
        let table = table_with(&["REGION", "AMOUNT", "FUND", "BENEFICIARIES", "GENCO/ERD"]);
        assert!(validate(&table).is_ok());
    }

    #[test]
    fn test_validate_reports_missing_and_found() {
        let table = table_with(&["GENCO/ERD", "AMOUNT", "REGION"]);
        let err = validate(&table).unwrap_err();

        assert_eq!(err.missing, vec!["BENEFICIARIES", "FUND"]);
        assert_eq!(err.found, vec!["GENCO/ERD", "AMOUNT", "REGION"]);
    }

    #[test]
    fn test_validate_is_case_sensitive() {
        let table = table_with(&["genco/erd", "BENEFICIARIES", "FUND", "AMOUNT"]);
        let err = validate(&table).unwrap_err();
        assert_eq!(err.missing, vec!["GENCO/ERD"]);
    }

    #[test]
    fn test_check_custom_required() {
        let table = table_with(&["A"]);
        assert!(check(&table, &["A"]).is_ok());
        assert_eq!(check(&table, &["A", "B"]).unwrap_err().missing, vec!["B"]);
    }

    #[test]
    fn test_column_map_resolve() {
        let table = table_with(&["REGION", "AMOUNT", "FUND", "BENEFICIARIES", "GENCO/ERD"]);
        let map = ColumnMap::resolve(&table).unwrap();

        assert_eq!(map.organization, 4);
        assert_eq!(map.beneficiary, 3);
        assert_eq!(map.fund_type, 2);
        assert_eq!(map.amount, 1);
        assert_eq!(map.region, Some(0));
    }

    #[test]
    fn test_column_map_rejects_incomplete_table() {
        let table = table_with(&["GENCO/ERD"]);
        assert!(ColumnMap::resolve(&table).is_err());
    }
}
