//! Asset code generation.
//!
//! Convention: `AAA.BB.C.DD.EEE`
//!
//! - `AAA` = location code, zero-padded to 3
//! - `BB`  = category code, zero-padded to 2
//! - `C`   = procurement source digit (see [`ProcurementSource::code_digit`])
//! - `DD`  = acquisition year mod 100
//! - `EEE` = sequence, zero-padded to 3
//!
//! Code generation never fails. Missing or unresolvable reference data
//! degrades to the default segment so an unrelated reference-data problem
//! cannot block asset creation.

use std::fmt;
use std::str::FromStr;

use crate::asset::AssetFields;
use crate::procurement::ProcurementSource;

/// Location segment used when the asset has no resolvable location.
pub const DEFAULT_LOCATION_CODE: &str = "001";

/// Category segment used when the asset's category cannot be resolved.
pub const DEFAULT_CATEGORY_CODE: &str = "10";

const LOCATION_WIDTH: usize = 3;
const CATEGORY_WIDTH: usize = 2;
const SEQUENCE_WIDTH: usize = 3;

/// Number of `.`-delimited segments in a well-formed code.
pub const SEGMENT_COUNT: usize = 5;

/// Left-pad `value` with zeros to `width`. Values wider than `width` keep
/// their rightmost `width` characters.
///
/// Location and category codes are truncated so the structural segments of
/// every generated code stay fixed-width. A plain `%03s`-style pad would
/// pass wide codes through unchanged.
fn fixed_width(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        value.chars().skip(len - width).collect()
    } else {
        format!("{}{value}", "0".repeat(width - len))
    }
}

// ---------------------------------------------------------------------------
// CodePrefix
// ---------------------------------------------------------------------------

/// The four structural segments of a code. Renders a full code for any
/// sequence, so one prefix serves every member of a bulk group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePrefix {
    location: String,
    category: String,
    procurement: u8,
    year: String,
}

impl CodePrefix {
    /// Build a prefix from looked-up reference codes. `None` or blank codes
    /// fall back to [`DEFAULT_LOCATION_CODE`] / [`DEFAULT_CATEGORY_CODE`].
    pub fn new(
        location_code: Option<&str>,
        category_code: Option<&str>,
        procurement: ProcurementSource,
        acquisition_year: i32,
    ) -> Self {
        let location = match location_code.map(str::trim) {
            Some(code) if !code.is_empty() => fixed_width(code, LOCATION_WIDTH),
            _ => DEFAULT_LOCATION_CODE.to_string(),
        };
        let category = match category_code.map(str::trim) {
            Some(code) if !code.is_empty() => fixed_width(code, CATEGORY_WIDTH),
            _ => DEFAULT_CATEGORY_CODE.to_string(),
        };
        Self {
            location,
            category,
            procurement: procurement.code_digit(),
            year: format!("{:02}", acquisition_year.rem_euclid(100)),
        }
    }

    /// Render the full code for `sequence`.
    pub fn with_sequence(&self, sequence: u32) -> String {
        format!(
            "{}.{}.{}.{}.{:0width$}",
            self.location,
            self.category,
            self.procurement,
            self.year,
            sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl fmt::Display for CodePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.location, self.category, self.procurement, self.year
        )
    }
}

/// Generate a complete asset code.
///
/// # Examples
///
/// ```
/// use inventory_core::code::generate_code;
/// use inventory_core::procurement::ProcurementSource;
///
/// assert_eq!(
///     generate_code(Some("7"), Some("3"), ProcurementSource::Grant, 2024, 12),
///     "007.03.3.24.012"
/// );
/// assert_eq!(
///     generate_code(None, None, ProcurementSource::Purchase, 2009, 1),
///     "001.10.1.09.001"
/// );
/// ```
pub fn generate_code(
    location_code: Option<&str>,
    category_code: Option<&str>,
    procurement: ProcurementSource,
    acquisition_year: i32,
    sequence: u32,
) -> String {
    CodePrefix::new(location_code, category_code, procurement, acquisition_year)
        .with_sequence(sequence)
}

/// Whether the new field values change any segment encoded in the code.
pub fn structural_change(old: &AssetFields, new: &AssetFields) -> bool {
    old.location_id != new.location_id
        || old.category_id != new.category_id
        || old.procurement_source != new.procurement_source
        || old.acquisition_year() != new.acquisition_year()
}

// ---------------------------------------------------------------------------
// AssetCode (parsing)
// ---------------------------------------------------------------------------

/// A parsed asset code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCode {
    pub location: String,
    pub category: String,
    pub procurement: String,
    pub year: String,
    pub sequence: u32,
}

/// Why a string is not a well-formed asset code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeParseError {
    #[error("expected 5 segments, found {0}")]
    SegmentCount(usize),
    #[error("sequence segment {0:?} is not numeric")]
    Sequence(String),
}

impl FromStr for AssetCode {
    type Err = CodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != SEGMENT_COUNT {
            return Err(CodeParseError::SegmentCount(parts.len()));
        }
        let raw_seq = parts[4];
        if raw_seq.is_empty() || !raw_seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeParseError::Sequence(raw_seq.to_string()));
        }
        let sequence = raw_seq
            .parse()
            .map_err(|_| CodeParseError::Sequence(raw_seq.to_string()))?;
        Ok(Self {
            location: parts[0].to_string(),
            category: parts[1].to_string(),
            procurement: parts[2].to_string(),
            year: parts[3].to_string(),
            sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::fixtures;

    #[test]
    fn full_code_from_lookups() {
        assert_eq!(
            generate_code(Some("101"), Some("20"), ProcurementSource::Donation, 2024, 7),
            "101.20.4.24.007"
        );
    }

    #[test]
    fn missing_lookups_use_defaults() {
        assert_eq!(
            generate_code(None, None, ProcurementSource::Purchase, 2024, 1),
            "001.10.1.24.001"
        );
        assert_eq!(
            generate_code(Some("  "), Some(""), ProcurementSource::Purchase, 2024, 1),
            "001.10.1.24.001"
        );
    }

    #[test]
    fn short_codes_are_zero_padded() {
        assert_eq!(
            generate_code(Some("5"), Some("3"), ProcurementSource::Aid, 2005, 9),
            "005.03.2.05.009"
        );
    }

    #[test]
    fn wide_lookup_codes_keep_rightmost_chars() {
        assert_eq!(
            generate_code(Some("1234"), Some("ABC"), ProcurementSource::Purchase, 2024, 1),
            "234.BC.1.24.001"
        );
    }

    #[test]
    fn sequence_wider_than_three_digits_is_not_truncated() {
        assert_eq!(
            generate_code(None, None, ProcurementSource::Purchase, 2024, 1000),
            "001.10.1.24.1000"
        );
    }

    #[test]
    fn year_uses_last_two_digits() {
        assert_eq!(
            CodePrefix::new(None, None, ProcurementSource::SelfProduced, 1999).to_string(),
            "001.10.5.99"
        );
        assert_eq!(
            CodePrefix::new(None, None, ProcurementSource::Purchase, 2100).to_string(),
            "001.10.1.00"
        );
    }

    #[test]
    fn prefix_renders_many_sequences() {
        let prefix = CodePrefix::new(Some("002"), Some("11"), ProcurementSource::Grant, 2023);
        assert_eq!(prefix.with_sequence(4), "002.11.3.23.004");
        assert_eq!(prefix.with_sequence(5), "002.11.3.23.005");
    }

    #[test]
    fn parse_well_formed_code() {
        let code: AssetCode = "002.11.3.23.045".parse().unwrap();
        assert_eq!(code.location, "002");
        assert_eq!(code.category, "11");
        assert_eq!(code.procurement, "3");
        assert_eq!(code.year, "23");
        assert_eq!(code.sequence, 45);
    }

    #[test]
    fn parse_rejects_malformed_codes() {
        assert_eq!(
            "001.10.1.24".parse::<AssetCode>(),
            Err(CodeParseError::SegmentCount(4))
        );
        assert_eq!(
            "001.10.1.24.00A".parse::<AssetCode>(),
            Err(CodeParseError::Sequence("00A".into()))
        );
        assert_eq!(
            "001.10.1.24.-1".parse::<AssetCode>(),
            Err(CodeParseError::Sequence("-1".into()))
        );
    }

    #[test]
    fn structural_change_detects_each_segment() {
        let base = fixtures::fields();
        assert!(!structural_change(&base, &base));

        let mut renamed = base.clone();
        renamed.name = "Desk".into();
        renamed.acquisition_price = 1.0;
        assert!(!structural_change(&base, &renamed));

        let mut moved = base.clone();
        moved.location_id = Some(99);
        assert!(structural_change(&base, &moved));

        let mut granted = base.clone();
        granted.procurement_source = ProcurementSource::Grant;
        assert!(structural_change(&base, &granted));

        let mut same_year = base.clone();
        same_year.acquisition_date = chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert!(!structural_change(&base, &same_year));

        let mut next_year = base.clone();
        next_year.acquisition_date = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(structural_change(&base, &next_year));
    }
}
