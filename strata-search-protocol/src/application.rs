//! Filter application types and filter kinds.
//!
//! The application type describes how a filter's values combine: match any
//! value, match all values, match all values across hierarchical levels, or
//! exclude matching items. It is carried on the wire as a number; the
//! numeric values follow the remote service contract and are part of the
//! protocol.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// How a filter's values are applied to the searchable set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ApplicationType {
    /// Every value must match.
    MustAll,
    /// Every value must match, and values form a parent/child level chain.
    MustAllWithLevels,
    /// At least one value must match. This is the wire default.
    #[default]
    AtLeastOne,
    /// Matching items are excluded from the result set.
    Exclude,
}

impl ApplicationType {
    /// True when at least one matching value is enough.
    pub fn matches_any(&self) -> bool {
        matches!(self, ApplicationType::AtLeastOne)
    }

    /// True when all values must match.
    pub fn matches_all(&self) -> bool {
        matches!(
            self,
            ApplicationType::MustAll | ApplicationType::MustAllWithLevels
        )
    }

    /// True when values form a hierarchical level chain.
    pub fn has_levels(&self) -> bool {
        matches!(self, ApplicationType::MustAllWithLevels)
    }

    /// True when matching items are excluded.
    pub fn excludes(&self) -> bool {
        matches!(self, ApplicationType::Exclude)
    }

    /// True at the wire default, used to omit the key on encode.
    pub fn is_default(&self) -> bool {
        *self == ApplicationType::default()
    }
}

impl From<ApplicationType> for u8 {
    fn from(value: ApplicationType) -> Self {
        match value {
            ApplicationType::MustAll => 4,
            ApplicationType::MustAllWithLevels => 5,
            ApplicationType::AtLeastOne => 8,
            ApplicationType::Exclude => 16,
        }
    }
}

impl TryFrom<u8> for ApplicationType {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(ApplicationType::MustAll),
            5 => Ok(ApplicationType::MustAllWithLevels),
            8 => Ok(ApplicationType::AtLeastOne),
            16 => Ok(ApplicationType::Exclude),
            other => Err(ProtocolError::invalid_format(format!(
                "unknown application type: {other}"
            ))),
        }
    }
}

/// The kind of predicate a filter or aggregation applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Exact match on a field value. This is the wire default.
    #[default]
    Field,
    /// Numeric range match, values formatted as `from..to`.
    Range,
    /// Date range match, values formatted as `from..to`.
    DateRange,
    /// Geographic match against a location range.
    #[serde(rename = "geo_distance")]
    Geo,
    /// Free-text query predicate, internal to the query object.
    Query,
}

impl FilterType {
    /// True at the wire default, used to omit the key on encode.
    pub fn is_default(&self) -> bool {
        *self == FilterType::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_type_wire_values() {
        assert_eq!(u8::from(ApplicationType::MustAll), 4);
        assert_eq!(u8::from(ApplicationType::MustAllWithLevels), 5);
        assert_eq!(u8::from(ApplicationType::AtLeastOne), 8);
        assert_eq!(u8::from(ApplicationType::Exclude), 16);
    }

    #[test]
    fn test_application_type_round_trip() {
        for at in [
            ApplicationType::MustAll,
            ApplicationType::MustAllWithLevels,
            ApplicationType::AtLeastOne,
            ApplicationType::Exclude,
        ] {
            assert_eq!(ApplicationType::try_from(u8::from(at)).unwrap(), at);
        }
    }

    #[test]
    fn test_application_type_unknown_value_fails() {
        assert!(ApplicationType::try_from(3).is_err());
        assert!(ApplicationType::try_from(0).is_err());
    }

    #[test]
    fn test_capabilities() {
        assert!(ApplicationType::MustAllWithLevels.matches_all());
        assert!(ApplicationType::MustAllWithLevels.has_levels());
        assert!(ApplicationType::MustAll.matches_all());
        assert!(!ApplicationType::MustAll.has_levels());
        assert!(ApplicationType::AtLeastOne.matches_any());
        assert!(ApplicationType::Exclude.excludes());
    }

    #[test]
    fn test_filter_type_wire_strings() {
        assert_eq!(
            serde_json::to_string(&FilterType::DateRange).unwrap(),
            "\"date_range\""
        );
        assert_eq!(
            serde_json::to_string(&FilterType::Geo).unwrap(),
            "\"geo_distance\""
        );
        let parsed: FilterType = serde_json::from_str("\"field\"").unwrap();
        assert_eq!(parsed, FilterType::Field);
    }
}
