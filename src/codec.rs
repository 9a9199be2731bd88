//! Association codec
//!
//! Idefix transports every list-valued association (projects, environments,
//! functions, required services, monitoring tools) as a comma-delimited string
//! of decimal identifiers. This module converts between that wire form and the
//! ordered `Vec<i64>` used by the desired-state model.

use std::num::ParseIntError;

use thiserror::Error;

/// Separator used by the remote service between identifiers.
pub const SEPARATOR: char = ',';

/// Failure to decode an association string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("segment '{segment}' at position {position} is not an integer: {source}")]
pub struct AssociationError {
    pub segment: String,
    pub position: usize,
    #[source]
    pub source: ParseIntError,
}

/// Join identifiers into their wire representation, preserving order.
pub fn encode(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a wire string back into identifiers.
///
/// Empty segments (`""`, `"1,,2"`, a trailing comma) are skipped rather than
/// turned into entries. Any other segment must parse as an integer.
pub fn decode(text: &str) -> Result<Vec<i64>, AssociationError> {
    text.split(SEPARATOR)
        .enumerate()
        .filter(|(_, segment)| !segment.is_empty())
        .map(|(position, segment)| {
            segment.parse::<i64>().map_err(|source| AssociationError {
                segment: segment.to_string(),
                position,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_encode_joins_in_order() {
        assert_eq!(encode(&[10, 20, 30]), "10,20,30");
        assert_eq!(encode(&[7]), "7");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_decode_skips_empty_segments() {
        assert_eq!(decode("1,,2").unwrap(), vec![1, 2]);
        assert_eq!(decode("").unwrap(), Vec::<i64>::new());
        assert_eq!(decode(",5,").unwrap(), vec![5]);
    }

    #[test]
    fn test_decode_rejects_malformed_segment() {
        let err = decode("1,x,2").unwrap_err();
        assert_eq!(err.segment, "x");
        assert_eq!(err.position, 1);
    }

    #[test]
    fn test_round_trip_preserves_order_and_duplicates() {
        assert_eq!(decode(&encode(&[30, 10, 20])).unwrap(), vec![30, 10, 20]);
        assert_eq!(decode(&encode(&[5, 5, 1])).unwrap(), vec![5, 5, 1]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn test_decode_inverts_encode(ids in prop::collection::vec(0i64.., 0..64)) {
            prop_assert_eq!(decode(&encode(&ids)).unwrap(), ids);
        }

        #[test]
        fn test_extra_separators_do_not_change_decode(
            ids in prop::collection::vec(0i64.., 0..64),
            leading in 0usize..3,
            trailing in 0usize..3,
        ) {
            let padded = format!(
                "{}{}{}",
                ",".repeat(leading),
                encode(&ids).replace(',', ",,"),
                ",".repeat(trailing)
            );
            prop_assert_eq!(decode(&padded).unwrap(), ids);
        }
    }
}
