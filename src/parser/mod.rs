//! CSV row parsing
//!
//! Turns one exported row into an [`ImportRecord`]. Column positions are
//! fixed by the exporter; the header row is never consulted.
//!
//! Coercion is lenient on purpose: exports in the wild carry empty or
//! garbled cells, and the importer keeps going with defaults instead of
//! rejecting the row. Only a wrong field count is an error.

use std::borrow::Cow;

use thiserror::Error;

use crate::models::{ImportRecord, RequestRecord, ResponseRecord};

/// Number of columns in an exported row
pub const FIELD_COUNT: usize = 23;

mod column {
    pub const ID: usize = 0;
    pub const HOST: usize = 1;
    pub const METHOD: usize = 2;
    pub const PATH: usize = 3;
    pub const LENGTH: usize = 4;
    pub const PORT: usize = 5;
    pub const RAW: usize = 6;
    pub const IS_TLS: usize = 7;
    pub const QUERY: usize = 8;
    pub const FILE_EXTENSIONS: usize = 9;
    pub const SOURCE: usize = 10;
    pub const ALTERATION: usize = 11;
    pub const EDITED: usize = 12;
    pub const PARENT_ID: usize = 13;
    pub const CREATED_AT: usize = 14;
    pub const RESPONSE_ID: usize = 15;
    pub const RESPONSE_STATUS_CODE: usize = 16;
    pub const RESPONSE_RAW: usize = 17;
    pub const RESPONSE_LENGTH: usize = 18;
    pub const RESPONSE_ALTERATION: usize = 19;
    pub const RESPONSE_EDITED: usize = 20;
    pub const RESPONSE_PARENT_ID: usize = 21;
    pub const RESPONSE_CREATED_AT: usize = 22;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
}

/// Parse one data row into a record.
///
/// Accepts anything that yields byte slices so rows can come straight from a
/// `csv::ByteRecord` without a UTF-8 check on the raw payload columns.
pub fn parse_record<F: AsRef<[u8]>>(fields: &[F]) -> Result<ImportRecord, ParseError> {
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }
    let field = |idx: usize| fields[idx].as_ref();
    let text = |idx: usize| text_field(field(idx));

    Ok(ImportRecord {
        id: parse_int(field(column::ID)),
        source: text(column::SOURCE),
        request: RequestRecord {
            host: text(column::HOST),
            method: text(column::METHOD),
            path: text(column::PATH),
            length: parse_int(field(column::LENGTH)),
            port: parse_int(field(column::PORT)),
            raw: field(column::RAW).to_vec(),
            is_tls: parse_bool(field(column::IS_TLS)),
            query: text(column::QUERY),
            file_extensions: text(column::FILE_EXTENSIONS),
            alteration: text(column::ALTERATION),
            edited: parse_bool(field(column::EDITED)),
            parent_id: parse_nullable_int(field(column::PARENT_ID)),
            created_at: parse_int(field(column::CREATED_AT)),
        },
        response: ResponseRecord {
            id: parse_nullable_int(field(column::RESPONSE_ID)),
            status_code: parse_int(field(column::RESPONSE_STATUS_CODE)),
            raw: field(column::RESPONSE_RAW).to_vec(),
            length: parse_int(field(column::RESPONSE_LENGTH)),
            alteration: text(column::RESPONSE_ALTERATION),
            edited: parse_bool(field(column::RESPONSE_EDITED)),
            parent_id: parse_nullable_int(field(column::RESPONSE_PARENT_ID)),
            created_at: parse_int(field(column::RESPONSE_CREATED_AT)),
        },
    })
}

fn text_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn as_str(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Exporter booleans: anything unrecognised, including empty, is `false`.
pub fn parse_bool(bytes: &[u8]) -> bool {
    matches!(&*as_str(bytes), "1" | "t" | "T" | "TRUE" | "true" | "True")
}

/// Base-10 integer, `0` on any failure.
pub fn parse_int(bytes: &[u8]) -> i64 {
    as_str(bytes).parse().unwrap_or(0)
}

/// Empty or unparseable cells are absent, never zero.
pub fn parse_nullable_int(bytes: &[u8]) -> Option<i64> {
    if bytes.is_empty() {
        return None;
    }
    as_str(bytes).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Vec<&'static str> {
        vec![
            "1", "h", "GET", "/", "0", "80", "x", "true", "", "", "src", "", "false", "", "100",
            "", "200", "y", "0", "", "false", "", "100",
        ]
    }

    #[test]
    fn maps_fields_by_position() {
        let record = parse_record(&sample_row()).expect("row parses");

        assert_eq!(record.id, 1);
        assert_eq!(record.host(), "h");
        assert_eq!(record.request.method, "GET");
        assert_eq!(record.request.path, "/");
        assert_eq!(record.request.port, 80);
        assert_eq!(record.request.raw, b"x");
        assert!(record.request.is_tls);
        assert_eq!(record.source, "src");
        assert!(!record.request.edited);
        assert_eq!(record.request.parent_id, None);
        assert_eq!(record.request.created_at, 100);
        assert_eq!(record.response.id, None);
        assert_eq!(record.response.status_code, 200);
        assert_eq!(record.response.raw, b"y");
        assert_eq!(record.response.parent_id, None);
        assert_eq!(record.response.created_at, 100);
    }

    #[test]
    fn every_column_lands_in_its_own_attribute() {
        let row: Vec<String> = (0..FIELD_COUNT).map(|i| format!("{}", 1000 + i)).collect();
        let record = parse_record(&row).expect("row parses");

        assert_eq!(record.id, 1000);
        assert_eq!(record.request.host, "1001");
        assert_eq!(record.request.method, "1002");
        assert_eq!(record.request.path, "1003");
        assert_eq!(record.request.length, 1004);
        assert_eq!(record.request.port, 1005);
        assert_eq!(record.request.raw, b"1006");
        assert_eq!(record.request.query, "1008");
        assert_eq!(record.request.file_extensions, "1009");
        assert_eq!(record.source, "1010");
        assert_eq!(record.request.alteration, "1011");
        assert_eq!(record.request.parent_id, Some(1013));
        assert_eq!(record.request.created_at, 1014);
        assert_eq!(record.response.id, Some(1015));
        assert_eq!(record.response.status_code, 1016);
        assert_eq!(record.response.raw, b"1017");
        assert_eq!(record.response.length, 1018);
        assert_eq!(record.response.alteration, "1019");
        assert_eq!(record.response.parent_id, Some(1021));
        assert_eq!(record.response.created_at, 1022);
    }

    #[test]
    fn nullable_ints_are_absent_when_empty_or_garbled() {
        assert_eq!(parse_nullable_int(b""), None);
        assert_eq!(parse_nullable_int(b"abc"), None);
        assert_eq!(parse_nullable_int(b"12x"), None);
        assert_eq!(parse_nullable_int(b"0"), Some(0));
        assert_eq!(parse_nullable_int(b"-7"), Some(-7));

        let mut row = sample_row();
        row[13] = "not-a-number";
        row[21] = "42";
        let record = parse_record(&row).expect("row parses");
        assert_eq!(record.request.parent_id, None);
        assert_eq!(record.response.parent_id, Some(42));
    }

    #[test]
    fn bools_and_ints_fall_back_to_defaults() {
        for truthy in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(parse_bool(truthy.as_bytes()), "{truthy} should be true");
        }
        for falsy in ["", "0", "false", "yes", "on", "tRuE", " true"] {
            assert!(!parse_bool(falsy.as_bytes()), "{falsy:?} should be false");
        }

        assert_eq!(parse_int(b""), 0);
        assert_eq!(parse_int(b"eighty"), 0);
        assert_eq!(parse_int(b"+443"), 443);
        assert_eq!(parse_int(b"99999999999999999999"), 0);

        let mut row = sample_row();
        row[5] = "http";
        row[7] = "maybe";
        row[16] = "";
        let record = parse_record(&row).expect("garbled cells do not fail the row");
        assert_eq!(record.request.port, 0);
        assert!(!record.request.is_tls);
        assert_eq!(record.response.status_code, 0);
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        let short = &sample_row()[..22];
        assert_eq!(
            parse_record(short),
            Err(ParseError::FieldCount {
                expected: 23,
                found: 22
            })
        );

        let mut long = sample_row();
        long.push("extra");
        assert!(parse_record(&long).is_err());

        let empty: [&str; 0] = [];
        assert!(parse_record(&empty).is_err());
    }

    #[test]
    fn raw_payloads_are_kept_verbatim() {
        let raw_request: &[u8] = b"GET / HTTP/1.1\r\nHost: h\r\n\r\n";
        let raw_response: &[u8] = &[0x48, 0x54, 0xff, 0x00, 0xfe];
        let mut row: Vec<&[u8]> = sample_row().into_iter().map(str::as_bytes).collect();
        row[6] = raw_request;
        row[17] = raw_response;

        let record = parse_record(&row).expect("row parses");
        assert_eq!(record.request.raw, raw_request);
        assert_eq!(record.response.raw, raw_response);
    }
}
