// ── Port-spec mini-language ──
//
// `1,2,3`, `1-8`, `5,10-12`: comma-separated indexes and inclusive ranges.

use std::collections::BTreeSet;

use crate::error::CoreError;

/// Widest range accepted. Far beyond any switch; it only bounds the
/// index set a typo like `1-4000000000` would allocate.
const MAX_RANGE_SPAN: u32 = 65_536;

/// Parse a port specification into a sorted, de-duplicated index list.
pub fn parse_port_spec(spec: &str) -> Result<Vec<u32>, CoreError> {
    let fail = |reason: String| CoreError::PortSpecParse {
        spec: spec.to_owned(),
        reason,
    };

    let mut ports = BTreeSet::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(fail("empty entry".into()));
        }

        if let Some((start, end)) = part.split_once('-') {
            let start = parse_index(start).map_err(&fail)?;
            let end = parse_index(end).map_err(&fail)?;
            if start > end {
                return Err(fail(format!("range {start}-{end} is reversed")));
            }
            if end - start >= MAX_RANGE_SPAN {
                return Err(fail(format!("range {start}-{end} is too wide")));
            }
            ports.extend(start..=end);
        } else {
            ports.insert(parse_index(part).map_err(&fail)?);
        }
    }

    Ok(ports.into_iter().collect())
}

fn parse_index(raw: &str) -> Result<u32, String> {
    let raw = raw.trim();
    raw.parse::<u32>()
        .map_err(|e| format!("'{raw}' is not a port number ({e})"))
}
