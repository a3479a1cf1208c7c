//! Object-key filter.
//!
//! Only objects named `<identifier>_output_<digits>.json` are client-submitted
//! payloads; everything else landing in the bucket (partial uploads, logs,
//! retries) is skipped without a trigger.

use std::sync::LazyLock;

use regex::Regex;

use crate::{ObjectKey, SkipReason};

/// Anchored, case-sensitive. `[0-9]` rather than `\d`, which would also match
/// non-ASCII decimal digits.
const OUTPUT_KEY_PATTERN: &str = r"^.+_output_[0-9]+\.json$";

static OUTPUT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(OUTPUT_KEY_PATTERN).expect("output key pattern is a valid regex"));

/// Returns `true` if `key` names a client output payload.
///
/// Pure and total: never fails, whatever the input.
pub fn is_output_key(key: &str) -> bool {
    OUTPUT_KEY.is_match(key)
}

/// Decides whether a record with `key` should be dispatched.
///
/// `Ok(())` accepts the record; `Err` carries the reason it is skipped.
pub fn check_key(key: &ObjectKey) -> Result<(), SkipReason> {
    if is_output_key(key.as_str()) {
        Ok(())
    } else {
        Err(SkipReason::PatternMismatch)
    }
}
