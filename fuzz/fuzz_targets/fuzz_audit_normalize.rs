// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for audit-log parsing and normalization

#![no_main]

use cleanlink_audit::{map_action_type, normalize_entries, RawAuditEntry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Arbitrary text is a possible action type; the mapping is total.
        let action = map_action_type(Some(s));
        assert_eq!(action, map_action_type(Some(s)));

        // Any JSON array that parses must normalize one-to-one.
        if let Ok(raw) = serde_json::from_str::<Vec<RawAuditEntry>>(s) {
            let entries = normalize_entries(&raw);
            assert_eq!(entries.len(), raw.len());
            for (entry, source) in entries.iter().zip(&raw) {
                assert_eq!(entry.report_id, source.target_id.clone().unwrap_or_default());
                assert!(!entry.actor.is_empty());
            }
        }
    }
});
