//! Property-based tests for the canonical codec.
//!
//! The round-trip law is the codec's core invariant: for every valid
//! payload `p`, `decode(encode(p)) == p`.

use chrono::NaiveDate;
use proptest::prelude::*;
use snapq_license::LicensePayload;

/// Field values: non-empty, free of the reserved `;` and `=` delimiters.
fn field_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9_.:/ -]{1,40}").unwrap()
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #[test]
    fn encode_decode_round_trip(
        package_id in field_strategy(),
        machine_id in field_strategy(),
        expiration in date_strategy(),
        plan in prop::option::of(field_strategy()),
    ) {
        let payload =
            LicensePayload::new(&package_id, &machine_id, expiration, plan.as_deref()).unwrap();
        let canonical = payload.encode().unwrap();
        let decoded = LicensePayload::decode(&canonical).unwrap();
        prop_assert_eq!(decoded, payload);
    }

    /// The canonical string never contains more delimiters than its
    /// structure requires, so a signature over it covers every field.
    #[test]
    fn canonical_field_count(
        package_id in field_strategy(),
        machine_id in field_strategy(),
        expiration in date_strategy(),
        plan in prop::option::of(field_strategy()),
    ) {
        let payload =
            LicensePayload::new(&package_id, &machine_id, expiration, plan.as_deref()).unwrap();
        let canonical = payload.encode().unwrap();
        let expected = if plan.is_some() { 4 } else { 3 };
        prop_assert_eq!(canonical.split(';').count(), expected);
    }
}
