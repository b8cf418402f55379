//! Properties of query decoding

use proptest::prelude::*;

use dir2json::query::Query;

proptest! {
    /// Decoding never panics, whatever the query string looks like.
    #[test]
    fn prop_decode_never_panics(query in "[a-z0-9=,&./_-]{0,32}") {
        let _ = Query::decode(&query);
    }

    /// One decode pass normalizes fully: re-decoding the normalized form is
    /// a fixed point.
    #[test]
    fn prop_normalized_form_is_a_fixed_point(query in "[a-z0-9=,&.]{0,32}") {
        let normalized = Query::decode(&query).normalized();
        prop_assert_eq!(Query::decode(&normalized).normalized(), normalized);
    }

    /// The last occurrence of a repeated key wins.
    #[test]
    fn prop_last_occurrence_wins(
        first in "[a-z]{1,4}",
        second in "[a-z]{1,4}",
    ) {
        let query = Query::decode(&format!("ext=.{first}&ext=.{second}"));
        prop_assert_eq!(query.list("ext"), Some(&[format!(".{second}")][..]));
    }
}
