//! Textual encodings of a [`FilterSet`].
//!
//! Two encodings are used by the run API:
//!
//! | Encoding | Example | Used for |
//! |----------|---------|----------|
//! | matrix | `;saved=true;.price=>1` | path-segment filtering of run collections |
//! | query | `include=a,b&page=2` | output modifiers and `GET` bodies |
//!
//! Neither encoding escapes anything: keys and values are embedded as their
//! display text.

use crate::types::FilterSet;

/// Encodes `filters` as a matrix path segment: `;k=v;k2=v2`.
///
/// The output always starts with `;`, so an empty set yields `";"`.
pub fn to_matrix_format(filters: &FilterSet) -> String {
    let pairs: Vec<String> = filters.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!(";{}", pairs.join(";"))
}

/// Encodes `filters` as a query string: `k=v&k2=v2`.
///
/// List values are joined with `,`. No leading `?`; an empty set yields `""`.
pub fn to_query_format(filters: &FilterSet) -> String {
    filters
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sets() {
        assert_eq!(to_matrix_format(&FilterSet::new()), ";");
        assert_eq!(to_query_format(&FilterSet::new()), "");
    }

    #[test]
    fn matrix_format_is_one_segment_per_entry_in_order() {
        let filters = FilterSet::new()
            .with("saved", true)
            .with(".price", ">1")
            .with("year", 2014);
        let encoded = to_matrix_format(&filters);
        assert_eq!(encoded, ";saved=true;.price=>1;year=2014");
        assert_eq!(encoded.split(';').skip(1).count(), filters.len());
    }

    #[test]
    fn query_format_joins_lists_with_commas() {
        let filters = FilterSet::new()
            .with("include", vec!["price", "sales"])
            .with("page", 2);
        assert_eq!(to_query_format(&filters), "include=price,sales&page=2");
    }

    #[test]
    fn single_entry_query_has_no_separator() {
        let filters = FilterSet::new().with("include", "score");
        assert_eq!(to_query_format(&filters), "include=score");
    }

    #[test]
    fn values_are_not_escaped() {
        let filters = FilterSet::new().with("name", "a b&c");
        assert_eq!(to_matrix_format(&filters), ";name=a b&c");
        assert_eq!(to_query_format(&filters), "name=a b&c");
    }
}
