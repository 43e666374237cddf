/// Canonical digits-only form of a raw contact field, used as the join key
/// against the reference index.
///
/// Strips every non-ASCII-digit character; an absent value normalizes to the
/// empty string. No length validation happens here; an empty result is
/// simply unmatchable downstream.
pub fn normalize_phone(raw: Option<&str>) -> String {
    match raw {
        Some(value) => value.chars().filter(|c| c.is_ascii_digit()).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting_characters() {
        assert_eq!(normalize_phone(Some("(555) 123-4567")), "5551234567");
        assert_eq!(normalize_phone(Some("+1 555.123.4567")), "15551234567");
        assert_eq!(normalize_phone(Some("555 123 4567 ext 9")), "55512345679");
    }

    #[test]
    fn absent_or_empty_input_yields_empty() {
        assert_eq!(normalize_phone(None), "");
        assert_eq!(normalize_phone(Some("")), "");
        assert_eq!(normalize_phone(Some("n/a")), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_phone(Some("(555) 123-4567"));
        let twice = normalize_phone(Some(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn non_ascii_digits_are_dropped() {
        // Only ASCII digits survive; Unicode digit forms are out of scope.
        assert_eq!(normalize_phone(Some("٥٥٥123")), "123");
    }
}
