//! Field delimiter normalization.

/// Delimiter used when the config is silent or unrecognized.
pub const DEFAULT_DELIMITER: char = '\t';

/// Normalizes the text of a `<delimiter>` element to a single character.
///
/// A literal tab passes through before trimming. Otherwise the value is
/// trimmed and matched case-insensitively against the synonyms `\t`/`tab`,
/// `,`/`comma` and `|`/`pipe`. Any other single character is used as-is;
/// everything else falls back to [`DEFAULT_DELIMITER`].
pub fn normalize_delimiter(raw: &str) -> char {
    if raw == "\t" {
        return '\t';
    }
    let value = raw.trim();
    match value.to_ascii_lowercase().as_str() {
        "" | "\\t" | "tab" => return '\t',
        "," | "comma" => return ',',
        "|" | "pipe" => return '|',
        _ => {}
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(single), None) => single,
        _ => DEFAULT_DELIMITER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_synonyms() {
        assert_eq!(normalize_delimiter("\t"), '\t');
        assert_eq!(normalize_delimiter("\\t"), '\t');
        assert_eq!(normalize_delimiter("tab"), '\t');
        assert_eq!(normalize_delimiter(","), ',');
        assert_eq!(normalize_delimiter("comma"), ',');
        assert_eq!(normalize_delimiter("|"), '|');
        assert_eq!(normalize_delimiter("pipe"), '|');
    }

    #[test]
    fn test_synonyms_ignore_case_and_padding() {
        assert_eq!(normalize_delimiter("  TAB "), '\t');
        assert_eq!(normalize_delimiter("Comma"), ',');
        assert_eq!(normalize_delimiter("\nPIPE\n"), '|');
        assert_eq!(normalize_delimiter(" \\T "), '\t');
    }

    #[test]
    fn test_single_character_is_literal() {
        assert_eq!(normalize_delimiter(";"), ';');
        assert_eq!(normalize_delimiter(" ~ "), '~');
        assert_eq!(normalize_delimiter("§"), '§');
    }

    #[test]
    fn test_fallback_to_tab() {
        assert_eq!(normalize_delimiter(""), '\t');
        assert_eq!(normalize_delimiter("   "), '\t');
        assert_eq!(normalize_delimiter("semicolon"), '\t');
        assert_eq!(normalize_delimiter(";;"), '\t');
    }

    proptest! {
        #[test]
        fn single_non_space_char_round_trips(c in any::<char>().prop_filter("not whitespace", |c| !c.is_whitespace())) {
            prop_assert_eq!(normalize_delimiter(&c.to_string()), c);
        }

        #[test]
        fn unrecognized_words_default_to_tab(word in "[a-z]{2,12}") {
            prop_assume!(!matches!(word.as_str(), "tab" | "comma" | "pipe"));
            prop_assert_eq!(normalize_delimiter(&word), '\t');
        }

        #[test]
        fn synonyms_are_case_insensitive(word in prop::sample::select(vec!["tab", "comma", "pipe"]), mask in any::<u8>()) {
            let mixed: String = word
                .chars()
                .enumerate()
                .map(|(i, c)| if mask & (1 << (i % 8)) != 0 { c.to_ascii_uppercase() } else { c })
                .collect();
            prop_assert_eq!(normalize_delimiter(&mixed), normalize_delimiter(word));
        }
    }
}
