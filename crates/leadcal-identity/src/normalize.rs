//! Identity normalization
//!
//! Two pure, total canonicalizations used as comparison keys:
//!
//! - [`normalize_name`]: strip diacritics, lower-case, trim, collapse whitespace
//! - [`normalize_loose`]: drop an e-mail domain and turn `.`, `_`, `-` into
//!   spaces, then apply [`normalize_name`]

use unicode_normalization::UnicodeNormalization;

/// Strict comparison key
///
/// ```rust,ignore
/// assert_eq!(normalize_name("  João   da Silva "), "joao da silva");
/// ```
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let lowered = if raw.is_ascii() {
        raw.to_ascii_lowercase()
    } else {
        raw.nfd()
            .filter(|c| !is_combining_diacritic(*c))
            .collect::<String>()
            .to_lowercase()
    };
    collapse_whitespace(&lowered)
}

/// Loose comparison key for login- and e-mail-shaped identifiers
///
/// ```rust,ignore
/// assert_eq!(normalize_loose("maria.santos@x.com"), "maria santos");
/// ```
#[must_use]
pub fn normalize_loose(raw: &str) -> String {
    let local = raw.split_once('@').map_or(raw, |(local, _)| local);
    let spaced: String = local
        .chars()
        .map(|c| if matches!(c, '.' | '_' | '-') { ' ' } else { c })
        .collect();
    normalize_name(&spaced)
}

// U+0300..=U+036F, the combining diacritical marks block
#[inline]
fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_diacritics_and_case() {
        assert_eq!(normalize_name("João Conceição"), "joao conceicao");
        assert_eq!(normalize_name("ÁNGELA MÜLLER"), "angela muller");
    }

    #[test]
    fn trims_and_collapses_whitespace() {
        assert_eq!(normalize_name("  Maria \t Dos\n\nSantos  "), "maria dos santos");
    }

    #[test]
    fn empty_input_yields_empty_key() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_loose(""), "");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn loose_drops_domain_and_separators() {
        assert_eq!(normalize_loose("maria.santos@x.com"), "maria santos");
        assert_eq!(normalize_loose("joao_silva-jr"), "joao silva jr");
        assert_eq!(normalize_loose("Zé.Ninguém@empresa.com.br"), "ze ninguem");
    }

    #[test]
    fn loose_of_bare_domain_is_empty() {
        assert_eq!(normalize_loose("@empresa.com"), "");
    }

    #[test]
    fn strict_keeps_email_shape() {
        assert_eq!(normalize_name("Maria.Santos@X.com"), "maria.santos@x.com");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(s in "[a-zA-Z\u{00C0}-\u{00FF} \t\n]{0,40}") {
            let once = normalize_name(&s);
            prop_assert_eq!(normalize_name(&once), once.clone());
            prop_assert_eq!(once.trim(), once.as_str());
            prop_assert!(!once.contains("  "));
        }

        #[test]
        fn prop_loose_never_contains_separators(s in "[a-zA-Z._@ -]{0,30}") {
            let key = normalize_loose(&s);
            prop_assert!(!key.contains('.'));
            prop_assert!(!key.contains('_'));
            prop_assert!(!key.contains('-'));
            prop_assert!(!key.contains('@'));
        }
    }
}
