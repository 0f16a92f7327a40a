/// Renders an uppercase directory name for display: every run of letters starts with an
/// uppercase letter and continues in lowercase.
///
/// Any non-letter (space, apostrophe, digit, hyphen) starts a new run, so `"D'OR"` becomes
/// `"D'Or"` and `"1ER"` becomes `"1Er"`.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words() {
        assert_eq!(title_case("CALLE MAYOR"), "Calle Mayor");
        assert_eq!(title_case("DE LA PAZ"), "De La Paz");
        assert_eq!(title_case("calle"), "Calle");
    }

    #[test]
    fn test_non_ascii_letters() {
        assert_eq!(title_case("PEÑA ÁNGEL"), "Peña Ángel");
        assert_eq!(title_case("ÑANDÚ"), "Ñandú");
    }

    #[test]
    fn test_separators_start_new_words() {
        assert_eq!(title_case("D'OR"), "D'Or");
        assert_eq!(title_case("1ER DE MAYO"), "1Er De Mayo");
        assert_eq!(title_case("SAN JUAN-BAUTISTA"), "San Juan-Bautista");
    }

    #[test]
    fn test_empty_and_spacing_preserved() {
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("  AV  "), "  Av  ");
    }
}
