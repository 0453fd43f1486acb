/// Abbreviation expansions applied before the digit-masking pass. The order
/// matters: a term substituted here is safe from masking only if its
/// expansion carries no digits.
const TERM_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("INA", "[Immigration and Nationality Act]"),
    ("CFR", "[Code of Federal Regulations]"),
    ("CBP", "[Customs and Border Protection]"),
    ("DHS", "[Department of Homeland Security]"),
];

const LAW_PLACEHOLDER: &str = "[Law]";

/// Mask a protocol citation for use as a hint: expand known abbreviations to
/// bracketed labels, then replace every whitespace-delimited token containing
/// a digit with `[Law]`. The digit pass is idempotent on its own output.
pub fn mask_citation(text: &str) -> String {
    let mut expanded = text.to_string();
    for (term, replacement) in TERM_SUBSTITUTIONS {
        expanded = expanded.replace(term, replacement);
    }

    expanded
        .split_whitespace()
        .map(|token| {
            if token.chars().any(|c| c.is_ascii_digit()) {
                LAW_PLACEHOLDER
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
