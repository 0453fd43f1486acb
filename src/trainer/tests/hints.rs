use crate::trainer::hints::mask_citation;

#[test]
fn expands_known_terms_then_masks_statute_tokens() {
    assert_eq!(
        mask_citation("Verify visa class under INA 214(b)"),
        "Verify visa class under [Immigration and Nationality Act] [Law]"
    );
}

#[test]
fn masks_every_token_containing_a_digit() {
    assert_eq!(
        mask_citation("Check entry stamps against I-94 arrival records"),
        "Check entry stamps against [Law] arrival records"
    );
    assert_eq!(
        mask_citation("Escalate per Directive 3340-030 section 8"),
        "Escalate per Directive [Law] section [Law]"
    );
}

#[test]
fn expansion_happens_before_digit_masking() {
    // CBP expands cleanly; the directive number still masks afterwards.
    assert_eq!(
        mask_citation("CBP Directive 3340-030"),
        "[Customs and Border Protection] Directive [Law]"
    );
}

#[test]
fn digit_masking_pass_is_idempotent_on_its_output() {
    let once = mask_citation("Escalate per Directive 3340-030 section 8");
    let twice = mask_citation(&once);
    assert_eq!(once, twice);
}

#[test]
fn text_without_terms_or_digits_passes_through() {
    assert_eq!(
        mask_citation("Confirm sponsor details with the applicant"),
        "Confirm sponsor details with the applicant"
    );
}
