mod rules;

/// Check a manual test submission before it leaves the page.
///
/// The input is taken as typed: whitespace is not trimmed, so `" "` is a
/// valid (if unlikely) order number.
pub fn validate(invoice_number: &str, shop: &str) -> Result<(), Vec<String>> {
    let mut errs = Vec::new();
    if let Err(e) = rules::invoice_number_present(invoice_number) {
        errs.push(e);
    }
    if let Err(e) = rules::shop_present(shop) {
        errs.push(e);
    }
    if errs.is_empty() {
        Ok(())
    } else {
        Err(errs)
    }
}

/// Whether the "Test Fulfillment" control is enabled for this input.
pub fn can_submit(invoice_number: &str) -> bool {
    rules::invoice_number_present(invoice_number).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_disables_submission() {
        assert!(!can_submit(""));
    }

    #[test]
    fn any_non_empty_input_enables_submission() {
        for input in ["1", "1012", "#1012", " ", "INV-2024/7"] {
            assert!(can_submit(input), "{input:?}");
        }
    }

    #[test]
    fn collects_every_failed_rule() {
        let errs = validate("", "").unwrap_err();
        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn accepts_complete_submission() {
        assert!(validate("1012", "demo.myshopify.com").is_ok());
    }
}
