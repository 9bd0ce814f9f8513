use super::*;

#[test]
fn step_without_requirements_is_always_complete() {
    let step = StepDefinition::new("Review", "Confirm the details");
    assert!(step.is_complete(&FormData::new()));
    assert!(step.missing_fields(&FormData::new()).is_empty());
}

#[test]
fn required_fields_gate_completion() {
    let step = StepDefinition::new("Invoice Details", "").required_fields(&["invoiceNumber", "amount"]);
    let partial = FormData::new().with_field("invoiceNumber", "INV-1");

    assert!(!step.is_complete(&partial));
    assert_eq!(step.missing_fields(&partial), vec!["amount"]);

    let full = partial.with_field("amount", "100");
    assert!(step.is_complete(&full));
}

#[test]
fn blank_text_does_not_satisfy_requirement() {
    let step = StepDefinition::new("Buyer", "").required_fields(&["buyerName"]);
    assert!(!step.is_complete(&FormData::new().with_field("buyerName", "  ")));
}

#[test]
fn nested_paths_are_checked() {
    let step = StepDefinition::new("Supply Chain", "").required_fields(&["supplyChainDetails.supplierName"]);
    let form = FormData::new().with_field("supplyChainDetails", FormData::new().with_field("supplierName", "Globex"));
    assert!(step.is_complete(&form));
    assert!(!step.is_complete(&FormData::new().with_field("supplyChainDetails", FormData::new())));
}

#[test]
fn extra_checks_must_all_pass() {
    let step = StepDefinition::new("Amount", "")
        .required_fields(&["amount"])
        .completed_when(|f| f.positive_number("amount"));

    assert!(!step.is_complete(&FormData::new().with_field("amount", "-1")));
    assert!(step.is_complete(&FormData::new().with_field("amount", "1")));
}

#[test]
fn debug_output_hides_closures() {
    let step = StepDefinition::new("Terms", "").completed_when(|f| f.flag("termsAccepted"));
    let rendered = format!("{step:?}");
    assert!(rendered.contains("Terms"));
    assert!(rendered.contains("checks: 1"));
}
