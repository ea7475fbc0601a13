use proptest::prelude::*;

use concierge_form::{
    FieldKind, FieldSpec, FieldValue, Fields, StepSpec, validate_email, validate_number,
    validate_phone, validate_step,
};

fn any_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Empty),
        any::<bool>().prop_map(FieldValue::Flag),
        ".{0,40}".prop_map(FieldValue::Text),
    ]
}

fn every_kind_step() -> StepSpec {
    StepSpec::new(
        "all",
        "All",
        vec![
            FieldSpec::new("text", FieldKind::Text, "Text").required(),
            FieldSpec::new("email", FieldKind::Email, "Email").required(),
            FieldSpec::new("phone", FieldKind::Phone, "Phone").required(),
            FieldSpec::new("choice", FieldKind::Choice, "Choice")
                .required()
                .with_choices(["a", "b"]),
            FieldSpec::new("ack", FieldKind::Acknowledgement, "Ack").required(),
            FieldSpec::new("number", FieldKind::Number, "Number"),
        ],
    )
}

proptest! {
    #[test]
    fn step_validation_is_total(values in proptest::collection::vec(any_value(), 6)) {
        let step = every_kind_step();
        let fields: Fields = step
            .fields
            .iter()
            .map(|field| field.id.clone())
            .zip(values)
            .collect();
        let result = validate_step(&step, &fields);
        prop_assert_eq!(result.valid, result.errors.is_empty());
        for (name, error) in &result.errors {
            prop_assert!(step.field(name).is_some());
            prop_assert!(!error.message.is_empty());
        }
    }

    #[test]
    fn emails_with_inner_whitespace_are_rejected(local in "[a-z]{1,5}", domain in "[a-z]{1,5}") {
        let spaced = format!("{local} x@{domain}.com");
        prop_assert!(validate_email(&spaced).is_err());
        let plain = format!("{local}@{domain}.com");
        prop_assert!(validate_email(&plain).is_ok());
    }

    #[test]
    fn text_validators_never_panic(input in ".{0,64}") {
        let _ = validate_email(&input);
        let _ = validate_phone(&input);
        let _ = validate_number(&input);
    }

    #[test]
    fn non_negative_numbers_round_trip(amount in 0.0f64..1_000_000.0) {
        let parsed = validate_number(&amount.to_string());
        prop_assert_eq!(parsed, Ok(Some(amount)));
    }
}
