mod common;

use concierge::intake::{OTHER_COUNTRY_SENTINEL, field};
use concierge::{Advance, Wizard, WizardPhase};
use concierge_form::FieldValue;
use proptest::prelude::*;

use common::{confirm_answers, contact_answers, travel_answers, wizard};

fn apply(wizard: &mut Wizard, answers: Vec<(&'static str, FieldValue)>) {
    for (name, value) in answers {
        wizard.update_field(name, value).unwrap();
    }
}

#[test]
fn next_is_gated_on_each_step() {
    let mut wizard = wizard();
    let steps = [contact_answers(), travel_answers()];
    for (index, answers) in steps.into_iter().enumerate() {
        let before_fields = wizard.fields().clone();
        let Advance::Rejected(result) = wizard.next().unwrap() else {
            panic!("step {index} must reject empty answers");
        };
        assert!(!result.valid);
        assert_eq!(wizard.phase(), WizardPhase::Editing(index));
        assert_eq!(wizard.fields(), &before_fields);
        assert_eq!(wizard.errors(), &result.field_errors());

        apply(&mut wizard, answers);
        assert_eq!(wizard.next().unwrap(), Advance::Moved { step: index + 1 });
        assert!(wizard.errors().is_empty());
    }
    assert_eq!(wizard.phase(), WizardPhase::Editing(2));
}

#[test]
fn a_single_bad_field_blocks_the_step() {
    let mut wizard = wizard();
    apply(&mut wizard, contact_answers());
    wizard.update_field(field::PHONE, "call me maybe").unwrap();
    let Advance::Rejected(result) = wizard.next().unwrap() else {
        panic!("invalid phone must block the contact step");
    };
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[field::PHONE].code, "invalid_phone");
    assert_eq!(wizard.phase(), WizardPhase::Editing(0));
}

#[test]
fn back_is_a_no_op_on_first_step_and_keeps_fields() {
    let mut wizard = wizard();
    assert_eq!(wizard.back().unwrap(), 0);
    assert_eq!(wizard.phase(), WizardPhase::Editing(0));

    apply(&mut wizard, contact_answers());
    wizard.next().unwrap();
    let fields = wizard.fields().clone();
    assert_eq!(wizard.back().unwrap(), 0);
    assert_eq!(wizard.fields(), &fields);
    assert_eq!(
        wizard.field(field::EMAIL),
        Some(&FieldValue::text("mere@example.com"))
    );
}

#[test]
fn repeated_update_matches_single_update() {
    let mut once = wizard();
    once.update_field(field::EMAIL, "x@y.com").unwrap();

    let mut twice = wizard();
    twice.update_field(field::EMAIL, "x@y.com").unwrap();
    twice.update_field(field::EMAIL, "x@y.com").unwrap();

    assert_eq!(once.fields(), twice.fields());
    assert_eq!(twice.field(field::EMAIL), Some(&FieldValue::text("x@y.com")));
    assert_eq!(once.phase(), twice.phase());
}

#[test]
fn other_country_only_matters_for_the_sentinel() {
    let mut wizard = wizard();
    apply(&mut wizard, contact_answers());

    wizard.update_field(field::COUNTRY, OTHER_COUNTRY_SENTINEL).unwrap();
    let Advance::Rejected(result) = wizard.next().unwrap() else {
        panic!("sentinel country with no specified country must be rejected");
    };
    assert_eq!(
        result.errors.keys().collect::<Vec<_>>(),
        vec![field::OTHER_COUNTRY]
    );
    assert_eq!(wizard.visibility().get(field::OTHER_COUNTRY), Some(&true));

    wizard.update_field(field::OTHER_COUNTRY, "Tonga").unwrap();
    assert_eq!(wizard.next().unwrap(), Advance::Moved { step: 1 });

    for other in [FieldValue::Empty, FieldValue::text("   "), FieldValue::text("Tonga")] {
        let mut wizard = common::wizard();
        apply(&mut wizard, contact_answers());
        wizard.update_field(field::COUNTRY, "Australia").unwrap();
        wizard.update_field(field::OTHER_COUNTRY, other).unwrap();
        assert_eq!(wizard.visibility().get(field::OTHER_COUNTRY), Some(&false));
        assert_eq!(wizard.next().unwrap(), Advance::Moved { step: 1 });
    }
}

#[test]
fn terms_must_be_strictly_true() {
    let mut wizard = wizard();
    apply(&mut wizard, contact_answers());
    wizard.next().unwrap();
    apply(&mut wizard, travel_answers());
    wizard.next().unwrap();

    let step = wizard.step().unwrap().clone();
    assert!(!step.validate(wizard.fields()).valid);
    wizard.update_field(field::TERMS_ACCEPTED, false).unwrap();
    assert!(!step.validate(wizard.fields()).valid);
    wizard.update_field(field::TERMS_ACCEPTED, "true").unwrap();
    assert!(!step.validate(wizard.fields()).valid);
    apply(&mut wizard, confirm_answers());
    assert!(step.validate(wizard.fields()).valid);
}

fn any_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Empty),
        any::<bool>().prop_map(FieldValue::Flag),
        ".{0,24}".prop_map(FieldValue::Text),
    ]
}

proptest! {
    #[test]
    fn back_always_reaches_previous_step(
        target in 1usize..=2,
        noise in proptest::collection::vec((0usize..13, any_value()), 0..20),
    ) {
        let mut wizard = wizard();
        apply(&mut wizard, contact_answers());
        apply(&mut wizard, travel_answers());
        for _ in 0..target {
            wizard.next().unwrap();
        }
        let names: Vec<String> = wizard.fields().keys().cloned().collect();
        for (index, value) in noise {
            let name = &names[index % names.len()];
            wizard.update_field(name, value).unwrap();
        }
        let fields = wizard.fields().clone();
        prop_assert_eq!(wizard.back().unwrap(), target - 1);
        prop_assert_eq!(wizard.phase(), WizardPhase::Editing(target - 1));
        prop_assert_eq!(wizard.fields(), &fields);
    }

    #[test]
    fn next_succeeds_iff_step_validates(
        noise in proptest::collection::vec((0usize..6, any_value()), 0..10),
    ) {
        let mut wizard = wizard();
        apply(&mut wizard, contact_answers());
        let contact: Vec<String> = wizard.step().unwrap().fields.iter().map(|f| f.id.clone()).collect();
        for (index, value) in noise {
            wizard.update_field(&contact[index % contact.len()], value).unwrap();
        }
        let expected = wizard.step().unwrap().validate(wizard.fields()).valid;
        let before = wizard.fields().clone();
        match wizard.next().unwrap() {
            Advance::Moved { step } => {
                prop_assert!(expected);
                prop_assert_eq!(step, 1);
            }
            Advance::Rejected(_) => {
                prop_assert!(!expected);
                prop_assert_eq!(wizard.phase(), WizardPhase::Editing(0));
                prop_assert_eq!(wizard.fields(), &before);
            }
        }
    }
}
