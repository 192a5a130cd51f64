/// Property-based tests using proptest
/// Tests invariants of validation and scoring that should hold for all inputs
use lead_desk_api::models::{CreateLeadInput, LeadStatus, UpdateLeadInput};
use lead_desk_api::scoring::{ScoreBand, ScoreResult};
use lead_desk_api::validation::{is_valid_email, validate_create, validate_update, NAME_REQUIRED};
use proptest::prelude::*;
use uuid::Uuid;

fn status_strategy() -> impl Strategy<Value = LeadStatus> {
    prop_oneof![
        Just(LeadStatus::New),
        Just(LeadStatus::Contacted),
        Just(LeadStatus::Converted),
    ]
}

// Property: Email validation should never panic
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn simple_addresses_are_valid(
        local in "[a-z]{1,10}",
        domain in "[a-z]{1,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email));
    }

    #[test]
    fn addresses_without_at_are_invalid(text in "[a-z.]{0,30}") {
        prop_assert!(!is_valid_email(&text));
    }
}

// Property: valid inputs are accepted, status defaults to new
proptest! {
    #[test]
    fn create_without_status_defaults_to_new(
        name in "[A-Za-z][A-Za-z ]{0,20}",
        local in "[a-z]{1,10}",
        company in proptest::option::of("[A-Za-z ]{0,12}")
    ) {
        let input = CreateLeadInput {
            name: name.clone(),
            email: format!("{}@example.com", local),
            company,
            status: None,
        };
        let lead = validate_create(&input).unwrap();
        prop_assert_eq!(lead.status, LeadStatus::New);
        prop_assert_eq!(lead.name, name.trim());
        // Blank companies never reach the store.
        prop_assert!(lead.company.map_or(true, |c| !c.trim().is_empty()));
    }

    #[test]
    fn blank_names_are_rejected(name in "[ \\t]{0,5}", status in status_strategy()) {
        let input = UpdateLeadInput {
            name,
            email: "ann@example.com".to_string(),
            company: None,
            status: status.as_str().to_string(),
        };
        let errors = validate_update(&input).unwrap_err();
        prop_assert_eq!(errors.for_field("name"), Some(NAME_REQUIRED));
    }

    #[test]
    fn update_keeps_any_status(status in status_strategy()) {
        let input = UpdateLeadInput {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            company: None,
            status: status.as_str().to_string(),
        };
        prop_assert_eq!(validate_update(&input).unwrap().status, status);
    }
}

// Property: scores and bands
proptest! {
    #[test]
    fn in_range_scores_are_accepted(score in 1u8..=100) {
        let result = ScoreResult::new(Uuid::new_v4(), score).unwrap();
        let band = result.band();
        match score {
            1..=29 => prop_assert_eq!(band, ScoreBand::Low),
            30..=69 => prop_assert_eq!(band, ScoreBand::Medium),
            _ => prop_assert_eq!(band, ScoreBand::High),
        }
    }

    #[test]
    fn out_of_range_scores_are_rejected(score in 101u8..=255) {
        prop_assert!(ScoreResult::new(Uuid::new_v4(), score).is_err());
    }
}

#[test]
fn band_boundaries() {
    assert_eq!(ScoreBand::from_score(29), ScoreBand::Low);
    assert_eq!(ScoreBand::from_score(30), ScoreBand::Medium);
    assert_eq!(ScoreBand::from_score(69), ScoreBand::Medium);
    assert_eq!(ScoreBand::from_score(70), ScoreBand::High);
    assert!(ScoreResult::new(Uuid::new_v4(), 0).is_err());
}
