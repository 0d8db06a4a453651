use chrono::Utc;
use make_a_decision::{
    DecisionConfig, DecisionService, ExclusionCause, Identity, OptionId, OutcomeState,
    RandomSource, SelectionOutcome, SelectionRequest,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn service_with_user() -> (DecisionService, Identity) {
    let service = DecisionService::in_memory(DecisionConfig::default()).unwrap();
    let user = service
        .accounts()
        .register("picker@example.com", "hash")
        .unwrap();
    (service, Identity::User(user.id))
}

/// Always draws the largest value in range, forcing the last interval.
struct Highest;

impl RandomSource for Highest {
    fn below(&mut self, bound: u64) -> u64 {
        bound - 1
    }
}

#[test]
fn time_budget_scenario_reports_probability_over_full_catalog() {
    let (service, me) = service_with_user();
    let catalog = service.catalog();
    catalog.add_option(&me, "Reading", Some(30), "indoor").unwrap();
    catalog.add_option(&me, "Running", None, "active").unwrap();
    catalog.add_option(&me, "Meditation", Some(15), "").unwrap();

    let request = SelectionRequest::from_form("0", "20", Vec::<String>::new());
    let mut rng = StdRng::seed_from_u64(2024);

    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..200 {
        let outcome = service.pick(&me, &request, Utc::now(), &mut rng).unwrap();
        let SelectionOutcome::Picked {
            option,
            probability,
        } = outcome
        else {
            panic!("expected a pick");
        };
        assert_ne!(option.name, "Reading");
        assert_eq!(probability.total_weight, 3);
        assert!((probability.probability - 1.0 / 3.0).abs() < 1e-12);
        seen.insert(option.name);
    }
    let seen: Vec<_> = seen.into_iter().collect();
    assert_eq!(seen, ["Meditation", "Running"]);
}

#[test]
fn empty_catalog_is_no_options_at_all() {
    let (service, me) = service_with_user();
    let mut rng = StdRng::seed_from_u64(1);
    let outcome = service
        .pick(&me, &SelectionRequest::unconstrained(), Utc::now(), &mut rng)
        .unwrap();
    assert_eq!(outcome.state(), OutcomeState::NoOptionsAtAll);
}

#[test]
fn unknown_tag_with_no_untagged_options_is_no_eligible() {
    let (service, me) = service_with_user();
    service.catalog().add_option(&me, "Chess", None, "indoor").unwrap();
    service.catalog().add_option(&me, "Surf", Some(90), "outdoor").unwrap();

    let request = SelectionRequest::builder().tag("nonexistent").build();
    let mut rng = StdRng::seed_from_u64(1);
    let outcome = service.pick(&me, &request, Utc::now(), &mut rng).unwrap();

    assert_eq!(outcome.state(), OutcomeState::NoEligibleAfterFilter);
    let diagnosis = outcome.diagnosis().unwrap();
    assert_eq!(diagnosis.cause(), Some(ExclusionCause::Tags));
    assert_eq!(diagnosis.considered, 2);
    assert_eq!(diagnosis.rejected_by_tags, 2);
}

#[test]
fn untagged_option_survives_any_tag_filter() {
    let (service, me) = service_with_user();
    service.catalog().add_option(&me, "Chess", None, "indoor").unwrap();
    service.catalog().add_option(&me, "Anything", None, "").unwrap();

    let request = SelectionRequest::builder().tag("nonexistent").build();
    let mut rng = StdRng::seed_from_u64(5);
    let outcome = service.pick(&me, &request, Utc::now(), &mut rng).unwrap();
    assert_eq!(outcome.picked_option().unwrap().name, "Anything");
}

#[test]
fn probability_stays_unconditional_when_heavy_option_is_filtered() {
    let (service, me) = service_with_user();
    let catalog = service.catalog();
    let heavy = catalog.add_option(&me, "Road trip", Some(600), "").unwrap().id;
    for _ in 0..9 {
        catalog.increase_weight(&me, heavy).unwrap();
    }
    catalog.add_option(&me, "Tea", Some(10), "").unwrap();

    let request = SelectionRequest::builder().time_budget(1, 0).build();
    let outcome = service.pick(&me, &request, Utc::now(), &mut Highest).unwrap();
    assert_eq!(outcome.picked_option().unwrap().name, "Tea");
    let p = outcome.probability().unwrap();
    assert!((p - 1.0 / 11.0).abs() < 1e-12);
}

#[test]
fn heaviest_interval_is_last_draw() {
    let (service, me) = service_with_user();
    let catalog = service.catalog();
    catalog.add_option(&me, "First", None, "").unwrap();
    let last: OptionId = catalog.add_option(&me, "Second", None, "").unwrap().id;

    let outcome = service
        .pick(&me, &SelectionRequest::unconstrained(), Utc::now(), &mut Highest)
        .unwrap();
    assert_eq!(outcome.picked_option().unwrap().id, last);
}

#[test]
fn users_never_see_each_others_options() {
    let service = DecisionService::in_memory(DecisionConfig::default()).unwrap();
    let a = service.accounts().register("a@example.com", "h").unwrap();
    let b = service.accounts().register("b@example.com", "h").unwrap();
    let (a, b) = (Identity::User(a.id), Identity::User(b.id));

    service.catalog().add_option(&a, "Only A", None, "").unwrap();

    let mut rng = StdRng::seed_from_u64(3);
    let outcome = service
        .pick(&b, &SelectionRequest::unconstrained(), Utc::now(), &mut rng)
        .unwrap();
    assert_eq!(outcome.state(), OutcomeState::NoOptionsAtAll);
}
