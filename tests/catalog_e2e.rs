use make_a_decision::{
    DecisionConfig, DecisionError, DecisionService, DetailsUpdate, ExecutionError, Identity,
    LocalOption, OptionStore, ValidationError,
};

fn setup() -> (DecisionService, Identity) {
    let service = DecisionService::in_memory(DecisionConfig::default()).unwrap();
    let user = service.accounts().register("owner@example.com", "hash").unwrap();
    (service, Identity::User(user.id))
}

#[test]
fn full_management_lifecycle() {
    let (service, me) = setup();
    let catalog = service.catalog();

    let walk = catalog.add_option(&me, "Walk", Some(45), "Outdoor, active").unwrap();
    let read = catalog.add_option(&me, "Read", None, "indoor").unwrap();

    catalog.increase_weight(&me, walk.id).unwrap();
    catalog.increase_weight(&me, walk.id).unwrap();
    catalog.set_duration(&me, read.id, Some(60)).unwrap();
    catalog.rename_option(&me, read.id, "Read a novel").unwrap();

    let view = catalog.list_options(&me).unwrap();
    assert_eq!(view.total_weight, 4);
    let names: Vec<_> = view.options.iter().map(|v| v.option.name.as_str()).collect();
    assert_eq!(names, ["Walk", "Read a novel"]);
    assert_eq!(view.options[1].option.duration_minutes, Some(60));

    let tags: Vec<String> = catalog
        .all_tags(&me)
        .unwrap()
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(tags, ["active", "indoor", "outdoor"]);

    catalog.delete_option(&me, walk.id).unwrap();
    let view = catalog.list_options(&me).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view.total_weight, 1);
    assert!((view.options[0].probability - 1.0).abs() < f64::EPSILON);
}

#[test]
fn validation_errors_surface_typed() {
    let (service, me) = setup();
    let catalog = service.catalog();

    let err = catalog.add_option(&me, "", None, "").unwrap_err();
    assert!(matches!(
        err,
        DecisionError::Validation(ValidationError::EmptyOptionName)
    ));

    let err = catalog.add_option(&me, "Nap", Some(1500), "").unwrap_err();
    assert!(matches!(
        err,
        DecisionError::Validation(ValidationError::DurationOutOfRange { minutes: 1500, max: 1440 })
    ));

    let long = "x".repeat(201);
    let err = catalog.add_option(&me, &long, None, "").unwrap_err();
    assert!(matches!(
        err,
        DecisionError::Validation(ValidationError::FieldTooLong { .. })
    ));
}

#[test]
fn missing_option_is_typed_not_found() {
    let (service, me) = setup();
    let err = service
        .catalog()
        .increase_weight(&me, "404".parse().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        DecisionError::Execution(ExecutionError::OptionNotFound { .. })
    ));
}

#[test]
fn details_form_round_trip() {
    let (service, me) = setup();
    let catalog = service.catalog();
    let id = catalog.add_option(&me, "Cook", None, "").unwrap().id;

    let update = DetailsUpdate::from_form("Cook dinner", "1", "15", "4", "home, food");
    let option = catalog.update_details(&me, id, &update).unwrap();
    assert_eq!(option.name, "Cook dinner");
    assert_eq!(option.duration_minutes, Some(75));
    assert_eq!(option.weight.get(), 4);
    assert!(option.tags.contains("food"));
    assert!(option.updated_at >= option.created_at);
}

#[test]
fn sync_imports_local_rows_after_sign_in() {
    let (service, me) = setup();
    let payload = r#"[
        {"text": "Bake", "weight": 3, "duration": 120, "tags": ["Home"]},
        {"text": "", "weight": 1, "duration": null, "tags": []},
        {"text": "Swim", "weight": -4, "duration": -10, "tags": []}
    ]"#;
    let rows: Vec<LocalOption> = serde_json::from_str(payload).unwrap();

    let report = service.catalog().sync_local_options(&me, rows).unwrap();
    assert_eq!((report.synced, report.skipped), (1, 2));

    let view = service.catalog().list_options(&me).unwrap();
    assert_eq!(view.len(), 1);
    let bake = &view.options[0].option;
    assert_eq!(bake.weight.get(), 3);
    assert_eq!(bake.duration_minutes, Some(120));
    assert!(bake.tags.contains("home"));
}

#[test]
fn catalog_view_serializes_flat_rows() {
    let (service, me) = setup();
    service.catalog().add_option(&me, "Read", Some(20), "").unwrap();
    let json = serde_json::to_value(service.catalog().list_options(&me).unwrap()).unwrap();
    let row = &json["options"][0];
    assert_eq!(row["name"], "Read");
    assert_eq!(row["duration_minutes"], 20);
    assert_eq!(row["probability"], 1.0);
    assert_eq!(json["total_weight"], 1);
}

#[test]
fn custom_store_is_shared_with_caller() {
    let stores = make_a_decision::InMemoryStores::new();
    let service = DecisionService::with_stores(&stores, DecisionConfig::default()).unwrap();
    let user = service.accounts().register("shared@example.com", "h").unwrap();
    let me = Identity::User(user.id);

    service.catalog().add_option(&me, "Visible", None, "").unwrap();
    let listed = stores.options.list_for_user(user.id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Visible");
}
