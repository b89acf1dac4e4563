use lap::core::pipeline::{
    InputField, Output, OutputType, PipelineConfig, Processor, ProcessorType,
};
use lap::core::types::ErrorCategory;

#[test]
fn input_field_keeps_name_and_flag() {
    for (name, required) in [
        ("PERSONAL.AGE", true),
        ("COURSE.SUBJECT", false),
        ("", false),
        ("not qualified", true),
    ] {
        let field = InputField::make(name, required);
        assert_eq!(field.name(), name);
        assert_eq!(field.required(), required);
    }
}

#[test]
fn storage_output_scenario() {
    let mut output = Output::make_storage("ENROLLMENT_TEMP", "enrollments");
    output.add_field_storage("GRADE", "FINAL_GRADE").unwrap();
    output.add_field_storage("STATUS", "ENROLL_STATUS").unwrap();

    assert_eq!(output.output_type(), OutputType::Storage);
    assert_eq!(output.from(), "ENROLLMENT_TEMP");
    assert_eq!(output.to(), Some("enrollments"));

    let fields: Vec<_> = output
        .fields()
        .iter()
        .map(|field| (field.source(), field.target(), field.header()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("GRADE", Some("FINAL_GRADE"), None),
            ("STATUS", Some("ENROLL_STATUS"), None),
        ]
    );
}

#[test]
fn storage_field_on_csv_output_fails_and_leaves_fields_empty() {
    let mut output = Output::make_csv("COURSE_TEMP", "courses.csv");
    let err = output.add_field_storage("COURSE_ID", "ID").unwrap_err();

    assert_eq!(err.category, ErrorCategory::InvalidState);
    assert!(output.fields().is_empty());
    insta::assert_snapshot!(
        err.message,
        @"Can only add STORAGE fields to a STORAGE type object, this type is: CSV"
    );
}

#[test]
fn wrong_shape_append_never_changes_existing_fields() {
    let mut storage = Output::make_storage("RISK", "risk");
    let mut csv = Output::make_csv("RISK", "risk.csv");
    for index in 0..5 {
        storage
            .add_field_storage(format!("S{index}"), format!("T{index}"))
            .unwrap();
        csv.add_field_csv(format!("S{index}"), format!("H{index}"))
            .unwrap();

        let storage_before = storage.clone();
        let csv_before = csv.clone();
        assert!(storage.add_field_csv("X", "Y").is_err());
        assert!(csv.add_field_storage("X", "Y").is_err());
        assert_eq!(storage, storage_before);
        assert_eq!(csv, csv_before);
    }

    let headers: Vec<_> = csv.fields().iter().filter_map(|f| f.header()).collect();
    assert_eq!(headers, vec!["H0", "H1", "H2", "H3", "H4"]);
    assert!(storage.fields().iter().all(|f| f.header().is_none()));
}

#[test]
fn processor_type_scenario() {
    let lower: ProcessorType = "kettle".parse().unwrap();
    let upper: ProcessorType = "KETTLE".parse().unwrap();
    assert_eq!(lower, upper);
    assert_eq!(lower, ProcessorType::Kettle);

    let err = "python".parse::<ProcessorType>().unwrap_err();
    assert_eq!(err.category, ErrorCategory::InvalidConfigValue);
    assert!(err.message.contains("python"));
    assert!(err.message.contains("KETTLE"));
}

#[test]
fn enumeration_parsing_is_exact_apart_from_case() {
    for text in ["Storage", "STORAGE", "storage"] {
        assert_eq!(text.parse::<OutputType>().unwrap(), OutputType::Storage);
    }
    for text in ["", " csv", "csv ", "flat_file", "STORAGES"] {
        assert!(text.parse::<OutputType>().is_err(), "{text:?} should fail");
    }
}

#[test]
fn processor_carries_triple() {
    let processor = Processor::make_external_unit("Score risk", "kettle/score_risk.kjb");
    assert_eq!(processor.name(), "Score risk");
    assert_eq!(processor.processor_type(), ProcessorType::Kettle);
    assert_eq!(processor.filename(), "kettle/score_risk.kjb");
}

#[test]
fn built_config_preserves_declared_order() {
    let mut csv = Output::make_csv("RISK", "risk.csv");
    csv.add_field_csv("ALTERNATIVE_ID", "Student").unwrap();

    let config = PipelineConfig::builder("marist_student_risk", "Marist student risk")
        .description("Risk scores")
        .stat("accuracy", serde_json::json!(0.85))
        .input(InputField::make("GRADE.EARNED_POINTS", true))
        .input(InputField::make("PERSONAL.ALTERNATIVE_ID", true))
        .input(InputField::make("GRADE.MAX_POINTS", false))
        .processor(Processor::make_external_unit("Score", "score.kjb"))
        .output(Output::make_storage("RISK", "risk_results"))
        .output(csv)
        .build()
        .unwrap();

    let names: Vec<_> = config.inputs().iter().map(InputField::name).collect();
    assert_eq!(
        names,
        vec!["GRADE.EARNED_POINTS", "PERSONAL.ALTERNATIVE_ID", "GRADE.MAX_POINTS"]
    );
    assert_eq!(config.outputs()[1].output_type(), OutputType::Csv);
    assert_eq!(config.stats()["accuracy"], serde_json::json!(0.85));
}

#[test]
fn config_is_shareable_across_threads() {
    let config = std::sync::Arc::new(
        PipelineConfig::builder("risk", "Risk")
            .input(InputField::make("COURSE.COURSE_ID", true))
            .build()
            .unwrap(),
    );
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let config = config.clone();
            std::thread::spawn(move || config.inputs().len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}
