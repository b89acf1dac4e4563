use lap::core::config::LapConfig;
use lap::core::input::{
    CsvInputHandler, EntityCategory, InputHandler, InputLoader, SampleSource, SourceResolver,
};
use lap::core::pipeline::PipelineConfig;
use lap::core::storage::{FieldValue, MemoryStore, SqliteStore, TempStorage};
use lap::core::types::ErrorCategory;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const COURSES: &str = "COURSE_ID,SUBJECT,ENROLLMENT,ONLINE_FLAG\nC101,MATH,32,N\nC205,ENGL,25,Y\n";

fn config_with(input: &Path, samples: &Path) -> LapConfig {
    let mut config = LapConfig::default();
    config.input.directory = input.to_path_buf();
    config.samples.directory = samples.to_path_buf();
    config
}

fn bundled_pipeline() -> PipelineConfig {
    PipelineConfig::load_from_file(
        &Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("samples")
            .join("pipelines")
            .join("marist_student_risk.yaml"),
    )
    .unwrap()
}

#[test]
fn sample_and_standard_handlers_differ_only_in_source() {
    let input = TempDir::new().unwrap();
    let samples = TempDir::new().unwrap();
    fs::write(input.path().join("course.csv"), COURSES).unwrap();
    fs::write(samples.path().join("course.csv"), COURSES).unwrap();
    let config = config_with(input.path(), samples.path());

    let standard_store = Arc::new(MemoryStore::new());
    let sample_store = Arc::new(MemoryStore::new());
    let standard =
        CsvInputHandler::standard(EntityCategory::Course, &config, standard_store.clone());
    let sample = CsvInputHandler::sample(EntityCategory::Course, &config, sample_store.clone());

    let standard_path = standard.get_file().unwrap();
    let sample_path = sample.get_file().unwrap();
    assert_ne!(standard_path, sample_path);
    assert_eq!(standard_path, input.path().join("course.csv"));
    assert_eq!(sample_path, samples.path().join("course.csv"));

    let standard_report = standard.load().unwrap();
    let sample_report = sample.load().unwrap();
    assert_eq!(standard_report.table, sample_report.table);
    assert_eq!(standard_report.rows, sample_report.rows);
    assert_eq!(
        standard_store.fetch("COURSE").unwrap(),
        sample_store.fetch("COURSE").unwrap()
    );
}

#[test]
fn every_bundled_extract_loads() {
    let store: Arc<dyn TempStorage> = Arc::new(SqliteStore::open_in_memory().unwrap());
    for category in EntityCategory::ALL {
        let handler = CsvInputHandler::with_resolver(category, SampleSource::bundled(), store.clone());
        let report = handler.load().unwrap();
        assert!(report.rows > 0, "{category}");
        assert_eq!(store.count(category.table()).unwrap(), report.rows);
    }

    let grades = store.fetch("GRADE").unwrap();
    // Both date formats land as ISO dates.
    assert!(grades
        .iter()
        .all(|row| row["GRADE_DATE"].as_text().map_or(false, |date| date.starts_with("2013-"))));
}

#[test]
fn memory_and_sqlite_hold_identical_rows() {
    let memory: Arc<dyn TempStorage> = Arc::new(MemoryStore::new());
    let sqlite: Arc<dyn TempStorage> = Arc::new(SqliteStore::open_in_memory().unwrap());
    for category in EntityCategory::ALL {
        for store in [&memory, &sqlite] {
            CsvInputHandler::with_resolver(category, SampleSource::bundled(), store.clone())
                .load()
                .unwrap();
        }
        assert_eq!(
            memory.fetch(category.table()).unwrap(),
            sqlite.fetch(category.table()).unwrap(),
            "{category}"
        );
    }

    let courses = sqlite.fetch("COURSE").unwrap();
    assert!(courses
        .iter()
        .all(|row| matches!(row["ONLINE_FLAG"], FieldValue::Flag(_) | FieldValue::Null)));
}

#[test]
fn loader_runs_bundled_pipeline_on_sample_data() {
    let mut config = LapConfig::default();
    config.input.use_sample_data = true;
    let store = config.open_store().unwrap();
    let loader = InputLoader::from_config(&config, store.clone());

    let reports = loader.load_for(&bundled_pipeline()).unwrap();
    let categories: Vec<_> = reports.iter().map(|report| report.category).collect();
    assert_eq!(categories, bundled_pipeline().input_categories());
    assert_eq!(store.count("COURSE").unwrap(), 0);

    let people = store.fetch("PERSONAL").unwrap();
    assert_eq!(people[0]["ALTERNATIVE_ID"], FieldValue::Text("S1001".into()));
    assert_eq!(people[0]["GPA_CUMULATIVE"], FieldValue::Decimal(3.42));
}

#[test]
fn custom_resolver_reuses_loading() {
    struct Fixed(PathBuf);

    impl SourceResolver for Fixed {
        fn resolve(&self, _category: EntityCategory) -> Result<PathBuf, lap::core::AppError> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            format!("fixed file {}", self.0.display())
        }
    }

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("courses-fall.txt");
    fs::write(&path, COURSES).unwrap();
    let store = Arc::new(MemoryStore::new());
    let handler = CsvInputHandler::with_resolver(EntityCategory::Course, Fixed(path.clone()), store.clone());

    let report = handler.load().unwrap();
    assert_eq!(report.source, path);
    assert_eq!(store.count("COURSE").unwrap(), 2);
}

#[test]
fn missing_extract_fails_without_writing() {
    let input = TempDir::new().unwrap();
    let config = config_with(input.path(), input.path());
    let store = Arc::new(MemoryStore::new());
    let loader = InputLoader::new()
        .with_handler(CsvInputHandler::standard(
            EntityCategory::Personal,
            &config,
            store.clone(),
        ));
    let pipeline = PipelineConfig::builder("risk", "Risk")
        .input(lap::core::pipeline::InputField::make("PERSONAL.AGE", true))
        .build()
        .unwrap();

    let err = loader.load_for(&pipeline).unwrap_err();
    assert_eq!(err.category, ErrorCategory::SourceError);
    assert_eq!(err.code, "INPUT-010");
    assert_eq!(store.count("PERSONAL").unwrap(), 0);
}
