use super::category::EntityCategory;
use crate::core::storage::{Column, ColumnType, FieldValue};
use chrono::{NaiveDate, NaiveDateTime};

/// How a raw extract value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    /// Y/N style indicator.
    Flag,
    /// Calendar date, optionally with a time of day.
    Date,
}

impl FieldKind {
    /// Storage column type; dates are kept as ISO-8601 text.
    pub fn column_type(self) -> ColumnType {
        match self {
            FieldKind::Text | FieldKind::Date => ColumnType::Text,
            FieldKind::Integer => ColumnType::Integer,
            FieldKind::Decimal => ColumnType::Decimal,
            FieldKind::Flag => ColumnType::Flag,
        }
    }
}

/// One canonical column of a category extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub mandatory: bool,
}

const fn field(name: &'static str, kind: FieldKind, mandatory: bool) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        mandatory,
    }
}

/// Canonical column layout of a category's temporary storage table.
#[derive(Debug)]
pub struct CategoryLayout {
    pub category: EntityCategory,
    pub fields: &'static [FieldSpec],
}

impl CategoryLayout {
    pub fn for_category(category: EntityCategory) -> &'static CategoryLayout {
        match category {
            EntityCategory::Personal => &PERSONAL,
            EntityCategory::Course => &COURSE,
            EntityCategory::Enrollment => &ENROLLMENT,
            EntityCategory::Grade => &GRADE,
            EntityCategory::Activity => &ACTIVITY,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
    }

    /// Typed storage columns in layout order.
    pub fn columns(&self) -> Vec<Column<'static>> {
        self.fields
            .iter()
            .map(|spec| Column::new(spec.name, spec.kind.column_type()))
            .collect()
    }
}

static PERSONAL: CategoryLayout = CategoryLayout {
    category: EntityCategory::Personal,
    fields: &[
        field("ALTERNATIVE_ID", FieldKind::Text, true),
        field("PERCENTILE", FieldKind::Decimal, false),
        field("SAT_VERBAL", FieldKind::Integer, false),
        field("SAT_MATH", FieldKind::Integer, false),
        field("ACT_COMPOSITE", FieldKind::Integer, false),
        field("AGE", FieldKind::Integer, false),
        field("RACE", FieldKind::Text, false),
        field("GENDER", FieldKind::Text, false),
        field("ENROLLMENT_STATUS", FieldKind::Text, false),
        field("CLASS_CODE", FieldKind::Text, false),
        field("GPA_CUMULATIVE", FieldKind::Decimal, false),
        field("GPA_SEMESTER", FieldKind::Decimal, false),
        field("STANDING", FieldKind::Text, false),
        field("PELL_STATUS", FieldKind::Flag, false),
    ],
};

static COURSE: CategoryLayout = CategoryLayout {
    category: EntityCategory::Course,
    fields: &[
        field("COURSE_ID", FieldKind::Text, true),
        field("SUBJECT", FieldKind::Text, false),
        field("ENROLLMENT", FieldKind::Integer, false),
        field("ONLINE_FLAG", FieldKind::Flag, false),
    ],
};

static ENROLLMENT: CategoryLayout = CategoryLayout {
    category: EntityCategory::Enrollment,
    fields: &[
        field("ALTERNATIVE_ID", FieldKind::Text, true),
        field("COURSE_ID", FieldKind::Text, true),
        field("FINAL_GRADE", FieldKind::Text, false),
        field("WITHDRAWAL_DATE", FieldKind::Date, false),
    ],
};

static GRADE: CategoryLayout = CategoryLayout {
    category: EntityCategory::Grade,
    fields: &[
        field("ALTERNATIVE_ID", FieldKind::Text, true),
        field("COURSE_ID", FieldKind::Text, true),
        field("GRADABLE_OBJECT", FieldKind::Text, true),
        field("CATEGORY", FieldKind::Text, false),
        field("MAX_POINTS", FieldKind::Decimal, false),
        field("EARNED_POINTS", FieldKind::Decimal, false),
        field("WEIGHT", FieldKind::Decimal, false),
        field("GRADE_DATE", FieldKind::Date, false),
    ],
};

static ACTIVITY: CategoryLayout = CategoryLayout {
    category: EntityCategory::Activity,
    fields: &[
        field("ALTERNATIVE_ID", FieldKind::Text, true),
        field("COURSE_ID", FieldKind::Text, true),
        field("EVENT", FieldKind::Text, true),
        field("EVENT_DATE", FieldKind::Date, true),
    ],
};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Interpret a trimmed, non-empty raw value as `kind`.
///
/// Dates are normalised to ISO-8601 text so every source format lands identically.
pub fn parse_value(kind: FieldKind, raw: &str) -> Result<FieldValue, String> {
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| format!("'{}' is not an integer", raw)),
        FieldKind::Decimal => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(FieldValue::Decimal(value)),
            _ => Err(format!("'{}' is not a decimal number", raw)),
        },
        FieldKind::Flag => match raw.to_ascii_uppercase().as_str() {
            "Y" | "YES" | "TRUE" | "1" => Ok(FieldValue::Flag(true)),
            "N" | "NO" | "FALSE" | "0" => Ok(FieldValue::Flag(false)),
            _ => Err(format!("'{}' is not a Y/N flag", raw)),
        },
        FieldKind::Date => parse_date(raw)
            .map(FieldValue::Text)
            .ok_or_else(|| format!("'{}' is not a date", raw)),
    }
}

fn parse_date(raw: &str) -> Option<String> {
    for format in DATETIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(value.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(value) = NaiveDate::parse_from_str(raw, format) {
            return Some(value.format("%Y-%m-%d").to_string());
        }
    }
    None
}
