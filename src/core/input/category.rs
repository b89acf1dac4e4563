use crate::core::error::AppError;
use crate::core::types::parse_closed_variant;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The record classes an input handler can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityCategory {
    Personal,
    Course,
    Enrollment,
    Grade,
    Activity,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 5] = [
        EntityCategory::Personal,
        EntityCategory::Course,
        EntityCategory::Enrollment,
        EntityCategory::Grade,
        EntityCategory::Activity,
    ];

    const VARIANTS: [(&'static str, EntityCategory); 5] = [
        ("PERSONAL", EntityCategory::Personal),
        ("COURSE", EntityCategory::Course),
        ("ENROLLMENT", EntityCategory::Enrollment),
        ("GRADE", EntityCategory::Grade),
        ("ACTIVITY", EntityCategory::Activity),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityCategory::Personal => "PERSONAL",
            EntityCategory::Course => "COURSE",
            EntityCategory::Enrollment => "ENROLLMENT",
            EntityCategory::Grade => "GRADE",
            EntityCategory::Activity => "ACTIVITY",
        }
    }

    /// Conventional extract file name inside an input directory.
    pub fn file_name(self) -> &'static str {
        match self {
            EntityCategory::Personal => "personal.csv",
            EntityCategory::Course => "course.csv",
            EntityCategory::Enrollment => "enrollment.csv",
            EntityCategory::Grade => "grade.csv",
            EntityCategory::Activity => "activity.csv",
        }
    }

    /// Temporary storage table populated for this category.
    pub fn table(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_closed_variant("input category", value, &Self::VARIANTS, "INPUT-001")
    }
}

impl Serialize for EntityCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
