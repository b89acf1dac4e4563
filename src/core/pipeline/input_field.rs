use serde::Serialize;

/// A single field of input for a pipeline.
///
/// Fields are named by category and column, e.g. `COURSE.COURSE_ID` or `PERSONAL.AGE`.
/// The category part selects the input handler that populates the field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InputField {
    name: String,
    required: bool,
}

impl InputField {
    /// Create an input field.
    ///
    /// `name` is taken as given; format checks belong to descriptor validation.
    pub fn make<T: Into<String>>(name: T, required: bool) -> Self {
        InputField {
            name: name.into(),
            required,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// Split the name into its `(category, column)` parts.
    pub fn qualified_parts(&self) -> Option<(&str, &str)> {
        let (category, column) = self.name.split_once('.')?;
        if category.is_empty() || column.is_empty() || column.contains('.') {
            return None;
        }
        Some((category, column))
    }
}
