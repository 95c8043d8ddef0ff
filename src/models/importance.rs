//! Feature importance report model

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportanceScope {
    Global,
    Local,
}

impl ImportanceScope {
    fn keys(self) -> (&'static str, &'static str) {
        match self {
            ImportanceScope::Global => ("global_importance_names", "global_importance_values"),
            ImportanceScope::Local => ("local_importance_names", "local_importance_values"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ImportanceError {
    #[error("missing key '{0}' in analysis payload")]
    MissingKey(&'static str),

    #[error("'{key}' entry {index} is not a {expected}")]
    WrongType {
        key: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("{names} feature names but {values} importance values")]
    LengthMismatch { names: usize, values: usize },
}

/// Paired feature names and importance values, in upstream order
#[derive(Debug, Clone, PartialEq)]
pub struct ImportanceReport {
    pub scope: ImportanceScope,
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl ImportanceReport {
    /// Pull the report for `scope` out of an `/analyze` payload
    pub fn from_analysis(analysis: &Value, scope: ImportanceScope) -> Result<Self, ImportanceError> {
        let (names_key, values_key) = scope.keys();

        let names = array_field(analysis, names_key)?
            .iter()
            .enumerate()
            .map(|(index, v)| {
                v.as_str().map(str::to_string).ok_or(ImportanceError::WrongType {
                    key: names_key,
                    index,
                    expected: "string",
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let values = array_field(analysis, values_key)?
            .iter()
            .enumerate()
            .map(|(index, v)| {
                v.as_f64().ok_or(ImportanceError::WrongType {
                    key: values_key,
                    index,
                    expected: "number",
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if names.len() != values.len() {
            return Err(ImportanceError::LengthMismatch {
                names: names.len(),
                values: values.len(),
            });
        }

        Ok(Self { scope, names, values })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn array_field<'a>(analysis: &'a Value, key: &'static str) -> Result<&'a Vec<Value>, ImportanceError> {
    analysis
        .get(key)
        .and_then(Value::as_array)
        .ok_or(ImportanceError::MissingKey(key))
}
