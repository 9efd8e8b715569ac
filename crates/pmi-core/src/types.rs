//! Row and schema types shared between the host pipeline and wrapped models

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Type of a single attribute (column)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttributeType {
    /// Real-valued attribute
    Numeric,

    /// Categorical attribute; values are stored as label indices
    Nominal { labels: Vec<String> },

    /// Free text attribute
    String,

    /// Date attribute; values are milliseconds since the epoch
    Date {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
}

/// A named, typed column of the training schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,

    /// Attribute type
    #[serde(flatten)]
    pub kind: AttributeType,
}

impl Attribute {
    /// Create a numeric attribute
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeType::Numeric,
        }
    }

    /// Create a nominal attribute with the given labels
    pub fn nominal<I, S>(name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: AttributeType::Nominal {
                labels: labels.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Create a string attribute
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeType::String,
        }
    }

    /// Whether the attribute is nominal
    pub fn is_nominal(&self) -> bool {
        matches!(self.kind, AttributeType::Nominal { .. })
    }

    /// Number of labels for nominal attributes, zero otherwise
    pub fn num_values(&self) -> usize {
        match &self.kind {
            AttributeType::Nominal { labels } => labels.len(),
            _ => 0,
        }
    }
}

/// Attribute layout of the data a model was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Relation (dataset) name
    pub relation: String,

    /// Ordered attributes
    pub attributes: Vec<Attribute>,

    /// Index of the class attribute, if the data is labelled
    #[serde(default)]
    pub class_index: Option<usize>,
}

impl Header {
    /// Create a header without a class attribute
    pub fn new(relation: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            relation: relation.into(),
            attributes,
            class_index: None,
        }
    }

    /// Set the class attribute index
    pub fn with_class_index(mut self, index: usize) -> Self {
        self.class_index = Some(index);
        self
    }

    /// Number of attributes
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// The class attribute, if any
    pub fn class_attribute(&self) -> Option<&Attribute> {
        self.class_index.and_then(|i| self.attributes.get(i))
    }

    /// Number of class labels, or 1 for a numeric class
    pub fn num_classes(&self) -> Option<usize> {
        self.class_attribute().map(|attr| match attr.kind {
            AttributeType::Nominal { ref labels } => labels.len(),
            _ => 1,
        })
    }

    /// Find an attribute index by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }
}

/// A single row to be scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Attribute values; NaN marks a missing value
    pub values: Vec<f64>,

    /// Instance weight
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Instance {
    /// Create an instance with unit weight
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            weight: default_weight(),
        }
    }

    /// Value used to mark missing entries
    pub const MISSING: f64 = f64::NAN;

    /// Value at the given index
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Whether the value at the given index is missing (or out of range)
    pub fn is_missing(&self, index: usize) -> bool {
        self.value(index).map_or(true, f64::is_nan)
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the instance has no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn default_weight() -> f64 {
    1.0
}

/// A batch of rows sharing one header
#[derive(Debug, Clone, PartialEq)]
pub struct Instances {
    /// Shared schema
    pub header: Arc<Header>,

    /// Rows
    pub rows: Vec<Instance>,
}

impl Instances {
    /// Create an empty batch for the given header
    pub fn new(header: Arc<Header>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Create a batch from existing rows
    pub fn with_rows(header: Arc<Header>, rows: Vec<Instance>) -> Self {
        Self { header, rows }
    }

    /// Append a row
    pub fn push(&mut self, instance: Instance) {
        self.rows.push(instance);
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the rows
    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iris_header() -> Header {
        Header::new(
            "iris",
            vec![
                Attribute::numeric("sepallength"),
                Attribute::numeric("petallength"),
                Attribute::nominal("class", ["setosa", "versicolor", "virginica"]),
            ],
        )
        .with_class_index(2)
    }

    #[test]
    fn test_num_classes() {
        let header = iris_header();
        assert_eq!(header.num_classes(), Some(3));
        assert_eq!(header.index_of("petallength"), Some(1));

        let unlabelled = Header::new("iris", header.attributes.clone());
        assert_eq!(unlabelled.num_classes(), None);
    }

    #[test]
    fn test_missing_values() {
        let inst = Instance::new(vec![5.1, Instance::MISSING]);
        assert!(!inst.is_missing(0));
        assert!(inst.is_missing(1));
        assert!(inst.is_missing(7));
    }

    #[test]
    fn test_header_from_yaml() {
        let yaml = r#"
relation: weather
class_index: 1
attributes:
  - name: temperature
    type: numeric
  - name: play
    type: nominal
    labels: ["yes", "no"]
"#;
        let header: Header = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(header.num_attributes(), 2);
        assert!(header.attributes[1].is_nominal());
        assert_eq!(header.num_classes(), Some(2));
    }
}
