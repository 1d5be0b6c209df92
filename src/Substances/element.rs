use std::fmt;

/// Named chemical element with its atomic count within one species.
/// Counts are real numbers so that fractional stoichiometry needs no special case.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    count: f64,
}

impl Element {
    pub fn new(name: &str, count: f64) -> Self {
        Self {
            name: name.to_string(),
            count,
        }
    }
    /// element with count 1
    pub fn single(name: &str) -> Self {
        Self::new(name, 1.0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> f64 {
        self.count
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 1.0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}{}", self.name, self.count)
        }
    }
}
