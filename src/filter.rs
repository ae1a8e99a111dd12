use crate::registry::ObjectProperty;
use crate::statics;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("empty term in property filter {expression:?}")]
    EmptyTerm { expression: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pattern {
    text: String,
    negate: bool,
}

impl Pattern {
    fn matches(&self, name: &str) -> bool {
        name.contains(&self.text) != self.negate
    }
}

/// Case-insensitive property-name filter.
///
/// Terms are substrings; `!` negates a term, `&` binds tighter than `|`.
/// `"size|name"` shows either, `"!id&!address"` hides both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    // Disjunction of conjunctions. Empty matches everything.
    any_of: Vec<Vec<Pattern>>,
}

impl PropertyFilter {
    pub fn parse(expression: &str) -> Result<Self, FilterError> {
        if expression.trim().is_empty() {
            return Ok(Self::default());
        }

        let empty = || FilterError::EmptyTerm {
            expression: expression.to_string(),
        };

        let mut any_of = Vec::new();
        for conjunction in expression.split(statics::FILTER_OR) {
            let mut all_of = Vec::new();
            for term in conjunction.split(statics::FILTER_AND) {
                let term = term.trim();
                let (negate, text) = match term.strip_prefix(statics::FILTER_NOT) {
                    Some(rest) => (true, rest.trim()),
                    None => (false, term),
                };
                if text.is_empty() {
                    return Err(empty());
                }
                all_of.push(Pattern {
                    text: text.to_lowercase(),
                    negate,
                });
            }
            any_of.push(all_of);
        }
        Ok(Self { any_of })
    }

    pub fn is_empty(&self) -> bool {
        self.any_of.is_empty()
    }

    pub fn matches(&self, property: &ObjectProperty) -> bool {
        if self.any_of.is_empty() {
            return true;
        }
        let name = property.name.to_lowercase();
        self.any_of
            .iter()
            .any(|all_of| all_of.iter().all(|p| p.matches(&name)))
    }
}
