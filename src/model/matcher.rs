//! Course matchers: how a course's row is found in a progress table.
//!
//! A matcher is an ordered list of search terms plus two filters.
//! Terms are tried in order; the first term that yields an accepted row wins.
//! Exclusion terms disqualify rows naming a sibling course (`CS50W` when
//! looking for `CS50`); required terms, when present, demand that the
//! row names at least one of them.

/// Search terms and disambiguation filters for one course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseMatcher {
    /// Search terms in priority order.
    pub terms: Vec<String>,
    pub exclusion_terms: Vec<String>,
    pub required_terms: Vec<String>,
    pub case_sensitive: bool,
}

/// Why a candidate row was passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The row names an exclusion term.
    Excluded(String),
    /// The row names none of the required terms.
    MissingRequired,
}

impl CourseMatcher {
    /// Build a matcher from a primary term followed by fallbacks.
    ///
    /// Blank terms are dropped and duplicates keep their first position.
    pub fn new<I, S>(primary: &str, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self {
            case_sensitive: true,
            ..Self::default()
        };
        matcher.push_term(primary);
        for term in fallbacks {
            matcher.push_term(term.as_ref());
        }
        matcher
    }

    pub fn exclude<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_unique(&mut self.exclusion_terms, terms);
        self
    }

    pub fn require<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_unique(&mut self.required_terms, terms);
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Append a search term, ignoring blanks and duplicates.
    pub fn push_term(&mut self, term: &str) {
        let term = term.trim();
        if !term.is_empty() && !self.terms.iter().any(|t| t == term) {
            self.terms.push(term.to_string());
        }
    }

    /// Whether `haystack` contains `needle` under this matcher's case mode.
    pub fn contains(&self, haystack: &str, needle: &str) -> bool {
        if self.case_sensitive {
            haystack.contains(needle)
        } else {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
    }

    /// Check a candidate name cell against the exclusion and required filters.
    ///
    /// Exclusions are checked first.
    pub fn screen(&self, name_cell: &str) -> Result<(), Rejection> {
        if let Some(term) = self
            .exclusion_terms
            .iter()
            .find(|t| self.contains(name_cell, t))
        {
            return Err(Rejection::Excluded(term.clone()));
        }

        if !self.required_terms.is_empty()
            && !self
                .required_terms
                .iter()
                .any(|t| self.contains(name_cell, t))
        {
            return Err(Rejection::MissingRequired);
        }

        Ok(())
    }
}

fn extend_unique<I, S>(list: &mut Vec<String>, terms: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for term in terms {
        let term = term.as_ref().trim();
        if !term.is_empty() && !list.iter().any(|t| t == term) {
            list.push(term.to_string());
        }
    }
}
