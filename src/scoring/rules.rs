/// Anything a rule can test a value against.
pub trait Matcher<T: ?Sized> {
    fn matches(&self, value: &T) -> bool;
}

/// One row of a rule table: if `when` matches, the criterion scores `score`.
#[derive(Debug, Clone)]
pub struct Rule<M> {
    pub when: M,
    pub score: f64,
}

/// An ordered rule table with a fallback for values no rule matches.
///
/// Rules are checked top to bottom and the first match wins, so tables list
/// the most specific (highest tier) patterns first.
#[derive(Debug, Clone)]
pub struct RuleTable<M: 'static> {
    pub rules: &'static [Rule<M>],
    pub fallback: f64,
}

impl<M: 'static> RuleTable<M> {
    pub const fn new(rules: &'static [Rule<M>], fallback: f64) -> Self {
        Self { rules, fallback }
    }

    /// Return the first rule matching `value`, if any.
    pub fn matched<T: ?Sized>(&self, value: &T) -> Option<&'static Rule<M>>
    where
        M: Matcher<T>,
    {
        self.rules.iter().find(|rule| rule.when.matches(value))
    }

    pub fn evaluate<T: ?Sized>(&self, value: &T) -> f64
    where
        M: Matcher<T>,
    {
        self.matched(value)
            .map(|rule| rule.score)
            .unwrap_or(self.fallback)
    }
}

/// Substring tests over already case-normalised text.
#[derive(Debug, Clone)]
pub enum TextMatch {
    /// Contains at least one of the needles
    ContainsAny(&'static [&'static str]),
    /// Contains `needle` but not `without`
    ContainsWithout {
        needle: &'static str,
        without: &'static str,
    },
    /// Splits into more than `count` parts on `separator`
    SegmentsOver { separator: char, count: usize },
}

impl Matcher<str> for TextMatch {
    fn matches(&self, value: &str) -> bool {
        match self {
            TextMatch::ContainsAny(needles) => needles.iter().any(|n| value.contains(n)),
            TextMatch::ContainsWithout { needle, without } => {
                value.contains(needle) && !value.contains(without)
            }
            TextMatch::SegmentsOver { separator, count } => {
                value.contains(*separator) && value.split(*separator).count() > *count
            }
        }
    }
}

/// Numeric band tests. Bounds are inclusive.
#[derive(Debug, Clone)]
pub enum Band {
    AtLeast(f64),
    AtMost(f64),
    Above(f64),
    Between(f64, f64),
}

impl Matcher<f64> for Band {
    fn matches(&self, value: &f64) -> bool {
        let value = *value;
        match self {
            Band::AtLeast(n) => value >= *n,
            Band::AtMost(n) => value <= *n,
            Band::Above(n) => value > *n,
            Band::Between(low, high) => value >= *low && value <= *high,
        }
    }
}
