use crate::{Diagnostic, DiagnosticCode, DiagnosticGroup, Severity};

/// Ordered accumulator of diagnostic groups.
///
/// Order is the order of `add`; `collect` appends the drained inner bag
/// in-order, so rendering matches the order failures were discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticBag {
    groups: Vec<DiagnosticGroup>,
    severity: Severity,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, group: impl Into<DiagnosticGroup>) -> &mut Self {
        let group = group.into();
        self.severity = self.severity.max(group.severity());
        self.groups.push(group);
        self
    }

    /// Append another bag, preserving its internal order.
    pub fn add_bag(&mut self, other: DiagnosticBag) -> &mut Self {
        self.severity = self.severity.max(other.severity);
        self.groups.extend(other.groups);
        self
    }

    /// Drain the diagnostics out of a [`Diagnosed`] and return its value.
    pub fn collect<T>(&mut self, diagnosed: Diagnosed<T>) -> T {
        let (value, bag) = diagnosed.into_parts();
        self.add_bag(bag);
        value
    }

    /// Drain the diagnostics out of an [`Expected`] and return its value,
    /// if one could be built.
    pub fn collect_opt<T>(&mut self, expected: Expected<T>) -> Option<T> {
        let (value, bag) = expected.into_parts();
        self.add_bag(bag);
        value
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// The maximum severity over all diagnostics; `Info` when empty.
    #[inline]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn groups(&self) -> &[DiagnosticGroup] {
        &self.groups
    }

    pub fn error_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|group| group.severity() == Severity::Error)
            .count()
    }

    /// All primary diagnostics carrying the given code.
    pub fn with_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.groups
            .iter()
            .filter(|group| group.code() == Some(code))
            .map(|group| &group.primary)
            .collect()
    }

    pub fn into_groups(self) -> Vec<DiagnosticGroup> {
        self.groups
    }
}

/// A value plus the diagnostics produced while building it. There is
/// always a value; failed sub-steps degrade it with error sentinels
/// instead of removing it.
#[derive(Debug, Clone)]
#[must_use = "dropping a Diagnosed drops its diagnostics"]
pub struct Diagnosed<T> {
    value: T,
    bag: DiagnosticBag,
}

impl<T> Diagnosed<T> {
    pub fn new(value: T, bag: DiagnosticBag) -> Self {
        Self { value, bag }
    }

    /// A value with no diagnostics.
    pub fn value(value: T) -> Self {
        Self {
            value,
            bag: DiagnosticBag::new(),
        }
    }

    pub fn into_parts(self) -> (T, DiagnosticBag) {
        (self.value, self.bag)
    }

    pub fn as_value(&self) -> &T {
        &self.value
    }

    pub fn bag(&self) -> &DiagnosticBag {
        &self.bag
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Diagnosed<U> {
        Diagnosed {
            value: f(self.value),
            bag: self.bag,
        }
    }
}

/// A possibly-absent value plus the diagnostics produced while trying to
/// build it. Absence means "no value could be built at all"; only the
/// surface layers short-circuit on it.
#[derive(Debug, Clone)]
#[must_use = "dropping an Expected drops its diagnostics"]
pub struct Expected<T> {
    value: Option<T>,
    bag: DiagnosticBag,
}

impl<T> Expected<T> {
    pub fn new(value: Option<T>, bag: DiagnosticBag) -> Self {
        Self { value, bag }
    }

    pub fn found(value: T) -> Self {
        Self {
            value: Some(value),
            bag: DiagnosticBag::new(),
        }
    }

    pub fn found_with(value: T, bag: DiagnosticBag) -> Self {
        Self {
            value: Some(value),
            bag,
        }
    }

    pub fn none(bag: DiagnosticBag) -> Self {
        Self { value: None, bag }
    }

    /// No value, a single diagnostic.
    pub fn fail(group: impl Into<DiagnosticGroup>) -> Self {
        let mut bag = DiagnosticBag::new();
        bag.add(group);
        Self { value: None, bag }
    }

    pub fn into_parts(self) -> (Option<T>, DiagnosticBag) {
        (self.value, self.bag)
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn bag(&self) -> &DiagnosticBag {
        &self.bag
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Expected<U> {
        Expected {
            value: self.value.map(f),
            bag: self.bag,
        }
    }
}

impl<T> From<Diagnosed<T>> for Expected<T> {
    fn from(diagnosed: Diagnosed<T>) -> Self {
        let (value, bag) = diagnosed.into_parts();
        Expected {
            value: Some(value),
            bag,
        }
    }
}
