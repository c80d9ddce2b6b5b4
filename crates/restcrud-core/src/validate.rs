// ── Form validation ──
//
// Declarative per-field rule lists evaluated against a flat map of form
// values. Rules for a field run in declared order and the first failure
// wins; fields are independent of each other. Validation is pure.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use regex::Regex;

/// Current form values by field name. Absent fields are treated as unset.
pub type FormData = BTreeMap<String, String>;

/// First error message per invalid field. Valid fields are absent.
pub type FieldErrors = BTreeMap<String, String>;

/// Caller-supplied check over a field's value and the whole form.
pub type Predicate = Arc<dyn Fn(Option<&str>, &FormData) -> bool + Send + Sync>;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

// ── Rules ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum RuleKind {
    /// Present and non-blank after trimming.
    Required,
    /// At least `n` characters after trimming. An empty value fails.
    MinLength(usize),
    /// At most `n` characters. An empty value passes.
    MaxLength(usize),
    /// `local@domain.tld` shape. Only checked when non-empty.
    Email,
    Custom(Predicate),
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::MinLength(n) => f.debug_tuple("MinLength").field(n).finish(),
            Self::MaxLength(n) => f.debug_tuple("MaxLength").field(n).finish(),
            Self::Email => f.write_str("Email"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One check on one field, with an optional custom message.
#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    message: Option<String>,
}

impl Rule {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    pub fn required() -> Self {
        Self::new(RuleKind::Required)
    }

    pub fn min_length(n: usize) -> Self {
        Self::new(RuleKind::MinLength(n))
    }

    pub fn max_length(n: usize) -> Self {
        Self::new(RuleKind::MaxLength(n))
    }

    pub fn email() -> Self {
        Self::new(RuleKind::Email)
    }

    pub fn custom(check: impl Fn(Option<&str>, &FormData) -> bool + Send + Sync + 'static) -> Self {
        Self::new(RuleKind::Custom(Arc::new(check)))
    }

    /// Replace the default message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn passes(&self, value: Option<&str>, form: &FormData) -> bool {
        match &self.kind {
            RuleKind::Required => value.is_some_and(|v| !v.trim().is_empty()),
            RuleKind::MinLength(n) => value.is_some_and(|v| v.trim().chars().count() >= *n),
            RuleKind::MaxLength(n) => value.is_none_or(|v| v.chars().count() <= *n),
            RuleKind::Email => value.is_none_or(|v| v.is_empty() || EMAIL.is_match(v)),
            RuleKind::Custom(check) => check(value, form),
        }
    }

    fn error_for(&self, field: &str) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match &self.kind {
            RuleKind::Required => format!("{field} is required"),
            RuleKind::MinLength(n) => format!("{field} must be at least {n} characters"),
            RuleKind::MaxLength(n) => format!("{field} must be no more than {n} characters"),
            RuleKind::Email => "Invalid email format".to_owned(),
            RuleKind::Custom(_) => "Invalid value".to_owned(),
        }
    }
}

// ── Validator ───────────────────────────────────────────────────────

/// A static rule set over named form fields.
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    fields: IndexMap<String, Vec<Rule>>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `rules` for `field`, appending to any already declared.
    pub fn field(mut self, field: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.entry(field.into()).or_default().extend(rules);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// First failing rule's message for `field`, if any.
    pub fn validate_field(&self, field: &str, form: &FormData) -> Option<String> {
        let rules = self.fields.get(field)?;
        let value = form.get(field).map(String::as_str);
        rules
            .iter()
            .find(|rule| !rule.passes(value, form))
            .map(|rule| rule.error_for(field))
    }

    pub fn validate(&self, form: &FormData) -> FieldErrors {
        self.fields
            .keys()
            .filter_map(|field| {
                self.validate_field(field, form)
                    .map(|message| (field.clone(), message))
            })
            .collect()
    }

    /// `Ok(())` when every field passes, otherwise every field's first error.
    pub fn check(&self, form: &FormData) -> Result<(), FieldErrors> {
        let errors = self.validate(form);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Build a [`FormData`] from `(field, value)` pairs.
pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> FormData
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
