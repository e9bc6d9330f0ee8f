//! The rule model: passive data describing how one record type maps onto
//! delimited rows.
//!
//! A [`Ruleset`] is a heterogeneous bag of [`Rule`]s for one record type:
//! exactly one separator rule, at most one header rule, and one
//! [`FieldBinding`] per bound column. Rulesets are assembled up front,
//! registered once, and never mutated afterwards.
//!
//! Field access goes through closures captured at configuration time, so a
//! binding to a field that does not exist is a compile error rather than a
//! per-row name lookup.

use std::any::type_name;

use crate::{
    convert::{CellValue, parse_cell},
    error::SerializationError,
};

/// The column delimiter, restricted to a closed set of single characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `,` — classic CSV.
    Comma,
    /// `|` — pipe-separated values.
    Pipe,
    /// `\t` — tab-separated values.
    Tab,
}

impl Separator {
    /// The character used to join and split cells.
    pub fn as_char(&self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Pipe => '|',
            Separator::Tab => '\t',
        }
    }
}

/// Whether a header line is emitted on write and skipped on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRule {
    /// When true, the first line of the text is the header row.
    pub emit: bool,
}

/// Binds one field of `T` to one output column.
///
/// The getter and setter are captured as boxed closures; the cell's typed
/// conversion is fixed by the field type `V` chosen at construction. Use
/// `Option<V>` as the field type to make the column tolerate empty cells.
///
/// # Examples
///
/// ```
/// use separated_text_rs::rule::FieldBinding;
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: i32,
/// }
///
/// let binding = FieldBinding::new(
///     "age",
///     1,
///     |person: &Person| &person.age,
///     |person, value| person.age = value,
/// )
/// .with_header("Years Old");
///
/// assert_eq!(binding.header_label(), "Years Old");
/// assert_eq!(binding.position(), 1);
/// ```
pub struct FieldBinding<T> {
    name: String,
    position: u32,
    header_label: Option<String>,
    required: bool,
    encode: Box<dyn Fn(&T) -> String + Send + Sync>,
    decode: Box<dyn Fn(&mut T, &str) -> Result<(), SerializationError> + Send + Sync>,
}

impl<T> FieldBinding<T> {
    /// Creates a binding between the named field and the column at
    /// `position`.
    ///
    /// `position` is a sort key: columns are ordered by ascending position,
    /// and gaps in the declared values do not produce empty columns.
    pub fn new<V, G, S>(name: impl Into<String>, position: u32, getter: G, setter: S) -> Self
    where
        V: CellValue,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        FieldBinding {
            name: name.into(),
            position,
            header_label: None,
            required: false,
            encode: Box::new(move |record| getter(record).to_text()),
            decode: Box::new(move |record, text| {
                setter(record, parse_cell(text)?);
                Ok(())
            }),
        }
    }

    /// Overrides the header label; without one the field name is used.
    pub fn with_header(mut self, label: impl Into<String>) -> Self {
        self.header_label = Some(label.into());
        self
    }

    /// Marks the binding as required.
    ///
    /// The flag is descriptive configuration only: during parsing the
    /// missing-value failure is driven by the field type's optionality, not
    /// by this flag.
    pub fn required(mut self, yes: bool) -> Self {
        self.required = yes;
        self
    }

    /// Name of the bound field on the record type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The binding's column sort key.
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Whether the binding was declared required.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The label used in the header row.
    pub fn header_label(&self) -> &str {
        self.header_label.as_deref().unwrap_or(&self.name)
    }

    pub(crate) fn cell_text(&self, record: &T) -> String {
        (self.encode)(record)
    }

    pub(crate) fn assign(&self, record: &mut T, text: &str) -> Result<(), SerializationError> {
        (self.decode)(record, text)
    }
}

impl<T> std::fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("header_label", &self.header_label)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// One serialization concern inside a [`Ruleset`].
#[derive(Debug)]
pub enum Rule<T> {
    /// A field-to-column binding.
    Field(FieldBinding<T>),
    /// The column delimiter. Exactly one per ruleset.
    Separator(Separator),
    /// Header row policy. At most one per ruleset; absence means no header.
    Header(HeaderRule),
}

/// The complete binding configuration for one record type.
///
/// Rules are kept in insertion order; when a rule kind is duplicated the
/// first occurrence wins.
#[derive(Debug)]
pub struct Ruleset<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Ruleset<T> {
    /// Creates an empty ruleset for `T`.
    pub fn new() -> Self {
        Ruleset { rules: Vec::new() }
    }

    /// Appends a rule of any kind.
    pub fn with_rule(mut self, rule: Rule<T>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends a separator rule.
    pub fn with_separator(self, separator: Separator) -> Self {
        self.with_rule(Rule::Separator(separator))
    }

    /// Appends a header rule.
    pub fn with_headers(self, emit: bool) -> Self {
        self.with_rule(Rule::Header(HeaderRule { emit }))
    }

    /// Appends a field binding.
    pub fn with_field(self, binding: FieldBinding<T>) -> Self {
        self.with_rule(Rule::Field(binding))
    }

    /// Resolves the separator rule.
    ///
    /// A ruleset without one is unusable, so absence is a configuration
    /// error rather than a default.
    pub fn separator(&self) -> Result<Separator, SerializationError> {
        self.rules
            .iter()
            .find_map(|rule| match rule {
                Rule::Separator(separator) => Some(*separator),
                _ => None,
            })
            .ok_or_else(|| {
                SerializationError::Configuration(format!(
                    "no separator rule for type {}",
                    type_name::<T>()
                ))
            })
    }

    /// Whether the first line of the text is a header row.
    pub fn has_headers(&self) -> bool {
        self.rules
            .iter()
            .find_map(|rule| match rule {
                Rule::Header(header) => Some(header.emit),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// The field bindings in column order, sorted by ascending position.
    pub fn bindings(&self) -> Vec<&FieldBinding<T>> {
        let mut bindings: Vec<&FieldBinding<T>> = self
            .rules
            .iter()
            .filter_map(|rule| match rule {
                Rule::Field(binding) => Some(binding),
                _ => None,
            })
            .collect();
        bindings.sort_by_key(|binding| binding.position());
        bindings
    }
}

impl<T> Default for Ruleset<T> {
    fn default() -> Self {
        Self::new()
    }
}
