//! The row codec: serializes record collections to delimited text and parses
//! delimited text back into records.
//!
//! The codec holds the configured [`RulesetRegistry`] and nothing else. Every
//! call resolves the ruleset for the record type, walks the field bindings in
//! position order and delegates each cell to the coercion engine. Calls are
//! stateless and safe to issue concurrently once configuration is done.
//!
//! There is no quoting or escaping: a cell value containing the separator
//! character will corrupt the row. Lines are `\n`-terminated on write; both
//! `\r` and `\n` are accepted as terminators on read.

use std::{any::type_name, slice};

use log::debug;

use crate::{
    error::SerializationError,
    registry::RulesetRegistry,
    rule::FieldBinding,
};

/// Serializes and deserializes delimited rows for every registered record
/// type.
///
/// # Examples
///
/// ```
/// use separated_text_rs::{
///     codec::RowCodec,
///     registry::RulesetRegistry,
///     rule::{FieldBinding, Ruleset, Separator},
/// };
///
/// #[derive(Debug, Default, PartialEq)]
/// struct City {
///     name: String,
///     population: u32,
/// }
///
/// let ruleset = Ruleset::<City>::new()
///     .with_separator(Separator::Comma)
///     .with_headers(true)
///     .with_field(FieldBinding::new(
///         "name",
///         0,
///         |city: &City| &city.name,
///         |city, value| city.name = value,
///     ))
///     .with_field(FieldBinding::new(
///         "population",
///         1,
///         |city: &City| &city.population,
///         |city, value| city.population = value,
///     ));
///
/// let mut registry = RulesetRegistry::new();
/// registry.register(ruleset);
/// let codec = RowCodec::new(registry);
///
/// let cities = vec![City { name: "Boston".into(), population: 4628910 }];
/// let text = codec.serialize(&cities).unwrap();
/// assert_eq!(text, "name,population\nBoston,4628910\n");
///
/// let parsed: Vec<City> = codec.deserialize(&text).unwrap();
/// assert_eq!(parsed, cities);
/// ```
pub struct RowCodec {
    registry: RulesetRegistry,
}

impl RowCodec {
    /// Creates a codec over a fully-built registry.
    pub fn new(registry: RulesetRegistry) -> Self {
        RowCodec { registry }
    }

    /// The registry the codec resolves rulesets from.
    pub fn registry(&self) -> &RulesetRegistry {
        &self.registry
    }

    /// Serializes the records to delimited text, one `\n`-terminated line
    /// per record, preceded by a header line when the ruleset asks for one.
    ///
    /// Cells appear in ascending binding-position order; absent optional
    /// values serialize as empty cells.
    pub fn serialize<T: 'static>(&self, records: &[T]) -> Result<String, SerializationError> {
        let ruleset = self.registry.find::<T>()?;
        let separator = ruleset.separator()?.as_char();
        let bindings = ruleset.bindings();
        debug!(
            "serializing {} records of type {}",
            records.len(),
            type_name::<T>()
        );

        let mut output = String::new();
        if ruleset.has_headers() {
            push_line(
                &mut output,
                bindings.iter().map(|binding| binding.header_label().to_string()),
                separator,
            );
        }
        for record in records {
            push_line(
                &mut output,
                bindings.iter().map(|binding| binding.cell_text(record)),
                separator,
            );
        }
        Ok(output)
    }

    /// Serializes a single record; the header line is still emitted when the
    /// ruleset asks for one.
    pub fn serialize_one<T: 'static>(&self, record: &T) -> Result<String, SerializationError> {
        self.serialize(slice::from_ref(record))
    }

    /// Parses every data line of `input` into a record.
    ///
    /// Empty lines are dropped, exactly one leading line is skipped when the
    /// ruleset declares headers, and input with no data lines yields an
    /// empty vector. Bound fields are assigned in position order from the
    /// line's cells; unbound fields keep their `Default` values.
    pub fn deserialize<T: Default + 'static>(
        &self,
        input: &str,
    ) -> Result<Vec<T>, SerializationError> {
        let ruleset = self.registry.find::<T>()?;
        let separator = ruleset.separator()?.as_char();
        let bindings = ruleset.bindings();
        let lines = data_lines(input);
        let skip = usize::from(ruleset.has_headers());
        debug!(
            "deserializing {} lines into type {}",
            lines.len().saturating_sub(skip),
            type_name::<T>()
        );

        let mut records = Vec::with_capacity(lines.len().saturating_sub(skip));
        for line in lines.into_iter().skip(skip) {
            records.push(read_row(line, separator, &bindings)?);
        }
        Ok(records)
    }

    /// Parses exactly one record from the first data line of `input`.
    ///
    /// Fails with [`SerializationError::EmptyInput`] when the input holds no
    /// lines at all, and with [`SerializationError::RowShape`] when only a
    /// header line remains. Lines after the first data line are ignored.
    pub fn deserialize_one<T: Default + 'static>(
        &self,
        input: &str,
    ) -> Result<T, SerializationError> {
        let ruleset = self.registry.find::<T>()?;
        let separator = ruleset.separator()?.as_char();
        let bindings = ruleset.bindings();

        let lines = data_lines(input);
        if lines.is_empty() {
            return Err(SerializationError::EmptyInput);
        }
        let index = usize::from(ruleset.has_headers());
        let Some(line) = lines.get(index) else {
            return Err(SerializationError::RowShape(
                "no data row remains after the header line".to_string(),
            ));
        };
        read_row(line, separator, &bindings)
    }

    /// The header labels for `T` in column order, regardless of whether the
    /// ruleset emits a header row.
    pub fn header_labels<T: 'static>(&self) -> Result<Vec<String>, SerializationError> {
        let ruleset = self.registry.find::<T>()?;
        Ok(ruleset
            .bindings()
            .iter()
            .map(|binding| binding.header_label().to_string())
            .collect())
    }

    /// The header line for `T`: the labels joined by the separator, without
    /// a trailing line terminator.
    pub fn header_line<T: 'static>(&self) -> Result<String, SerializationError> {
        let ruleset = self.registry.find::<T>()?;
        let separator = ruleset.separator()?.as_char().to_string();
        let labels: Vec<&str> = ruleset
            .bindings()
            .iter()
            .map(|binding| binding.header_label())
            .collect();
        Ok(labels.join(&separator))
    }
}

/// Splits input on `\r`/`\n` and drops empty lines, so any mix of line
/// terminators and trailing newlines is accepted.
fn data_lines(input: &str) -> Vec<&str> {
    input
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .collect()
}

fn push_line<I>(output: &mut String, cells: I, separator: char)
where
    I: Iterator<Item = String>,
{
    for (index, cell) in cells.enumerate() {
        if index > 0 {
            output.push(separator);
        }
        output.push_str(&cell);
    }
    output.push('\n');
}

fn read_row<T: Default>(
    line: &str,
    separator: char,
    bindings: &[&FieldBinding<T>],
) -> Result<T, SerializationError> {
    let cells: Vec<&str> = line.split(separator).collect();
    if cells.len() < bindings.len() {
        return Err(SerializationError::RowShape(format!(
            "row has {} cells but the ruleset binds {} columns: {line:?}",
            cells.len(),
            bindings.len()
        )));
    }

    let mut record = T::default();
    for (cell, binding) in cells.iter().zip(bindings) {
        binding.assign(&mut record, cell)?;
    }
    Ok(record)
}
