#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Separated Text for Rust

 A rule-driven mapper between strongly-typed records and delimited-text rows
 (CSV, TSV, PSV and friends). Instead of deriving the mapping from the record
 type, the caller declares it: an ordered list of field-to-column bindings,
 one column separator, and whether a header row is present. The crate then
 serializes collections of that type to delimited text and parses delimited
 text back into typed records.

 ## Core Concepts

 - **Field binding:** associates one record field with one output column —
   a position, an optional header label, and a pair of accessor closures
   captured at configuration time.
 - **Ruleset:** the complete binding configuration for one record type:
   the separator rule, the header rule and the field bindings.
 - **Registry:** maps record types to their rulesets; populated once during
   configuration and read-only afterwards.
 - **Row codec:** walks the bindings in position order and delegates every
   cell to the value coercion engine, which covers strings, numbers, dates,
   booleans, enums, UUIDs, byte buffers, URLs and more.

 ## Getting Started

```rust
use separated_text_rs::{
    codec::RowCodec,
    error::SerializationError,
    registry::RulesetRegistry,
    rule::{FieldBinding, Ruleset, Separator},
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    name: String,
    age: i32,
    email: String,
}

fn main() -> Result<(), SerializationError> {
    let ruleset = Ruleset::<Person>::new()
        .with_separator(Separator::Comma)
        .with_headers(true)
        .with_field(
            FieldBinding::new(
                "name",
                0,
                |person: &Person| &person.name,
                |person, value| person.name = value,
            )
            .with_header("Full Name"),
        )
        .with_field(
            FieldBinding::new(
                "age",
                1,
                |person: &Person| &person.age,
                |person, value| person.age = value,
            )
            .with_header("Years Old"),
        )
        .with_field(FieldBinding::new(
            "email",
            2,
            |person: &Person| &person.email,
            |person, value| person.email = value,
        ));

    let mut registry = RulesetRegistry::new();
    registry.register(ruleset);
    let codec = RowCodec::new(registry);

    let people = vec![Person {
        name: "John Doe".to_string(),
        age: 30,
        email: "john@x.com".to_string(),
    }];

    let text = codec.serialize(&people)?;
    assert_eq!(text, "Full Name,Years Old,email\nJohn Doe,30,john@x.com\n");

    let parsed: Vec<Person> = codec.deserialize(&text)?;
    assert_eq!(parsed, people);

    Ok(())
}
```

 ## Scope

 The format is deliberately plain: single-character separators from a closed
 set, no RFC-4180 quoting or escaping, `\n`-terminated lines on write and
 any mix of `\r`/`\n` accepted on read. Failures are surfaced as typed
 errors with no partial recovery; callers wanting per-row fault tolerance
 catch and skip at the row granularity themselves.

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.

*/

/// The row codec that serializes and deserializes delimited rows.
pub mod codec;

/// The value coercion engine between cell text and typed field values.
pub mod convert;

/// Error types for rule configuration and row conversion.
pub mod error;

#[doc(inline)]
pub use error::*;

/// The type-keyed ruleset registry.
pub mod registry;

/// The rule model: separators, header policy and field bindings.
pub mod rule;
