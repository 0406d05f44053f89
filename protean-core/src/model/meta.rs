// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Normalized per-type metadata: names, renames, integer keys, inclusion
//! flags, and the union tag style.
//!
//! Metadata is supplied by the caller at registration time and affects which
//! dispatch rule fires and how fields are labeled on the wire. It never
//! affects descriptor identity.

use crate::types::UnionStyle;

/// Case transform applied to every field or variant name of a type unless an
/// explicit rename overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    LowerCase,
    UpperCase,
    PascalCase,
    CamelCase,
    SnakeCase,
    ScreamingSnakeCase,
    KebabCase,
}

/// Splits `name` into lowercase words at underscores and case boundaries, so
/// both `snake_case` fields and `PascalCase` variants normalize identically.
fn words(name: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else if ch.is_uppercase() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            current.extend(ch.to_lowercase());
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl RenameRule {
    pub fn apply(&self, name: &str) -> String {
        let words = words(name);
        match self {
            RenameRule::LowerCase => words.concat(),
            RenameRule::UpperCase => words.concat().to_uppercase(),
            RenameRule::PascalCase => words.iter().map(|w| capitalize(w)).collect(),
            RenameRule::CamelCase => {
                let mut iter = words.iter();
                let mut out = iter.next().cloned().unwrap_or_default();
                for w in iter {
                    out.push_str(&capitalize(w));
                }
                out
            }
            RenameRule::SnakeCase => words.join("_"),
            RenameRule::ScreamingSnakeCase => words.join("_").to_uppercase(),
            RenameRule::KebabCase => words.join("-"),
        }
    }
}

/// Metadata of one struct field.
#[derive(Debug, Clone)]
pub struct FieldMeta {
    /// Declared (source-level) name.
    pub name: String,
    /// Explicit wire rename; wins over any type-level rule.
    pub rename: Option<String>,
    /// Optional compact integer key for formats that prefer numbers.
    pub int_key: Option<u32>,
    /// Whether the field participates in serialization.
    pub include_ser: bool,
    /// Whether the field participates in deserialization.
    pub include_de: bool,
}

impl FieldMeta {
    pub fn new(name: impl Into<String>) -> FieldMeta {
        FieldMeta {
            name: name.into(),
            rename: None,
            int_key: None,
            include_ser: true,
            include_de: true,
        }
    }

    pub fn rename(mut self, wire_name: impl Into<String>) -> FieldMeta {
        self.rename = Some(wire_name.into());
        self
    }

    pub fn int_key(mut self, key: u32) -> FieldMeta {
        self.int_key = Some(key);
        self
    }

    pub fn skip_ser(mut self) -> FieldMeta {
        self.include_ser = false;
        self
    }

    pub fn skip_de(mut self) -> FieldMeta {
        self.include_de = false;
        self
    }

    /// The label a backend should emit: explicit rename, then the type-level
    /// rule, then the declared name.
    pub fn wire_name(&self, rule: Option<RenameRule>) -> String {
        match (&self.rename, rule) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(rule)) => rule.apply(&self.name),
            (None, None) => self.name.clone(),
        }
    }
}

/// Metadata of one union variant.
#[derive(Debug, Clone)]
pub struct VariantMeta {
    pub name: String,
    pub rename: Option<String>,
    /// Stable tag; defaults to the declaration index.
    pub tag: u32,
}

impl VariantMeta {
    pub fn new(name: impl Into<String>, tag: u32) -> VariantMeta {
        VariantMeta {
            name: name.into(),
            rename: None,
            tag,
        }
    }

    pub fn rename(mut self, wire_name: impl Into<String>) -> VariantMeta {
        self.rename = Some(wire_name.into());
        self
    }

    pub fn wire_name(&self, rule: Option<RenameRule>) -> String {
        match (&self.rename, rule) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(rule)) => rule.apply(&self.name),
            (None, None) => self.name.clone(),
        }
    }
}

/// Per-type metadata table, normalized away from any attribute syntax.
#[derive(Debug, Clone)]
pub struct TypeMeta {
    pub declared_name: String,
    /// Case transform for field/variant labels.
    pub rename_all: Option<RenameRule>,
    /// Tag encoding for union shapes; ignored by the others.
    pub union_style: UnionStyle,
}

impl TypeMeta {
    pub fn named(declared_name: impl Into<String>) -> TypeMeta {
        TypeMeta {
            declared_name: declared_name.into(),
            rename_all: None,
            union_style: UnionStyle::External,
        }
    }

    pub fn rename_all(mut self, rule: RenameRule) -> TypeMeta {
        self.rename_all = Some(rule);
        self
    }

    pub fn union_style(mut self, style: UnionStyle) -> TypeMeta {
        self.union_style = style;
        self
    }
}

impl From<&str> for FieldMeta {
    fn from(name: &str) -> FieldMeta {
        FieldMeta::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_rules_cover_field_and_variant_conventions() {
        assert_eq!(RenameRule::CamelCase.apply("max_retry_count"), "maxRetryCount");
        assert_eq!(RenameRule::PascalCase.apply("max_retry_count"), "MaxRetryCount");
        assert_eq!(RenameRule::SnakeCase.apply("MaxRetryCount"), "max_retry_count");
        assert_eq!(RenameRule::KebabCase.apply("MaxRetryCount"), "max-retry-count");
        assert_eq!(
            RenameRule::ScreamingSnakeCase.apply("maxRetryCount"),
            "MAX_RETRY_COUNT"
        );
    }

    #[test]
    fn explicit_rename_wins_over_type_rule() {
        let field = FieldMeta::new("user_id").rename("uid");
        assert_eq!(field.wire_name(Some(RenameRule::CamelCase)), "uid");
        let plain = FieldMeta::new("user_id");
        assert_eq!(plain.wire_name(Some(RenameRule::CamelCase)), "userId");
        assert_eq!(plain.wire_name(None), "user_id");
    }
}
