//! Struct tag parsing and normalization.
//!
//! A struct tag is a fully-qualified on-chain type reference such as
//! `0x2::coin::Coin<0x2::sui::SUI>`. Both chains share the grammar:
//!
//! - Primitive types: `bool`, `u8`, `u16`, `u32`, `u64`, `u128`, `u256`, `address`, `signer`
//! - Vector types: `vector<T>`
//! - Struct types: `0x2::module::Struct` or `0x2::module::Struct<T1, T2>`
//!
//! Parsed tags keep addresses in short form (`0x2`). The canonical string
//! used on the wire expands them to 64 hex digits.

use std::fmt;

use move_core_types::identifier::Identifier;
use serde::{Deserialize, Serialize};

use crate::address::{normalize_address, parse_address};

/// A fully-qualified Move struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructTag {
    pub address: String,
    pub module: String,
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeTag>,
}

/// Any Move type that may appear as a type parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
}

/// A type string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructTagError {
    pub input: String,
    pub reason: String,
}

impl StructTagError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StructTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid struct tag '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for StructTagError {}

/// Parse `0x<address>::<module>::<name>[<type params>]`.
pub fn parse_struct_tag(input: &str) -> Result<StructTag, StructTagError> {
    let type_str = input.trim();

    let (base, args) = match type_str.find('<') {
        Some(pos) => (&type_str[..pos], Some(&type_str[pos..])),
        None => (type_str, None),
    };

    let parts: Vec<&str> = base.split("::").collect();
    let [address, module, name] = parts.as_slice() else {
        return Err(StructTagError::new(
            input,
            "expected <address>::<module>::<name>",
        ));
    };

    let address = parse_address(address)
        .ok_or_else(|| StructTagError::new(input, format!("invalid address '{}'", address)))?;
    for ident in [module, name] {
        if !Identifier::is_valid(ident) {
            return Err(StructTagError::new(
                input,
                format!("invalid identifier '{}'", ident),
            ));
        }
    }

    let type_params = match args {
        Some(args) => parse_type_args(input, args)?,
        None => Vec::new(),
    };

    Ok(StructTag {
        address: address.to_hex_literal(),
        module: module.to_string(),
        name: name.to_string(),
        type_params,
    })
}

/// Parse any Move type string into a [`TypeTag`].
pub fn parse_type_tag(input: &str) -> Result<TypeTag, StructTagError> {
    let type_str = input.trim();

    let primitive = match type_str {
        "bool" => Some(TypeTag::Bool),
        "u8" => Some(TypeTag::U8),
        "u16" => Some(TypeTag::U16),
        "u32" => Some(TypeTag::U32),
        "u64" => Some(TypeTag::U64),
        "u128" => Some(TypeTag::U128),
        "u256" => Some(TypeTag::U256),
        "address" => Some(TypeTag::Address),
        "signer" => Some(TypeTag::Signer),
        _ => None,
    };
    if let Some(tag) = primitive {
        return Ok(tag);
    }

    if let Some(inner) = type_str
        .strip_prefix("vector<")
        .and_then(|s| s.strip_suffix('>'))
    {
        return Ok(TypeTag::Vector(Box::new(parse_type_tag(inner)?)));
    }

    parse_struct_tag(type_str).map(|s| TypeTag::Struct(Box::new(s)))
}

fn parse_type_args(input: &str, args: &str) -> Result<Vec<TypeTag>, StructTagError> {
    let inner = args
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| StructTagError::new(input, "unterminated type parameter list"))?;
    if inner.trim().is_empty() {
        return Err(StructTagError::new(input, "empty type parameter list"));
    }

    split_type_params(inner)
        .ok_or_else(|| StructTagError::new(input, "unbalanced angle brackets"))?
        .into_iter()
        .map(parse_type_tag)
        .collect()
}

/// Split type parameters respecting nested angle brackets.
///
/// Given "A, B<C, D>, E", returns ["A", "B<C, D>", "E"]. Returns `None` when
/// the brackets do not balance.
pub fn split_type_params(s: &str) -> Option<Vec<&str>> {
    let mut result = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                result.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }

    result.push(s[start..].trim());
    Some(result)
}

/// Canonicalize a tag: addresses in short lowercase form, recursively.
pub fn normalize_struct_tag(tag: &StructTag) -> StructTag {
    StructTag {
        address: parse_address(&tag.address)
            .map(|a| a.to_hex_literal())
            .unwrap_or_else(|| tag.address.to_lowercase()),
        module: tag.module.clone(),
        name: tag.name.clone(),
        type_params: tag.type_params.iter().map(TypeTag::normalized).collect(),
    }
}

impl StructTag {
    /// Wire form with 64-digit addresses, parameters joined by `,`.
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        self.render(true, &mut out);
        out
    }

    fn render(&self, full_address: bool, out: &mut String) {
        if full_address {
            out.push_str(&normalize_address(&self.address));
        } else {
            out.push_str(&self.address);
        }
        out.push_str("::");
        out.push_str(&self.module);
        out.push_str("::");
        out.push_str(&self.name);
        if !self.type_params.is_empty() {
            out.push('<');
            for (i, p) in self.type_params.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                p.render(full_address, out);
            }
            out.push('>');
        }
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(false, &mut out);
        f.write_str(&out)
    }
}

impl TypeTag {
    pub fn normalized(&self) -> TypeTag {
        match self {
            TypeTag::Vector(inner) => TypeTag::Vector(Box::new(inner.normalized())),
            TypeTag::Struct(s) => TypeTag::Struct(Box::new(normalize_struct_tag(s))),
            other => other.clone(),
        }
    }

    pub fn as_struct(&self) -> Option<&StructTag> {
        match self {
            TypeTag::Struct(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        self.render(true, &mut out);
        out
    }

    fn render(&self, full_address: bool, out: &mut String) {
        let primitive = match self {
            TypeTag::Bool => "bool",
            TypeTag::U8 => "u8",
            TypeTag::U16 => "u16",
            TypeTag::U32 => "u32",
            TypeTag::U64 => "u64",
            TypeTag::U128 => "u128",
            TypeTag::U256 => "u256",
            TypeTag::Address => "address",
            TypeTag::Signer => "signer",
            TypeTag::Vector(inner) => {
                out.push_str("vector<");
                inner.render(full_address, out);
                out.push('>');
                return;
            }
            TypeTag::Struct(s) => {
                s.render(full_address, out);
                return;
            }
        };
        out.push_str(primitive);
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(false, &mut out);
        f.write_str(&out)
    }
}
