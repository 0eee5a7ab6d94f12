// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Content fingerprint of a configuration resource's `data`.
//!
//! The payload is rendered as JSON with sorted keys, `", "`/`": "` separators
//! and every non-ASCII character escaped as `\uXXXX`, then hashed with MD5.
//! That canonical form keeps fingerprints stable across controller versions,
//! so workloads already stamped are not rolled again after an upgrade.

use crate::error::Result;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Hex-encoded MD5 of the canonical JSON form of `data`.
///
/// `None` (a resource without a `data` field) hashes as `null`, distinct from
/// an empty mapping.
pub fn fingerprint(data: Option<&BTreeMap<String, String>>) -> Result<String> {
    let canonical = canonical_json(&data)?;
    Ok(format!("{:x}", md5::compute(canonical)))
}

fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, CanonicalFormatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\x7f' {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
