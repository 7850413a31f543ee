//! Serialized item text format
//!
//! An item file is a header block followed by field and version blocks:
//!
//! ```text
//! ----item----
//! version: 1
//! id: {GUID}
//! database: master
//! path: /sitecore/content/Home
//! parent: {GUID}
//! name: Home
//! master: {GUID}
//! template: {GUID}
//! templatekey: Sample Item
//!
//! ----field----
//! field: {GUID}
//! name: Title
//! key: title
//! content-length: 4
//!
//! Home
//! ----version----
//! language: en
//! version: 1
//! revision: {GUID}
//!
//! ```
//!
//! Field blocks before the first version block are shared fields. `content-length` is the
//! byte length of the value that follows the blank line.

use crate::error::StorageError;
use crate::item::{ItemField, ItemVersion, SerializedItem};

const ITEM_MARKER: &str = "----item----";
const FIELD_MARKER: &str = "----field----";
const VERSION_MARKER: &str = "----version----";
const FORMAT_VERSION: &str = "1";

/// Encode/decode service for item files
pub trait ItemCodec: Send + Sync {
    fn decode(&self, text: &str) -> Result<SerializedItem, StorageError>;
    fn encode(&self, item: &SerializedItem) -> Result<String, StorageError>;
}

/// The line-oriented item format
#[derive(Debug, Clone, Copy, Default)]
pub struct TextItemCodec;

impl ItemCodec for TextItemCodec {
    fn decode(&self, text: &str) -> Result<SerializedItem, StorageError> {
        let mut tokens = Tokenizer::new(text);
        match tokens.next_non_empty() {
            Some(ITEM_MARKER) => {}
            Some(other) => {
                return Err(StorageError::parse(
                    tokens.line,
                    format!("expected {}, found {:?}", ITEM_MARKER, other),
                ))
            }
            None => return Err(StorageError::parse(0, "empty item file")),
        }

        let mut item = SerializedItem::default();
        for (key, value) in tokens.read_headers()? {
            let slot = match key {
                "id" => &mut item.id,
                "database" => &mut item.database_name,
                "path" => &mut item.path,
                "parent" => &mut item.parent_id,
                "name" => &mut item.name,
                "master" => &mut item.branch_id,
                "template" => &mut item.template_id,
                "templatekey" => &mut item.template_name,
                _ => continue,
            };
            *slot = value.to_string();
        }
        if item.id.is_empty() {
            return Err(StorageError::parse(tokens.line, "item header has no id"));
        }

        while let Some(line) = tokens.next_non_empty() {
            match line {
                FIELD_MARKER => {
                    let field = tokens.read_field()?;
                    match item.versions.last_mut() {
                        Some(version) => version.fields.push(field),
                        None => item.shared_fields.push(field),
                    }
                }
                VERSION_MARKER => {
                    let version = tokens.read_version()?;
                    item.versions.push(version);
                }
                other => {
                    return Err(StorageError::parse(
                        tokens.line,
                        format!("unexpected line {:?}", other),
                    ))
                }
            }
        }

        Ok(item)
    }

    fn encode(&self, item: &SerializedItem) -> Result<String, StorageError> {
        let mut out = String::new();
        out.push_str(ITEM_MARKER);
        out.push('\n');
        let headers = [
            ("version", FORMAT_VERSION),
            ("id", item.id.as_str()),
            ("database", item.database_name.as_str()),
            ("path", item.path.as_str()),
            ("parent", item.parent_id.as_str()),
            ("name", item.name.as_str()),
            ("master", item.branch_id.as_str()),
            ("template", item.template_id.as_str()),
            ("templatekey", item.template_name.as_str()),
        ];
        write_headers(&mut out, item, &headers)?;

        for field in &item.shared_fields {
            write_field(&mut out, item, field)?;
        }
        for version in &item.versions {
            out.push_str(VERSION_MARKER);
            out.push('\n');
            let number = version.version_number.to_string();
            let headers = [
                ("language", version.language.as_str()),
                ("version", number.as_str()),
                ("revision", version.revision.as_str()),
            ];
            write_headers(&mut out, item, &headers)?;
            for field in &version.fields {
                write_field(&mut out, item, field)?;
            }
        }

        Ok(out)
    }
}

fn write_headers(
    out: &mut String,
    item: &SerializedItem,
    headers: &[(&str, &str)],
) -> Result<(), StorageError> {
    for (key, value) in headers {
        if value.contains(|c: char| c == '\n' || c == '\r') {
            return Err(StorageError::Encode {
                id: item.id.clone(),
                message: format!("header '{}' contains a line break", key),
            });
        }
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push('\n');
    Ok(())
}

fn write_field(out: &mut String, item: &SerializedItem, field: &ItemField) -> Result<(), StorageError> {
    out.push_str(FIELD_MARKER);
    out.push('\n');
    let length = field.value.len().to_string();
    let headers = [
        ("field", field.field_id.as_str()),
        ("name", field.name.as_str()),
        ("key", field.key.as_str()),
        ("content-length", length.as_str()),
    ];
    write_headers(out, item, &headers)?;
    out.push_str(&field.value);
    out.push('\n');
    Ok(())
}

struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
    /// Number of lines consumed so far
    line: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 0,
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.pos..];
        let (line, advance) = match rest.find('\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.pos += advance;
        self.line += 1;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    fn next_non_empty(&mut self) -> Option<&'a str> {
        loop {
            let line = self.next_line()?;
            if !line.trim().is_empty() {
                return Some(line.trim_end());
            }
        }
    }

    /// `key: value` lines up to the next blank line
    fn read_headers(&mut self) -> Result<Vec<(&'a str, &'a str)>, StorageError> {
        let mut headers = Vec::new();
        while let Some(line) = self.next_line() {
            if line.is_empty() {
                break;
            }
            let (key, value) = line.split_once(':').ok_or_else(|| {
                StorageError::parse(self.line, format!("expected 'key: value', found {:?}", line))
            })?;
            headers.push((key.trim(), value.strip_prefix(' ').unwrap_or(value)));
        }
        Ok(headers)
    }

    fn read_field(&mut self) -> Result<ItemField, StorageError> {
        let mut field = ItemField::new("", "");
        let mut length = None;
        for (key, value) in self.read_headers()? {
            match key {
                "field" => field.field_id = value.to_string(),
                "name" => field.name = value.to_string(),
                "key" => field.key = value.to_string(),
                "content-length" => {
                    let parsed = value.trim().parse::<usize>().map_err(|e| {
                        StorageError::parse(self.line, format!("bad content-length {:?}: {}", value, e))
                    })?;
                    length = Some(parsed);
                }
                _ => {}
            }
        }
        if field.field_id.is_empty() {
            return Err(StorageError::parse(self.line, "field block has no field id"));
        }
        let length = length
            .ok_or_else(|| StorageError::parse(self.line, "field block has no content-length"))?;
        field.value = self.take_value(length)?.to_string();
        Ok(field)
    }

    fn read_version(&mut self) -> Result<ItemVersion, StorageError> {
        let mut language = None;
        let mut number = None;
        let mut revision = String::new();
        for (key, value) in self.read_headers()? {
            match key {
                "language" => language = Some(value.to_string()),
                "version" => {
                    let parsed = value.trim().parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                        StorageError::parse(self.line, format!("bad version number {:?}", value))
                    })?;
                    number = Some(parsed);
                }
                "revision" => revision = value.to_string(),
                _ => {}
            }
        }
        let language =
            language.ok_or_else(|| StorageError::parse(self.line, "version block has no language"))?;
        let number =
            number.ok_or_else(|| StorageError::parse(self.line, "version block has no version"))?;
        let mut version = ItemVersion::new(language, number);
        version.revision = revision;
        Ok(version)
    }

    /// Exactly `length` bytes of content, then the line break after it
    fn take_value(&mut self, length: usize) -> Result<&'a str, StorageError> {
        let value = self
            .pos
            .checked_add(length)
            .and_then(|end| self.text.get(self.pos..end))
            .ok_or_else(|| {
                StorageError::parse(self.line, format!("content-length {} overruns the file", length))
            })?;
        self.pos += length;
        self.line += value.matches('\n').count();

        let rest = &self.text[self.pos..];
        if rest.starts_with("\r\n") {
            self.pos += 2;
            self.line += 1;
        } else if rest.starts_with('\n') {
            self.pos += 1;
            self.line += 1;
        }
        Ok(value)
    }
}
