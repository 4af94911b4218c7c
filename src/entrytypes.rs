use core::str;

use crate::{Error, Result};

/// The declared type of an entry, parsed once from its start record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryType {
    Boolean,
    Int64,
    Float,
    Double,
    String,
    BooleanArray,
    Int64Array,
    FloatArray,
    DoubleArray,
    StringArray,
    Raw,
    /// Struct, json, msgpack and any other type this crate does not decode
    Other(Box<str>),
}

impl EntryType {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "boolean" => EntryType::Boolean,
            "int64" => EntryType::Int64,
            "float" => EntryType::Float,
            "double" => EntryType::Double,
            "string" => EntryType::String,
            "boolean[]" => EntryType::BooleanArray,
            "int64[]" => EntryType::Int64Array,
            "float[]" => EntryType::FloatArray,
            "double[]" => EntryType::DoubleArray,
            "string[]" => EntryType::StringArray,
            "raw" => EntryType::Raw,
            other => EntryType::Other(other.into()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            EntryType::Boolean => "boolean",
            EntryType::Int64 => "int64",
            EntryType::Float => "float",
            EntryType::Double => "double",
            EntryType::String => "string",
            EntryType::BooleanArray => "boolean[]",
            EntryType::Int64Array => "int64[]",
            EntryType::FloatArray => "float[]",
            EntryType::DoubleArray => "double[]",
            EntryType::StringArray => "string[]",
            EntryType::Raw => "raw",
            EntryType::Other(name) => name,
        }
    }

    /// Decodes a whole data payload according to this type
    pub fn decode(&self, data: &[u8]) -> Result<Value> {
        let mut cursor = PayloadCursor::new(data);

        let value = match self {
            EntryType::Boolean => Value::Boolean(cursor.read_bool()?),
            EntryType::Int64 => Value::Int64(cursor.read_i64()?),
            EntryType::Float => Value::Float(cursor.read_f32()?),
            EntryType::Double => Value::Double(cursor.read_f64()?),
            EntryType::String => Value::String(cursor.read_string()?),
            EntryType::BooleanArray => Value::BooleanArray(cursor.read_bool_array()?),
            EntryType::Int64Array => Value::Int64Array(cursor.read_i64_array()?),
            EntryType::FloatArray => Value::FloatArray(cursor.read_f32_array()?),
            EntryType::DoubleArray => Value::DoubleArray(cursor.read_f64_array()?),
            EntryType::StringArray => Value::StringArray(cursor.read_string_array()?),
            EntryType::Raw | EntryType::Other(_) => Value::Raw(cursor.read_rest().into()),
        };

        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int64(i64),
    Float(f32),
    Double(f64),
    String(Box<str>),
    BooleanArray(Box<[bool]>),
    Int64Array(Box<[i64]>),
    FloatArray(Box<[f32]>),
    DoubleArray(Box<[f64]>),
    StringArray(Box<[Box<str>]>),
    Raw(Box<[u8]>),
}

/// Read position inside a single record payload.
///
/// Every read is bounded by the payload; running past its end is an error.
#[derive(Debug, Clone, Copy)]
pub struct PayloadCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> PayloadCursor<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        PayloadCursor { data, position: 0 }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, length: usize, what: &'static str) -> Result<&'a [u8]> {
        if self.remaining() < length {
            return Err(Error::Decode {
                what,
                needed: length,
                remaining: self.remaining(),
            });
        }

        let bytes = &self.data[self.position..self.position + length];
        self.position += length;

        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N, what)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1, "byte")?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array("u32")?))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.take(1, "boolean")?[0] != 0)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take_array("int64")?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take_array("float")?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take_array("double")?))
    }

    /// Reads a u32 length followed by that many utf-8 bytes
    pub fn read_length_prefixed(&mut self, what: &'static str) -> Result<Box<str>> {
        let length = self.read_u32()? as usize;
        let bytes = self.take(length, what)?;

        Ok(str::from_utf8(bytes)
            .map_err(|source| Error::Utf8 { what, source })?
            .into())
    }

    /// Consumes the rest of the payload as a utf-8 string
    pub fn read_string(&mut self) -> Result<Box<str>> {
        let bytes = self.read_rest();

        Ok(str::from_utf8(bytes)
            .map_err(|source| Error::Utf8 {
                what: "string",
                source,
            })?
            .into())
    }

    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.position..];
        self.position = self.data.len();
        rest
    }

    fn read_fixed_array<T>(
        &mut self,
        width: usize,
        what: &'static str,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Box<[T]>> {
        let remaining = self.remaining();

        if remaining % width != 0 {
            return Err(Error::Decode {
                what,
                needed: remaining.next_multiple_of(width),
                remaining,
            });
        }

        let mut values = Vec::with_capacity(remaining / width);
        while !self.is_empty() {
            values.push(read(self)?);
        }

        Ok(values.into_boxed_slice())
    }

    pub fn read_bool_array(&mut self) -> Result<Box<[bool]>> {
        self.read_fixed_array(1, "boolean[]", Self::read_bool)
    }

    pub fn read_i64_array(&mut self) -> Result<Box<[i64]>> {
        self.read_fixed_array(8, "int64[]", Self::read_i64)
    }

    pub fn read_f32_array(&mut self) -> Result<Box<[f32]>> {
        self.read_fixed_array(4, "float[]", Self::read_f32)
    }

    pub fn read_f64_array(&mut self) -> Result<Box<[f64]>> {
        self.read_fixed_array(8, "double[]", Self::read_f64)
    }

    pub fn read_string_array(&mut self) -> Result<Box<[Box<str>]>> {
        let mut values = Vec::new();

        while !self.is_empty() {
            values.push(self.read_length_prefixed("string[] element")?);
        }

        Ok(values.into_boxed_slice())
    }
}
