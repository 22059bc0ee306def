use crate::error::DbError;
use crate::udbc::value::Value;
use serde::Serialize;
use serde::ser::{
    Impossible, SerializeSeq, SerializeTuple, SerializeTupleStruct, SerializeTupleVariant,
    Serializer,
};

/// Converts any serializable argument into a positional argument list.
///
/// Sequences and tuples yield one argument per element, unit and `None`
/// yield no arguments, any other scalar yields a single argument. Maps and
/// structs are rejected because placeholders bind by position.
pub fn to_args<T: Serialize + ?Sized>(args: &T) -> Result<Vec<Value>, DbError> {
    match args.serialize(ValueSerializer)? {
        Value::List(list) => Ok(list),
        Value::Null => Ok(Vec::new()),
        v => Ok(vec![v]),
    }
}

fn keyed(kind: &str) -> DbError {
    DbError::Serialization(format!(
        "query arguments are bound by position, got a {}",
        kind
    ))
}

/// Serializes one argument into a [`Value`].
pub struct ValueSerializer;

macro_rules! serialize_scalar {
    ($($method:ident($ty:ty) => $variant:ident),+ $(,)?) => {$(
        fn $method(self, v: $ty) -> Result<Value, DbError> {
            Ok(Value::$variant(v.into()))
        }
    )+};
}

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = DbError;
    type SerializeSeq = ListSerializer;
    type SerializeTuple = ListSerializer;
    type SerializeTupleStruct = ListSerializer;
    type SerializeTupleVariant = ListSerializer;
    type SerializeMap = Impossible<Value, DbError>;
    type SerializeStruct = Impossible<Value, DbError>;
    type SerializeStructVariant = Impossible<Value, DbError>;

    serialize_scalar! {
        serialize_bool(bool) => Bool,
        serialize_i8(i8) => I8,
        serialize_i16(i16) => I16,
        serialize_i32(i32) => I32,
        serialize_i64(i64) => I64,
        serialize_i128(i128) => I128,
        serialize_u8(u8) => U8,
        serialize_u16(u16) => U16,
        serialize_u32(u32) => U32,
        serialize_u64(u64) => U64,
        serialize_u128(u128) => U128,
        serialize_f32(f32) => F32,
        serialize_f64(f64) => F64,
        serialize_str(&str) => Str,
        serialize_bytes(&[u8]) => Bytes,
    }

    fn serialize_char(self, v: char) -> Result<Value, DbError> {
        Ok(Value::Str(v.to_string()))
    }
    fn serialize_none(self) -> Result<Value, DbError> {
        Ok(Value::Null)
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, DbError> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<Value, DbError> {
        Ok(Value::Null)
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<Value, DbError> {
        Ok(Value::Null)
    }
    // Fieldless enums bind as their variant name.
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
    ) -> Result<Value, DbError> {
        Ok(Value::Str(variant.to_string()))
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Value, DbError> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<Value, DbError> {
        value.serialize(self)
    }
    fn serialize_seq(self, len: Option<usize>) -> Result<ListSerializer, DbError> {
        Ok(ListSerializer {
            vec: Vec::with_capacity(len.unwrap_or(0)),
        })
    }
    fn serialize_tuple(self, len: usize) -> Result<ListSerializer, DbError> {
        self.serialize_seq(Some(len))
    }
    fn serialize_tuple_struct(self, _: &'static str, len: usize) -> Result<ListSerializer, DbError> {
        self.serialize_seq(Some(len))
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        len: usize,
    ) -> Result<ListSerializer, DbError> {
        self.serialize_seq(Some(len))
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, DbError> {
        Err(keyed("map"))
    }
    fn serialize_struct(self, name: &'static str, _: usize) -> Result<Self::SerializeStruct, DbError> {
        Err(keyed(&format!("struct {}", name)))
    }
    fn serialize_struct_variant(
        self,
        name: &'static str,
        _: u32,
        variant: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, DbError> {
        Err(keyed(&format!("struct variant {}::{}", name, variant)))
    }
}

pub struct ListSerializer {
    vec: Vec<Value>,
}

macro_rules! impl_serialize_list {
    ($trait:ident, $method:ident) => {
        impl $trait for ListSerializer {
            type Ok = Value;
            type Error = DbError;

            fn $method<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), DbError> {
                self.vec.push(value.serialize(ValueSerializer)?);
                Ok(())
            }

            fn end(self) -> Result<Value, DbError> {
                Ok(Value::List(self.vec))
            }
        }
    };
}

impl_serialize_list!(SerializeSeq, serialize_element);
impl_serialize_list!(SerializeTuple, serialize_element);
impl_serialize_list!(SerializeTupleStruct, serialize_field);
impl_serialize_list!(SerializeTupleVariant, serialize_field);
