use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};

/// An object that can encode a particular type to, and decode it from, a
/// `Vec<u8>`. The implementation can be based on a `serde` data format, or
/// anything else.
pub trait Coder {
    type Type;

    /// Consume an instance of the encodable type and convert it to bytes.
    fn encode(&self, inst: Self::Type) -> Result<Vec<u8>>;

    /// Consume a buffer of bytes and decode it to the decodable type.
    fn decode(&self, data: Vec<u8>) -> Result<Self::Type>;
}

/// Encodes any `serde` type as CBOR.
pub struct CborCoder<T> {
    phantom: std::marker::PhantomData<T>,
}

impl<T> CborCoder<T> {
    pub fn new() -> Self {
        Self {
            phantom: std::marker::PhantomData::<T> {},
        }
    }
}

impl<T> Coder for CborCoder<T>
where
    T: Serialize + DeserializeOwned,
{
    type Type = T;

    fn encode(&self, inst: Self::Type) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        ciborium::ser::into_writer(&inst, &mut buffer)
            .map_err(|e| Error::Decode(format!("{:?}", e)))?;
        Ok(buffer)
    }

    fn decode(&self, data: Vec<u8>) -> Result<Self::Type> {
        ciborium::de::from_reader(data.as_slice()).map_err(|e| Error::Decode(format!("{:?}", e)))
    }
}

impl<T> Default for CborCoder<T> {
    fn default() -> Self {
        Self::new()
    }
}
