// Copyright 2024 tison <wander4096@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::Error;

/// Which of the four parallel serialization slots (§4.10) a hook or serializer applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Key,
    Value,
    HeaderKey,
    HeaderValue,
}

/// Encodes a typed value into wire bytes for one slot. The default, [`BytesSerializer`], treats
/// the input as already-encoded bytes — schema registry integration (out of scope, §1 Non-goals)
/// plugs in here by registering its own [`Serializer`] per slot.
pub trait Serializer: Send + Sync {
    fn serialize(&self, slot: Slot, topic: &str, value: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Decodes wire bytes back into a typed value for one slot. Symmetric to [`Serializer`].
pub trait Deserializer: Send + Sync {
    fn deserialize(&self, slot: Slot, topic: &str, value: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Identity (de)serializer: passes bytes through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct BytesSerializer;

impl Serializer for BytesSerializer {
    fn serialize(&self, _slot: Slot, _topic: &str, value: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(value.to_vec())
    }
}

impl Deserializer for BytesSerializer {
    fn deserialize(&self, _slot: Slot, _topic: &str, value: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(value.to_vec())
    }
}

/// Runs before a slot is serialized. May mutate metadata (e.g. fetch and stamp a schema id)
/// before the value is handed to the [`Serializer`]. A hook error fails the message with
/// `Error::UserError`.
pub trait BeforeSerializationHook: Send + Sync {
    fn before_serialize(&self, slot: Slot, topic: &str, value: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Symmetric to [`BeforeSerializationHook`], run before a slot is deserialized.
pub trait BeforeDeserializationHook: Send + Sync {
    fn before_deserialize(&self, slot: Slot, topic: &str, value: &[u8]) -> Result<Vec<u8>, Error>;
}

#[derive(Default)]
struct NoopHook;

impl BeforeSerializationHook for NoopHook {
    fn before_serialize(&self, _slot: Slot, _topic: &str, value: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(value.to_vec())
    }
}

impl BeforeDeserializationHook for NoopHook {
    fn before_deserialize(&self, _slot: Slot, _topic: &str, value: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(value.to_vec())
    }
}

/// Registers a [`Serializer`]/[`Deserializer`] pair per slot plus the two hooks, and runs the
/// full pipeline (`hook` then `serializer`, or `serializer` then `hook` on the way back) for one
/// value at a time.
pub struct SerializerPipeline {
    serializers: [Box<dyn Serializer>; 4],
    deserializers: [Box<dyn Deserializer>; 4],
    before_serialize: Box<dyn BeforeSerializationHook>,
    before_deserialize: Box<dyn BeforeDeserializationHook>,
}

impl Default for SerializerPipeline {
    fn default() -> Self {
        SerializerPipeline {
            serializers: [
                Box::new(BytesSerializer),
                Box::new(BytesSerializer),
                Box::new(BytesSerializer),
                Box::new(BytesSerializer),
            ],
            deserializers: [
                Box::new(BytesSerializer),
                Box::new(BytesSerializer),
                Box::new(BytesSerializer),
                Box::new(BytesSerializer),
            ],
            before_serialize: Box::new(NoopHook),
            before_deserialize: Box::new(NoopHook),
        }
    }
}

impl SerializerPipeline {
    pub fn set_serializer(&mut self, slot: Slot, serializer: Box<dyn Serializer>) {
        self.serializers[slot as usize] = serializer;
    }

    pub fn set_deserializer(&mut self, slot: Slot, deserializer: Box<dyn Deserializer>) {
        self.deserializers[slot as usize] = deserializer;
    }

    pub fn set_before_serialize(&mut self, hook: Box<dyn BeforeSerializationHook>) {
        self.before_serialize = hook;
    }

    pub fn set_before_deserialize(&mut self, hook: Box<dyn BeforeDeserializationHook>) {
        self.before_deserialize = hook;
    }

    pub fn serialize(&self, slot: Slot, topic: &str, value: &[u8]) -> Result<Vec<u8>, Error> {
        let value = self.before_serialize.before_serialize(slot, topic, value)?;
        self.serializers[slot as usize].serialize(slot, topic, &value)
    }

    pub fn deserialize(&self, slot: Slot, topic: &str, value: &[u8]) -> Result<Vec<u8>, Error> {
        let value = self.deserializers[slot as usize].deserialize(slot, topic, value)?;
        self.before_deserialize
            .before_deserialize(slot, topic, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_pipeline_round_trips() {
        let pipeline = SerializerPipeline::default();
        let encoded = pipeline.serialize(Slot::Value, "topic", b"hello").unwrap();
        let decoded = pipeline.deserialize(Slot::Value, "topic", &encoded).unwrap();
        assert_eq!(decoded, b"hello");
    }
}
