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

use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;

use crate::codec::*;
use crate::IoResult;

// Version 1 is the same as version 0.
//
// Version 2 adds retention time.
//
// Version 3 adds the throttle time.
//
// Version 4 and 5 are the same as version 3.
//
// Version 6 adds the committed leader epoch.
//
// Version 7 is the same as version 6.
//
// Version 8 is the first flexible version.

#[derive(Debug, Default, Clone)]
pub struct OffsetCommitResponse {
    /// The duration in milliseconds for which the request was throttled due to a quota
    /// violation, or zero if the request did not violate any quota.
    pub throttle_time_ms: i32,
    /// The responses for each topic.
    pub topics: Vec<OffsetCommitResponseTopic>,
    /// Unknown tagged fields.
    pub unknown_tagged_fields: Vec<RawTaggedField>,
}

impl Decodable for OffsetCommitResponse {
    fn read<B: ReadBytesExt>(buf: &mut B, version: i16) -> IoResult<Self> {
        let flexible = version >= 8;
        let mut this = OffsetCommitResponse::default();
        if version >= 3 {
            this.throttle_time_ms = Int32.decode(buf)?;
        }
        this.topics = NullableArray(Struct(version), flexible)
            .decode(buf)?
            .ok_or_else(|| err_decode_message_null("topics"))?;
        if flexible {
            this.unknown_tagged_fields = RawTaggedFieldList.decode(buf)?;
        }
        Ok(this)
    }
}

#[derive(Debug, Default, Clone)]
pub struct OffsetCommitResponseTopic {
    /// The topic name.
    pub name: String,
    /// The responses for each partition in the topic.
    pub partitions: Vec<OffsetCommitResponsePartition>,
    /// Unknown tagged fields.
    pub unknown_tagged_fields: Vec<RawTaggedField>,
}

impl Decodable for OffsetCommitResponseTopic {
    fn read<B: ReadBytesExt>(buf: &mut B, version: i16) -> IoResult<Self> {
        let flexible = version >= 8;
        let mut this = OffsetCommitResponseTopic {
            name: NullableString(flexible)
                .decode(buf)?
                .ok_or_else(|| err_decode_message_null("name"))?,
            partitions: NullableArray(Struct(version), flexible)
                .decode(buf)?
                .ok_or_else(|| err_decode_message_null("partitions"))?,
            ..Default::default()
        };
        if flexible {
            this.unknown_tagged_fields = RawTaggedFieldList.decode(buf)?;
        }
        Ok(this)
    }
}

#[derive(Debug, Default, Clone)]
pub struct OffsetCommitResponsePartition {
    /// The partition index.
    pub partition_index: i32,
    /// The error code, or 0 if there was no error.
    pub error_code: i16,
    /// Unknown tagged fields.
    pub unknown_tagged_fields: Vec<RawTaggedField>,
}

impl Decodable for OffsetCommitResponsePartition {
    fn read<B: ReadBytesExt>(buf: &mut B, version: i16) -> IoResult<Self> {
        let flexible = version >= 8;
        let mut this = OffsetCommitResponsePartition {
            partition_index: Int32.decode(buf)?,
            error_code: Int16.decode(buf)?,
            ..Default::default()
        };
        if flexible {
            this.unknown_tagged_fields = RawTaggedFieldList.decode(buf)?;
        }
        Ok(this)
    }
}

impl Encodable for OffsetCommitResponse {
    fn write<B: WriteBytesExt>(&self, buf: &mut B, version: i16) -> IoResult<()> {
        let flexible = version >= 8;
        if version >= 3 {
            Int32.encode(buf, self.throttle_time_ms)?;
        }
        NullableArray(Struct(version), flexible).encode(buf, self.topics.as_slice())?;
        if flexible {
            RawTaggedFieldList.encode(buf, &self.unknown_tagged_fields)?;
        }
        Ok(())
    }

    fn calculate_size(&self, version: i16) -> usize {
        let flexible = version >= 8;
        let mut res = 0;
        if version >= 3 {
            res += Int32::SIZE;
        }
        res += NullableArray(Struct(version), flexible).calculate_size(self.topics.as_slice());
        if flexible {
            res += RawTaggedFieldList.calculate_size(&self.unknown_tagged_fields);
        }
        res
    }
}

impl Encodable for OffsetCommitResponseTopic {
    fn write<B: WriteBytesExt>(&self, buf: &mut B, version: i16) -> IoResult<()> {
        let flexible = version >= 8;
        NullableString(flexible).encode(buf, self.name.as_str())?;
        NullableArray(Struct(version), flexible).encode(buf, self.partitions.as_slice())?;
        if flexible {
            RawTaggedFieldList.encode(buf, &self.unknown_tagged_fields)?;
        }
        Ok(())
    }

    fn calculate_size(&self, version: i16) -> usize {
        let flexible = version >= 8;
        let mut res = 0;
        res += NullableString(flexible).calculate_size(self.name.as_str());
        res += NullableArray(Struct(version), flexible).calculate_size(self.partitions.as_slice());
        if flexible {
            res += RawTaggedFieldList.calculate_size(&self.unknown_tagged_fields);
        }
        res
    }
}

impl Encodable for OffsetCommitResponsePartition {
    fn write<B: WriteBytesExt>(&self, buf: &mut B, version: i16) -> IoResult<()> {
        let flexible = version >= 8;
        Int32.encode(buf, self.partition_index)?;
        Int16.encode(buf, self.error_code)?;
        if flexible {
            RawTaggedFieldList.encode(buf, &self.unknown_tagged_fields)?;
        }
        Ok(())
    }

    fn calculate_size(&self, version: i16) -> usize {
        let flexible = version >= 8;
        let mut res = 0;
        res += Int32::SIZE;
        res += Int16::SIZE;
        if flexible {
            res += RawTaggedFieldList.calculate_size(&self.unknown_tagged_fields);
        }
        res
    }
}
