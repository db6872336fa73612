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

// Version 1 adds timestamp and group membership information, as well as the commit timestamp.
//
// Version 2 adds retention time to the committed offset.
//
// Version 3 and 4 are the same as version 2.
//
// Version 5 removes the retention time, which is now controlled only by a broker configuration.
//
// Version 6 adds the leader epoch for the committed offset.
//
// Version 7 adds the group instance id to support static membership.
//
// Version 8 is the first flexible version.

#[derive(Debug, Default, Clone)]
pub struct OffsetCommitRequest {
    /// The unique group identifier.
    pub group_id: String,
    /// The generation of the group.
    pub generation_id_or_member_epoch: i32,
    /// The member ID assigned by the group coordinator.
    pub member_id: String,
    /// The unique identifier of the consumer instance provided by end user.
    pub group_instance_id: Option<String>,
    /// The topics to commit offsets for.
    pub topics: Vec<OffsetCommitRequestTopic>,
    /// Unknown tagged fields.
    pub unknown_tagged_fields: Vec<RawTaggedField>,
}

impl Decodable for OffsetCommitRequest {
    fn read<B: ReadBytesExt>(buf: &mut B, version: i16) -> IoResult<Self> {
        let flexible = version >= 8;
        let mut this = OffsetCommitRequest {
            group_id: NullableString(flexible)
                .decode(buf)?
                .ok_or_else(|| err_decode_message_null("group_id"))?,
            generation_id_or_member_epoch: -1,
            member_id: String::new(),
            ..Default::default()
        };
        if version >= 1 {
            this.generation_id_or_member_epoch = Int32.decode(buf)?;
            this.member_id = NullableString(flexible)
                .decode(buf)?
                .ok_or_else(|| err_decode_message_null("member_id"))?;
        }
        if version >= 7 {
            this.group_instance_id = NullableString(flexible).decode(buf)?;
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
pub struct OffsetCommitRequestTopic {
    /// The topic name.
    pub name: String,
    /// Each partition to commit offsets for.
    pub partitions: Vec<OffsetCommitRequestPartition>,
    /// Unknown tagged fields.
    pub unknown_tagged_fields: Vec<RawTaggedField>,
}

impl Decodable for OffsetCommitRequestTopic {
    fn read<B: ReadBytesExt>(buf: &mut B, version: i16) -> IoResult<Self> {
        let flexible = version >= 8;
        let mut this = OffsetCommitRequestTopic {
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
pub struct OffsetCommitRequestPartition {
    /// The partition index.
    pub partition_index: i32,
    /// The message offset to be committed.
    pub committed_offset: i64,
    /// The leader epoch of this partition.
    pub committed_leader_epoch: i32,
    /// Any associated metadata the client wants to keep.
    pub committed_metadata: Option<String>,
    /// Unknown tagged fields.
    pub unknown_tagged_fields: Vec<RawTaggedField>,
}

impl Decodable for OffsetCommitRequestPartition {
    fn read<B: ReadBytesExt>(buf: &mut B, version: i16) -> IoResult<Self> {
        let flexible = version >= 8;
        let mut this = OffsetCommitRequestPartition {
            partition_index: Int32.decode(buf)?,
            committed_offset: Int64.decode(buf)?,
            committed_leader_epoch: -1,
            ..Default::default()
        };
        if version >= 6 {
            this.committed_leader_epoch = Int32.decode(buf)?;
        }
        this.committed_metadata = NullableString(flexible).decode(buf)?;
        if flexible {
            this.unknown_tagged_fields = RawTaggedFieldList.decode(buf)?;
        }
        Ok(this)
    }
}

impl Encodable for OffsetCommitRequest {
    fn write<B: WriteBytesExt>(&self, buf: &mut B, version: i16) -> IoResult<()> {
        let flexible = version >= 8;
        NullableString(flexible).encode(buf, self.group_id.as_str())?;
        if version >= 1 {
            Int32.encode(buf, self.generation_id_or_member_epoch)?;
            NullableString(flexible).encode(buf, self.member_id.as_str())?;
        }
        if version >= 7 {
            NullableString(flexible).encode(buf, self.group_instance_id.as_deref())?;
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
        res += NullableString(flexible).calculate_size(self.group_id.as_str());
        if version >= 1 {
            res += Int32::SIZE;
            res += NullableString(flexible).calculate_size(self.member_id.as_str());
        }
        if version >= 7 {
            res += NullableString(flexible).calculate_size(self.group_instance_id.as_deref());
        }
        res += NullableArray(Struct(version), flexible).calculate_size(self.topics.as_slice());
        if flexible {
            res += RawTaggedFieldList.calculate_size(&self.unknown_tagged_fields);
        }
        res
    }
}

impl Encodable for OffsetCommitRequestTopic {
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

impl Encodable for OffsetCommitRequestPartition {
    fn write<B: WriteBytesExt>(&self, buf: &mut B, version: i16) -> IoResult<()> {
        let flexible = version >= 8;
        Int32.encode(buf, self.partition_index)?;
        Int64.encode(buf, self.committed_offset)?;
        if version >= 6 {
            Int32.encode(buf, self.committed_leader_epoch)?;
        }
        NullableString(flexible).encode(buf, self.committed_metadata.as_deref())?;
        if flexible {
            RawTaggedFieldList.encode(buf, &self.unknown_tagged_fields)?;
        }
        Ok(())
    }

    fn calculate_size(&self, version: i16) -> usize {
        let flexible = version >= 8;
        let mut res = 0;
        res += Int32::SIZE;
        res += Int64::SIZE;
        if version >= 6 {
            res += Int32::SIZE;
        }
        res += NullableString(flexible).calculate_size(self.committed_metadata.as_deref());
        if flexible {
            res += RawTaggedFieldList.calculate_size(&self.unknown_tagged_fields);
        }
        res
    }
}
