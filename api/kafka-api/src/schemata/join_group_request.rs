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

// Version 1 adds RebalanceTimeoutMs.
//
// Version 2 and 3 are the same as version 1.
//
// Starting from version 4, the client needs to issue a second request to join group
//
// Starting from version 5, we add a new field called groupInstanceId to indicate member identity
// across restarts. with assigned id.
//
// Version 6 is the first flexible version.
//
// Version 7 is the same as version 6.
//
// Version 8 adds the Reason field (KIP-800).
//
// Version 9 is the same as version 8.

#[derive(Debug, Default, Clone)]
pub struct JoinGroupRequest {
    /// The group identifier.
    pub group_id: String,
    /// The coordinator considers the consumer dead if it receives no heartbeat after this timeout
    /// in milliseconds.
    pub session_timeout_ms: i32,
    /// The maximum time in milliseconds that the coordinator will wait for each member to rejoin
    /// when rebalancing the group.
    pub rebalance_timeout_ms: i32,
    /// The member id assigned by the group coordinator.
    pub member_id: String,
    /// The unique identifier of the consumer instance provided by end user.
    pub group_instance_id: Option<String>,
    /// The unique name the for class of protocols implemented by the group we want to join.
    pub protocol_type: String,
    /// The list of protocols that the member supports.
    pub protocols: Vec<JoinGroupRequestProtocol>,
    /// The reason why the member (re-)joins the group.
    pub reason: Option<String>,
    /// Unknown tagged fields.
    pub unknown_tagged_fields: Vec<RawTaggedField>,
}

impl Decodable for JoinGroupRequest {
    fn read<B: ReadBytesExt>(buf: &mut B, version: i16) -> IoResult<Self> {
        let mut this = JoinGroupRequest {
            group_id: NullableString(version >= 6)
                .decode(buf)?
                .ok_or_else(|| err_decode_message_null("group_id"))?,
            session_timeout_ms: Int32.decode(buf)?,
            ..Default::default()
        };
        this.rebalance_timeout_ms = if version >= 1 { Int32.decode(buf)? } else { -1 };
        this.member_id = NullableString(version >= 6)
            .decode(buf)?
            .ok_or_else(|| err_decode_message_null("member_id"))?;
        if version >= 5 {
            this.group_instance_id = NullableString(version >= 6).decode(buf)?;
        }
        this.protocol_type = NullableString(version >= 6)
            .decode(buf)?
            .ok_or_else(|| err_decode_message_null("protocol_type"))?;
        this.protocols = NullableArray(Struct(version), version >= 6)
            .decode(buf)?
            .ok_or_else(|| err_decode_message_null("protocols"))?;
        if version >= 8 {
            this.reason = NullableString(true).decode(buf)?;
        }
        if version >= 6 {
            this.unknown_tagged_fields = RawTaggedFieldList.decode(buf)?;
        }
        Ok(this)
    }
}

impl Encodable for JoinGroupRequest {
    fn write<B: WriteBytesExt>(&self, buf: &mut B, version: i16) -> IoResult<()> {
        NullableString(version >= 6).encode(buf, self.group_id.as_str())?;
        Int32.encode(buf, self.session_timeout_ms)?;
        if version >= 1 {
            Int32.encode(buf, self.rebalance_timeout_ms)?;
        }
        NullableString(version >= 6).encode(buf, self.member_id.as_str())?;
        if version >= 5 {
            NullableString(version >= 6).encode(buf, self.group_instance_id.as_deref())?;
        }
        NullableString(version >= 6).encode(buf, self.protocol_type.as_str())?;
        NullableArray(Struct(version), version >= 6).encode(buf, self.protocols.as_slice())?;
        if version >= 8 {
            NullableString(true).encode(buf, self.reason.as_deref())?;
        }
        if version >= 6 {
            RawTaggedFieldList.encode(buf, &self.unknown_tagged_fields)?;
        }
        Ok(())
    }

    fn calculate_size(&self, version: i16) -> usize {
        let mut res = 0;
        res += NullableString(version >= 6).calculate_size(self.group_id.as_str());
        res += Int32::SIZE; // self.session_timeout_ms
        if version >= 1 {
            res += Int32::SIZE; // self.rebalance_timeout_ms
        }
        res += NullableString(version >= 6).calculate_size(self.member_id.as_str());
        if version >= 5 {
            res += NullableString(version >= 6).calculate_size(self.group_instance_id.as_deref());
        }
        res += NullableString(version >= 6).calculate_size(self.protocol_type.as_str());
        res +=
            NullableArray(Struct(version), version >= 6).calculate_size(self.protocols.as_slice());
        if version >= 8 {
            res += NullableString(true).calculate_size(self.reason.as_deref());
        }
        if version >= 6 {
            res += RawTaggedFieldList.calculate_size(&self.unknown_tagged_fields);
        }
        res
    }
}

#[derive(Debug, Default, Clone)]
pub struct JoinGroupRequestProtocol {
    /// The protocol name.
    pub name: String,
    /// The protocol metadata.
    pub metadata: Vec<u8>,
    /// Unknown tagged fields.
    pub unknown_tagged_fields: Vec<RawTaggedField>,
}

impl Decodable for JoinGroupRequestProtocol {
    fn read<B: ReadBytesExt>(buf: &mut B, version: i16) -> IoResult<Self> {
        if version > 9 {
            Err(err_decode_message_unsupported(
                version,
                "JoinGroupRequestProtocol",
            ))?
        }
        let mut this = JoinGroupRequestProtocol {
            name: NullableString(version >= 6)
                .decode(buf)?
                .ok_or_else(|| err_decode_message_null("name"))?,
            metadata: NullableBytes(version >= 6)
                .decode(buf)?
                .ok_or_else(|| err_decode_message_null("metadata"))?,
            ..Default::default()
        };
        if version >= 6 {
            this.unknown_tagged_fields = RawTaggedFieldList.decode(buf)?;
        }
        Ok(this)
    }
}

impl Encodable for JoinGroupRequestProtocol {
    fn write<B: WriteBytesExt>(&self, buf: &mut B, version: i16) -> IoResult<()> {
        if version > 9 {
            Err(err_encode_message_unsupported(
                version,
                "JoinGroupRequestProtocol",
            ))?
        }
        NullableString(version >= 6).encode(buf, self.name.as_str())?;
        NullableBytes(version >= 6).encode(buf, Some(&self.metadata))?;
        if version >= 6 {
            RawTaggedFieldList.encode(buf, &self.unknown_tagged_fields)?;
        }
        Ok(())
    }

    fn calculate_size(&self, version: i16) -> usize {
        let mut res = 0;
        res += NullableString(version >= 6).calculate_size(self.name.as_str());
        res += NullableBytes(version >= 6).calculate_size(Some(&self.metadata));
        if version >= 6 {
            res += RawTaggedFieldList.calculate_size(&self.unknown_tagged_fields);
        }
        res
    }
}
