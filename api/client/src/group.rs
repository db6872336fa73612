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

use std::time::Duration;

use kafka_api::schemata::apikey::ApiMessageType;
use kafka_api::schemata::find_coordinator_request::FindCoordinatorRequest;
use kafka_api::schemata::heartbeat_request::HeartbeatRequest;
use kafka_api::schemata::join_group_request::JoinGroupRequest;
use kafka_api::schemata::join_group_request::JoinGroupRequestProtocol;
use kafka_api::schemata::join_group_response::JoinGroupResponseMember;
use kafka_api::schemata::sync_group_request::SyncGroupRequest;
use kafka_api::schemata::sync_group_request::SyncGroupRequestAssignment;
use kafka_api::schemata::Request;
use kafka_api::schemata::Response;

use crate::error::Error;
use crate::pool::ConnectionPool;

/// Mirrors the consumer group member lifecycle (§4.9): a fresh member starts
/// `Disconnected` and only reaches `Stable` after a full join/sync round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Disconnected,
    FindingCoordinator,
    Joining,
    Syncing,
    Stable,
    Rebalancing,
    Leaving,
}

const FIND_COORDINATOR_API_VERSION: i16 = 3;
const JOIN_GROUP_API_VERSION: i16 = 9;
const SYNC_GROUP_API_VERSION: i16 = 5;
const HEARTBEAT_API_VERSION: i16 = 4;
const GROUP_KEY_TYPE: i8 = 0;
const PROTOCOL_TYPE: &str = "consumer";
const ASSIGNOR_NAME: &str = "range";

pub struct JoinedGroup {
    pub generation_id: i32,
    pub member_id: String,
    pub leader_id: String,
    pub members: Vec<JoinGroupResponseMember>,
}

/// Asks any available node who coordinates `group_id` and returns that node's id (§4.9).
pub async fn find_coordinator(
    pool: &ConnectionPool,
    group_id: &str,
    timeout: Duration,
) -> Result<i32, Error> {
    let request = Request::FindCoordinatorRequest(FindCoordinatorRequest {
        key: group_id.to_string(),
        key_type: GROUP_KEY_TYPE,
        coordinator_keys: vec![],
        unknown_tagged_fields: vec![],
    });
    let conn = pool.get_first_available(&[]).await?;
    let response = conn
        .send(
            ApiMessageType::FIND_COORDINATOR,
            FIND_COORDINATOR_API_VERSION,
            request,
            timeout,
        )
        .await?;
    match response {
        Response::FindCoordinatorResponse(resp) if resp.error_code == 0 => Ok(resp.node_id),
        Response::FindCoordinatorResponse(resp) => Err(Error::protocol(resp.error_code)),
        _ => Err(Error::network("unexpected response to FindCoordinator")),
    }
}

/// Joins `group_id` at the given coordinator, proposing `subscribed_topics` with the sole
/// `range` assignor (§4.9). On success, the response reveals whether this member is the group
/// leader (`members` is non-empty only for the leader).
pub async fn join_group(
    pool: &ConnectionPool,
    coordinator: i32,
    group_id: &str,
    member_id: &str,
    session_timeout_ms: i32,
    subscribed_topics: &[String],
    timeout: Duration,
) -> Result<JoinedGroup, Error> {
    let metadata = encode_subscription(subscribed_topics);
    let request = Request::JoinGroupRequest(JoinGroupRequest {
        group_id: group_id.to_string(),
        session_timeout_ms,
        rebalance_timeout_ms: session_timeout_ms,
        member_id: member_id.to_string(),
        group_instance_id: None,
        protocol_type: PROTOCOL_TYPE.to_string(),
        protocols: vec![JoinGroupRequestProtocol {
            name: ASSIGNOR_NAME.to_string(),
            metadata,
            unknown_tagged_fields: vec![],
        }],
        reason: None,
        unknown_tagged_fields: vec![],
    });

    let conn = pool.get(coordinator).await?;
    let response = conn
        .send(ApiMessageType::JOIN_GROUP, JOIN_GROUP_API_VERSION, request, timeout)
        .await?;

    match response {
        Response::JoinGroupResponse(resp) if resp.error_code == 0 => Ok(JoinedGroup {
            generation_id: resp.generation_id,
            member_id: resp.member_id,
            leader_id: resp.leader,
            members: resp.members,
        }),
        Response::JoinGroupResponse(resp) => Err(Error::protocol(resp.error_code)),
        _ => Err(Error::network("unexpected response to JoinGroup")),
    }
}

/// Completes the rendezvous: the leader computes every member's assignment and submits the full
/// map; every other member submits an empty assignment list and receives its own back (§4.9).
pub async fn sync_group(
    pool: &ConnectionPool,
    coordinator: i32,
    group_id: &str,
    generation_id: i32,
    member_id: &str,
    assignments: Vec<SyncGroupRequestAssignment>,
    timeout: Duration,
) -> Result<Vec<u8>, Error> {
    let request = Request::SyncGroupRequest(SyncGroupRequest {
        group_id: group_id.to_string(),
        generation_id,
        member_id: member_id.to_string(),
        group_instance_id: None,
        protocol_type: Some(PROTOCOL_TYPE.to_string()),
        protocol_name: Some(ASSIGNOR_NAME.to_string()),
        assignments,
        unknown_tagged_fields: vec![],
    });

    let conn = pool.get(coordinator).await?;
    let response = conn
        .send(ApiMessageType::SYNC_GROUP, SYNC_GROUP_API_VERSION, request, timeout)
        .await?;

    match response {
        Response::SyncGroupResponse(resp) if resp.error_code == 0 => Ok(resp.assignment),
        Response::SyncGroupResponse(resp) => Err(Error::protocol(resp.error_code)),
        _ => Err(Error::network("unexpected response to SyncGroup")),
    }
}

pub async fn heartbeat(
    pool: &ConnectionPool,
    coordinator: i32,
    group_id: &str,
    generation_id: i32,
    member_id: &str,
    timeout: Duration,
) -> Result<(), Error> {
    let request = Request::HeartbeatRequest(HeartbeatRequest {
        group_id: group_id.to_string(),
        generation_id,
        member_id: member_id.to_string(),
        group_instance_id: None,
        unknown_tagged_fields: vec![],
    });
    let conn = pool.get(coordinator).await?;
    let response = conn
        .send(ApiMessageType::HEARTBEAT, HEARTBEAT_API_VERSION, request, timeout)
        .await?;
    match response {
        Response::HeartbeatResponse(resp) if resp.error_code == 0 => Ok(()),
        Response::HeartbeatResponse(resp) => Err(Error::protocol(resp.error_code)),
        _ => Err(Error::network("unexpected response to Heartbeat")),
    }
}

/// Assigns every partition of `topic_partition_counts` round-robin across `members`, range-style
/// (each member gets a contiguous slice per topic). Only the group leader calls this.
pub fn assign_partitions_range(
    members: &[String],
    topic_partition_counts: &[(String, usize)],
) -> std::collections::HashMap<String, Vec<(String, i32)>> {
    let mut assignment: std::collections::HashMap<String, Vec<(String, i32)>> =
        members.iter().map(|m| (m.clone(), vec![])).collect();
    if members.is_empty() {
        return assignment;
    }

    for (topic, count) in topic_partition_counts {
        let per_member = count / members.len();
        let extra = count % members.len();
        let mut partition = 0usize;
        for (idx, member) in members.iter().enumerate() {
            let take = per_member + usize::from(idx < extra);
            for _ in 0..take {
                assignment
                    .get_mut(member)
                    .expect("member present in assignment map")
                    .push((topic.clone(), partition as i32));
                partition += 1;
            }
        }
    }
    assignment
}

/// Minimal subscription encoding: a flat list of topic names, length-prefixed. Only this client's
/// own members decode it (via [`decode_subscription`]), so there's no need to match the
/// reference `ConsumerProtocolSubscription` byte layout (§1 Non-goals: cross-client
/// interoperability on group protocol metadata).
pub fn encode_subscription(topics: &[String]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(topics.len() as u32).to_be_bytes());
    for topic in topics {
        buf.extend_from_slice(&(topic.len() as u32).to_be_bytes());
        buf.extend_from_slice(topic.as_bytes());
    }
    buf
}

pub fn decode_subscription(bytes: &[u8]) -> Vec<String> {
    let mut topics = Vec::new();
    let mut pos = 0;
    if bytes.len() < 4 {
        return topics;
    }
    let count = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
    pos += 4;
    for _ in 0..count {
        if pos + 4 > bytes.len() {
            break;
        }
        let len = u32::from_be_bytes(bytes[pos..pos + 4].try_into().unwrap()) as usize;
        pos += 4;
        if pos + len > bytes.len() {
            break;
        }
        topics.push(String::from_utf8_lossy(&bytes[pos..pos + len]).to_string());
        pos += len;
    }
    topics
}

pub fn encode_assignment(partitions: &[(String, i32)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(partitions.len() as u32).to_be_bytes());
    for (topic, partition) in partitions {
        buf.extend_from_slice(&(topic.len() as u32).to_be_bytes());
        buf.extend_from_slice(topic.as_bytes());
        buf.extend_from_slice(&partition.to_be_bytes());
    }
    buf
}

pub fn decode_assignment(bytes: &[u8]) -> Vec<(String, i32)> {
    let mut partitions = Vec::new();
    let mut pos = 0;
    if bytes.len() < 4 {
        return partitions;
    }
    let count = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
    pos += 4;
    for _ in 0..count {
        if pos + 4 > bytes.len() {
            break;
        }
        let len = u32::from_be_bytes(bytes[pos..pos + 4].try_into().unwrap()) as usize;
        pos += 4;
        if pos + len + 4 > bytes.len() {
            break;
        }
        let topic = String::from_utf8_lossy(&bytes[pos..pos + len]).to_string();
        pos += len;
        let partition = i32::from_be_bytes(bytes[pos..pos + 4].try_into().unwrap());
        pos += 4;
        partitions.push((topic, partition));
    }
    partitions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_round_trips() {
        let topics = vec!["orders".to_string(), "payments".to_string()];
        let encoded = encode_subscription(&topics);
        assert_eq!(decode_subscription(&encoded), topics);
    }

    #[test]
    fn test_assignment_round_trips() {
        let partitions = vec![("orders".to_string(), 0), ("orders".to_string(), 1)];
        let encoded = encode_assignment(&partitions);
        assert_eq!(decode_assignment(&encoded), partitions);
    }

    #[test]
    fn test_assign_partitions_range_splits_evenly() {
        let members = vec!["m1".to_string(), "m2".to_string()];
        let assignment = assign_partitions_range(&members, &[("orders".to_string(), 4)]);
        assert_eq!(assignment["m1"].len(), 2);
        assert_eq!(assignment["m2"].len(), 2);
    }

    #[test]
    fn test_assign_partitions_range_distributes_remainder() {
        let members = vec!["m1".to_string(), "m2".to_string(), "m3".to_string()];
        let assignment = assign_partitions_range(&members, &[("orders".to_string(), 4)]);
        let total: usize = assignment.values().map(|v| v.len()).sum();
        assert_eq!(total, 4);
    }
}
