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

use kafka_api::schemata::apikey::ApiMessageType;
use kafka_api::schemata::metadata_request::MetadataRequest;
use kafka_api::schemata::metadata_request::MetadataRequestTopic;
use kafka_api::schemata::Request;
use kafka_api::schemata::Response;

use crate::error::Error;
use crate::metadata::ClusterSnapshot;
use crate::metadata::MetadataCache;
use crate::pool::ConnectionPool;

/// The Metadata API version this client speaks: flexible, but still name-keyed rather than the
/// topic-id-only shape `METADATA` grows at v13 (§4.7 Open Question).
const METADATA_API_VERSION: i16 = 9;

/// Fetches and publishes a fresh cluster snapshot (§4.7). An empty `topics` slice asks the broker
/// for every topic it knows about; a non-empty slice scopes the request to just those topics.
pub async fn refresh(
    pool: &ConnectionPool,
    cache: &MetadataCache,
    topics: &[String],
) -> Result<(), Error> {
    let request = Request::MetadataRequest(MetadataRequest {
        topics: if topics.is_empty() {
            None
        } else {
            Some(
                topics
                    .iter()
                    .map(|name| MetadataRequestTopic {
                        topic_id: uuid::Uuid::nil(),
                        name: Some(name.clone()),
                        unknown_tagged_fields: vec![],
                    })
                    .collect(),
            )
        },
        allow_auto_topic_creation: false,
        include_cluster_authorized_operations: false,
        include_topic_authorized_operations: false,
        unknown_tagged_fields: vec![],
    });

    let conn = pool.get_first_available(&[]).await?;
    let response = conn
        .send(
            ApiMessageType::METADATA,
            METADATA_API_VERSION,
            request,
            std::time::Duration::from_secs(30),
        )
        .await?;

    let Response::MetadataResponse(resp) = response else {
        return Err(Error::network("unexpected response to Metadata"));
    };

    let snapshot = ClusterSnapshot::from_response(&resp);
    cache.publish(snapshot);
    Ok(())
}
