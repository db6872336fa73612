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

//! Manual implementation of the Apache Kafka wire protocol: fixed-width and
//! variable-length primitive codecs, the v2 record batch format, and the
//! request/response schemata this client speaks.

pub mod codec;
pub mod records;
pub mod schemata;

pub type IoResult<T> = std::io::Result<T>;
