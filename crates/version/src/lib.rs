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

shadow_rs::shadow!(build);

use const_format::formatcp;

/// Name reported to a broker's `ApiVersionsRequest.client_software_name`.
pub const CLIENT_SOFTWARE_NAME: &str = "kafka-client";

/// Version reported to a broker's `ApiVersionsRequest.client_software_version`.
pub const CLIENT_SOFTWARE_VERSION: &str = build::PKG_VERSION;

/// A one-line identifier combining name, version, and short commit hash, suitable for logging
/// at client startup.
pub const VERSION_STRING: &str = formatcp!(
    "{}/{} ({})",
    CLIENT_SOFTWARE_NAME,
    CLIENT_SOFTWARE_VERSION,
    build::SHORT_COMMIT,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_is_non_empty() {
        assert!(!VERSION_STRING.is_empty());
        assert!(!CLIENT_SOFTWARE_VERSION.is_empty());
    }
}
