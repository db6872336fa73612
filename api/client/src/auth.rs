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

use std::future::Future;
use std::pin::Pin;

use crate::error::Error;

/// The kind of credential a SASL mechanism is asking for (§6 Authentication).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Username,
    Password,
    Token,
}

type CredentialFuture<'a> = Pin<Box<dyn Future<Output = Result<String, Error>> + Send + 'a>>;

/// Credential acquisition is a thin collaborator (§1 Non-goals): the crate defines this seam for
/// SASL credential lookup, but does not itself drive a SASL handshake over the connection.
pub trait CredentialCallback: Send + Sync {
    fn get_credential(&self, kind: CredentialKind) -> CredentialFuture<'_>;
}

/// A callback that always returns the same username/password pair, for the common `PLAIN`
/// mechanism in tests and simple deployments.
pub struct StaticPlainCredentials {
    pub username: String,
    pub password: String,
}

impl CredentialCallback for StaticPlainCredentials {
    fn get_credential(&self, kind: CredentialKind) -> CredentialFuture<'_> {
        Box::pin(async move {
            match kind {
                CredentialKind::Username => Ok(self.username.clone()),
                CredentialKind::Password => Ok(self.password.clone()),
                CredentialKind::Token => Err(Error::UserError(
                    "StaticPlainCredentials does not carry a token".to_string(),
                )),
            }
        })
    }
}
