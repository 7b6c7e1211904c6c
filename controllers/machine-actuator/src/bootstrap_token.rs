//! Kubeadm bootstrap tokens.
//!
//! A token is `<id>.<secret>` (6 and 16 characters of `[a-z0-9]`). The
//! workload cluster learns about it through a `bootstrap.kubernetes.io/token`
//! Secret in `kube-system` whose `expiration` bounds its lifetime.

use crate::error::ClusterError;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use rand::Rng;
use std::collections::BTreeMap;
use std::time::Duration;

/// TTL of tokens minted for joining control-plane members
pub const DEFAULT_BOOTSTRAP_TOKEN_TTL: Duration = Duration::from_secs(10 * 60);

pub const BOOTSTRAP_TOKEN_NAMESPACE: &str = "kube-system";
pub const BOOTSTRAP_TOKEN_SECRET_TYPE: &str = "bootstrap.kubernetes.io/token";
pub const BOOTSTRAP_TOKEN_GROUPS: &str = "system:bootstrappers:kubeadm:default-node-token";

const TOKEN_ID_LEN: usize = 6;
const TOKEN_SECRET_LEN: usize = 16;
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapToken {
    id: String,
    secret: String,
}

impl BootstrapToken {
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            id: random_string(rng, TOKEN_ID_LEN),
            secret: random_string(rng, TOKEN_SECRET_LEN),
        }
    }

    /// Parses `<id>.<secret>`, rejecting anything kubeadm would reject.
    pub fn parse(token: &str) -> Option<Self> {
        let (id, secret) = token.split_once('.')?;
        let valid = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| TOKEN_CHARSET.contains(&b));
        (valid(id, TOKEN_ID_LEN) && valid(secret, TOKEN_SECRET_LEN)).then(|| Self {
            id: id.to_string(),
            secret: secret.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn secret_name(&self) -> String {
        format!("bootstrap-token-{}", self.id)
    }

    /// Secret registering this token, expiring `ttl` after `now`.
    pub fn to_secret(&self, ttl: Duration, now: DateTime<Utc>) -> Result<Secret, ClusterError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|e| ClusterError::InvalidRequest(format!("bootstrap token ttl out of range: {e}")))?;
        let expiration = now + ttl;

        let string_data = BTreeMap::from([
            ("token-id".to_string(), self.id.clone()),
            ("token-secret".to_string(), self.secret.clone()),
            (
                "expiration".to_string(),
                expiration.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("usage-bootstrap-authentication".to_string(), "true".to_string()),
            ("usage-bootstrap-signing".to_string(), "true".to_string()),
            ("auth-extra-groups".to_string(), BOOTSTRAP_TOKEN_GROUPS.to_string()),
        ]);

        Ok(Secret {
            metadata: ObjectMeta {
                name: Some(self.secret_name()),
                namespace: Some(BOOTSTRAP_TOKEN_NAMESPACE.to_string()),
                ..Default::default()
            },
            type_: Some(BOOTSTRAP_TOKEN_SECRET_TYPE.to_string()),
            string_data: Some(string_data),
            ..Default::default()
        })
    }
}

impl std::fmt::Display for BootstrapToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.id, self.secret)
    }
}

fn random_string<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())]))
        .collect()
}
