//! Forwarder reachability check.

use log::{debug, warn};
use ndn_mgmt_common::ndn::{Interest, Name, NameComponent};
use ndn_mgmt_transport::{Transport, DEFAULT_INTEREST_LIFETIME_MS};

/// Express a fresh Interest for `name`; any Data back means reachable.
///
/// Failures are logged and reported as `false`, never raised.
pub async fn ping<T>(face: &T, name: &Name) -> bool
where
    T: Transport + ?Sized,
{
    let interest = Interest::new(name.clone())
        .with_can_be_prefix(true)
        .with_must_be_fresh(true)
        .with_lifetime(DEFAULT_INTEREST_LIFETIME_MS);

    match face.express_interest(&interest).await {
        Ok(data) => {
            debug!("Ping {} answered by {}", name, data.name);
            true
        }
        Err(e) => {
            warn!("Ping {} failed: {}", name, e);
            false
        }
    }
}

/// Ping the local forwarder at `/localhost/nfd`.
pub async fn ping_local<T>(face: &T) -> bool
where
    T: Transport + ?Sized,
{
    let name = Name::new()
        .append(NameComponent::new(&b"localhost"[..]))
        .append(NameComponent::new(&b"nfd"[..]));
    ping(face, &name).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFace;
    use ndn_mgmt_common::{ndn::Data, Error};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[tokio::test]
    async fn test_ping_local_reachable() {
        init_logging();
        let face = MockFace::new(|interest| {
            Ok(Data::new(interest.name.clone().append_version(1), &b"status"[..]))
        });

        assert!(ping_local(&face).await);
        let expressed = face.expressed();
        assert_eq!(expressed.len(), 1);
        assert_eq!(expressed[0].name.to_string(), "/localhost/nfd");
        assert!(expressed[0].can_be_prefix && expressed[0].must_be_fresh);
    }

    #[tokio::test]
    async fn test_ping_failure_is_false() {
        init_logging();
        let face = MockFace::new(|interest| Err(Error::Timeout(interest.name.to_string())));
        assert!(!ping(&face, &Name::from_string("/unreachable").unwrap()).await);

        let face = MockFace::new(|interest| {
            Err(Error::Nack {
                name: interest.name.to_string(),
                reason: 150,
            })
        });
        assert!(!ping_local(&face).await);
    }

    #[tokio::test]
    async fn test_ping_is_not_retried() {
        let face = MockFace::new(|interest| Err(Error::Timeout(interest.name.to_string())));
        ping_local(&face).await;
        assert_eq!(face.expressed().len(), 1);
    }
}
