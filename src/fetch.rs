//! Segmented dataset retrieval.
//!
//! A dataset is published as `<prefix>/<version>/<segment>` Data packets. The
//! fetch discovers the latest version, learns the last segment number from
//! FinalBlockId, then retrieves the remaining segments one at a time.

use bytes::{BufMut, Bytes, BytesMut};
use log::{debug, info, warn};
use ndn_mgmt_common::{
    ndn::{Data, Interest, Name},
    Error,
};
use ndn_mgmt_transport::{ClientOptions, Transport, DEFAULT_INTEREST_LIFETIME_MS, DEFAULT_MAX_ATTEMPTS};

use crate::error::{ManagementError, Result};

/// Largest FinalBlockId a fetch will follow.
pub const MAX_SEGMENTS: u64 = 1 << 16;

/// Per-Interest timing and retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interest_lifetime_ms: u64,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interest_lifetime_ms: DEFAULT_INTEREST_LIFETIME_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl From<&ClientOptions> for RetryPolicy {
    fn from(options: &ClientOptions) -> Self {
        Self {
            interest_lifetime_ms: options.interest_lifetime_ms,
            max_attempts: options.max_attempts.max(1),
        }
    }
}

/// Express `interest`, retransmitting with a fresh nonce after each timeout.
///
/// Only timeouts are retried; a Nack or face failure ends the request at once.
pub async fn get_data<T>(face: &T, mut interest: Interest, policy: &RetryPolicy) -> Result<Data>
where
    T: Transport + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match face.express_interest(&interest).await {
            Ok(data) => return Ok(data),
            Err(Error::Timeout(_)) if attempt < max_attempts => {
                debug!(
                    "Interest {} timed out, retrying ({}/{})",
                    interest.name, attempt, max_attempts
                );
                interest.refresh_nonce();
            }
            Err(e @ (Error::Timeout(_) | Error::Nack { .. })) => {
                warn!("Request for {} failed after {} attempt(s): {}", interest.name, attempt, e);
                return Err(ManagementError::RequestFailed {
                    name: interest.name.to_string(),
                    attempts: attempt,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Retrieve every segment of the latest version under `prefix`, ordered by segment number.
pub async fn get_segmented_data<T>(face: &T, prefix: &Name, policy: &RetryPolicy) -> Result<Vec<Data>>
where
    T: Transport + ?Sized,
{
    let discovery = Interest::new(prefix.clone())
        .with_can_be_prefix(true)
        .with_must_be_fresh(true)
        .with_lifetime(policy.interest_lifetime_ms);
    let first = get_data(face, discovery, policy).await?;

    if first.name.len() != prefix.len() + 2 || !prefix.is_prefix_of(&first.name) {
        return Err(ManagementError::MalformedStream(format!(
            "{} is not <{}>/<version>/<segment>",
            first.name, prefix
        )));
    }
    let discovered = first
        .name
        .get_from_end(0)
        .and_then(|component| component.to_segment().ok())
        .ok_or_else(|| {
            ManagementError::MalformedStream(format!("{} does not end in a segment number", first.name))
        })?;
    let final_segment = match first.final_block_id() {
        Some(component) => component.to_segment().map_err(|e| ManagementError::UnboundedStream {
            name: first.name.to_string(),
            reason: e.to_string(),
        })?,
        None => {
            return Err(ManagementError::UnboundedStream {
                name: first.name.to_string(),
                reason: "no FinalBlockId".into(),
            })
        }
    };
    if final_segment >= MAX_SEGMENTS {
        return Err(ManagementError::UnboundedStream {
            name: first.name.to_string(),
            reason: format!("FinalBlockId {} exceeds {} segments", final_segment, MAX_SEGMENTS),
        });
    }
    if discovered > final_segment {
        return Err(ManagementError::MalformedStream(format!(
            "segment {} lies past FinalBlockId {}",
            discovered, final_segment
        )));
    }

    let versioned = first.name.prefix(prefix.len() + 1);
    info!(
        "Fetching {} ({} segment(s), discovered segment {})",
        versioned,
        final_segment.saturating_add(1),
        discovered
    );

    let mut segments = Vec::new();
    for index in 0..=final_segment {
        if index == discovered {
            continue;
        }
        let name = versioned.clone().append_segment(index);
        let interest = Interest::new(name.clone())
            .with_must_be_fresh(false)
            .with_lifetime(policy.interest_lifetime_ms);
        let data = get_data(face, interest, policy).await?;
        if data.name != name {
            return Err(ManagementError::MalformedStream(format!(
                "asked for {} but received {}",
                name, data.name
            )));
        }
        debug!("Retrieved segment {} of {}", index, versioned);
        segments.push((index, data));
    }
    segments.push((discovered, first));
    segments.sort_by_key(|(index, _)| *index);

    Ok(segments.into_iter().map(|(_, data)| data).collect())
}

/// Concatenate segment contents with no separators.
pub fn combine(segments: &[Data]) -> Bytes {
    let total = segments.iter().map(|data| data.content.len()).sum();
    let mut payload = BytesMut::with_capacity(total);
    for data in segments {
        payload.put_slice(&data.content);
    }
    payload.freeze()
}

/// Fetch a whole dataset and return its reassembled payload.
pub async fn fetch<T>(face: &T, prefix: &Name, policy: &RetryPolicy) -> Result<Bytes>
where
    T: Transport + ?Sized,
{
    let segments = get_segmented_data(face, prefix, policy).await?;
    Ok(combine(&segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{segmented_stream, serve_segments, MockFace};
    use ndn_mgmt_common::ndn::NameComponent;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn prefix() -> Name {
        Name::from_string("/localhost/nfd/faces/list").unwrap()
    }

    #[tokio::test]
    async fn test_three_segment_stream() {
        let segments = segmented_stream(&prefix(), 7, b"aaaabbbbcc", 4);
        assert_eq!(segments.len(), 3);
        let face = MockFace::serving(segments);

        let payload = fetch(&face, &prefix(), &RetryPolicy::default()).await.unwrap();
        assert_eq!(&payload[..], b"aaaabbbbcc");

        let expressed = face.expressed();
        assert_eq!(expressed.len(), 3);
        assert!(expressed[0].can_be_prefix && expressed[0].must_be_fresh);
        assert_eq!(expressed[0].lifetime_ms, 2000);

        let versioned = prefix().append_version(7);
        assert_eq!(expressed[1].name, versioned.clone().append_segment(0));
        assert_eq!(expressed[2].name, versioned.append_segment(1));
        assert!(expressed[1..].iter().all(|i| !i.can_be_prefix && !i.must_be_fresh));
    }

    #[tokio::test]
    async fn test_single_segment_needs_no_more_requests() {
        let face = MockFace::serving(segmented_stream(&prefix(), 1, b"only", 16));
        let payload = fetch(&face, &prefix(), &RetryPolicy::default()).await.unwrap();
        assert_eq!(&payload[..], b"only");
        assert_eq!(face.expressed().len(), 1);
    }

    #[tokio::test]
    async fn test_discovered_segment_is_reused_in_order() {
        // Discovery lands on the middle segment
        let segments = segmented_stream(&prefix(), 3, b"112233", 2);
        let middle = segments[1].clone();
        let face = MockFace::new(move |interest| {
            if interest.can_be_prefix {
                Ok(middle.clone())
            } else {
                serve_segments(&segments, interest)
            }
        });

        let payload = fetch(&face, &prefix(), &RetryPolicy::default()).await.unwrap();
        assert_eq!(&payload[..], b"112233");

        let fetched: Vec<u64> = face.expressed()[1..]
            .iter()
            .map(|i| i.name.get_from_end(0).unwrap().to_segment().unwrap())
            .collect();
        assert_eq!(fetched, vec![0, 2]);
    }

    #[tokio::test]
    async fn test_missing_final_block_id_is_unbounded() {
        let data = Data::new(prefix().append_version(1).append_segment(0), &b"x"[..]);
        let face = MockFace::new(move |_| Ok(data.clone()));

        let result = fetch(&face, &prefix(), &RetryPolicy::default()).await;
        assert!(matches!(result, Err(ManagementError::UnboundedStream { .. })));
    }

    #[tokio::test]
    async fn test_non_numeric_final_block_id_is_unbounded() {
        let data = Data::new(prefix().append_version(1).append_segment(0), &b"x"[..])
            .with_final_block_id(NameComponent::new(&b"end"[..]));
        let face = MockFace::new(move |_| Ok(data.clone()));

        let result = fetch(&face, &prefix(), &RetryPolicy::default()).await;
        assert!(matches!(result, Err(ManagementError::UnboundedStream { .. })));
    }

    #[tokio::test]
    async fn test_huge_final_block_id_is_unbounded() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Info)
            .try_init();
        let data = Data::new(prefix().append_version(1).append_segment(u64::MAX), &b"x"[..])
            .with_final_block_id(NameComponent::from_segment(u64::MAX));
        let face = MockFace::new(move |_| Ok(data.clone()));

        let result = fetch(&face, &prefix(), &RetryPolicy::default()).await;
        assert!(matches!(result, Err(ManagementError::UnboundedStream { .. })));
        assert_eq!(face.expressed().len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_name_shape_is_malformed() {
        let data = Data::new(prefix().append_segment(0), &b"x"[..])
            .with_final_block_id(NameComponent::from_segment(0));
        let face = MockFace::new(move |_| Ok(data.clone()));

        let result = fetch(&face, &prefix(), &RetryPolicy::default()).await;
        assert!(matches!(result, Err(ManagementError::MalformedStream(_))));
    }

    #[tokio::test]
    async fn test_timeouts_are_retried_with_fresh_nonce() {
        let segments = segmented_stream(&prefix(), 1, b"data", 16);
        let failures = AtomicU32::new(0);
        let face = MockFace::new(move |interest| {
            if failures.fetch_add(1, Ordering::SeqCst) < 2 {
                return Err(Error::Timeout(interest.name.to_string()));
            }
            serve_segments(&segments, interest)
        });

        let payload = fetch(&face, &prefix(), &RetryPolicy::default()).await.unwrap();
        assert_eq!(&payload[..], b"data");

        let expressed = face.expressed();
        assert_eq!(expressed.len(), 3);
        assert_ne!(expressed[0].nonce, expressed[1].nonce);
        assert_ne!(expressed[1].nonce, expressed[2].nonce);
    }

    #[tokio::test]
    async fn test_exhausted_retries_abort_the_fetch() {
        let segments = segmented_stream(&prefix(), 1, b"aabb", 2);
        let face = MockFace::new(move |interest| {
            // Segment 0 is never answered
            if interest.name.get_from_end(0).and_then(|c| c.to_segment().ok()) == Some(0) {
                return Err(Error::Timeout(interest.name.to_string()));
            }
            serve_segments(&segments, interest)
        });

        match fetch(&face, &prefix(), &RetryPolicy::default()).await {
            Err(ManagementError::RequestFailed { attempts, name, .. }) => {
                assert_eq!(attempts, 3);
                assert!(name.ends_with("seg=0"));
            }
            other => panic!("expected RequestFailed, got {:?}", other),
        }
        // Discovery plus three attempts at segment 0
        assert_eq!(face.expressed().len(), 4);
    }

    #[tokio::test]
    async fn test_nack_is_not_retried() {
        let face = MockFace::new(|interest| {
            Err(Error::Nack {
                name: interest.name.to_string(),
                reason: 150,
            })
        });
        let result = get_data(&face, Interest::new(prefix()), &RetryPolicy::default()).await;
        assert!(matches!(result, Err(ManagementError::RequestFailed { attempts: 1, .. })));
        assert_eq!(face.expressed().len(), 1);
    }

    #[test]
    fn test_combine_concatenates_in_order() {
        let segments = segmented_stream(&prefix(), 1, b"hello world", 3);
        assert_eq!(&combine(&segments)[..], b"hello world");
        assert!(combine(&[]).is_empty());
    }
}
