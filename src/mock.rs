//! Scripted in-memory forwarder for protocol tests.

use async_trait::async_trait;
use ndn_mgmt_common::{
    ndn::{Data, Interest, Name, NameComponent},
    Error, Result,
};
use ndn_mgmt_transport::Transport;
use std::sync::Mutex;

type Handler = Box<dyn Fn(&Interest) -> Result<Data> + Send + Sync>;

/// Answers each Interest through `handler` and records what was expressed.
pub(crate) struct MockFace {
    handler: Handler,
    expressed: Mutex<Vec<Interest>>,
}

impl MockFace {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(&Interest) -> Result<Data> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            expressed: Mutex::new(Vec::new()),
        }
    }

    /// Serves `segments` (as built by [`segmented_stream`]).
    pub(crate) fn serving(segments: Vec<Data>) -> Self {
        Self::new(move |interest| serve_segments(&segments, interest))
    }

    pub(crate) fn expressed(&self) -> Vec<Interest> {
        self.expressed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockFace {
    async fn express_interest(&self, interest: &Interest) -> Result<Data> {
        self.expressed.lock().unwrap().push(interest.clone());
        (self.handler)(interest)
    }
}

/// Answer a discovery Interest with the last segment, an exact one by name.
pub(crate) fn serve_segments(segments: &[Data], interest: &Interest) -> Result<Data> {
    let found = if interest.can_be_prefix {
        segments
            .iter()
            .filter(|data| interest.matches_data(data))
            .last()
    } else {
        segments.iter().find(|data| data.name == interest.name)
    };
    found
        .cloned()
        .ok_or_else(|| Error::Timeout(interest.name.to_string()))
}

/// Split `payload` into `chunk`-byte segments under `prefix/v=version`.
pub(crate) fn segmented_stream(prefix: &Name, version: u64, payload: &[u8], chunk: usize) -> Vec<Data> {
    let chunks: Vec<&[u8]> = if payload.is_empty() {
        vec![&[][..]]
    } else {
        payload.chunks(chunk).collect()
    };
    let last = chunks.len() as u64 - 1;

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, content)| {
            Data::new(
                prefix.clone().append_version(version).append_segment(i as u64),
                content.to_vec(),
            )
            .with_final_block_id(NameComponent::from_segment(last))
        })
        .collect()
}
