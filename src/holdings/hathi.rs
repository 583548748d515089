//! Concurrent expansion of a HathiTrust catalog record into volume formats
//!
//! The item list is split into [`HATHI_WORKERS`] contiguous chunks, one task
//! per chunk. Workers never touch the instance: they send formats over their
//! own channel and finish with [`WorkerMessage::Done`]. The aggregator is the
//! only writer to the instance's format list.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt, StreamMap};

use crate::{
    error::{AppError, AppResult},
    models::{identifier::AUTHORITATIVE_WEIGHT, Format, Identifier, InstanceRecord, Link, LinkFlags},
    services::lookup::{HathiItem, HoldingsLookup},
};

/// Size of the worker pool
pub const HATHI_WORKERS: usize = 4;

/// Rights codes of volumes that cannot be offered (in copyright, undetermined)
const RESTRICTED_RIGHTS: [&str; 4] = ["ic", "icus", "ic-world", "und"];

/// Buffered formats per worker channel
const CHANNEL_CAPACITY: usize = 16;

static HATHI_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"id=([a-z./$0-9]+)").expect("valid hathi id regex"));

/// Message sent by a worker to the aggregator
#[derive(Debug)]
pub enum WorkerMessage {
    Item(Format),
    /// The worker has no further output
    Done,
}

/// Missing rights codes count as "ic"
pub fn is_restricted(rights_code: Option<&str>) -> bool {
    RESTRICTED_RIGHTS.contains(&rights_code.unwrap_or("ic"))
}

/// Split `items` into exactly `workers` contiguous chunks of `ceil(n / workers)`
/// items; trailing chunks may be short or empty.
pub fn partition<T>(items: Vec<T>, workers: usize) -> Vec<Vec<T>> {
    let size = items.len().div_ceil(workers.max(1));
    let mut items = items.into_iter();
    (0..workers).map(|_| items.by_ref().take(size).collect()).collect()
}

/// Drain every worker channel into `instance.formats`.
///
/// A channel is dropped from the poll set when its worker sends `Done` or
/// when it closes; the loop ends once no channel is left. Returns the number
/// of formats added.
pub async fn collect_formats(receivers: Vec<mpsc::Receiver<WorkerMessage>>, instance: &mut InstanceRecord) -> usize {
    let mut channels = StreamMap::new();
    for (worker, rx) in receivers.into_iter().enumerate() {
        channels.insert(worker, ReceiverStream::new(rx));
    }

    let mut added = 0;
    while let Some((worker, message)) = channels.next().await {
        match message {
            WorkerMessage::Item(format) => {
                instance.add_format(format);
                added += 1;
            }
            WorkerMessage::Done => {
                tracing::debug!("Hathi worker {} done", worker);
                channels.remove(&worker);
            }
        }
    }
    added
}

#[derive(Clone)]
pub struct HathiFetcher {
    lookup: Arc<dyn HoldingsLookup>,
    /// Download URL template, `{}` is replaced by the volume id
    download_url: String,
}

impl HathiFetcher {
    pub fn new(lookup: Arc<dyn HoldingsLookup>, download_url: impl Into<String>) -> Self {
        Self {
            lookup,
            download_url: download_url.into(),
        }
    }

    /// Fan `items` out to the worker pool and append every resulting format
    /// to `instance`. Returns the number of formats added.
    pub async fn fetch(&self, items: Vec<HathiItem>, instance: &mut InstanceRecord) -> usize {
        tracing::info!("Loading {} HathiTrust items with {} workers", items.len(), HATHI_WORKERS);

        let mut receivers = Vec::with_capacity(HATHI_WORKERS);
        let mut handles = Vec::with_capacity(HATHI_WORKERS);

        for (worker, chunk) in partition(items, HATHI_WORKERS).into_iter().enumerate() {
            let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
            let fetcher = self.clone();
            handles.push(tokio::spawn(async move {
                fetcher.process_chunk(worker, chunk, tx).await
            }));
            receivers.push(rx);
        }

        let added = collect_formats(receivers, instance).await;

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Hathi worker task failed: {}", e);
            }
        }

        added
    }

    async fn process_chunk(&self, worker: usize, chunk: Vec<HathiItem>, tx: mpsc::Sender<WorkerMessage>) {
        for item in chunk {
            match self.item_format(&item).await {
                Ok(Some(format)) => {
                    if tx.send(WorkerMessage::Item(format)).await.is_err() {
                        tracing::warn!("Hathi worker {} lost its aggregator", worker);
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping Hathi item {}: {}", item.item_url, e),
            }
        }

        // The aggregator also stops polling on a closed channel
        let _ = tx.send(WorkerMessage::Done).await;
    }

    /// Build the viewer + PDF format for one volume, `None` if its rights
    /// forbid access
    pub async fn item_format(&self, item: &HathiItem) -> AppResult<Option<Format>> {
        if is_restricted(item.rights_code.as_deref()) {
            tracing::debug!("Hathi item {} is not public domain", item.item_url);
            return Ok(None);
        }

        let location = self.lookup.resolve_redirect(&item.item_url).await?;
        let viewer_url = location.replace("https://", "");

        let volume_id = HATHI_ID_REGEX
            .captures(&viewer_url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| AppError::Upstream(format!("No volume id in redirect {}", viewer_url)))?;
        let download_url = self.download_url.replace("{}", &volume_id);

        let mut format = Format::with_link("ebook", Link::new(viewer_url, "text/html", LinkFlags::viewer()))
            .source("hathitrust")
            .identifier(Identifier::new("hathi", volume_id, AUTHORITATIVE_WEIGHT));
        format
            .links
            .push(Link::new(download_url, "application/pdf", LinkFlags::download()));

        Ok(Some(format))
    }
}
