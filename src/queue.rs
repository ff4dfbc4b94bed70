//! Priority-ordered, deduplicated index queue.
//!
//! Content changes are published on the content channel. The
//! [`ContentChangeListener`] turns them into [`IndexTask`]s, batched per
//! change, and publishes them on the index channel. The index channel
//! reaches the [`IndexDispatcher`] of every node in the cluster, which hands
//! each task to that node's index writer.

pub mod bus;
pub mod context;
pub mod dispatcher;
pub mod event;
pub mod priority;
pub mod service;
pub mod task;

use std::sync::Arc;

use log::warn;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::QueueConfig;
use crate::content::ContentAccess;

pub use bus::{Channel, ClusterLink, Envelope, Listener};
pub use context::ExecutionContext;
pub use dispatcher::{DispatchStats, IndexDispatcher, IndexWriter, WriterLookup, WriterSlot};
pub use event::{ContentChange, ContentEvent, IndexEvent, TaskPayload};
pub use priority::Priority;
pub use service::{ContentChangeListener, IndexQueue};
pub use task::{IndexTask, TaskBatch, TaskKind};

/// The queue as wired on one cluster node.
pub struct IndexNode {
    node_id: Uuid,
    content_channel: Arc<Channel<ContentChange>>,
    index_channel: Arc<Channel<IndexEvent>>,
    queue: Arc<IndexQueue>,
    dispatcher: Arc<IndexDispatcher>,
}

impl IndexNode {
    /// Wire a node. Without a link, index events stay on this node.
    pub fn new(
        config: QueueConfig,
        content: Arc<dyn ContentAccess>,
        writers: Arc<dyn WriterLookup>,
        link: Option<ClusterLink>,
    ) -> Self {
        let node_id = Uuid::new_v4();
        let content_channel: Arc<Channel<ContentChange>> =
            Arc::new(Channel::new(config.content_channel.clone(), node_id, None));
        let index_channel: Arc<Channel<IndexEvent>> =
            Arc::new(Channel::new(config.index_channel.clone(), node_id, link));

        let queue = Arc::new(IndexQueue::new(config, content, index_channel.clone()));
        let dispatcher = Arc::new(IndexDispatcher::new(writers));

        content_channel.register_local(Arc::new(ContentChangeListener::new(queue.clone())));
        index_channel.register_remote(dispatcher.clone());

        IndexNode {
            node_id,
            content_channel,
            index_channel,
            queue,
            dispatcher,
        }
    }

    pub fn node_id(&self) -> Uuid {
        self.node_id
    }

    /// Report a content change made under `ctx`.
    pub fn notify(&self, event: ContentEvent, ctx: &ExecutionContext) {
        let change = ContentChange::new(event, ctx.clone());
        if let Err(e) = self.content_channel.publish(&change) {
            warn!("failed to publish content change: {e}");
        }
    }

    pub fn queue(&self) -> &IndexQueue {
        &self.queue
    }

    pub fn content_channel(&self) -> &Arc<Channel<ContentChange>> {
        &self.content_channel
    }

    pub fn index_channel(&self) -> &Arc<Channel<IndexEvent>> {
        &self.index_channel
    }

    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    /// Start receiving index events from other nodes. See
    /// [`Channel::spawn_receiver`].
    pub fn spawn_cluster_receiver(&self) -> Option<JoinHandle<()>> {
        self.index_channel.spawn_receiver()
    }
}
