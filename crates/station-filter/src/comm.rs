//! Worker-partition communication.
//!
//! The resample step needs three collective operations (a weight-sum
//! reduction, a gather of the weight vector onto the coordinator, and a
//! broadcast of the ancestor mapping) plus point-to-point state transfer
//! for ancestors living on a different worker than their destination slot.
//! [`WorkerComm`] abstracts the transport: [`SingleWorker`] short-circuits
//! everything locally, [`ChannelWorker`] runs a real multi-worker exchange
//! over in-process channels, and an MPI transport would slot in behind the
//! same trait.

use std::sync::mpsc::{Receiver, Sender, channel};

use crate::error::{FilterError, FilterResult};

/// Transport-independent view of one worker in the partition.
///
/// Rank 0 is the coordinator: it alone receives the gathered weights and
/// supplies the ancestor vector to broadcast.
pub trait WorkerComm<S> {
    fn world_size(&self) -> usize;
    fn rank(&self) -> usize;

    /// Sum the local weight sums across all workers; every worker receives
    /// the global total.
    fn reduce_weight_sum(&mut self, local_sum: f64) -> FilterResult<f64>;

    /// Concatenate every worker's weights in rank order onto the
    /// coordinator.  Returns `Some` on rank 0, `None` elsewhere.
    fn gather_weights(&mut self, local: &[f32]) -> FilterResult<Option<Vec<f32>>>;

    /// Distribute the coordinator's ancestor vector to every worker.
    /// Non-coordinators pass `None` and receive the vector.
    fn broadcast_ancestors(&mut self, ancestors: Option<Vec<usize>>)
    -> FilterResult<Vec<usize>>;

    /// Send the state destined for global slot `slot` to worker `to`.
    fn send_state(&mut self, to: usize, slot: usize, state: &S) -> FilterResult<()>;

    /// Receive the state for global slot `slot` from worker `from`.
    fn recv_state(&mut self, from: usize, slot: usize) -> FilterResult<S>;
}

// ── Single worker ─────────────────────────────────────────────────────────────

/// World of one: every collective is the identity and point-to-point
/// transfer is unreachable (the swap protocol only copies locally).
pub struct SingleWorker;

impl<S: Clone> WorkerComm<S> for SingleWorker {
    fn world_size(&self) -> usize {
        1
    }

    fn rank(&self) -> usize {
        0
    }

    fn reduce_weight_sum(&mut self, local_sum: f64) -> FilterResult<f64> {
        Ok(local_sum)
    }

    fn gather_weights(&mut self, local: &[f32]) -> FilterResult<Option<Vec<f32>>> {
        Ok(Some(local.to_vec()))
    }

    fn broadcast_ancestors(
        &mut self,
        ancestors: Option<Vec<usize>>,
    ) -> FilterResult<Vec<usize>> {
        ancestors.ok_or_else(|| {
            FilterError::Comm("single worker asked to receive a broadcast".into())
        })
    }

    fn send_state(&mut self, _to: usize, _slot: usize, _state: &S) -> FilterResult<()> {
        Err(FilterError::Comm("no peers in a single-worker world".into()))
    }

    fn recv_state(&mut self, _from: usize, _slot: usize) -> FilterResult<S> {
        Err(FilterError::Comm("no peers in a single-worker world".into()))
    }
}

// ── Channel mesh ──────────────────────────────────────────────────────────────

enum Payload<S> {
    WeightSum(f64),
    Weights(Vec<f32>),
    Ancestors(Vec<usize>),
    State { slot: usize, state: S },
}

struct Envelope<S> {
    from:    usize,
    payload: Payload<S>,
}

/// One worker in an in-process mesh of unbounded channels.
///
/// Sends never block, so the slot-ordered swap protocol cannot deadlock:
/// whichever worker is blocked on the earliest slot is waiting for a send
/// its peer has either already made or will make before blocking itself.
/// Out-of-order arrivals are stashed until a matching receive asks for
/// them.
pub struct ChannelWorker<S> {
    rank:    usize,
    senders: Vec<Sender<Envelope<S>>>,
    inbox:   Receiver<Envelope<S>>,
    stash:   Vec<Envelope<S>>,
}

/// Build a fully connected mesh of `world_size` workers.
///
/// Each returned worker is moved onto its own thread by the caller.
pub fn channel_workers<S: Send>(world_size: usize) -> Vec<ChannelWorker<S>> {
    let mut senders = Vec::with_capacity(world_size);
    let mut inboxes = Vec::with_capacity(world_size);
    for _ in 0..world_size {
        let (tx, rx) = channel();
        senders.push(tx);
        inboxes.push(rx);
    }

    inboxes
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| ChannelWorker {
            rank,
            senders: senders.clone(),
            inbox,
            stash: Vec::new(),
        })
        .collect()
}

impl<S: Send> ChannelWorker<S> {
    fn world(&self) -> usize {
        self.senders.len()
    }

    fn post(&self, to: usize, payload: Payload<S>) -> FilterResult<()> {
        if to == self.rank {
            return Err(FilterError::Comm("worker addressed itself".into()));
        }
        self.senders[to]
            .send(Envelope { from: self.rank, payload })
            .map_err(|_| FilterError::Comm(format!("worker {to} is gone")))
    }

    /// Blocking receive of the first envelope satisfying `matches`,
    /// stashing everything that arrives ahead of it.
    fn recv_match<F>(&mut self, matches: F) -> FilterResult<Envelope<S>>
    where
        F: Fn(&Envelope<S>) -> bool,
    {
        if let Some(pos) = self.stash.iter().position(|e| matches(e)) {
            return Ok(self.stash.swap_remove(pos));
        }
        loop {
            let envelope = self
                .inbox
                .recv()
                .map_err(|_| FilterError::Comm("all peers disconnected".into()))?;
            if matches(&envelope) {
                return Ok(envelope);
            }
            self.stash.push(envelope);
        }
    }
}

impl<S: Clone + Send> WorkerComm<S> for ChannelWorker<S> {
    fn world_size(&self) -> usize {
        self.world()
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn reduce_weight_sum(&mut self, local_sum: f64) -> FilterResult<f64> {
        if self.rank == 0 {
            let mut total = local_sum;
            for from in 1..self.world() {
                let envelope = self.recv_match(|e| {
                    e.from == from && matches!(e.payload, Payload::WeightSum(_))
                })?;
                if let Payload::WeightSum(sum) = envelope.payload {
                    total += sum;
                }
            }
            for to in 1..self.world() {
                self.post(to, Payload::WeightSum(total))?;
            }
            Ok(total)
        } else {
            self.post(0, Payload::WeightSum(local_sum))?;
            let envelope = self
                .recv_match(|e| e.from == 0 && matches!(e.payload, Payload::WeightSum(_)))?;
            match envelope.payload {
                Payload::WeightSum(total) => Ok(total),
                _ => unreachable!(),
            }
        }
    }

    fn gather_weights(&mut self, local: &[f32]) -> FilterResult<Option<Vec<f32>>> {
        if self.rank == 0 {
            let mut all = local.to_vec();
            for from in 1..self.world() {
                let envelope = self.recv_match(|e| {
                    e.from == from && matches!(e.payload, Payload::Weights(_))
                })?;
                if let Payload::Weights(weights) = envelope.payload {
                    all.extend(weights);
                }
            }
            Ok(Some(all))
        } else {
            self.post(0, Payload::Weights(local.to_vec()))?;
            Ok(None)
        }
    }

    fn broadcast_ancestors(
        &mut self,
        ancestors: Option<Vec<usize>>,
    ) -> FilterResult<Vec<usize>> {
        if self.rank == 0 {
            let ancestors = ancestors.ok_or_else(|| {
                FilterError::Comm("coordinator has no ancestor vector".into())
            })?;
            for to in 1..self.world() {
                self.post(to, Payload::Ancestors(ancestors.clone()))?;
            }
            Ok(ancestors)
        } else {
            let envelope = self
                .recv_match(|e| e.from == 0 && matches!(e.payload, Payload::Ancestors(_)))?;
            match envelope.payload {
                Payload::Ancestors(ancestors) => Ok(ancestors),
                _ => unreachable!(),
            }
        }
    }

    fn send_state(&mut self, to: usize, slot: usize, state: &S) -> FilterResult<()> {
        self.post(to, Payload::State { slot, state: state.clone() })
    }

    fn recv_state(&mut self, from: usize, slot: usize) -> FilterResult<S> {
        let envelope = self.recv_match(|e| {
            e.from == from && matches!(e.payload, Payload::State { slot: s, .. } if s == slot)
        })?;
        match envelope.payload {
            Payload::State { state, .. } => Ok(state),
            _ => unreachable!(),
        }
    }
}
