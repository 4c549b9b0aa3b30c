//! Asset acquisition: the external source contract and the core's cache.
//!
//! The cache deduplicates concurrent requests per model, memoizes successful
//! templates, and caps the number of outstanding acquisitions. It is polled
//! once per frame; a ticket never resolves on the frame it was issued.

use std::collections::{BTreeMap, BTreeSet};
use std::task::Poll;

use bulwark_core::error::AssetError;
use bulwark_core::types::{LoadTicket, ModelId, ModelTemplate};

/// External loader. Implementations must not block.
pub trait AssetSource {
    /// Start loading `model`. The cache calls this at most once per model
    /// while a load for it is outstanding.
    fn begin(&mut self, model: &ModelId);

    /// Check on an outstanding load.
    fn poll(&mut self, model: &ModelId) -> Poll<Result<ModelTemplate, AssetError>>;
}

/// A finished acquisition.
#[derive(Debug, Clone)]
pub struct LoadResolution {
    pub ticket: LoadTicket,
    pub model: ModelId,
    pub result: Result<ModelTemplate, AssetError>,
}

#[derive(Debug)]
enum CacheEntry {
    Loading { waiters: Vec<LoadTicket> },
    Ready(ModelTemplate),
}

/// Memoizing, deduplicating, concurrency-capped asset cache.
///
/// Keyed with ordered maps so resolutions come out in a stable order.
#[derive(Debug)]
pub struct AssetCache {
    entries: BTreeMap<ModelId, CacheEntry>,
    /// Tickets for models that were already cached when requested.
    ready: Vec<(LoadTicket, ModelId)>,
    max_in_flight: usize,
    in_flight: usize,
    next_ticket: u64,
    loads_started: u64,
}

impl AssetCache {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            ready: Vec::new(),
            max_in_flight,
            in_flight: 0,
            next_ticket: 0,
            loads_started: 0,
        }
    }

    /// Tickets issued and not yet resolved.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn has_capacity(&self) -> bool {
        self.in_flight < self.max_in_flight
    }

    pub fn is_cached(&self, model: &ModelId) -> bool {
        matches!(self.entries.get(model), Some(CacheEntry::Ready(_)))
    }

    /// Number of times the source was asked to begin a load.
    pub fn loads_started(&self) -> u64 {
        self.loads_started
    }

    /// Request a model. Returns `None` when the in-flight cap is reached.
    pub fn acquire(&mut self, source: &mut impl AssetSource, model: &ModelId) -> Option<LoadTicket> {
        if !self.has_capacity() {
            return None;
        }

        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight += 1;

        match self.entries.get_mut(model) {
            Some(CacheEntry::Ready(_)) => self.ready.push((ticket, model.clone())),
            Some(CacheEntry::Loading { waiters }) => waiters.push(ticket),
            None => {
                source.begin(model);
                self.loads_started += 1;
                self.entries.insert(
                    model.clone(),
                    CacheEntry::Loading {
                        waiters: vec![ticket],
                    },
                );
            }
        }
        Some(ticket)
    }

    /// Poll outstanding loads and return every ticket that resolved.
    ///
    /// All waiters on one model resolve from the same result. Failures are
    /// not cached, so a later request retries the load.
    pub fn pump(&mut self, source: &mut impl AssetSource) -> Vec<LoadResolution> {
        let mut resolved = Vec::new();

        for (ticket, model) in std::mem::take(&mut self.ready) {
            let result = match self.entries.get(&model) {
                Some(CacheEntry::Ready(template)) => Ok(template.clone()),
                _ => Err(AssetError::NotFound(model.clone())),
            };
            resolved.push(LoadResolution {
                ticket,
                model,
                result,
            });
        }

        let loading: Vec<ModelId> = self
            .entries
            .iter()
            .filter(|(_, entry)| matches!(entry, CacheEntry::Loading { .. }))
            .map(|(model, _)| model.clone())
            .collect();

        for model in loading {
            let result = match source.poll(&model) {
                Poll::Pending => continue,
                Poll::Ready(result) => result,
            };

            let waiters = match self.entries.remove(&model) {
                Some(CacheEntry::Loading { waiters }) => waiters,
                Some(entry @ CacheEntry::Ready(_)) => {
                    self.entries.insert(model, entry);
                    continue;
                }
                None => continue,
            };

            if let Ok(template) = &result {
                self.entries
                    .insert(model.clone(), CacheEntry::Ready(template.clone()));
            }

            for ticket in waiters {
                resolved.push(LoadResolution {
                    ticket,
                    model: model.clone(),
                    result: result.clone(),
                });
            }
        }

        self.in_flight -= resolved.len();
        resolved
    }
}

/// Deterministic asset source for headless runs and tests.
///
/// Every load resolves after a fixed number of polls. Models can be scripted
/// to fail, or stalled until explicitly released.
#[derive(Debug, Default)]
pub struct ScriptedAssetSource {
    latency_polls: u32,
    failing: BTreeSet<ModelId>,
    stalled: BTreeSet<ModelId>,
    outstanding: BTreeMap<ModelId, u32>,
    begun: Vec<ModelId>,
    next_handle: u64,
}

impl ScriptedAssetSource {
    /// `latency_polls` = extra polls a load stays pending before resolving.
    pub fn new(latency_polls: u32) -> Self {
        Self {
            latency_polls,
            ..Default::default()
        }
    }

    /// Every future load of `model` fails.
    pub fn fail_model(&mut self, model: ModelId) {
        self.failing.insert(model);
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// Loads of `model` stay pending until [`Self::release_stalled`].
    pub fn stall_model(&mut self, model: ModelId) {
        self.stalled.insert(model);
    }

    pub fn release_stalled(&mut self) {
        self.stalled.clear();
    }

    /// Models passed to `begin`, in call order.
    pub fn begun(&self) -> &[ModelId] {
        &self.begun
    }
}

impl AssetSource for ScriptedAssetSource {
    fn begin(&mut self, model: &ModelId) {
        self.begun.push(model.clone());
        self.outstanding.insert(model.clone(), self.latency_polls);
    }

    fn poll(&mut self, model: &ModelId) -> Poll<Result<ModelTemplate, AssetError>> {
        if self.stalled.contains(model) {
            return Poll::Pending;
        }
        let Some(remaining) = self.outstanding.get_mut(model) else {
            return Poll::Ready(Err(AssetError::Failed {
                model: model.clone(),
                reason: "load was never started".into(),
            }));
        };
        if *remaining > 0 {
            *remaining -= 1;
            return Poll::Pending;
        }
        self.outstanding.remove(model);

        if self.failing.contains(model) {
            return Poll::Ready(Err(AssetError::Failed {
                model: model.clone(),
                reason: "scripted failure".into(),
            }));
        }
        self.next_handle += 1;
        Poll::Ready(Ok(ModelTemplate {
            model: model.clone(),
            handle: self.next_handle,
        }))
    }
}
