// Copyright (c) 2018 Fabian Schuiki

//! Bundled set analysis of a grammar.
//!
//! The first and follow sets of a grammar are needed by several consumers.
//! `Analysis` owns both, and `AnalysisCache` hands out shared analyses keyed
//! by the content of a grammar rather than by the grammar object.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::first::FirstSets;
use crate::follow::FollowSets;
use crate::grammar::Grammar;
use crate::ll1;

/// The first and follow sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    fingerprint: u64,
    first: FirstSets,
    follow: FollowSets,
}

impl Analysis {
    /// Analyze a grammar.
    pub fn compute(grammar: &Grammar) -> Result<Analysis> {
        let first = FirstSets::compute(grammar)?;
        let follow = FollowSets::compute(grammar, &first)?;
        Ok(Analysis {
            fingerprint: grammar.fingerprint(),
            first,
            follow,
        })
    }

    /// The fingerprint of the analyzed grammar.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// The first sets.
    pub fn first(&self) -> &FirstSets {
        &self.first
    }

    /// The follow sets.
    pub fn follow(&self) -> &FollowSets {
        &self.follow
    }

    /// Check whether the analyzed grammar is LL(1).
    pub fn is_ll1(&self, grammar: &Grammar) -> bool {
        ll1::is_ll1(grammar, &self.first, &self.follow)
    }
}

/// A cache of analyses keyed by grammar fingerprint.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: HashMap<u64, Arc<Analysis>>,
}

impl AnalysisCache {
    /// Create an empty cache.
    pub fn new() -> AnalysisCache {
        AnalysisCache {
            entries: HashMap::new(),
        }
    }

    /// Get the analysis of a grammar, computing it on first request.
    ///
    /// Errors are not cached.
    pub fn get(&mut self, grammar: &Grammar) -> Result<Arc<Analysis>> {
        let key = grammar.fingerprint();
        if let Some(analysis) = self.entries.get(&key) {
            trace!("analysis cache hit for {:016x}", key);
            return Ok(analysis.clone());
        }
        let analysis = Arc::new(Analysis::compute(grammar)?);
        self.entries.insert(key, analysis.clone());
        Ok(analysis)
    }

    /// Drop the cached analysis of a grammar.
    pub fn evict(&mut self, grammar: &Grammar) -> Option<Arc<Analysis>> {
        self.entries.remove(&grammar.fingerprint())
    }

    /// The number of cached analyses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
