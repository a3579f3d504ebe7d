//! # Worker registry.
//!
//! Holds the base worker and the named sub-workers together with their
//! registration order.
//!
//! ## Rules
//! - Names are unique; `"_"` is reserved for the base worker.
//! - The base worker is always yielded **last** by [`Registry::iter`], after every
//!   sub-worker, so it initializes last and terminates first.
//! - The registry is mutated only during setup (`&mut self`); once running it is read-only.

use std::collections::HashMap;

use crate::{error::ConfigError, workers::WorkerRef};

/// Registry name of the base worker.
pub const BASE_WORKER: &str = "_";

/// Label used for the base worker in logs and errors.
pub const BASE_LABEL: &str = "base";

/// Named, ordered collection of workers.
pub struct Registry {
    base: WorkerRef,
    workers: HashMap<String, WorkerRef>,
    order: Vec<String>,
}

impl Registry {
    /// Creates a registry holding only the base worker.
    pub fn new(base: WorkerRef) -> Self {
        Self {
            base,
            workers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers a sub-worker under `name`.
    ///
    /// Fails without touching the registry if the name is reserved or already taken.
    pub fn add(&mut self, name: String, worker: WorkerRef) -> Result<(), ConfigError> {
        if name == BASE_WORKER {
            return Err(ConfigError::Reserved { name });
        }
        if self.workers.contains_key(&name) {
            return Err(ConfigError::Duplicate { name });
        }
        self.order.push(name.clone());
        self.workers.insert(name, worker);
        Ok(())
    }

    /// Looks a worker up by registry name (including [`BASE_WORKER`]).
    pub fn get(&self, name: &str) -> Option<&WorkerRef> {
        if name == BASE_WORKER {
            Some(&self.base)
        } else {
            self.workers.get(name)
        }
    }

    /// Iterates workers in init order: sub-workers as registered, then the base worker.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WorkerRef)> {
        self.order
            .iter()
            .filter_map(|name| self.workers.get(name).map(|w| (name.as_str(), w)))
            .chain(std::iter::once((BASE_WORKER, &self.base)))
    }

    /// Sub-worker names in registration order (base worker excluded).
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Number of workers including the base worker.
    pub fn len(&self) -> usize {
        self.order.len() + 1
    }

    /// Returns `true` if `name` refers to the base worker.
    pub fn is_base(name: &str) -> bool {
        name == BASE_WORKER
    }

    /// Name to use for `name` in logs and errors.
    pub fn label(name: &str) -> &str {
        if Self::is_base(name) { BASE_LABEL } else { name }
    }
}
