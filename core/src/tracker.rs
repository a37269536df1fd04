//! Render-time input tracking.
//!
//! The rendering layer calls [`InputTracker::record`] once per rendered
//! input and [`InputTracker::snapshot`] once after rendering completes.
//!
//! ```text
//! Empty --record--> Recording --snapshot--> Snapshotted
//!   |                                          ^
//!   +---------------- snapshot (None) ---------+
//! ```
//!
//! `snapshot` consumes the tracker. A pass that recorded nothing produces no
//! descriptor, so nothing gets signed or emitted for it.

use std::collections::BTreeMap;
use std::mem;

use serde_json::Value;

use formseal_types::{Constraint, CsrfBinding, DescriptorError, FormDescriptor};

/// Which recording operations a tracker honors. Derived from the capability
/// set of the composed form that started the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrackerPolicy {
    pub(crate) track_inputs: bool,
    pub(crate) keep_constraints: bool,
    pub(crate) bind_csrf: bool,
    pub(crate) keep_form_version: bool,
}

impl TrackerPolicy {
    pub(crate) const ALL: TrackerPolicy = TrackerPolicy {
        track_inputs: true,
        keep_constraints: true,
        bind_csrf: true,
        keep_form_version: true,
    };
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Records {
    columns: Vec<String>,
    constraints: BTreeMap<String, Constraint>,
}

impl Records {
    fn record(&mut self, field: String, constraint: Option<Constraint>) {
        match constraint {
            Some(constraint) => {
                self.constraints.insert(field.clone(), constraint);
            }
            None => {
                self.constraints.remove(&field);
            }
        }
        if !self.columns.contains(&field) {
            self.columns.push(field);
        }
    }

    fn merge(&mut self, nested: Records) {
        let Records {
            columns,
            mut constraints,
        } = nested;
        for column in columns {
            let constraint = constraints.remove(&column);
            self.record(column, constraint);
        }
    }
}

/// Accumulates the inputs of one render pass.
#[derive(Debug, Clone)]
pub struct InputTracker {
    namespaces: Vec<String>,
    records: Records,
    csrf: Option<CsrfBinding>,
    form_version: Option<Value>,
    policy: TrackerPolicy,
}

impl InputTracker {
    /// A tracker honoring every recording operation.
    pub fn new<N>(namespaces: N) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self::with_policy(namespaces, TrackerPolicy::ALL)
    }

    pub(crate) fn with_policy<N>(namespaces: N, policy: TrackerPolicy) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self {
            namespaces: namespaces.into_iter().map(Into::into).collect(),
            records: Records::default(),
            csrf: None,
            form_version: None,
            policy,
        }
    }

    /// Record one rendered input.
    ///
    /// Recording a field again during the same pass overwrites its earlier
    /// constraint (or clears it when `constraint` is `None`) and keeps its
    /// original position.
    pub fn record(&mut self, field: impl Into<String>, constraint: Option<Constraint>) {
        if !self.policy.track_inputs {
            return;
        }
        let constraint = constraint.filter(|_| self.policy.keep_constraints);
        self.records.record(field.into(), constraint);
    }

    pub fn bind_csrf(&mut self, binding: CsrfBinding) {
        if self.policy.bind_csrf {
            self.csrf = Some(binding);
        }
    }

    pub fn set_form_version(&mut self, version: Value) {
        if self.policy.keep_form_version {
            self.form_version = Some(version);
        }
    }

    /// Run a nested render pass against an empty record set, then merge what
    /// it recorded back into this pass.
    ///
    /// Inside `nested`, [`columns`](Self::columns) shows only the nested
    /// records.
    pub fn isolate<R>(&mut self, nested: impl FnOnce(&mut InputTracker) -> R) -> R {
        let parent = mem::take(&mut self.records);
        let out = nested(self);
        let recorded = mem::replace(&mut self.records, parent);
        self.records.merge(recorded);
        out
    }

    #[must_use]
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.records.columns
    }

    #[must_use]
    pub fn constraint(&self, field: &str) -> Option<&Constraint> {
        self.records.constraints.get(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.columns.is_empty()
    }

    /// Finish the pass. Returns `Ok(None)` when nothing was recorded.
    ///
    /// Recorded columns are unique and every constraint belongs to a recorded
    /// column, so building the descriptor only fails if that bookkeeping is
    /// broken; the error is surfaced rather than read as an empty pass.
    pub fn snapshot(self) -> Result<Option<FormDescriptor>, DescriptorError> {
        let InputTracker {
            namespaces,
            records,
            csrf,
            form_version,
            ..
        } = self;
        if records.columns.is_empty() {
            tracing::debug!("render pass recorded no inputs; nothing to seal");
            return Ok(None);
        }

        let mut descriptor = FormDescriptor::new(records.columns, namespaces)?;
        for (column, constraint) in records.constraints {
            descriptor = descriptor.with_constraint(column, constraint)?;
        }
        if let Some(binding) = csrf {
            descriptor = descriptor.with_csrf(binding);
        }
        if let Some(version) = form_version {
            descriptor = descriptor.with_form_version(version);
        }
        Ok(Some(descriptor))
    }
}
