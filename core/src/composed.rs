//! Composed form behavior, memoized per base form type.
//!
//! A base form type (whatever the rendering layer uses to build markup)
//! declares the capability modules it supports. A [`FormKindCache`] adds its
//! own mixin capabilities (model-aware tracking, CSRF binding, versioning)
//! and builds one [`ComposedForm`] per base type the first time it is asked,
//! then hands out the same `Arc` to every later caller.
//!
//! Lookups take the read lock first. On a miss the write lock is taken and
//! the map is checked again before inserting, so two threads racing on the
//! same base type still produce exactly one composed form.

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use crate::tracker::{InputTracker, TrackerPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Record each rendered input.
    InputTracking,
    /// Keep per-field allowed-value constraints.
    AssociationConstraints,
    /// Bind the render-time CSRF token into the sealed payload.
    CsrfBinding,
    /// Carry a form version tag through the round trip.
    FormVersioning,
}

/// A base form-rendering type.
pub trait FormBase: 'static {
    const NAME: &'static str;

    fn capabilities() -> Vec<Capability> {
        vec![Capability::InputTracking]
    }
}

/// One base type composed with a fixed capability set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedForm {
    base: &'static str,
    capabilities: BTreeSet<Capability>,
}

impl ComposedForm {
    fn compose(base: &'static str, own: Vec<Capability>, mixins: &[Capability]) -> Self {
        let mut capabilities: BTreeSet<Capability> = own.into_iter().collect();
        capabilities.extend(mixins.iter().copied());
        Self { base, capabilities }
    }

    #[must_use]
    pub fn base_name(&self) -> &'static str {
        self.base
    }

    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Start a render pass whose tracker honors this form's capabilities.
    pub fn begin_pass<N>(&self, namespaces: N) -> InputTracker
    where
        N: IntoIterator,
        N::Item: Into<String>,
    {
        InputTracker::with_policy(namespaces, self.policy())
    }

    fn policy(&self) -> TrackerPolicy {
        TrackerPolicy {
            track_inputs: self.has(Capability::InputTracking),
            keep_constraints: self.has(Capability::AssociationConstraints),
            bind_csrf: self.has(Capability::CsrfBinding),
            keep_form_version: self.has(Capability::FormVersioning),
        }
    }
}

/// Concurrency-safe memoized factory of [`ComposedForm`]s.
#[derive(Debug)]
pub struct FormKindCache {
    mixins: Vec<Capability>,
    forms: RwLock<HashMap<TypeId, Arc<ComposedForm>>>,
}

impl FormKindCache {
    #[must_use]
    pub fn new(mixins: Vec<Capability>) -> Self {
        Self {
            mixins,
            forms: RwLock::new(HashMap::new()),
        }
    }

    /// Cache that mixes in every model-aware capability.
    #[must_use]
    pub fn model_aware() -> Self {
        Self::new(vec![
            Capability::InputTracking,
            Capability::AssociationConstraints,
            Capability::CsrfBinding,
            Capability::FormVersioning,
        ])
    }

    /// The composed form for base type `B`, built on first use.
    pub fn composed<B: FormBase>(&self) -> Arc<ComposedForm> {
        let key = TypeId::of::<B>();
        {
            let forms = self.forms.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = forms.get(&key) {
                return Arc::clone(found);
            }
        }

        let mut forms = self.forms.write().unwrap_or_else(PoisonError::into_inner);
        let composed = forms.entry(key).or_insert_with(|| {
            tracing::debug!(base = B::NAME, "composing form behavior");
            Arc::new(ComposedForm::compose(B::NAME, B::capabilities(), &self.mixins))
        });
        Arc::clone(composed)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.forms.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FormKindCache {
    fn default() -> Self {
        Self::model_aware()
    }
}
