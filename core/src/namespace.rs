//! Locate a form's fields inside the submitted parameter tree.

use formseal_types::{FormSealError, ParamMap, ParamValue, SealErrorKind};

/// Walk `params` through `namespaces` in order.
///
/// Every level must exist and be a nested map; otherwise the whole
/// resolution fails with `missing_namespace` and no partial level is
/// returned. An empty namespace list resolves to `params` itself.
pub fn resolve<'a>(
    params: &'a ParamMap,
    namespaces: &[String],
) -> Result<&'a ParamMap, FormSealError> {
    namespaces.iter().try_fold(params, |level, key| {
        level
            .get(key)
            .and_then(ParamValue::as_map)
            .ok_or(FormSealError::new(SealErrorKind::MissingNamespace))
    })
}
