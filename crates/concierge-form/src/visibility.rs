use std::collections::BTreeMap;

use crate::spec::form::StepSpec;
use crate::value::Fields;

pub type VisibilityMap = BTreeMap<String, bool>;

/// Resolves which fields of a step are currently shown. Fields without a
/// condition are always visible.
pub fn resolve_visibility(step: &StepSpec, fields: &Fields) -> VisibilityMap {
    step.fields
        .iter()
        .map(|field| {
            let visible = field
                .visible_if
                .as_ref()
                .is_none_or(|condition| condition.evaluate(fields));
            (field.id.clone(), visible)
        })
        .collect()
}
