//! Partial-update merge with a compile-time field registry.
//!
//! A patch names only the fields to change. The whole mapping is first
//! decoded into a candidate `Character` with the same serde rules as a
//! create payload, then only the named fields are copied from the candidate
//! onto the loaded record. Copying from the candidate rather than assigning
//! the decoded struct wholesale keeps decoder defaults from clobbering
//! fields the caller never mentioned.

use serde_json::Value;

use archref_domain::Character;

use super::CharacterError;

/// Untyped patch payload: field name to new value.
pub type PatchRequest = serde_json::Map<String, Value>;

type FieldCopier = fn(&mut Character, &Character);

/// Recognized patchable fields, by wire (camelCase) name. The identity
/// field is deliberately absent; it is rejected before lookup.
const PATCHABLE_FIELDS: &[(&str, FieldCopier)] = &[
    ("name", |current, candidate| {
        current.name = candidate.name.clone()
    }),
    ("description", |current, candidate| {
        current.description = candidate.description.clone()
    }),
    ("attackPoint", |current, candidate| {
        current.attack_point = candidate.attack_point
    }),
    ("address", |current, candidate| {
        current.address = candidate.address.clone()
    }),
    ("priority", |current, candidate| {
        current.priority = candidate.priority
    }),
    ("createdAt", |current, candidate| {
        current.created_at = candidate.created_at
    }),
    ("updatedAt", |current, candidate| {
        current.updated_at = candidate.updated_at
    }),
];

/// Apply a patch mapping onto a loaded character, field by field.
///
/// Field names are screened before anything is decoded, so a mapping that
/// names the identity field always fails `ForbiddenField` no matter what
/// else it contains.
///
/// # Errors
///
/// - `ForbiddenField` when the mapping names the identity field
/// - `InvalidField` when the mapping names an unknown field
/// - `Validation` when the mapping does not decode as a character payload
///   (wrong types, out-of-range attack point)
pub fn apply_patch(patch: &PatchRequest, current: &mut Character) -> Result<(), CharacterError> {
    if let Some(name) = patch.keys().find(|name| name.eq_ignore_ascii_case("id")) {
        return Err(CharacterError::ForbiddenField(name.clone()));
    }

    let copiers = patch
        .keys()
        .map(|name| {
            PATCHABLE_FIELDS
                .iter()
                .find(|(field, _)| *field == name)
                .map(|(_, copier)| copier)
                .ok_or_else(|| CharacterError::InvalidField(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let candidate: Character = serde_json::from_value(Value::Object(patch.clone()))
        .map_err(|e| CharacterError::Validation(e.to_string()))?;

    for copier in copiers {
        copier(current, &candidate);
    }

    Ok(())
}
