//! Object references and their translation into query parameters.
//!
//! Most endpoints accept either a list of ids or a list of names for the same
//! target, never both. Callers can instead hand over references (or model
//! objects they already fetched) and let [`process_references`] pick the
//! parameter.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::params::Params;

/// Something that identifies a resource by id, name, or both.
pub trait Reference {
    /// The resource id, if known.
    fn id(&self) -> Option<&str>;

    /// The resource name, if known.
    fn name(&self) -> Option<&str>;
}

impl<R: Reference + ?Sized> Reference for &R {
    fn id(&self) -> Option<&str> {
        (**self).id()
    }

    fn name(&self) -> Option<&str> {
        (**self).name()
    }
}

/// A plain id/name handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Resource id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Resource name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ResourceRef {
    /// References a resource by id.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }

    /// References a resource by name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Copies the id and name of any reference.
    pub fn of(reference: &impl Reference) -> Self {
        Self {
            id: reference.id().map(String::from),
            name: reference.name().map(String::from),
        }
    }
}

impl Reference for ResourceRef {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Resolves `references` into exactly one of the parameters in `params`.
///
/// Parameters ending in `ids` take reference ids, those ending in `names` take
/// reference names. Any value already present for a parameter in `params` is
/// dropped first, so references win over explicit id/name lists. Ids are used
/// when every reference has one; otherwise names, when every reference has
/// one. An empty slice leaves `query` untouched.
///
/// # Errors
///
/// Returns [`Error::Configuration`] when the batch is neither uniformly
/// id-bearing nor uniformly name-bearing (or `params` has no matching slot).
///
/// # Example
///
/// ```
/// use flashblade_sdk::{process_references, Params, ResourceRef};
///
/// let mut query = Params::new();
/// query.insert_list("names", ["stale"]);
///
/// let refs = [ResourceRef::by_id("10314f42")];
/// process_references(&refs, &["ids", "names"], &mut query)?;
///
/// assert!(!query.contains("names"));
/// assert_eq!(query.get("ids").unwrap().values(), ["10314f42".to_string()]);
/// # Ok::<(), flashblade_sdk::Error>(())
/// ```
pub fn process_references<R: Reference>(
    references: &[R],
    params: &[&str],
    query: &mut Params,
) -> Result<()> {
    if references.is_empty() {
        return Ok(());
    }

    for param in params {
        query.remove(param);
    }

    let id_param = params.iter().find(|p| p.ends_with("ids"));
    let name_param = params.iter().find(|p| p.ends_with("names"));

    let ids: Option<Vec<&str>> = references.iter().map(|r| r.id()).collect();
    let names: Option<Vec<&str>> = references.iter().map(|r| r.name()).collect();

    match (ids, id_param, names, name_param) {
        (Some(ids), Some(param), _, _) => query.insert_list(*param, ids),
        (_, _, Some(names), Some(param)) => query.insert_list(*param, names),
        _ => {
            return Err(Error::config(format!(
                "Invalid reference for {}",
                params.join(", ")
            )))
        }
    }

    Ok(())
}
