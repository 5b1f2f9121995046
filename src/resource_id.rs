//! Composite resource IDs.
//!
//! Most resources are addressed by `projectId#objectId`. Lineage attachments
//! join three comma-separated identity triples with `#`:
//! `srcId,srcType,srcPlatform#tgtId,tgtType,tgtPlatform#procId,procType,procPlatform`.

use std::fmt;

use crate::config::ids::{COMMA_SEPARATOR, FIELD_SEPARATOR};
use crate::error::ProviderError;

/// Join ID parts with `#`.
pub fn join(parts: &[&str]) -> String {
    parts.join(FIELD_SEPARATOR)
}

/// Split an ID into exactly `N` `#`-separated parts.
///
/// Any other part count is reported as `id is broken,<id>`.
pub fn split<const N: usize>(id: &str) -> Result<[&str; N], ProviderError> {
    let parts: Vec<&str> = id.split(FIELD_SEPARATOR).collect();
    <[&str; N]>::try_from(parts).map_err(|_| ProviderError::broken_id(id))
}

/// An `(id, type, platform)` identity used by lineage nodes and processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Unique id of the node or process.
    pub id: String,
    /// Resource or process type.
    pub kind: String,
    /// Owning platform, e.g. `WEDATA`.
    pub platform: String,
}

impl Identity {
    /// Build an identity from its three parts.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            platform: platform.into(),
        }
    }

    fn parse(part: &str) -> Option<Self> {
        let pieces: Vec<&str> = part.split(COMMA_SEPARATOR).collect();
        match pieces.as_slice() {
            [id, kind, platform] => Some(Self::new(*id, *kind, *platform)),
            _ => None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.id,
            self.kind,
            self.platform,
            sep = COMMA_SEPARATOR
        )
    }
}

/// ID of a lineage attachment: source, target and the linking process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageId {
    /// Upstream node.
    pub source: Identity,
    /// Downstream node.
    pub target: Identity,
    /// Process producing the target from the source.
    pub process: Identity,
}

impl LineageId {
    /// Parse a lineage attachment ID.
    pub fn parse(id: &str) -> Result<Self, ProviderError> {
        let [source, target, process] = split::<3>(id)?;
        let broken = |which: &str| ProviderError::BrokenId(format!("{} ID is broken,{}", which, id));

        Ok(Self {
            source: Identity::parse(source).ok_or_else(|| broken("source"))?,
            target: Identity::parse(target).ok_or_else(|| broken("target"))?,
            process: Identity::parse(process).ok_or_else(|| broken("process"))?,
        })
    }
}

impl fmt::Display for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.source,
            self.target,
            self.process,
            sep = FIELD_SEPARATOR
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_split() {
        let id = join(&["1460947878944567296", "wf-1"]);
        assert_eq!(id, "1460947878944567296#wf-1");

        let [project_id, workflow_id] = split::<2>(&id).unwrap();
        assert_eq!(project_id, "1460947878944567296");
        assert_eq!(workflow_id, "wf-1");
    }

    #[test]
    fn test_split_wrong_part_count() {
        let err = split::<2>("only-one").unwrap_err();
        assert_eq!(format!("{}", err), "id is broken,only-one");

        let err = split::<2>("a#b#c").unwrap_err();
        assert_eq!(format!("{}", err), "id is broken,a#b#c");
    }

    #[test]
    fn test_split_keeps_empty_parts() {
        let [a, b] = split::<2>("#b").unwrap();
        assert_eq!(a, "");
        assert_eq!(b, "b");
    }

    #[test]
    fn test_lineage_id_round_trip() {
        let id = LineageId {
            source: Identity::new("db.src", "TABLE", "WEDATA"),
            target: Identity::new("db.tgt", "TABLE", "WEDATA"),
            process: Identity::new("task-1", "SCHEDULE_TASK", "WEDATA"),
        };
        let text = id.to_string();
        assert_eq!(
            text,
            "db.src,TABLE,WEDATA#db.tgt,TABLE,WEDATA#task-1,SCHEDULE_TASK,WEDATA"
        );
        assert_eq!(LineageId::parse(&text).unwrap(), id);
    }

    #[test]
    fn test_lineage_id_errors() {
        let err = LineageId::parse("a,b,c#d,e,f").unwrap_err();
        assert_eq!(format!("{}", err), "id is broken,a,b,c#d,e,f");

        let err = LineageId::parse("a,b#d,e,f#g,h,i").unwrap_err();
        assert_eq!(format!("{}", err), "source ID is broken,a,b#d,e,f#g,h,i");

        let err = LineageId::parse("a,b,c#d,e,f,x#g,h,i").unwrap_err();
        assert_eq!(format!("{}", err), "target ID is broken,a,b,c#d,e,f,x#g,h,i");

        let err = LineageId::parse("a,b,c#d,e,f#g").unwrap_err();
        assert_eq!(format!("{}", err), "process ID is broken,a,b,c#d,e,f#g");
    }
}
