use std::collections::HashSet;

use crate::analyzers::location::{LocationCache, ResolvedLocation};
use crate::core::{Error, Result};
use crate::semantic::model::{MemberKind, MethodKind, TypeCatalog, TypeInfo};

/// Decides whether a type is "plain data" (fields, accessors, and
/// constructors only, considering its full base chain) or "complex" (carries
/// behavior and is therefore a reportable coupling endpoint).
#[derive(Debug)]
pub struct PlainDataClassifier {
    allowed_method_kinds: HashSet<MethodKind>,
}

impl Default for PlainDataClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PlainDataClassifier {
    pub fn new() -> Self {
        let allowed_method_kinds = [
            MethodKind::Getter,
            MethodKind::Setter,
            MethodKind::Constructor,
        ]
        .into_iter()
        .collect();
        Self {
            allowed_method_kinds,
        }
    }

    /// True iff at least one member, own or inherited, is neither a field
    /// nor an allowed accessor/constructor method. A type with zero members
    /// is plain data.
    ///
    /// The base chain is walked up to the root sentinel (no base). A cycle in
    /// the chain is a per-type analysis error; the caller converts it into a
    /// diagnostic row rather than aborting the run.
    ///
    /// On classifying a type complex, its declaration segment and declaring
    /// project/file are recorded in the location cache (first write wins) so
    /// later dependency targets resolve without a second workspace pass.
    pub fn is_complex(
        &self,
        ty: &TypeInfo,
        catalog: &TypeCatalog,
        cache: &mut LocationCache,
    ) -> Result<bool> {
        let mut complex = false;
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = ty;

        loop {
            if !visited.insert(current.fully_qualified()) {
                return Err(Error::Analysis(format!(
                    "base type cycle involving '{}'",
                    current.fully_qualified()
                )));
            }
            if current.members.iter().any(|m| !self.is_allowed(&m.kind)) {
                complex = true;
            }
            match catalog.base_of(current) {
                Some(base) => current = base,
                None => break,
            }
        }

        if complex {
            cache.record(
                ty.decl_segment(),
                ResolvedLocation {
                    project: ty.project.clone(),
                    file: ty.file.clone(),
                },
            );
        }
        Ok(complex)
    }

    fn is_allowed(&self, kind: &MemberKind) -> bool {
        match kind {
            MemberKind::Field => true,
            MemberKind::Method(method_kind) => self.allowed_method_kinds.contains(method_kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SourceSegment;
    use crate::semantic::model::{Member, TypeKind};

    fn ty(name: &str, members: Vec<Member>, base: Option<&str>) -> TypeInfo {
        TypeInfo {
            namespace: "child_project".to_string(),
            name: name.to_string(),
            kind: TypeKind::Struct,
            members,
            base: base.map(str::to_string),
            project: "child_project".to_string(),
            file: "child_project/src/lib.rs".to_string(),
            decl: SourceSegment::new(1, 1, 1, 10, name, "child_project/src/lib.rs"),
        }
    }

    fn classify(catalog: &TypeCatalog, name: &str) -> Result<bool> {
        let classifier = PlainDataClassifier::new();
        let mut cache = LocationCache::new();
        classifier.is_complex(catalog.resolve(name).unwrap(), catalog, &mut cache)
    }

    #[test]
    fn fields_accessors_and_constructors_are_plain_data() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(ty(
            "SimpleChild",
            vec![
                Member::field("my_field"),
                Member::method("new", MethodKind::Constructor),
                Member::method("my_field", MethodKind::Getter),
                Member::method("set_my_field", MethodKind::Setter),
            ],
            None,
        ));
        assert!(!classify(&catalog, "SimpleChild").unwrap());
    }

    #[test]
    fn a_regular_method_makes_a_type_complex() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(ty(
            "ComplexChild",
            vec![Member::method("logic", MethodKind::Regular)],
            None,
        ));
        assert!(classify(&catalog, "ComplexChild").unwrap());
    }

    #[test]
    fn zero_members_is_plain_data() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(ty("Empty", vec![], None));
        assert!(!classify(&catalog, "Empty").unwrap());
    }

    #[test]
    fn behavior_is_inherited_through_the_base_chain() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(ty(
            "ComplexChild",
            vec![Member::method("logic", MethodKind::Regular)],
            None,
        ));
        catalog.insert(ty("VeryComplexChild", vec![], Some("ComplexChild")));
        assert!(classify(&catalog, "VeryComplexChild").unwrap());
    }

    #[test]
    fn plain_base_keeps_a_plain_type_plain() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(ty("SimpleBase", vec![Member::field("x")], None));
        catalog.insert(ty("StillSimple", vec![Member::field("y")], Some("SimpleBase")));
        assert!(!classify(&catalog, "StillSimple").unwrap());
    }

    #[test]
    fn base_cycle_is_an_error_not_a_hang() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(ty("A", vec![], Some("B")));
        catalog.insert(ty("B", vec![], Some("A")));
        assert!(classify(&catalog, "A").is_err());
    }

    #[test]
    fn classification_is_deterministic() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(ty(
            "ComplexChild",
            vec![
                Member::field("data"),
                Member::method("logic", MethodKind::Regular),
            ],
            None,
        ));
        let first = classify(&catalog, "ComplexChild").unwrap();
        let second = classify(&catalog, "ComplexChild").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn complex_classification_records_the_declaration_location() {
        let mut catalog = TypeCatalog::new();
        catalog.insert(ty(
            "ComplexChild",
            vec![Member::method("logic", MethodKind::Regular)],
            None,
        ));
        let classifier = PlainDataClassifier::new();
        let mut cache = LocationCache::new();
        let info = catalog.resolve("ComplexChild").unwrap();
        classifier.is_complex(info, &catalog, &mut cache).unwrap();

        let resolved = cache.resolve_or_unknown(&info.decl_segment());
        assert_eq!(resolved.project, "child_project");
        assert_eq!(resolved.file, "child_project/src/lib.rs");
    }
}
