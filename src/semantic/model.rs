use std::collections::{BTreeMap, HashMap};

use crate::core::SourceSegment;
use crate::io::paths::RepoRoot;
use crate::semantic::nodes::{module_namespace, path_to_string, span_segment};
use crate::semantic::workspace::Workspace;

/// Kind of a declared type. Only `Struct` ever qualifies as a coupling
/// endpoint; traits and enums are carried for completeness of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Struct,
    Enum,
    Trait,
}

/// Detected kind of a method member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Associated fn with no receiver returning `Self`.
    Constructor,
    /// `&self`, no arguments, named after a field or `get_`-prefixed.
    Getter,
    /// `set_`-prefixed with a single argument.
    Setter,
    Regular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method(MethodKind),
}

#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
}

impl Member {
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Field,
        }
    }

    pub fn method(name: impl Into<String>, kind: MethodKind) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method(kind),
        }
    }
}

/// A declared type: its namespace, members, optional base type (the `Deref`
/// target), and the project/file/span where it was declared.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub namespace: String,
    pub name: String,
    pub kind: TypeKind,
    pub members: Vec<Member>,
    /// Raw path of the `Deref` target, if any. Resolved through the catalog
    /// when the base chain is walked.
    pub base: Option<String>,
    pub project: String,
    /// Repo-relative declaring file.
    pub file: String,
    /// Span of the declaring identifier.
    pub decl: SourceSegment,
}

impl TypeInfo {
    pub fn fully_qualified(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }

    /// The declaration segment used as the location-cache key: the exact
    /// declaring span plus the literal declared name and file.
    pub fn decl_segment(&self) -> SourceSegment {
        self.decl.clone()
    }
}

/// Catalog of every type declared in the workspace, keyed by fully-qualified
/// name, with a simple-name index for resolving unqualified references.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: HashMap<String, TypeInfo>,
    by_name: BTreeMap<String, Vec<String>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: TypeInfo) {
        let fqn = info.fully_qualified();
        let index = self.by_name.entry(info.name.clone()).or_default();
        if !index.contains(&fqn) {
            index.push(fqn.clone());
            index.sort();
        }
        self.types.insert(fqn, info);
    }

    pub fn get(&self, fqn: &str) -> Option<&TypeInfo> {
        self.types.get(fqn)
    }

    pub fn get_mut(&mut self, fqn: &str) -> Option<&mut TypeInfo> {
        self.types.get_mut(fqn)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.values()
    }

    /// Resolve a raw type path against the catalog.
    ///
    /// Tries, in order: exact fully-qualified match, suffix match on the full
    /// path, then the simple-name index on the final segment. The last step
    /// covers impl blocks that qualify their self type with the module the
    /// impl appears in, which need not be the declaring module. An ambiguous
    /// name resolves to the first candidate in sorted order, which keeps
    /// resolution deterministic across runs.
    pub fn resolve(&self, raw: &str) -> Option<&TypeInfo> {
        let path = raw
            .trim_start_matches("crate::")
            .trim_start_matches("self::");

        if let Some(info) = self.types.get(path) {
            return Some(info);
        }

        if path.contains("::") {
            let suffix = format!("::{path}");
            let mut candidates: Vec<&String> = self
                .types
                .keys()
                .filter(|fqn| fqn.ends_with(&suffix))
                .collect();
            candidates.sort();
            if let Some(fqn) = candidates.first() {
                return self.types.get(*fqn);
            }
        }

        let name = path.rsplit("::").next().unwrap_or(path);
        self.by_name
            .get(name)
            .and_then(|fqns| fqns.first())
            .and_then(|fqn| self.types.get(fqn))
    }

    /// Resolve a type's base (its `Deref` target), if it names a cataloged type.
    pub fn base_of(&self, info: &TypeInfo) -> Option<&TypeInfo> {
        info.base.as_deref().and_then(|raw| self.resolve(raw))
    }
}

/// Build the catalog from every document of every project, in two passes:
/// declarations first, then impls, so a method or `Deref` base can attach to
/// a type declared in any other document.
pub fn build_catalog(workspace: &Workspace, root: &RepoRoot) -> TypeCatalog {
    let mut catalog = TypeCatalog::new();
    for project in &workspace.projects {
        for doc in &project.documents {
            let namespace = module_namespace(&project.name, &project.root, &doc.path);
            let file = root.normalize(&doc.path);
            register_declarations(&doc.ast.items, &namespace, &project.name, &file, &mut catalog);
        }
    }
    for project in &workspace.projects {
        for doc in &project.documents {
            let namespace = module_namespace(&project.name, &project.root, &doc.path);
            apply_impls(&doc.ast.items, &namespace, &mut catalog);
        }
    }
    catalog
}

fn register_declarations(
    items: &[syn::Item],
    namespace: &str,
    project: &str,
    file: &str,
    catalog: &mut TypeCatalog,
) {
    for item in items {
        match item {
            syn::Item::Struct(item_struct) => {
                let members = struct_members(&item_struct.fields);
                catalog.insert(declared(
                    namespace,
                    &item_struct.ident,
                    TypeKind::Struct,
                    members,
                    project,
                    file,
                ));
            }
            syn::Item::Enum(item_enum) => {
                catalog.insert(declared(
                    namespace,
                    &item_enum.ident,
                    TypeKind::Enum,
                    Vec::new(),
                    project,
                    file,
                ));
            }
            syn::Item::Trait(item_trait) => {
                catalog.insert(declared(
                    namespace,
                    &item_trait.ident,
                    TypeKind::Trait,
                    Vec::new(),
                    project,
                    file,
                ));
            }
            syn::Item::Mod(item_mod) => {
                if let Some((_, items)) = &item_mod.content {
                    let nested = format!("{namespace}::{}", item_mod.ident);
                    register_declarations(items, &nested, project, file, catalog);
                }
            }
            _ => {}
        }
    }
}

fn declared(
    namespace: &str,
    ident: &syn::Ident,
    kind: TypeKind,
    members: Vec<Member>,
    project: &str,
    file: &str,
) -> TypeInfo {
    TypeInfo {
        namespace: namespace.to_string(),
        name: ident.to_string(),
        kind,
        members,
        base: None,
        project: project.to_string(),
        file: file.to_string(),
        decl: span_segment(ident.span(), ident.to_string(), file),
    }
}

fn struct_members(fields: &syn::Fields) -> Vec<Member> {
    match fields {
        syn::Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| f.ident.as_ref())
            .map(|ident| Member::field(ident.to_string()))
            .collect(),
        syn::Fields::Unnamed(unnamed) => (0..unnamed.unnamed.len())
            .map(|i| Member::field(i.to_string()))
            .collect(),
        syn::Fields::Unit => Vec::new(),
    }
}

fn apply_impls(items: &[syn::Item], namespace: &str, catalog: &mut TypeCatalog) {
    for item in items {
        match item {
            syn::Item::Impl(item_impl) => apply_impl(item_impl, namespace, catalog),
            syn::Item::Mod(item_mod) => {
                if let Some((_, items)) = &item_mod.content {
                    let nested = format!("{namespace}::{}", item_mod.ident);
                    apply_impls(items, &nested, catalog);
                }
            }
            _ => {}
        }
    }
}

fn apply_impl(item_impl: &syn::ItemImpl, namespace: &str, catalog: &mut TypeCatalog) {
    let self_name = match item_impl.self_ty.as_ref() {
        syn::Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => segment.ident.to_string(),
            None => return,
        },
        _ => return,
    };
    let Some(fqn) = local_fqn(catalog, namespace, &self_name) else {
        return;
    };

    let is_deref_impl = item_impl
        .trait_
        .as_ref()
        .and_then(|(_, path, _)| path.segments.last())
        .is_some_and(|segment| segment.ident == "Deref");

    if is_deref_impl {
        // The `Deref` target is the type's base; the `deref` method itself
        // is the inheritance marker, not a behavior member.
        let target = item_impl.items.iter().find_map(|item| match item {
            syn::ImplItem::Type(assoc) if assoc.ident == "Target" => match &assoc.ty {
                syn::Type::Path(type_path) => Some(path_to_string(&type_path.path)),
                _ => None,
            },
            _ => None,
        });
        if let Some(info) = catalog.get_mut(&fqn) {
            if info.base.is_none() {
                info.base = target;
            }
        }
        return;
    }

    let fields: Vec<String> = catalog
        .get(&fqn)
        .map(|info| {
            info.members
                .iter()
                .filter(|m| m.kind == MemberKind::Field)
                .map(|m| m.name.clone())
                .collect()
        })
        .unwrap_or_default();
    let is_trait_impl = item_impl.trait_.is_some();

    let mut methods = Vec::new();
    for item in &item_impl.items {
        if let syn::ImplItem::Fn(method) = item {
            let kind = if is_trait_impl {
                // Manual trait impls (Display, custom traits) are behavior.
                MethodKind::Regular
            } else {
                classify_method(&method.sig, &fields, &self_name)
            };
            methods.push(Member::method(method.sig.ident.to_string(), kind));
        }
    }
    if let Some(info) = catalog.get_mut(&fqn) {
        info.members.extend(methods);
    }
}

fn local_fqn(catalog: &TypeCatalog, namespace: &str, name: &str) -> Option<String> {
    let local = if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}::{name}")
    };
    if catalog.get(&local).is_some() {
        return Some(local);
    }
    catalog.resolve(name).map(|info| info.fully_qualified())
}

fn classify_method(sig: &syn::Signature, fields: &[String], type_name: &str) -> MethodKind {
    let name = sig.ident.to_string();
    match sig.receiver() {
        None => {
            if returns_self(sig, type_name) {
                MethodKind::Constructor
            } else {
                MethodKind::Regular
            }
        }
        Some(receiver) => {
            let extra_args = sig.inputs.len() - 1;
            if name.starts_with("set_") && extra_args == 1 {
                MethodKind::Setter
            } else if extra_args == 0
                && receiver.reference.is_some()
                && receiver.mutability.is_none()
                && (fields.iter().any(|f| f == &name) || name.starts_with("get_"))
            {
                MethodKind::Getter
            } else {
                MethodKind::Regular
            }
        }
    }
}

fn returns_self(sig: &syn::Signature, type_name: &str) -> bool {
    match &sig.output {
        syn::ReturnType::Type(_, ty) => type_is_self(ty, type_name),
        syn::ReturnType::Default => false,
    }
}

/// True iff the type is exactly `Self`/the constructed type, directly or as
/// the first generic argument of `Option`/`Result`. Matching is structural:
/// a factory returning `AccountSummary` from `Account` is not a constructor.
fn type_is_self(ty: &syn::Type, type_name: &str) -> bool {
    let syn::Type::Path(type_path) = ty else {
        return false;
    };
    let Some(last) = type_path.path.segments.last() else {
        return false;
    };
    if last.ident == "Self" || last.ident == type_name {
        return true;
    }
    if last.ident == "Option" || last.ident == "Result" {
        if let syn::PathArguments::AngleBracketed(args) = &last.arguments {
            if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                return type_is_self(inner, type_name);
            }
        }
    }
    false
}
