use proc_macro2::Span;
use quote::ToTokens;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};

use crate::core::SourceSegment;

/// One harvested syntax occurrence: its span and source text, the raw type
/// paths it references, and the fully-qualified name of the enclosing
/// declared type. This flat record is the node surface the extraction core
/// consumes; nothing downstream touches `syn` directly.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    /// Span + source text; `path` is the repo-relative file being walked.
    pub segment: SourceSegment,
    /// Raw type paths referenced by the node, generic arguments flattened in.
    pub type_refs: Vec<String>,
    /// Fully-qualified name of the enclosing declared type.
    pub enclosing: String,
}

/// Harvest the type-referencing nodes of one parsed document.
///
/// Nodes outside any type declaration (free functions, module items) are not
/// harvested: a dependency always originates from an enclosing type.
pub fn harvest(ast: &syn::File, base_namespace: &str, file: &str) -> Vec<SyntaxNode> {
    let mut harvester = NodeHarvester {
        base_namespace: base_namespace.to_string(),
        module_stack: Vec::new(),
        enclosing: None,
        file: file.to_string(),
        nodes: Vec::new(),
    };
    harvester.visit_file(ast);
    harvester.nodes
}

/// Derive the namespace of a document: crate name plus the module path
/// implied by its location under `src/`.
pub fn module_namespace(crate_name: &str, project_root: &std::path::Path, file: &std::path::Path) -> String {
    let rel = file.strip_prefix(project_root).unwrap_or(file);
    let mut segments: Vec<String> = Vec::new();
    let components: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    for (i, component) in components.iter().enumerate() {
        if i == 0 && component == "src" {
            continue;
        }
        let is_last = i + 1 == components.len();
        let name = if is_last {
            let stem = component.trim_end_matches(".rs");
            if matches!(stem, "lib" | "main" | "mod") {
                continue;
            }
            stem.to_string()
        } else {
            component.clone()
        };
        segments.push(name);
    }

    let mut namespace = crate_name.replace('-', "_");
    for segment in segments {
        namespace.push_str("::");
        namespace.push_str(&segment);
    }
    namespace
}

/// Build a `SourceSegment` from a proc-macro2 span (1-based lines; columns
/// converted from proc-macro2's 0-based convention).
pub fn span_segment(span: Span, text: impl Into<String>, path: impl Into<String>) -> SourceSegment {
    let start = span.start();
    let end = span.end();
    SourceSegment::new(
        start.line,
        start.column + 1,
        end.line,
        end.column + 1,
        text,
        path,
    )
}

/// Join a path's segment identifiers (`a::b::C`), ignoring generic arguments.
pub fn path_to_string(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

/// Collect the raw type paths a type expression references, recursing through
/// references, containers, tuples, and generic arguments.
fn collect_type_paths(ty: &syn::Type, out: &mut Vec<String>) {
    match ty {
        syn::Type::Path(type_path) => {
            out.push(path_to_string(&type_path.path));
            for segment in &type_path.path.segments {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let syn::GenericArgument::Type(inner) = arg {
                            collect_type_paths(inner, out);
                        }
                    }
                }
            }
        }
        syn::Type::Reference(reference) => collect_type_paths(&reference.elem, out),
        syn::Type::Paren(paren) => collect_type_paths(&paren.elem, out),
        syn::Type::Group(group) => collect_type_paths(&group.elem, out),
        syn::Type::Slice(slice) => collect_type_paths(&slice.elem, out),
        syn::Type::Array(array) => collect_type_paths(&array.elem, out),
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_type_paths(elem, out);
            }
        }
        _ => {}
    }
}

struct NodeHarvester {
    base_namespace: String,
    module_stack: Vec<String>,
    enclosing: Option<String>,
    file: String,
    nodes: Vec<SyntaxNode>,
}

impl NodeHarvester {
    fn current_namespace(&self) -> String {
        let mut namespace = self.base_namespace.clone();
        for module in &self.module_stack {
            namespace.push_str("::");
            namespace.push_str(module);
        }
        namespace
    }

    fn qualified(&self, name: &str) -> String {
        let namespace = self.current_namespace();
        if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}::{name}")
        }
    }

    fn push_node(&mut self, span: Span, text: String, type_refs: Vec<String>) {
        let Some(enclosing) = self.enclosing.clone() else {
            return;
        };
        if type_refs.is_empty() {
            return;
        }
        self.nodes.push(SyntaxNode {
            segment: span_segment(span, text, self.file.clone()),
            type_refs,
            enclosing,
        });
    }

    fn push_type_node(&mut self, ty: &syn::Type) {
        let mut refs = Vec::new();
        collect_type_paths(ty, &mut refs);
        self.push_node(ty.span(), ty.to_token_stream().to_string(), refs);
    }

    fn harvest_fields(&mut self, fields: &syn::Fields) {
        for field in fields {
            self.push_type_node(&field.ty);
        }
    }

    fn harvest_signature(&mut self, sig: &syn::Signature) {
        for input in &sig.inputs {
            if let syn::FnArg::Typed(pat_type) = input {
                self.push_type_node(&pat_type.ty);
            }
        }
        if let syn::ReturnType::Type(_, ty) = &sig.output {
            self.push_type_node(ty);
        }
    }
}

impl<'ast> Visit<'ast> for NodeHarvester {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.module_stack.push(node.ident.to_string());
        visit::visit_item_mod(self, node);
        self.module_stack.pop();
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        let previous = self.enclosing.replace(self.qualified(&node.ident.to_string()));
        self.harvest_fields(&node.fields);
        self.enclosing = previous;
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        let previous = self.enclosing.replace(self.qualified(&node.ident.to_string()));
        for variant in &node.variants {
            self.harvest_fields(&variant.fields);
        }
        self.enclosing = previous;
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let self_type = match node.self_ty.as_ref() {
            syn::Type::Path(type_path) => type_path
                .path
                .segments
                .last()
                .map(|segment| segment.ident.to_string()),
            _ => None,
        };
        let Some(self_type) = self_type else {
            return;
        };
        let previous = self.enclosing.replace(self.qualified(&self_type));
        visit::visit_item_impl(self, node);
        self.enclosing = previous;
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.harvest_signature(&node.sig);
        visit::visit_impl_item_fn(self, node);
    }

    fn visit_impl_item_type(&mut self, node: &'ast syn::ImplItemType) {
        // Associated type bindings; this is where a `Deref` target surfaces
        // as a reference from the derived type to its base.
        self.push_type_node(&node.ty);
    }

    fn visit_local(&mut self, node: &'ast syn::Local) {
        if let syn::Pat::Type(pat_type) = &node.pat {
            self.push_type_node(&pat_type.ty);
        }
        visit::visit_local(self, node);
    }

    fn visit_expr_struct(&mut self, node: &'ast syn::ExprStruct) {
        let text = node.path.to_token_stream().to_string();
        let refs = vec![path_to_string(&node.path)];
        self.push_node(node.path.span(), text, refs);
        visit::visit_expr_struct(self, node);
    }

    fn visit_expr_path(&mut self, node: &'ast syn::ExprPath) {
        // `Foo::new`, `a::b::Type::CONST`: the segments before the final one
        // name the candidate type. Turbofish generic arguments come along as
        // additional references.
        if node.path.segments.len() >= 2 {
            let type_path: Vec<String> = node
                .path
                .segments
                .iter()
                .take(node.path.segments.len() - 1)
                .map(|segment| segment.ident.to_string())
                .collect();
            let mut refs = vec![type_path.join("::")];
            for segment in &node.path.segments {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let syn::GenericArgument::Type(inner) = arg {
                            collect_type_paths(inner, &mut refs);
                        }
                    }
                }
            }
            let text = node.path.to_token_stream().to_string();
            self.push_node(node.path.span(), text, refs);
        }
        visit::visit_expr_path(self, node);
    }
}
