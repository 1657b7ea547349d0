//! Structural scope extraction for Rust sources.
//!
//! The matching engine only needs flat line ranges; this module produces
//! them by parsing a file with `syn` and walking its items in pre-order.
//! Pre-order matters: a nested scope always appears after its parent in
//! the emitted list, which is the tie-break order the engine documents.

use std::path::{Path, PathBuf};

use syn::spanned::Spanned;

use crate::error::Result;
use crate::model::{Scope, ScopeKind};

/// Supplies the structural scopes of a source file.
///
/// `handles` is the eligibility predicate: files it rejects are excluded
/// from analysis entirely. `scopes` may return an empty list for files
/// that exist but cannot be parsed; that is a skip, not an error.
pub trait StructureProvider {
    fn handles(&self, path: &Path) -> bool;
    fn scopes(&self, path: &Path) -> Result<Vec<Scope>>;
}

/// Scope provider for `.rs` files, backed by `syn`.
pub struct RustStructure;

impl StructureProvider for RustStructure {
    fn handles(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("rs")
    }

    fn scopes(&self, path: &Path) -> Result<Vec<Scope>> {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            // A path in the diff that no longer exists (e.g. renamed away)
            // simply has no structure.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        // Unparsable source yields no scopes; the engine skips such files.
        let Ok(ast) = syn::parse_file(&source) else {
            return Ok(Vec::new());
        };

        let mut scopes = Vec::new();
        collect_items(&ast.items, path, &mut scopes);
        Ok(scopes)
    }
}

fn collect_items(items: &[syn::Item], path: &Path, out: &mut Vec<Scope>) {
    for item in items {
        match item {
            syn::Item::Fn(f) => {
                push_scope(out, path, item.span(), ScopeKind::Function, f.sig.ident.to_string());
                // Nested fns inside a body are rare enough to ignore;
                // their lines still match the enclosing fn's range.
            }
            syn::Item::Impl(i) => {
                push_scope(out, path, item.span(), ScopeKind::Impl, impl_name(i));
                for impl_item in &i.items {
                    if let syn::ImplItem::Fn(m) = impl_item {
                        push_scope(
                            out,
                            path,
                            m.span(),
                            ScopeKind::Method,
                            m.sig.ident.to_string(),
                        );
                    }
                }
            }
            syn::Item::Trait(t) => {
                push_scope(out, path, item.span(), ScopeKind::Trait, t.ident.to_string());
                for trait_item in &t.items {
                    if let syn::TraitItem::Fn(m) = trait_item {
                        if m.default.is_some() {
                            push_scope(
                                out,
                                path,
                                m.span(),
                                ScopeKind::Method,
                                m.sig.ident.to_string(),
                            );
                        }
                    }
                }
            }
            syn::Item::Mod(m) => {
                if let Some((_, nested)) = &m.content {
                    push_scope(out, path, item.span(), ScopeKind::Module, m.ident.to_string());
                    collect_items(nested, path, out);
                }
                // `mod foo;` declarations span one line and contain no code.
            }
            _ => {}
        }
    }
}

fn push_scope(
    out: &mut Vec<Scope>,
    path: &Path,
    span: proc_macro2::Span,
    kind: ScopeKind,
    name: String,
) {
    out.push(Scope {
        path: PathBuf::from(path),
        first_line: span.start().line as u32,
        last_line: span.end().line as u32,
        kind,
        name,
    });
}

/// Display name for an impl block: `Type` or `Trait for Type`.
fn impl_name(item: &syn::ItemImpl) -> String {
    let self_ty = type_name(&item.self_ty);
    match &item.trait_ {
        Some((_, trait_path, _)) => match trait_path.segments.last() {
            Some(seg) => format!("{} for {}", seg.ident, self_ty),
            None => self_ty,
        },
        None => self_ty,
    }
}

fn type_name(ty: &syn::Type) -> String {
    if let syn::Type::Path(p) = ty {
        if let Some(seg) = p.path.segments.last() {
            return seg.ident.to_string();
        }
    }
    "_".to_string()
}
