//! Method-set resolution: value/pointer method sets, embedding promotion,
//! and depth-based shadowing, for one implementation package plus every
//! cross-package type reached through an embedded field (spec §4.3's
//! "E(T)" computation, spec §4.2's importer hook).
//!
//! An embedded field whose type is declared in another package is
//! resolved through an [`Importer`], which parses and catalogs that
//! package once per run and caches the result; without an importer (most
//! unit tests here don't need one), such a field contributes nothing to
//! promotion, same as if the package simply weren't found. Interface
//! satisfaction is name-only — a method is present in a set if the name
//! matches, signatures are never compared — which is both simpler and a
//! literal reading of spec §4.3 step 2a ("T has exported method named m").

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;
use crate::importer::Importer;
use crate::parser::{ParsedPackage, TopDecl, TypeKind};
use crate::types::Pos;

/// Where an embedded field's promoted methods come from.
enum EmbedSource {
    /// Declared in this same package; look it up in `self.types`.
    Local,
    /// Declared in another package, already resolved and cataloged.
    Foreign(Rc<TypeCatalog>),
    /// Qualified (`pkg.Type`) but no [`Importer`] was given to resolve it,
    /// or the alias didn't match a known import — contributes nothing.
    Unresolved,
}

/// One field of a struct type, reduced to what promotion needs.
struct EmbeddedField {
    /// Bare type name (package qualifier stripped once `source` is known).
    type_name: String,
    is_ptr: bool,
    source: EmbedSource,
}

/// Everything the checker needs about one concrete type: its own
/// directly-declared methods (receiver kind + the identifier's position,
/// since that position is what a [`crate::types::MethodObligation`]
/// keys on) and its embedded fields.
struct TypeEntry {
    name_pos: Pos,
    /// method name -> (declared with pointer receiver, name token position)
    own_methods: HashMap<String, (bool, Pos)>,
    embeds: Vec<EmbeddedField>,
    /// true only for types actually declared `struct { ... }` in this
    /// package; a bare `func (r T) M()` with no matching `type T struct`
    /// still gets an entry (so its methods are visible) but can't embed
    /// anything.
    is_struct: bool,
}

impl Default for TypeEntry {
    fn default() -> Self {
        TypeEntry {
            name_pos: 0,
            own_methods: HashMap::new(),
            embeds: Vec::new(),
            is_struct: false,
        }
    }
}

/// Method-set catalog for every type declared or given a method in one
/// implementation package.
pub struct TypeCatalog {
    types: HashMap<String, TypeEntry>,
}

impl TypeCatalog {
    /// Walk every file's declarations once, recording struct shapes and
    /// method receivers. Declaration order within or across files doesn't
    /// matter: a method can be seen before its type's `struct` decl.
    /// `importer` resolves any embedded field whose type is qualified with
    /// another package's alias; pass `None` to leave such fields
    /// unresolved (fine for single-package scenarios and most tests).
    pub fn build(parsed: &ParsedPackage, importer: Option<&Importer>) -> Result<TypeCatalog> {
        let mut types: HashMap<String, TypeEntry> = HashMap::new();

        for file in &parsed.files {
            let aliases = import_aliases(file);

            for decl in &file.ast.decls {
                match decl {
                    TopDecl::Type(type_decl) => {
                        let entry = types.entry(type_decl.name.clone()).or_default();
                        entry.name_pos = type_decl.name_pos;
                        if let TypeKind::Struct { fields } = &type_decl.kind {
                            entry.is_struct = true;
                            let mut embeds = Vec::with_capacity(fields.len());
                            for f in fields.iter().filter(|f| f.is_embedded()) {
                                embeds.push(resolve_embed(f, &aliases, importer)?);
                            }
                            entry.embeds = embeds;
                        }
                    }
                    TopDecl::Func(func_decl) => {
                        let Some(receiver) = &func_decl.receiver else {
                            continue;
                        };
                        let entry = types.entry(receiver.type_name.clone()).or_default();
                        entry
                            .own_methods
                            .insert(func_decl.name.clone(), (receiver.is_ptr, func_decl.name_pos));
                    }
                }
            }
        }

        Ok(TypeCatalog { types })
    }

    /// Every type name the catalog has an entry for.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Methods declared directly on `type_name` in this package (not
    /// promoted), with the position of each method-name token.
    pub fn own_methods(&self, type_name: &str) -> Vec<(&str, Pos)> {
        match self.types.get(type_name) {
            Some(entry) => entry
                .own_methods
                .iter()
                .map(|(name, (_, pos))| (name.as_str(), *pos))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The method set of `*T`: every method reachable from `T` including
    /// pointer-receiver methods, with promotion through both value and
    /// pointer embedded fields (spec §4.3, real-language promotion
    /// rules) — this is the "intuitive method set" the glossary and
    /// spec §4.3 step 2c describe, and the superset used for interface
    /// satisfaction. Each entry also carries the name of the type that
    /// actually declares the method, which may differ from `type_name`
    /// when the method was promoted (possibly from another package).
    pub fn pointer_method_set(&self, type_name: &str) -> HashMap<String, (String, Pos)> {
        let mut visited = std::collections::HashSet::new();
        self.collect(type_name, 0, true, &mut visited)
    }

    /// The method set of `T` itself (value method set): only
    /// value-receiver own methods, plus promotion through embedded
    /// fields using the same value-vs-pointer embedding rule a value
    /// receiver is subject to.
    pub fn value_method_set(&self, type_name: &str) -> HashMap<String, (String, Pos)> {
        let mut visited = std::collections::HashSet::new();
        self.collect(type_name, 0, false, &mut visited)
    }

    /// Entry point for a *foreign* catalog being consulted from another
    /// package's promotion walk: same recursive collection, but starting
    /// its own `visited` set, since type names in different packages
    /// don't share a namespace (package-level import cycles are instead
    /// caught by [`Importer::catalog_for`] before a foreign catalog like
    /// this one is even handed back).
    pub(crate) fn collect_promoted(
        &self,
        type_name: &str,
        depth: usize,
        through_pointer: bool,
    ) -> HashMap<String, (String, Pos)> {
        let mut visited = std::collections::HashSet::new();
        self.collect(type_name, depth, through_pointer, &mut visited)
    }

    /// BFS-ish recursive collection with depth-based shadowing: a
    /// candidate found at a shallower depth wins; same-depth collisions
    /// are ambiguous and dropped entirely (neither promoted), matching
    /// the subject language's own ambiguity rule.
    fn collect(
        &self,
        type_name: &str,
        depth: usize,
        through_pointer: bool,
        visited: &mut std::collections::HashSet<String>,
    ) -> HashMap<String, (String, Pos)> {
        let mut by_depth: HashMap<String, (usize, String, Pos)> = HashMap::new();

        if !visited.insert(type_name.to_string()) {
            return HashMap::new();
        }

        if let Some(entry) = self.types.get(type_name) {
            for (name, (is_ptr, pos)) in &entry.own_methods {
                if through_pointer || !is_ptr {
                    by_depth.insert(name.clone(), (depth, type_name.to_string(), *pos));
                }
            }

            for embed in &entry.embeds {
                // Promotion reaches pointer methods of the embedded type
                // either because the receiver side is itself a pointer,
                // or because the field is an embedded pointer (the value
                // already exists, so its address is always available).
                let reach_pointer = through_pointer || embed.is_ptr;
                let promoted = match &embed.source {
                    EmbedSource::Local => {
                        self.collect(&embed.type_name, depth + 1, reach_pointer, visited)
                    }
                    EmbedSource::Foreign(catalog) => {
                        catalog.collect_promoted(&embed.type_name, depth + 1, reach_pointer)
                    }
                    EmbedSource::Unresolved => HashMap::new(),
                };
                for (name, (found_depth, decl_type, pos)) in promoted {
                    by_depth
                        .entry(name)
                        .and_modify(|(existing_depth, existing_type, existing_pos)| {
                            if found_depth < *existing_depth {
                                *existing_depth = found_depth;
                                *existing_type = decl_type.clone();
                                *existing_pos = pos;
                            } else if found_depth == *existing_depth {
                                // Ambiguous at equal depth: mark for removal
                                // by pointing at a sentinel depth that can
                                // never win, handled below.
                                *existing_depth = usize::MAX;
                            }
                        })
                        .or_insert((found_depth, decl_type, pos));
                }
            }
        }

        visited.remove(type_name);

        by_depth
            .into_iter()
            .filter(|(_, (d, _, _))| *d != usize::MAX)
            .map(|(name, (_, decl_type, pos))| (name, (decl_type, pos)))
            .collect()
    }

    /// Does `type_name`'s pointer method set contain every name in
    /// `method_names`? Name-only satisfaction per spec §4.3 step 2a.
    pub fn satisfies(&self, type_name: &str, method_names: &[String]) -> bool {
        let set = self.pointer_method_set(type_name);
        method_names.iter().all(|m| set.contains_key(m))
    }

    /// True only for types backed by an actual `struct { ... }`
    /// declaration in this package. A type that only ever appears as a
    /// method receiver (e.g. a defined type over a non-struct underlying)
    /// still has its methods considered for promotion, but isn't itself
    /// offered to interface satisfaction as a struct literal would be.
    pub fn is_struct(&self, type_name: &str) -> bool {
        self.types
            .get(type_name)
            .map(|e| e.is_struct)
            .unwrap_or(false)
    }
}

/// Alias -> canonical import path, as declared by this file's own import
/// table — needed to turn a qualified embedded field (`pkg.Type`) into
/// the import path an [`Importer`] resolves.
fn import_aliases(file: &crate::parser::ParsedFile) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for decl in &file.ast.imports {
        for spec in &decl.specs {
            let alias = spec.clone().alias.unwrap_or_else(|| {
                spec.path
                    .rsplit('/')
                    .next()
                    .unwrap_or(&spec.path)
                    .to_string()
            });
            out.insert(alias, spec.path.clone());
        }
    }
    out
}

fn resolve_embed(
    f: &crate::parser::Field,
    aliases: &HashMap<String, String>,
    importer: Option<&Importer>,
) -> Result<EmbeddedField> {
    let Some((pkg_alias, bare_name)) = f.type_name.split_once('.') else {
        return Ok(EmbeddedField {
            type_name: f.type_name.clone(),
            is_ptr: f.type_is_ptr,
            source: EmbedSource::Local,
        });
    };

    let source = match (aliases.get(pkg_alias), importer) {
        (Some(import_path), Some(importer)) => {
            EmbedSource::Foreign(importer.catalog_for(import_path)?)
        }
        _ => EmbedSource::Unresolved,
    };

    Ok(EmbeddedField {
        type_name: bare_name.to_string(),
        is_ptr: f.type_is_ptr,
        source,
    })
}
