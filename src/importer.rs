//! Cross-package import resolution for method-set computation (spec §4.2,
//! §9: "the CYCLE_ERROR-via-in-progress-set decision" is normative, not
//! optional).
//!
//! The importer hook the Parser/Type-Checker uses has no compiled-metadata
//! path to fall back from in this subject language's scope (there is no
//! serialized package-interface format here), so it always resolves a
//! dependency package by recursively listing, parsing, and cataloging it
//! from source, memoized per run by canonical import path. A package
//! currently being resolved is marked in-progress; resolving it again
//! before that mark clears means an import cycle, which surfaces as
//! [`LogCopError::Cycle`] instead of unbounded recursion.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::checker::TypeCatalog;
use crate::collab::PackageLister;
use crate::error::{LogCopError, Result};
use crate::parser::{self, ParsedPackage};
use crate::resolver;

/// One run's memoized cross-package resolutions. Lives only for the
/// duration of a single `analyze` call — the memo is "per-invocation,
/// read-write from a single task, not shared" (spec §4.2 design notes).
pub struct Importer<'a> {
    lister: &'a dyn PackageLister,
    cache: RefCell<HashMap<String, (Rc<ParsedPackage>, Rc<TypeCatalog>)>>,
    in_progress: RefCell<HashSet<String>>,
}

impl<'a> Importer<'a> {
    pub fn new(lister: &'a dyn PackageLister) -> Self {
        Importer {
            lister,
            cache: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(HashSet::new()),
        }
    }

    /// Resolve, parse, and catalog the package at `import_path`, reusing a
    /// prior resolution within this run. Returns `CYCLE_ERROR` if
    /// `import_path` is already being resolved further up the call stack.
    pub fn catalog_for(&self, import_path: &str) -> Result<Rc<TypeCatalog>> {
        if let Some((_, catalog)) = self.cache.borrow().get(import_path) {
            return Ok(catalog.clone());
        }
        if !self.in_progress.borrow_mut().insert(import_path.to_string()) {
            return Err(LogCopError::Cycle {
                path: import_path.to_string(),
                chain: vec![import_path.to_string()],
            });
        }

        let built = self.build(import_path);
        self.in_progress.borrow_mut().remove(import_path);
        let (parsed, catalog) = built?;

        let catalog = Rc::new(catalog);
        self.cache
            .borrow_mut()
            .insert(import_path.to_string(), (Rc::new(parsed), catalog.clone()));
        Ok(catalog)
    }

    fn build(&self, import_path: &str) -> Result<(ParsedPackage, TypeCatalog)> {
        let descriptor = resolver::resolve(self.lister, std::slice::from_ref(&import_path.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| LogCopError::Import {
                path: import_path.to_string(),
                message: "package expanded to no files".to_string(),
            })?;
        let parsed = parser::parse_package(&descriptor, None)?;
        let catalog = TypeCatalog::build(&parsed, Some(self))?;
        Ok((parsed, catalog))
    }

    /// Every package pulled in transitively through a cross-package embed
    /// this run, for the Validator to search when an obligated method's
    /// declaration lives outside the implementation package it was
    /// obligated from.
    pub fn parsed_packages(&self) -> Vec<Rc<ParsedPackage>> {
        self.cache.borrow().values().map(|(p, _)| p.clone()).collect()
    }
}
