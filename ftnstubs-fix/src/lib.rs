//! Repair engine for raw bfort output.
//!
//! Responsibilities:
//! - Apply the ordered rewrite table in [`rules`] to a stub's text.
//! - Prepend the local includes every stub needs.
//! - Rewrite stub files in place, warning about embedded NUL characters.

pub mod rules;

use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use tracing::{debug, warn};

pub use rules::{FixRule, RULE_SPECS, RuleSpec, compile_rules};

/// Includes prepended to every fixed stub, in this order.
pub const STUB_PREAMBLE: &str =
    "#include \"petscsys.h\"\n#include \"petscfix.h\"\n#include \"petsc/private/fortranimpl.h\"\n";

/// Result of fixing one stub's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub text: String,
    /// The raw text contained at least one NUL character.
    pub nul_found: bool,
}

#[derive(Debug, Clone)]
pub struct StubFixer {
    rules: Vec<FixRule>,
}

impl StubFixer {
    pub fn new() -> anyhow::Result<Self> {
        let rules = compile_rules().context("compile stub rewrite rules")?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[FixRule] {
        &self.rules
    }

    /// Run the rewrite table only, without touching the preamble.
    pub fn apply_rules(&self, raw: &str) -> String {
        self.rules
            .iter()
            .fold(raw.to_string(), |text, rule| rule.apply(&text))
    }

    /// Rewrite a raw stub and prepend the preamble unless it is already there.
    pub fn fix_text(&self, raw: &str) -> FixOutcome {
        let nul_found = raw.contains('\0');
        let body = self.apply_rules(raw);
        let text = if body.starts_with(STUB_PREAMBLE) {
            body
        } else {
            format!("{STUB_PREAMBLE}{body}")
        };
        FixOutcome { text, nul_found }
    }

    /// Fix a stub file in place.
    pub fn fix_file(&self, path: &Utf8Path) -> anyhow::Result<FixOutcome> {
        let bytes = fs::read(path).with_context(|| format!("read stub {}", path))?;
        let raw = String::from_utf8_lossy(&bytes);
        if let std::borrow::Cow::Owned(_) = raw {
            warn!(path = path.as_str(), "replaced invalid UTF-8 in generated Fortran stub file");
        }
        let outcome = self.fix_text(&raw);
        if outcome.nul_found {
            warn!(path = path.as_str(), "found null character in generated Fortran stub file");
        }
        fs::write(path, &outcome.text).with_context(|| format!("write stub {}", path))?;

        let written = fs::read(path).with_context(|| format!("re-read stub {}", path))?;
        if written.contains(&0) {
            warn!(
                path = path.as_str(),
                "found null character in generated Fortran stub file after processing"
            );
        }
        debug!(path = path.as_str(), "fixed stub");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixer() -> StubFixer {
        StubFixer::new().expect("fixer")
    }

    #[test]
    fn prepends_preamble_once() {
        let f = fixer();
        let once = f.fix_text("void foo_(int *ierr);\n");
        assert!(once.text.starts_with(STUB_PREAMBLE));
        assert_eq!(
            &once.text[STUB_PREAMBLE.len()..],
            "PETSC_EXTERN void foo_(int *ierr);\n"
        );

        let twice = f.fix_text(&once.text);
        assert_eq!(twice.text, once.text);
    }

    #[test]
    fn status_return_declaration_becomes_extern_void() {
        let f = fixer();
        let out = f.fix_text("PetscErrorCode foo(Vec);\n");
        assert!(out.text.contains("PETSC_EXTERN void foo(Vec);"));
        assert!(!out.text.contains("PetscErrorCode foo"));
    }

    #[test]
    fn reports_nul_characters() {
        let f = fixer();
        let out = f.fix_text("\0void foo_(void);\0\n");
        assert!(out.nul_found);
        assert!(!out.text.contains('\0'));
        assert!(out.text.ends_with("PETSC_EXTERN void foo_(void);\n"));

        assert!(!f.fix_text("void foo_(void);\n").nul_found);
    }

    #[test]
    fn later_rules_see_output_of_earlier_ones() {
        let f = fixer();
        let raw = "*ierr = KSPSetComm((MPI_Comm)PetscToPointer( *(int*) (comm) ));\n";
        assert_eq!(
            f.apply_rules(raw),
            "*ierr = KSPSetComm(MPI_Comm_f2c(*(MPI_Fint*)(comm)));\n"
        );
    }
}
