//! The ordered rewrite table applied to every raw bfort C stub.
//!
//! Order matters: later rules assume earlier ones already ran.

use regex::Regex;

/// A rule as written in the table, before compilation.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub name: &'static str,
    pub pattern: &'static str,
    pub replacement: &'static str,
}

pub const RULE_SPECS: &[RuleSpec] = &[
    RuleSpec {
        name: "strip-nul",
        pattern: r"\x00",
        replacement: "",
    },
    RuleSpec {
        name: "extern-void",
        pattern: r"(?m)^void ",
        replacement: "PETSC_EXTERN void ",
    },
    RuleSpec {
        name: "error-code-to-void",
        pattern: r"(?m)^PetscErrorCode ",
        replacement: "PETSC_EXTERN void ",
    },
    RuleSpec {
        name: "pointer-macro-arg",
        pattern: r"Petsc([ToRm]*)Pointer\(int\)",
        replacement: "Petsc${1}Pointer(void*)",
    },
    RuleSpec {
        name: "to-pointer-deref",
        pattern: r"PetscToPointer\(a\) \(a\)",
        replacement: "PetscToPointer(a) (*(PetscFortranAddr *)(a))",
    },
    RuleSpec {
        name: "from-pointer-addr",
        pattern: r"PetscFromPointer\(a\) \(int\)\(a\)",
        replacement: "PetscFromPointer(a) (PetscFortranAddr)(a)",
    },
    RuleSpec {
        name: "drop-int-deref",
        pattern: r"PetscToPointer\( \*\(int\*\)",
        replacement: "PetscToPointer(",
    },
    RuleSpec {
        name: "comm-by-pointer",
        pattern: r"MPI_Comm comm",
        replacement: "MPI_Comm *comm",
    },
    RuleSpec {
        name: "comm-f2c",
        pattern: r"\(MPI_Comm\)PetscToPointer\( \(comm\) \)",
        replacement: "MPI_Comm_f2c(*(MPI_Fint*)(comm))",
    },
    RuleSpec {
        name: "strip-handle-cast",
        pattern: r"\((?:PetscInt|Tao|TaoConvergedReason|TaoLineSearch|TaoLineSearchConvergedReason)\* \)PetscToPointer",
        replacement: "",
    },
    RuleSpec {
        name: "strip-dll-export",
        pattern: r"\b(PETSC|TAO)(_DLL|VEC_DLL|MAT_DLL|DM_DLL|KSP_DLL|SNES_DLL|TS_DLL|FORTRAN_DLL)(EXPORT)",
        replacement: "",
    },
];

/// A compiled rewrite rule.
#[derive(Debug, Clone)]
pub struct FixRule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl FixRule {
    pub fn compile(spec: &RuleSpec) -> Result<Self, regex::Error> {
        Ok(Self {
            name: spec.name,
            pattern: Regex::new(spec.pattern)?,
            replacement: spec.replacement,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Rewrite every match of this rule. Non-matching text is left untouched.
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement)
            .into_owned()
    }
}

pub fn compile_rules() -> Result<Vec<FixRule>, regex::Error> {
    RULE_SPECS.iter().map(FixRule::compile).collect()
}
