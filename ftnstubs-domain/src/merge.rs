//! Line-oriented merge of interface fragments into one consolidated file.
//!
//! Each line is copied through two substitutions. A subroutine signature that
//! continues across lines (trailing `&`) is followed, after its last line, by a
//! `use` of the subsystem's generated-definitions module.

const STATUS_PATTERN: &str = "integer z";
const STATUS_LINE: &str = "        PetscErrorCode z";
const COMM_PATTERN: &str = "integer a ! MPI_Comm";
const COMM_LINE: &str = "      MPI_Comm a ! MPI_Comm";
const CONTINUATION_MARKER: char = '&';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureState {
    #[default]
    Normal,
    /// Inside a subroutine signature whose last line ended with `&`.
    Continuation,
}

/// Rewrite declarations to the canonical status and communicator spellings.
pub fn substitute_line(line: &str) -> &str {
    if line.contains(STATUS_PATTERN) {
        STATUS_LINE
    } else if line.contains(COMM_PATTERN) {
        COMM_LINE
    } else {
        line
    }
}

fn opens_signature(line: &str) -> bool {
    line.contains("subroutine ") && !line.contains("end subroutine")
}

fn continues(line: &str) -> bool {
    line.trim_end().ends_with(CONTINUATION_MARKER)
}

#[derive(Debug, Clone)]
pub struct InterfaceMerger {
    use_line: String,
    state: SignatureState,
    out: String,
}

impl InterfaceMerger {
    /// `module_prefix` and `subsystem` name the definitions module, e.g. `petscvecdef`.
    pub fn new(module_prefix: &str, subsystem: &str) -> Self {
        Self {
            use_line: format!("      use {module_prefix}{subsystem}def"),
            state: SignatureState::Normal,
            out: String::new(),
        }
    }

    pub fn state(&self) -> SignatureState {
        self.state
    }

    /// Append one fragment. A signature left open at the end of the fragment is closed.
    pub fn push_fragment(&mut self, text: &str) {
        for line in text.lines() {
            self.push_line(line);
        }
        if self.state == SignatureState::Continuation {
            self.emit_use();
        }
    }

    fn push_line(&mut self, line: &str) {
        match self.state {
            SignatureState::Normal => {
                self.emit(substitute_line(line));
                if opens_signature(line) && continues(line) {
                    self.state = SignatureState::Continuation;
                }
            }
            SignatureState::Continuation => {
                self.emit(line);
                if !continues(line) {
                    self.emit_use();
                }
            }
        }
    }

    fn emit(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn emit_use(&mut self) {
        self.out.push_str(&self.use_line);
        self.out.push('\n');
        self.state = SignatureState::Normal;
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn merge(fragments: &[&str]) -> String {
        let mut merger = InterfaceMerger::new("petsc", "vec");
        for f in fragments {
            merger.push_fragment(f);
        }
        merger.finish()
    }

    #[test]
    fn substitutes_status_and_communicator_lines() {
        assert_eq!(substitute_line("      integer z"), STATUS_LINE);
        assert_eq!(substitute_line("      integer a ! MPI_Comm"), COMM_LINE);
        assert_eq!(substitute_line("      integer n"), "      integer n");
    }

    #[test]
    fn single_line_signature_gets_no_use_line() {
        let out = merge(&["      subroutine foo(z)\n      integer z\n      end subroutine\n"]);
        assert_eq!(
            out,
            "      subroutine foo(z)\n        PetscErrorCode z\n      end subroutine\n"
        );
    }

    #[test]
    fn use_line_follows_last_continuation_line() {
        let fragment = "\
      subroutine VecSetSizes(a,b,c,z)&
     &
      use petscvecdef, only: tVec
      Vec a ! Vec
      integer z
      end subroutine
";
        let out = merge(&[fragment]);
        let expected = "\
      subroutine VecSetSizes(a,b,c,z)&
     &
      use petscvecdef, only: tVec
      use petscvecdef
      Vec a ! Vec
        PetscErrorCode z
      end subroutine
";
        assert_eq!(out, expected);
    }

    #[test]
    fn tracks_state_across_lines() {
        let mut merger = InterfaceMerger::new("petsc", "ksp");
        merger.push_line("      subroutine KSPSolve(a,b,&");
        assert_eq!(merger.state(), SignatureState::Continuation);
        merger.push_line("     & c,z)");
        assert_eq!(merger.state(), SignatureState::Normal);
        assert!(merger.finish().ends_with("     & c,z)\n      use petsckspdef\n"));
    }

    #[test]
    fn end_subroutine_never_opens_a_signature() {
        let out = merge(&["      end subroutine foo &\n      integer n\n"]);
        assert_eq!(out, "      end subroutine foo &\n      integer n\n");
    }

    #[test]
    fn open_signature_is_closed_at_fragment_end() {
        let out = merge(&["      subroutine Foo(a,&", "      integer z\n"]);
        assert_eq!(
            out,
            "      subroutine Foo(a,&\n      use petscvecdef\n        PetscErrorCode z\n"
        );
    }

    #[test]
    fn fragments_concatenate_in_order_with_newlines() {
        let out = merge(&["      integer a ! MPI_Comm", "      end subroutine\n"]);
        assert_eq!(out, "      MPI_Comm a ! MPI_Comm\n      end subroutine\n");
    }
}
