//! CLI invocation tests for both modes.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn ftnstubs() -> Command {
    let mut cmd = Command::cargo_bin("ftnstubs").expect("ftnstubs binary");
    cmd.env_remove("RUST_LOG").env_remove("PETSC_DIR");
    cmd
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

fn create_merge_tree() -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    write(
        &td.path()
            .join("src/vec/f90-mod/ftn-auto-interfaces/vec-tmpdir/src_vec_vec_interface.h90"),
        "      subroutine VecNorm(a,b,&\n     & c,z)\n      integer z\n      end subroutine\n",
    );
    td
}

#[test]
fn test_no_args_prints_usage() {
    ftnstubs()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_missing_petsc_dir_is_fatal() {
    ftnstubs()
        .arg("-merge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--petsc-dir"));
}

#[test]
fn test_unknown_option_is_rejected() {
    let temp = tempfile::tempdir().expect("tempdir");
    ftnstubs()
        .current_dir(temp.path())
        .env("PETSC_DIR", temp.path())
        .arg("-frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown option '-frobnicate'"));
}

#[test]
fn test_merge_writes_consolidated_interface() {
    let temp = create_merge_tree();

    ftnstubs()
        .env("PETSC_DIR", temp.path())
        .arg("-merge")
        .assert()
        .success();

    let interfaces = temp.path().join("src/vec/f90-mod/ftn-auto-interfaces");
    let merged = fs::read_to_string(interfaces.join("petscvec.h90")).expect("merged");
    assert_eq!(
        merged,
        "      subroutine VecNorm(a,b,&\n     & c,z)\n      use petscvecdef\n        PetscErrorCode z\n      end subroutine\n"
    );
    assert!(!interfaces.join("vec-tmpdir").exists());
}

#[test]
fn test_merge_verbose_logs_progress() {
    let temp = create_merge_tree();

    ftnstubs()
        .arg("--petsc-dir")
        .arg(temp.path())
        .arg("-merge")
        .arg("1")
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing F90 interface for vec-tmpdir"))
        .stderr(predicate::str::contains("Copying in src_vec_vec_interface.h90"));
}

#[test]
fn test_merge_accepts_hyphenated_verbose_flag() {
    let temp = create_merge_tree();

    ftnstubs()
        .env("PETSC_DIR", temp.path())
        .arg("-merge")
        .arg("-verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing F90 interface for vec-tmpdir"));
}

#[test]
fn test_merge_is_quiet_by_default() {
    let temp = create_merge_tree();

    ftnstubs()
        .env("PETSC_DIR", temp.path())
        .arg("-merge")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_config_file_changes_product_prefix() {
    let temp = tempfile::tempdir().expect("tempdir");
    write(
        &temp.path().join("ftnstubs.toml"),
        "[merge]\nsubsystems = [\"eps\"]\nproduct_prefix = \"slepc\"\n",
    );
    write(
        &temp.path().join("src/eps/f90-mod/ftn-auto-interfaces/eps-tmpdir/a.h90"),
        "      subroutine EPSSolve(a,&\n     & z)\n",
    );

    ftnstubs()
        .env("PETSC_DIR", temp.path())
        .arg("-merge")
        .assert()
        .success();

    let merged = fs::read_to_string(
        temp.path()
            .join("src/eps/f90-mod/ftn-auto-interfaces/slepceps.h90"),
    )
    .expect("merged");
    assert!(merged.contains("      use slepcepsdef\n"));
}

#[test]
fn test_invalid_config_is_fatal() {
    let temp = tempfile::tempdir().expect("tempdir");
    write(&temp.path().join("ftnstubs.toml"), "[generate]\nbatch_size = 0\n");
    write(&temp.path().join("src/vec/a.c"), "int x;\n");

    ftnstubs()
        .current_dir(temp.path().join("src"))
        .env("PETSC_DIR", temp.path())
        .arg("/nonexistent/bfort")
        .assert()
        .failure()
        .stderr(predicate::str::contains("batch_size"));
}

#[cfg(unix)]
mod generate {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::PermissionsExt;

    const FAKE_BFORT: &str = r#"#!/bin/sh
out=
frag=
files=
while [ $# -gt 0 ]; do
  case "$1" in
    -dir) out="$2"; shift 2 ;;
    -f90modfile) frag="$2"; shift 2 ;;
    -ptrprefix|-ptr64|-fcaps|-fuscore) shift 2 ;;
    -*) shift ;;
    *) files="$files $1"; shift ;;
  esac
done
for f in $files; do
  stem="${f%.*}"
  printf 'PetscErrorCode %s_(void*);\n' "$stem" > "$out/${stem}f.c"
done
printf '      subroutine foo(z)\n      integer z\n      end subroutine\n' > "$frag"
"#;

    fn install_script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let script = dir.join(name);
        fs::write(&script, body).expect("write script");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");
        script
    }

    fn create_source_tree() -> TempDir {
        let td = tempfile::tempdir().expect("tempdir");
        write(
            &td.path().join("src/vec/vec/interface/makefile"),
            "CPPFLAGS  =\nLIBBASE   = libpetscvec\nMANSEC    = Vec\nLOCDIR    = src/vec/vec/interface/\n",
        );
        write(&td.path().join("src/vec/vec/interface/vector.c"), "PetscErrorCode foo(Vec);\n");
        td
    }

    #[test]
    fn test_generate_then_merge() {
        let temp = create_source_tree();
        let script = install_script(temp.path(), "fake-bfort", FAKE_BFORT);

        ftnstubs()
            .current_dir(temp.path().join("src"))
            .env("PETSC_DIR", temp.path())
            .arg(&script)
            .assert()
            .success();

        let out = temp.path().join("src/vec/vec/interface/ftn-auto");
        let stub = fs::read_to_string(out.join("vectorf.c")).expect("stub");
        assert!(stub.starts_with("#include \"petscsys.h\"\n"));
        assert!(stub.contains("PETSC_EXTERN void vector_(void*);"));
        let makefile = fs::read_to_string(out.join("makefile")).expect("makefile");
        assert!(makefile.contains("SOURCEC  = vectorf.c\n"));

        ftnstubs()
            .env("PETSC_DIR", temp.path())
            .arg("-merge")
            .assert()
            .success();

        let merged = fs::read_to_string(
            temp.path()
                .join("src/vec/f90-mod/ftn-auto-interfaces/petscvec.h90"),
        )
        .expect("merged");
        assert_eq!(
            merged,
            "      subroutine foo(z)\n        PetscErrorCode z\n      end subroutine\n"
        );
    }

    #[test]
    fn test_generate_accepts_hyphenated_verbose_flag() {
        let temp = create_source_tree();
        let script = install_script(temp.path(), "fake-bfort", FAKE_BFORT);

        ftnstubs()
            .current_dir(temp.path().join("src"))
            .env("PETSC_DIR", temp.path())
            .arg(&script)
            .arg("-verbose")
            .assert()
            .success()
            .stderr(predicate::str::contains("Generating Fortran stubs for"));
        assert!(temp.path().join("src/vec/vec/interface/ftn-auto/vectorf.c").is_file());
    }

    #[test]
    fn test_generator_failure_surfaces_output() {
        let temp = create_source_tree();
        let script = install_script(
            temp.path(),
            "broken-bfort",
            "#!/bin/sh\necho 'vector.c:1: cannot parse'\nexit 2\n",
        );

        ftnstubs()
            .current_dir(temp.path().join("src"))
            .env("PETSC_DIR", temp.path())
            .arg(&script)
            .assert()
            .failure()
            .stderr(predicate::str::contains("vector.c:1: cannot parse"));
    }

    #[test]
    fn test_missing_parent_makefile_is_fatal() {
        let temp = tempfile::tempdir().expect("tempdir");
        write(&temp.path().join("src/sys/utils/str.c"), "PetscErrorCode s(void);\n");
        let script = install_script(temp.path(), "fake-bfort", FAKE_BFORT);

        ftnstubs()
            .current_dir(temp.path().join("src"))
            .env("PETSC_DIR", temp.path())
            .arg(&script)
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing build descriptor"));
    }
}
