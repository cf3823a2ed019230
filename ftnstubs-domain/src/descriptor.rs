//! Scraping a parent `makefile` and synthesizing the one for `ftn-auto/`.

use crate::layout::{ArtifactKind, OUTPUT_DIR_NAME, artifact_kind};

const UNKNOWN: &str = "unknown";

const SHARED_INCLUDES: &[&str] = &[
    "include ${PETSC_DIR}/lib/petsc/conf/variables",
    "include ${PETSC_DIR}/lib/petsc/conf/rules",
    "include ${PETSC_DIR}/lib/petsc/conf/test",
];

/// The recognised lines of a parent build descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildDescriptor {
    pub cppflags: String,
    pub libbase: String,
    pub locdir: String,
    pub subsystem: Option<String>,
    pub submodule: Option<String>,
}

impl BuildDescriptor {
    /// Scrape a descriptor. Lines are matched by substring; the last match wins.
    pub fn parse(text: &str) -> Self {
        let mut desc = Self::default();
        for line in text.lines() {
            if line.contains("CPPFLAGS") {
                desc.cppflags = line.to_string();
            }
            if line.contains("LIBBASE") {
                desc.libbase = line.to_string();
            } else if line.contains("LOCDIR") {
                desc.locdir = line.to_string();
            } else if line.contains("SUBMANSEC") {
                desc.submodule = assigned_value(line).or(desc.submodule);
            } else if line.contains("MANSEC") {
                desc.subsystem = assigned_value(line).or(desc.subsystem);
            }
        }
        desc
    }

    pub fn subsystem(&self) -> &str {
        self.subsystem.as_deref().unwrap_or(UNKNOWN)
    }

    /// Falls back to the subsystem when no submodule line is present.
    pub fn submodule(&self) -> &str {
        self.submodule
            .as_deref()
            .or(self.subsystem.as_deref())
            .unwrap_or(UNKNOWN)
    }

    /// Location line pointing into the output subdirectory.
    pub fn output_locdir(&self) -> String {
        format!("{}{OUTPUT_DIR_NAME}/", self.locdir.trim_end())
    }

    /// Render the child descriptor for an output subdirectory.
    pub fn synthesize(&self, artifacts: &GeneratedArtifacts) -> String {
        let mut out = String::from("\n");
        out.push_str("#requiresdefine   'PETSC_HAVE_FORTRAN'\n");
        out.push_str("ALL: lib\n");
        out.push_str(&self.cppflags);
        out.push('\n');
        out.push_str("CFLAGS   =\n");
        out.push_str("FFLAGS   =\n");
        out.push_str(&list_line("SOURCEC  =", &artifacts.sources));
        out.push_str("SOURCEF  =\n");
        out.push_str(&list_line("SOURCEH  =", &artifacts.headers));
        out.push_str("DIRS     =\n");
        out.push_str(&self.libbase);
        out.push('\n');
        out.push_str(&self.output_locdir());
        out.push('\n');
        for include in SHARED_INCLUDES {
            out.push_str(include);
            out.push('\n');
        }
        out
    }
}

fn list_line(key: &str, names: &[String]) -> String {
    if names.is_empty() {
        format!("{key}\n")
    } else {
        format!("{key} {}\n", names.join(" "))
    }
}

fn assigned_value(line: &str) -> Option<String> {
    let (_, value) = line.split_once('=')?;
    Some(value.trim().to_lowercase())
}

/// Basenames of what the generator left in an output subdirectory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    pub sources: Vec<String>,
    pub headers: Vec<String>,
}

impl GeneratedArtifacts {
    /// Sort names into sources and headers; anything else is ignored.
    pub fn classify<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut artifacts = Self::default();
        for name in names {
            let name = name.into();
            match artifact_kind(&name) {
                Some(ArtifactKind::Source) => artifacts.sources.push(name),
                Some(ArtifactKind::Header) => artifacts.headers.push(name),
                None => {}
            }
        }
        artifacts.sources.sort();
        artifacts.headers.sort();
        artifacts
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.headers.is_empty()
    }
}
