//! # draftgen: code generation from IETF-style draft message definitions
//!
//! Protocol drafts describe control messages as loose, human-readable blocks. This
//! crate parses those blocks into a typed model and renders source artifacts (a
//! declarations file and a definitions file) so codec code can be regenerated
//! whenever the draft changes.
//!
//! ## Draft syntax
//!
//! ```text
//! SUBSCRIBE_OK Message {
//!   Type (i) = 0x4,             # wire type id, hexadecimal
//!   Length (16),
//!   Subscribe ID (i),
//!   [Largest Group ID (i),      # optional group
//!    Largest Object ID (i)]
//!   Number of Parameters (i),   # size field, elided into the next field
//!   Subscribe Parameters (..) ...
//! }
//! ```
//!
//! - `(type)`: type token; `..` means variable length.
//! - trailing `...`: repeated; the preceding field becomes its implicit count.
//! - `[ ... ]`: optional group, emitted as a nested aggregate.
//! - lines that do not match are skipped; blocks without `Type` are dropped.
//!
//! ## Pipeline
//!
//! text → [`parser::extract_blocks`] → [`Assembler`] (with a [`TypeResolver`]) →
//! [`AliasTable::aggregate`] → [`emit::Backend::render`].

pub mod alias;
pub mod assemble;
pub mod ast;
pub mod check;
pub mod config;
pub mod dump;
pub mod emit;
pub mod error;
pub mod parser;
pub mod resolve;

pub use alias::AliasTable;
pub use assemble::{Assembler, ParseOutcome};
pub use ast::{AliasType, Field, MessageSpec, Shape, TypeRef};
pub use check::{check, Finding, Severity};
pub use config::{Config, UnresolvedPolicy};
pub use emit::{cpp::CppBackend, emit, Artifacts, Backend, Model};
pub use error::GenError;
pub use resolve::TypeResolver;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of running the pipeline over one draft text.
#[derive(Debug, Clone)]
pub struct Generation {
    pub outcome: ParseOutcome,
    pub aliases: AliasTable,
    pub findings: Vec<Finding>,
    /// `None` when no message survived assembly.
    pub artifacts: Option<Artifacts>,
}

/// What [`run`] did.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub messages: usize,
    pub dropped: Vec<String>,
    pub findings: Vec<Finding>,
    /// Paths written, declarations first. Empty when nothing was generated.
    pub written: Vec<PathBuf>,
}

/// Parse, aggregate, check and render `text`. Pure: no files are touched.
pub fn generate(
    text: &str,
    config: &Config,
    backend: &dyn Backend,
    base_name: &str,
) -> Result<Generation, GenError> {
    let mut assembler = Assembler::new(config.resolver());
    let outcome = assembler.parse_messages(text)?;
    let aliases = AliasTable::aggregate(&outcome.messages, &config.discards);
    let findings = check(&outcome.messages, &config.discards, config.unresolved);
    let artifacts = if outcome.messages.is_empty() {
        None
    } else {
        Some(emit(
            backend,
            &outcome.messages,
            &aliases,
            &config.discards,
            base_name,
        ))
    };
    Ok(Generation {
        outcome,
        aliases,
        findings,
        artifacts,
    })
}

/// `<base>.<ext>`, keeping any dots already in `base`.
pub fn artifact_path(output_base: &Path, extension: &str) -> PathBuf {
    let mut path: OsString = output_base.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Read the draft at `input` and write `<output_base>.<ext>` for both artifacts.
///
/// When no message survives, nothing is written so a previous good output is kept.
/// Under [`UnresolvedPolicy::Fail`] any error finding aborts before writing.
pub fn run(
    input: &Path,
    output_base: &Path,
    config: &Config,
    backend: &dyn Backend,
) -> Result<RunReport, GenError> {
    let text = std::fs::read_to_string(input)?;
    let base_name = output_base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let generation = generate(&text, config, backend, &base_name)?;

    for finding in &generation.findings {
        warn!("{}", finding);
    }
    if config.unresolved == UnresolvedPolicy::Fail && check::has_errors(&generation.findings) {
        return Err(GenError::Strict(
            generation
                .findings
                .iter()
                .filter(|f| f.severity == Severity::Error)
                .map(Finding::to_string)
                .collect(),
        ));
    }

    let mut report = RunReport {
        messages: generation.outcome.messages.len(),
        dropped: generation.outcome.dropped,
        findings: generation.findings,
        written: Vec::new(),
    };
    let Some(artifacts) = generation.artifacts else {
        warn!(input = %input.display(), "no messages parsed, nothing written");
        return Ok(report);
    };

    let declarations = artifact_path(output_base, backend.declarations_extension());
    let definitions = artifact_path(output_base, backend.definitions_extension());
    std::fs::write(&declarations, &artifacts.declarations)?;
    std::fs::write(&definitions, &artifacts.definitions)?;
    info!(
        messages = report.messages,
        declarations = %declarations.display(),
        definitions = %definitions.display(),
        "artifacts written"
    );
    report.written = vec![declarations, definitions];
    Ok(report)
}
