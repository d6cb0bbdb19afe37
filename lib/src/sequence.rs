use serde::Deserialize;
use std::{
    ffi::OsString,
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Biochemical type of a chain, as understood by `run_RF2NA.sh`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum ChainKind {
    #[serde(rename = "Protein")]
    Protein,
    #[serde(rename = "RNA")]
    Rna,
    #[serde(rename = "Double stranded DNA")]
    DoubleStrandDna,
    #[serde(rename = "Single stranded DNA")]
    SingleStrandDna,
    #[serde(rename = "Paired Protein/RNA")]
    PairedProteinRna,
}

impl ChainKind {
    pub const ALL: [ChainKind; 5] = [
        Self::Protein,
        Self::Rna,
        Self::DoubleStrandDna,
        Self::SingleStrandDna,
        Self::PairedProteinRna,
    ];

    /// Command-line prefix token for this kind.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Protein => "P",
            Self::Rna => "R",
            Self::DoubleStrandDna => "D",
            Self::SingleStrandDna => "S",
            Self::PairedProteinRna => "PR",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Protein => "Protein",
            Self::Rna => "RNA",
            Self::DoubleStrandDna => "Double stranded DNA",
            Self::SingleStrandDna => "Single stranded DNA",
            Self::PairedProteinRna => "Paired Protein/RNA",
        }
    }
}

impl Display for ChainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ChainKind {
    type Err = String;

    // Accepts the prefix tokens as well as readable names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace([' ', '_', '/'], "-");
        let kind = match normalized.as_str() {
            "p" | "protein" => Self::Protein,
            "r" | "rna" => Self::Rna,
            "d" | "dna" | "dsdna" | "double-stranded-dna" | "double-strand-dna" => {
                Self::DoubleStrandDna
            }
            "s" | "ssdna" | "single-stranded-dna" | "single-strand-dna" => Self::SingleStrandDna,
            "pr" | "paired" | "protein-rna" | "paired-protein-rna" => Self::PairedProteinRna,
            _ => {
                return Err(format!(
                    "Unknown chain kind \"{s}\"; expected one of protein, rna, dsdna, ssdna, paired-protein-rna (or P, R, D, S, PR)"
                ));
            }
        };
        Ok(kind)
    }
}

/// One chain of the prediction: its kind and the local FASTA it lives in.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SequenceInput {
    kind: ChainKind,
    file: PathBuf,
}

impl SequenceInput {
    pub fn new(kind: ChainKind, file: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            file: file.into(),
        }
    }

    pub fn kind(&self) -> ChainKind {
        self.kind
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// `<prefix>:<path>`
    pub fn token(&self) -> OsString {
        let path = self.file.as_os_str();
        let mut token = OsString::with_capacity(self.kind.prefix().len() + 1 + path.len());
        token.push(self.kind.prefix());
        token.push(":");
        token.push(path);
        token
    }
}

impl FromStr for SequenceInput {
    type Err = String;

    /// Parses `<kind>:<path>`, splitting on the first colon only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, file) = s
            .split_once(':')
            .ok_or_else(|| format!("Expected <kind>:<path>, got \"{s}\""))?;
        if file.is_empty() {
            return Err(format!("Missing file path in \"{s}\""));
        }
        Ok(Self::new(kind.parse()?, file))
    }
}
