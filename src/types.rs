use std::fmt;

/// Genomic strand/orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    /// Parse the strand column of an annotation line (`+`, `-`, `.` or `?`).
    pub fn from_column(s: &str) -> Option<Strand> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            "." | "?" => Some(Strand::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strand::Plus => "+",
            Strand::Minus => "-",
            Strand::Unknown => ".",
        };
        write!(f, "{s}")
    }
}

/// Genomic location of a reference feature.
/// Coordinates are kept as written in the annotation: 1-based, inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locus {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strand_column_parsing() {
        assert_eq!(Strand::from_column("+"), Some(Strand::Plus));
        assert_eq!(Strand::from_column("-"), Some(Strand::Minus));
        assert_eq!(Strand::from_column("."), Some(Strand::Unknown));
        assert_eq!(Strand::from_column("?"), Some(Strand::Unknown));
        assert_eq!(Strand::from_column("x"), None);
        assert_eq!(Strand::Minus.to_string(), "-");
    }
}
