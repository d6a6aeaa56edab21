use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};

/// Which tool is producing plain output; the two name their files differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Filtered,
    Repaired,
}

impl OutputKind {
    const fn zst_tag(self) -> &'static str {
        match self {
            Self::Filtered => "filt-v3",
            Self::Repaired => "filter-v3",
        }
    }
}

fn is_zstd(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "zst")
}

/// Picks the plain output path for an input dump:
/// `x.csv` becomes `x.csv.plain`, `x.csv.zst` becomes `x.csv.zst.<tag>.plain`.
pub fn plain_output_path(input: &Path, kind: OutputKind) -> anyhow::Result<PathBuf> {
    let Some(name) = input.to_str() else {
        bail!("Input path {} is not valid UTF-8.", input.display());
    };
    if name.ends_with(".csv.zst") {
        Ok(PathBuf::from(format!("{name}.{}.plain", kind.zst_tag())))
    } else if name.ends_with(".csv") {
        Ok(PathBuf::from(format!("{name}.plain")))
    } else {
        bail!("Cannot derive an output name for {name}: expected a .csv or .csv.zst file, or pass --output.");
    }
}

/// Opens a dump for line-by-line reading, decompressing `.zst` files on the fly.
pub fn open(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open input file {}", path.display()))?;
    if !is_zstd(path) {
        return Ok(Box::new(BufReader::new(file)));
    }

    #[cfg(feature = "zstd")]
    let decoder = zstd::stream::read::Decoder::new(file)
        .with_context(|| format!("Failed to start zstd decoding of {}", path.display()))?;
    #[cfg(not(feature = "zstd"))]
    let decoder = ruzstd::decoding::StreamingDecoder::new(file).map_err(|e| {
        anyhow::anyhow!("Failed to start zstd decoding of {}: {e}", path.display())
    })?;

    Ok(Box::new(BufReader::new(decoder)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names() {
        assert_eq!(
            plain_output_path(Path::new("data/run1.csv"), OutputKind::Filtered).unwrap(),
            PathBuf::from("data/run1.csv.plain")
        );
        assert_eq!(
            plain_output_path(Path::new("data/run1.csv.zst"), OutputKind::Filtered).unwrap(),
            PathBuf::from("data/run1.csv.zst.filt-v3.plain")
        );
        assert_eq!(
            plain_output_path(Path::new("data/run1.csv.zst"), OutputKind::Repaired).unwrap(),
            PathBuf::from("data/run1.csv.zst.filter-v3.plain")
        );
        assert!(plain_output_path(Path::new("data/run1.binpack"), OutputKind::Filtered).is_err());
    }

    #[test]
    fn zstd_detection() {
        assert!(is_zstd(Path::new("a.csv.zst")));
        assert!(!is_zstd(Path::new("a.csv")));
        assert!(!is_zstd(Path::new("zst")));
    }
}
